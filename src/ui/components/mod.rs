pub mod drill_summary;
pub mod flashcard;
pub mod menu;
pub mod passage_view;
pub mod progress_bar;
pub mod word_bank;
