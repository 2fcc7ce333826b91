pub mod drill;
pub mod marked;
pub mod reading;
pub mod result;
pub mod swipe;
