use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::session::drill::{CardDefinition, DrillOutcome, DrillPhase, VocabularyDrill};
use crate::ui::theme::Theme;

pub struct FlashCard<'a> {
    drill: &'a VocabularyDrill,
    offset: i32,
    theme: &'a Theme,
}

impl<'a> FlashCard<'a> {
    /// `offset` shifts the card horizontally while it is dragged or swiped away.
    pub fn new(drill: &'a VocabularyDrill, offset: i32, theme: &'a Theme) -> Self {
        Self {
            drill,
            offset,
            theme,
        }
    }

    fn shifted(&self, area: Rect) -> Option<Rect> {
        let left = i32::from(area.x) + self.offset;
        let right = left + i32::from(area.width);
        let min = i32::from(area.x);
        let max = i32::from(area.x + area.width);
        let clipped_left = left.max(min);
        let clipped_right = right.min(max);
        if clipped_right - clipped_left < 4 {
            return None;
        }
        Some(Rect::new(
            clipped_left as u16,
            area.y,
            (clipped_right - clipped_left) as u16,
            area.height,
        ))
    }

    fn back_lines(&self, word: &str) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let mut lines = vec![Line::from(Span::styled(
            word.to_string(),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ))];

        match self.drill.card() {
            CardDefinition::Loading => lines.push(Line::from(Span::styled(
                "Looking up definition…",
                Style::default().fg(colors.text_muted()),
            ))),
            CardDefinition::Missing => lines.push(Line::from(Span::styled(
                "No definition available for this word.",
                Style::default().fg(colors.warning()),
            ))),
            CardDefinition::Ready(definition) => {
                if !definition.phonetic.is_empty() {
                    lines.push(Line::from(Span::styled(
                        definition.phonetic.clone(),
                        Style::default().fg(colors.text_muted()),
                    )));
                }
                lines.push(Line::from(""));
                for meaning in &definition.meanings {
                    let Some(primary) = meaning.primary() else {
                        continue;
                    };
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("{}  ", meaning.part_of_speech),
                            Style::default()
                                .fg(colors.fg())
                                .add_modifier(Modifier::ITALIC),
                        ),
                        Span::styled(primary.to_string(), Style::default().fg(colors.fg())),
                    ]));
                }
                lines.push(Line::from(""));
                let mut footer = vec![Span::styled(
                    format!("source: {}", definition.source.label()),
                    Style::default().fg(colors.text_muted()),
                )];
                if self.drill.is_awaiting() {
                    footer.push(Span::styled(
                        "  (shortening…)",
                        Style::default().fg(colors.text_muted()),
                    ));
                }
                lines.push(Line::from(footer));
            }
        }
        lines
    }
}

impl Widget for FlashCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        if self.drill.phase() == DrillPhase::Empty {
            let block = Block::bordered()
                .title(" Vocabulary Drill ")
                .border_style(Style::default().fg(colors.border()))
                .style(Style::default().bg(colors.card_bg()));
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No words marked yet.",
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Mark unfamiliar words in a passage, then come back.",
                    Style::default().fg(colors.text_muted()),
                )),
                Line::from(Span::styled(
                    "[b/Enter/Esc] Return to reading",
                    Style::default().fg(colors.accent()),
                )),
            ])
            .alignment(Alignment::Center)
            .block(block)
            .render(area, buf);
            return;
        }

        let (Some(cursor), Some(word)) = (self.drill.cursor(), self.drill.current_word()) else {
            return;
        };
        let Some(card) = self.shifted(area) else {
            return;
        };
        Clear.render(area, buf);

        let mut title = format!(" Card {} of {} ", cursor.index + 1, self.drill.len());
        match self.drill.outcome(cursor.index) {
            Some(DrillOutcome::Known) => title.push_str("· known "),
            Some(DrillOutcome::Unknown) => title.push_str("· review again "),
            None => {}
        }
        let border = if self.offset > 0 {
            colors.success()
        } else if self.offset < 0 {
            colors.error()
        } else {
            colors.border_focused()
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.card_bg()));

        let lines = if cursor.revealed {
            self.back_lines(word)
        } else {
            let top_pad = usize::from(card.height.saturating_sub(4) / 2);
            let mut lines = vec![Line::from(""); top_pad];
            lines.push(Line::from(Span::styled(
                word.to_string(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "[Space] reveal definition",
                Style::default().fg(colors.text_muted()),
            )));
            lines
        };

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block)
            .render(card, buf);
    }
}
