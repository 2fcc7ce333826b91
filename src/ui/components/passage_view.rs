use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::lookup::definition::DefinitionCache;
use crate::session::reading::{PassageLayout, ReadingSession, Tooltip, tooltip_senses};
use crate::ui::layout::{passage_scroll, wrapped_line_count};
use crate::ui::theme::Theme;

const TOOLTIP_MAX_WIDTH: u16 = 56;

/// The passage with marked words highlighted and a definition tooltip for
/// the focused word. `area` is the bordered passage area from `ReadingLayout`.
pub struct PassageView<'a> {
    session: &'a ReadingSession,
    cache: &'a DefinitionCache,
    text_area: Rect,
    active: bool,
    theme: &'a Theme,
}

impl<'a> PassageView<'a> {
    pub fn new(
        session: &'a ReadingSession,
        cache: &'a DefinitionCache,
        text_area: Rect,
        active: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            session,
            cache,
            text_area,
            active,
            theme,
        }
    }

    fn tooltip_lines(&self, tooltip: Tooltip<'_>, word: &str) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let mut lines = Vec::new();
        match tooltip {
            Tooltip::Loading => {
                lines.push(Line::from(Span::styled(
                    format!("{word}: looking up…"),
                    Style::default().fg(colors.text_muted()),
                )));
            }
            Tooltip::Missing => {
                lines.push(Line::from(Span::styled(
                    format!("{word}: no definition found"),
                    Style::default().fg(colors.warning()),
                )));
            }
            Tooltip::Definition(definition) => {
                let mut head = vec![Span::styled(
                    definition.word.clone(),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                )];
                if !definition.phonetic.is_empty() {
                    head.push(Span::styled(
                        format!("  {}", definition.phonetic),
                        Style::default().fg(colors.text_muted()),
                    ));
                }
                lines.push(Line::from(head));
                for (part_of_speech, senses) in tooltip_senses(definition) {
                    lines.push(Line::from(Span::styled(
                        part_of_speech.to_string(),
                        Style::default()
                            .fg(colors.fg())
                            .add_modifier(Modifier::ITALIC),
                    )));
                    for sense in senses {
                        lines.push(Line::from(Span::styled(
                            format!("• {sense}"),
                            Style::default().fg(colors.fg()),
                        )));
                    }
                }
            }
        }
        lines
    }
}

impl Widget for PassageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = if self.active {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(" Passage ")
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        block.render(area, buf);

        let text = self.text_area;
        if text.width == 0 || text.height == 0 {
            return;
        }

        if self.session.is_loading() {
            let msg = Paragraph::new(Line::from(Span::styled(
                "Generating a new passage…",
                Style::default().fg(colors.text_muted()),
            )))
            .alignment(Alignment::Center);
            let row = Rect::new(text.x, text.y + text.height / 2, text.width, 1);
            msg.render(row, buf);
            return;
        }

        let tokens = self.session.tokens();
        let layout = PassageLayout::new(tokens, text.width);
        let focus = self.session.focus();
        let focus_line = focus.and_then(|f| layout.placement(f)).map(|p| p.line);
        let scroll = passage_scroll(focus_line, text.height);

        for placement in layout.placements() {
            if placement.line < scroll || placement.line >= scroll + usize::from(text.height) {
                continue;
            }
            let y = text.y + (placement.line - scroll) as u16;
            let x = text.x + placement.col;

            let is_focus = focus == Some(placement.token);
            let style = if is_focus && self.active {
                Style::default()
                    .fg(colors.focus_fg())
                    .bg(colors.focus_bg())
                    .add_modifier(Modifier::BOLD)
            } else if self.session.is_marked(placement.token) {
                Style::default()
                    .fg(colors.marked_fg())
                    .bg(colors.marked_bg())
            } else {
                Style::default().fg(colors.fg())
            };
            let word: String = tokens[placement.token]
                .text
                .chars()
                .take(usize::from(placement.width))
                .collect();
            buf.set_string(x, y, &word, style);
        }

        let (Some(tooltip), Some(word), Some(placement)) = (
            self.session.tooltip(self.cache),
            self.session.focused_word(),
            focus.and_then(|f| layout.placement(f)),
        ) else {
            return;
        };
        if !self.active {
            return;
        }

        let lines = self.tooltip_lines(tooltip, &word);
        let width = TOOLTIP_MAX_WIDTH.min(text.width);
        let inner_width = usize::from(width.saturating_sub(2));
        let body_height: usize = lines
            .iter()
            .map(|l| wrapped_line_count(&l.to_string(), inner_width))
            .sum();
        let height = (body_height as u16 + 2).min(text.height);

        let token_y = text.y + (placement.line - scroll) as u16;
        let below = token_y + 1;
        let y = if below + height <= text.y + text.height {
            below
        } else {
            token_y.saturating_sub(height).max(text.y)
        };
        let x = (text.x + placement.col).min(text.x + text.width - width);
        let popup = Rect::new(x, y, width, height);

        Clear.render(popup, buf);
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::bordered()
                    .border_style(Style::default().fg(colors.accent()))
                    .style(Style::default().bg(colors.card_bg())),
            )
            .render(popup, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::marked::MarkedWordSet;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.x + buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_renders_tokens_and_highlights_marks() {
        let theme = Theme::default();
        let cache = DefinitionCache::new();
        let session = ReadingSession::restore(
            "An ephemeral glow.",
            MarkedWordSet::from_words(["ephemeral"]),
        );
        let area = Rect::new(0, 0, 40, 6);
        let text = Rect::new(2, 1, 36, 4);
        let mut buf = Buffer::empty(area);
        PassageView::new(&session, &cache, text, false, &theme).render(area, &mut buf);

        assert!(row_text(&buf, 1).contains("An ephemeral glow."));
        assert_eq!(buf[(5, 1)].bg, theme.colors.marked_bg());
        assert_ne!(buf[(2, 1)].bg, theme.colors.marked_bg());
    }

    #[test]
    fn test_tooltip_shows_for_focused_marked_word() {
        let theme = Theme::default();
        let mut cache = DefinitionCache::new();
        cache.insert("ephemeral", None);
        let mut session = ReadingSession::restore(
            "An ephemeral glow.",
            MarkedWordSet::from_words(["ephemeral"]),
        );
        session.set_focus(1, &cache);
        let area = Rect::new(0, 0, 60, 10);
        let text = Rect::new(2, 1, 56, 8);
        let mut buf = Buffer::empty(area);
        PassageView::new(&session, &cache, text, true, &theme).render(area, &mut buf);

        let rendered: String = (0..10).map(|y| row_text(&buf, y)).collect();
        assert!(rendered.contains("no definition found"));
    }
}
