use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::lookup::definition::DefinitionCache;
use crate::session::reading::ReadingSession;
use crate::ui::layout::passage_scroll;
use crate::ui::theme::Theme;

/// Marked words in marking order. A second view of the same marked set the
/// passage shows; it never owns state of its own.
pub struct WordBank<'a> {
    session: &'a ReadingSession,
    cache: &'a DefinitionCache,
    active: bool,
    theme: &'a Theme,
}

impl<'a> WordBank<'a> {
    pub fn new(
        session: &'a ReadingSession,
        cache: &'a DefinitionCache,
        active: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            session,
            cache,
            active,
            theme,
        }
    }

    /// Marked-word index drawn at `row` of `list` (the area inside the border).
    pub fn index_at(session: &ReadingSession, list: Rect, row: u16) -> Option<usize> {
        if row < list.y || row >= list.y + list.height {
            return None;
        }
        let scroll = passage_scroll(Some(session.bank_selected()), list.height);
        let index = scroll + usize::from(row - list.y);
        (index < session.marked().len()).then_some(index)
    }
}

impl Widget for WordBank<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let marked = self.session.marked();

        let border = if self.active {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(format!(" Word Bank ({}) ", marked.len()))
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        if marked.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "Select words in the passage to add them here",
                Style::default().fg(colors.text_muted()),
            )))
            .render(inner, buf);
            return;
        }

        let selected = self.session.bank_selected();
        let scroll = passage_scroll(Some(selected), inner.height);
        let lines: Vec<Line> = marked
            .iter()
            .enumerate()
            .skip(scroll)
            .take(usize::from(inner.height))
            .map(|(i, word)| {
                let (badge, badge_style) = match self.cache.get(word) {
                    Some(Some(_)) => ("✓", Style::default().fg(colors.success())),
                    Some(None) => ("✗", Style::default().fg(colors.warning())),
                    None => ("…", Style::default().fg(colors.text_muted())),
                };
                let is_selected = self.active && i == selected;
                let word_style = if is_selected {
                    Style::default()
                        .fg(colors.focus_fg())
                        .bg(colors.focus_bg())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(vec![
                    Span::styled(format!("{badge} "), badge_style),
                    Span::styled(word.to_string(), word_style),
                ])
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
