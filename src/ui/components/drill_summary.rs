use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::result::DrillSummary;
use crate::ui::theme::Theme;

pub struct DrillSummaryView<'a> {
    pub summary: &'a DrillSummary,
    pub previous: Option<&'a DrillSummary>,
    pub theme: &'a Theme,
}

impl<'a> DrillSummaryView<'a> {
    pub fn new(
        summary: &'a DrillSummary,
        previous: Option<&'a DrillSummary>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            summary,
            previous,
            theme,
        }
    }
}

impl Widget for DrillSummaryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Drill Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let title_text = if self.summary.ended_early {
            "Session ended early"
        } else {
            "All cards reviewed"
        };
        Paragraph::new(Line::from(Span::styled(
            title_text,
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let reviewed_text = format!("{} of {}", self.summary.reviewed, self.summary.total_words);
        Paragraph::new(Line::from(vec![
            Span::styled("  Reviewed: ", Style::default().fg(colors.fg())),
            Span::styled(
                &*reviewed_text,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
        .render(layout[1], buf);

        let known_text = format!("{}", self.summary.known);
        let unknown_text = format!("{}", self.summary.unknown);
        let unrated_text = format!("  ({} not rated)", self.summary.unrated());
        Paragraph::new(Line::from(vec![
            Span::styled("  Known:    ", Style::default().fg(colors.fg())),
            Span::styled(
                &*known_text,
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("   Review again: ", Style::default().fg(colors.fg())),
            Span::styled(
                &*unknown_text,
                Style::default()
                    .fg(if self.summary.unknown == 0 {
                        colors.success()
                    } else {
                        colors.error()
                    })
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(&*unrated_text, Style::default().fg(colors.text_muted())),
        ]))
        .render(layout[2], buf);

        let trend = match self.previous {
            Some(prev) if prev.known + prev.unknown > 0 => {
                let delta = self.summary.known_percent() - prev.known_percent();
                format!("  Known rate {:.0}% ({delta:+.0} vs last drill)", self.summary.known_percent())
            }
            _ => format!("  Known rate {:.0}%", self.summary.known_percent()),
        };
        Paragraph::new(Line::from(Span::styled(
            trend,
            Style::default().fg(colors.text_muted()),
        )))
        .render(layout[3], buf);

        if !self.summary.unknown_words.is_empty() {
            let mut lines = vec![Line::from(Span::styled(
                "  Words to review:",
                Style::default().fg(colors.fg()),
            ))];
            lines.push(Line::from(Span::styled(
                format!("  {}", self.summary.unknown_words.join(", ")),
                Style::default().fg(colors.warning()),
            )));
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .render(layout[4], buf);
        }

        Paragraph::new(Line::from(vec![
            Span::styled("  [r] Drill again  ", Style::default().fg(colors.accent())),
            Span::styled("[b] Back to reading  ", Style::default().fg(colors.accent())),
            Span::styled("[q] Menu", Style::default().fg(colors.accent())),
        ]))
        .render(layout[5], buf);
    }
}
