use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥100 cols: passage + word bank sidebar
    Medium, // 60-99 cols: passage with word bank strip below
    Narrow, // <60 cols: passage with a short word bank strip
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 100 {
            LayoutTier::Wide
        } else if area.width >= 60 {
            LayoutTier::Medium
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn show_sidebar(&self) -> bool {
        *self == LayoutTier::Wide
    }

    fn bank_strip_height(&self) -> u16 {
        match self {
            LayoutTier::Wide => 0,
            LayoutTier::Medium => 7,
            LayoutTier::Narrow => 5,
        }
    }
}

/// Reading screen areas. Shared by the renderer and the mouse handler.
pub struct ReadingLayout {
    pub header: Rect,
    pub passage: Rect,
    pub bank: Rect,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl ReadingLayout {
    pub fn new(area: Rect) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(2),
            ])
            .split(area);

        let (passage, bank) = if tier.show_sidebar() {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                .split(vertical[1]);
            (horizontal[0], horizontal[1])
        } else {
            let stacked = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(4),
                    Constraint::Length(tier.bank_strip_height()),
                ])
                .split(vertical[1]);
            (stacked[0], stacked[1])
        };

        Self {
            header: vertical[0],
            passage,
            bank,
            footer: vertical[2],
            tier,
        }
    }

    /// Text area inside the passage border and padding.
    pub fn passage_text(&self) -> Rect {
        self.passage.inner(Margin::new(2, 1))
    }

    /// List area inside the word bank border.
    pub fn bank_list(&self) -> Rect {
        self.bank.inner(Margin::new(1, 1))
    }
}

/// First visible passage line so that the focused line stays on screen.
pub fn passage_scroll(focus_line: Option<usize>, height: u16) -> usize {
    let height = usize::from(height.max(1));
    match focus_line {
        Some(line) if line >= height => line + 1 - height,
        _ => 0,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrillButton {
    Prev,
    Flip,
    Next,
    End,
}

impl DrillButton {
    pub const ALL: [DrillButton; 4] = [
        DrillButton::Prev,
        DrillButton::Flip,
        DrillButton::Next,
        DrillButton::End,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DrillButton::Prev => "◀ Prev",
            DrillButton::Flip => "Flip",
            DrillButton::Next => "Next ▶",
            DrillButton::End => "End",
        }
    }
}

/// Drill screen areas. Shared by the renderer and the mouse handler.
pub struct DrillLayout {
    pub header: Rect,
    pub progress: Rect,
    pub card: Rect,
    pub buttons: [Rect; 4],
    pub footer: Rect,
}

impl DrillLayout {
    pub fn new(area: Rect) -> Self {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
                Constraint::Length(2),
            ])
            .split(area);

        let card_width = vertical[2].width.min(100);
        let card = Rect::new(
            vertical[2].x + (vertical[2].width - card_width) / 2,
            vertical[2].y,
            card_width,
            vertical[2].height,
        );

        let row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(12); 4])
            .flex(ratatui::layout::Flex::Center)
            .spacing(2)
            .split(vertical[3]);

        Self {
            header: vertical[0],
            progress: vertical[1],
            card,
            buttons: [row[0], row[1], row[2], row[3]],
            footer: vertical[4],
        }
    }

    pub fn button_at(&self, col: u16, row: u16) -> Option<DrillButton> {
        self.buttons
            .iter()
            .zip(DrillButton::ALL)
            .find(|(rect, _)| contains(rect, col, row))
            .map(|(_, button)| button)
    }
}

pub fn contains(rect: &Rect, col: u16, row: u16) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

pub fn wrapped_line_count(text: &str, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    let chars = text.chars().count().max(1);
    chars.div_ceil(width)
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = " ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 50;
    const MIN_POPUP_HEIGHT: u16 = 14;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}
