mod app;
mod config;
mod event;
mod generator;
mod logging;
mod lookup;
mod session;
mod store;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use app::{App, AppScreen, Collaborators};
use config::Config;
use event::{AppEvent, EventHandler};
use session::drill::{DrillEvent, DrillOutcome};
use session::reading::{Pane, PassageLayout};
use session::swipe::SwipeDirection;
use store::json_store::JsonStore;
use ui::components::drill_summary::DrillSummaryView;
use ui::components::flashcard::FlashCard;
use ui::components::passage_view::PassageView;
use ui::components::progress_bar::ProgressBar;
use ui::components::word_bank::WordBank;
use ui::layout::{DrillButton, DrillLayout, LayoutTier, ReadingLayout, contains, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "lexdr", version, about = "Terminal reading and vocabulary tutor")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Ignore any saved session and start with a new passage")]
    fresh: bool,

    #[arg(long, help = "No network: built-in definitions and passages only")]
    offline: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = JsonStore::default_dir();
    let log_path = logging::init(&data_dir).ok();

    let mut config = Config::load().unwrap_or_else(|err| {
        warn!("config unreadable, using defaults: {err:#}");
        Config::default()
    });
    if let Some(theme_name) = cli.theme {
        config.theme = theme_name;
    }
    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        warn!("theme {:?} not found, using default", config.theme);
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(theme));

    let store = match JsonStore::new() {
        Ok(store) => {
            info!("data in {}", store.base_dir().display());
            Some(store)
        }
        Err(err) => {
            warn!("session storage unavailable: {err:#}");
            None
        }
    };

    let events = EventHandler::new(Duration::from_millis(100));
    let collaborators = Collaborators::from_config(&config, cli.offline);
    let mut app = App::new(config, theme, collaborators, store, events.sender());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;
    app.terminal_size = (size.width, size.height);
    app.start(cli.fresh);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    if let Some(path) = log_path {
        info!("exiting; log at {}", path.display());
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
            AppEvent::Resize(width, height) => app.terminal_size = (width, height),
            background => app.handle_background(background),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn screen_area(app: &App) -> Rect {
    Rect::new(0, 0, app.terminal_size.0, app.terminal_size.1)
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    app.status = None;
    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Reading => handle_reading_key(app, key),
        AppScreen::Drill => handle_drill_key(app, key),
        AppScreen::DrillComplete => handle_summary_key(app, key),
    }
}

fn activate_menu_item(app: &mut App, index: usize) {
    match index {
        0 => app.screen = AppScreen::Reading,
        1 => {
            app.screen = AppScreen::Reading;
            app.new_passage();
        }
        2 => app.start_drill(),
        3 => app.quit(),
        _ => {}
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('1') => activate_menu_item(app, 0),
        KeyCode::Char('2') => activate_menu_item(app, 1),
        KeyCode::Char('3') => activate_menu_item(app, 2),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => activate_menu_item(app, app.menu.selected),
        _ => {}
    }
}

fn handle_reading_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.go_to_menu();
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.reading.switch_pane();
            return;
        }
        KeyCode::Char('c') => {
            app.clear_marks();
            return;
        }
        KeyCode::Char('s') => {
            app.save_session();
            return;
        }
        KeyCode::Char('v') => {
            app.start_drill();
            return;
        }
        KeyCode::Char('n') => {
            app.new_passage();
            return;
        }
        KeyCode::Char('p') => {
            app.previous_passage();
            return;
        }
        KeyCode::Char('d') => {
            app.reading.banner = None;
            return;
        }
        _ => {}
    }

    match app.reading.pane() {
        Pane::Passage => {
            let width = ReadingLayout::new(screen_area(app)).passage_text().width;
            match key.code {
                KeyCode::Left | KeyCode::Char('h') => app.focus_prev(),
                KeyCode::Right | KeyCode::Char('l') => app.focus_next(),
                KeyCode::Up | KeyCode::Char('k') => app.focus_line(-1, width),
                KeyCode::Down | KeyCode::Char('j') => app.focus_line(1, width),
                KeyCode::Enter | KeyCode::Char(' ') => app.toggle_focused(),
                _ => {}
            }
        }
        Pane::WordBank => match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.reading.bank_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.reading.bank_next(),
            KeyCode::Enter | KeyCode::Char('x') | KeyCode::Delete => {
                app.remove_selected_bank_word()
            }
            _ => {}
        },
    }
}

fn handle_drill_key(app: &mut App, key: KeyEvent) {
    let empty = app.drill.as_ref().is_none_or(|d| d.is_empty());
    if empty {
        if matches!(key.code, KeyCode::Char('b') | KeyCode::Enter | KeyCode::Esc) {
            app.back_to_reading();
        }
        return;
    }

    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.drill_event(DrillEvent::Retreat),
        KeyCode::Right | KeyCode::Char('l') => app.drill_event(DrillEvent::Advance),
        KeyCode::Char(' ') | KeyCode::Enter => app.drill_event(DrillEvent::Flip),
        KeyCode::Esc | KeyCode::Char('e') => app.drill_event(DrillEvent::EndSession),
        KeyCode::Char('k') => app.swipe_card(SwipeDirection::Right, Instant::now()),
        KeyCode::Char('u') => app.swipe_card(SwipeDirection::Left, Instant::now()),
        KeyCode::Char('b') => app.back_to_reading(),
        _ => {}
    }
}

fn handle_summary_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.start_drill(),
        KeyCode::Char('b') | KeyCode::Enter => app.back_to_reading(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match app.screen {
        AppScreen::Menu => handle_menu_mouse(app, mouse),
        AppScreen::Reading => handle_reading_mouse(app, mouse),
        AppScreen::Drill => handle_drill_mouse(app, mouse),
        AppScreen::DrillComplete => {}
    }
}

fn menu_area(area: Rect) -> Rect {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);
    ui::layout::centered_rect(50, 80, layout[1])
}

fn handle_menu_mouse(app: &mut App, mouse: MouseEvent) {
    let area = menu_area(screen_area(app));
    if !contains(&area, mouse.column, mouse.row) {
        return;
    }
    let Some(index) = app.menu.item_at(area, mouse.row) else {
        return;
    };
    match mouse.kind {
        MouseEventKind::Moved => app.menu.selected = index,
        MouseEventKind::Down(MouseButton::Left) => {
            app.menu.selected = index;
            activate_menu_item(app, index);
        }
        _ => {}
    }
}

/// Token under the pointer, using the same layout and scroll the renderer uses.
fn token_at(app: &App, text: Rect, col: u16, row: u16) -> Option<usize> {
    if !contains(&text, col, row) {
        return None;
    }
    let layout = PassageLayout::new(app.reading.tokens(), text.width);
    let focus_line = app
        .reading
        .focus()
        .and_then(|f| layout.placement(f))
        .map(|p| p.line);
    let scroll = ui::layout::passage_scroll(focus_line, text.height);
    layout.hit_test(scroll + usize::from(row - text.y), col - text.x)
}

fn handle_reading_mouse(app: &mut App, mouse: MouseEvent) {
    let layout = ReadingLayout::new(screen_area(app));
    let text = layout.passage_text();
    let (col, row) = (mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Moved => {
            if let Some(token) = token_at(app, text, col, row)
                && app.reading.focus() != Some(token)
            {
                app.focus_token(token);
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(token) = token_at(app, text, col, row) {
                if app.reading.pane() != Pane::Passage {
                    app.reading.switch_pane();
                }
                app.focus_token(token);
                app.toggle_token(token);
            } else if let Some(index) = WordBank::index_at(&app.reading, layout.bank_list(), row)
                && contains(&layout.bank_list(), col, row)
            {
                app.reading.select_bank(index);
                app.remove_selected_bank_word();
            }
        }
        MouseEventKind::ScrollUp if contains(&layout.passage, col, row) => {
            app.focus_line(-1, text.width)
        }
        MouseEventKind::ScrollDown if contains(&layout.passage, col, row) => {
            app.focus_line(1, text.width)
        }
        MouseEventKind::ScrollUp => app.reading.bank_prev(),
        MouseEventKind::ScrollDown => app.reading.bank_next(),
        _ => {}
    }
}

fn handle_drill_mouse(app: &mut App, mouse: MouseEvent) {
    let layout = DrillLayout::new(screen_area(app));
    let (col, row) = (mouse.column, mouse.row);
    let now = Instant::now();

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.drill.as_ref().is_none_or(|d| d.is_empty()) {
                if contains(&layout.card, col, row) {
                    app.back_to_reading();
                }
                return;
            }
            match layout.button_at(col, row) {
                Some(DrillButton::Prev) => app.drill_event(DrillEvent::Retreat),
                Some(DrillButton::Flip) => app.drill_event(DrillEvent::Flip),
                Some(DrillButton::Next) => app.drill_event(DrillEvent::Advance),
                Some(DrillButton::End) => app.drill_event(DrillEvent::EndSession),
                None if contains(&layout.card, col, row) => app.begin_drag(col),
                None => {}
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => app.drag_to(col),
        MouseEventKind::Up(MouseButton::Left) => app.release_drag(now),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Reading => render_reading(frame, app),
        AppScreen::Drill => render_drill(frame, app),
        AppScreen::DrillComplete => render_summary(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, title: &str, info: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info.to_string(),
            Style::default().fg(colors.text_muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let mut lines: Vec<Line> = Vec::new();
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(colors.accent()),
        )));
    }
    lines.extend(
        pack_hint_lines(hints, usize::from(area.width))
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_muted())))),
    );
    lines.truncate(usize::from(area.height));
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let info = format!(
        " {} marked | {} definitions cached | {} drills",
        app.reading.marked().len(),
        app.cache.len(),
        app.drill_history.drills.len()
    );
    render_header(frame, app, layout[0], "lexdr", &info);

    frame.render_widget(&app.menu, menu_area(area));

    render_footer(
        frame,
        app,
        layout[2],
        &["[1-3] Select", "[j/k] Move", "[Enter] Open", "[q] Quit"],
    );
}

fn render_reading(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let layout = ReadingLayout::new(frame.area());

    let mut info = format!(" {} marked", app.reading.marked().len());
    match app.reading.focused_word() {
        Some(word) if app.is_pending(&word) => info.push_str(&format!(" | looking up {word}")),
        _ if app.in_flight() > 0 => info.push_str(&format!(" | {} lookups", app.in_flight())),
        _ => {}
    }
    if !app.has_passage_source() {
        info.push_str(" | built-in passages");
    }
    if !app.has_ai_definitions() {
        info.push_str(" | dictionary only");
    }
    render_header(frame, app, layout.header, "Reading", &info);

    let passage_active = app.reading.pane() == Pane::Passage;
    let view = PassageView::new(
        &app.reading,
        &app.cache,
        layout.passage_text(),
        passage_active,
        app.theme,
    );
    frame.render_widget(view, layout.passage);

    let bank = WordBank::new(&app.reading, &app.cache, !passage_active, app.theme);
    frame.render_widget(bank, layout.bank);

    if let Some(banner) = &app.reading.banner {
        let width = layout.passage.width.saturating_sub(4);
        let banner_area = Rect::new(
            layout.passage.x + 2,
            layout.passage.y + layout.passage.height.saturating_sub(2),
            width,
            1,
        );
        let line = Paragraph::new(Line::from(Span::styled(
            format!("{banner}  [d] dismiss"),
            Style::default().fg(colors.bg()).bg(colors.warning()),
        )));
        frame.render_widget(line, banner_area);
    }

    let mut hints = Vec::new();
    if passage_active {
        hints.extend([
            "[←→↑↓] Move",
            "[Space] Mark",
            "[Tab] Word bank",
            "[v] Drill",
            "[n] New passage",
        ]);
        // Narrow footers only have room for the core keys
        if layout.tier != LayoutTier::Narrow {
            hints.extend(["[p] Previous", "[c] Clear", "[s] Save"]);
        }
    } else {
        hints.extend(["[j/k] Select", "[x] Unmark", "[Tab] Passage", "[v] Drill"]);
    }
    hints.push("[Esc] Menu");
    render_footer(frame, app, layout.footer, &hints);
}

fn render_drill(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let Some(drill) = app.drill.as_ref() else {
        return;
    };
    let layout = DrillLayout::new(frame.area());

    let info = match drill.cursor() {
        Some(_) => format!(
            " {} known | {} to review",
            drill.count(DrillOutcome::Known),
            drill.count(DrillOutcome::Unknown)
        ),
        None => String::new(),
    };
    render_header(frame, app, layout.header, "Vocabulary Drill", &info);

    let position = drill.cursor().map_or(0, |c| c.index + 1);
    let progress =
        ProgressBar::new("Deck", position, drill.len(), app.theme).with_ratio(drill.progress());
    frame.render_widget(progress, layout.progress);

    let offset = app.swipe.display_offset(Instant::now(), layout.card.width);
    frame.render_widget(FlashCard::new(drill, offset, app.theme), layout.card);

    if drill.cursor().is_some() {
        for (rect, button) in layout.buttons.iter().zip(DrillButton::ALL) {
            let style = if button == DrillButton::End {
                Style::default().fg(colors.error())
            } else {
                Style::default().fg(colors.accent())
            };
            let widget = Paragraph::new(button.label())
                .alignment(Alignment::Center)
                .block(Block::bordered().border_style(Style::default().fg(colors.border())))
                .style(style);
            frame.render_widget(widget, *rect);
        }
    }

    let hints: &[&str] = if drill.cursor().is_some() {
        &[
            "[Space] Flip",
            "[←/→] Prev/Next",
            "[k] Known",
            "[u] Review again",
            "[drag] Swipe card",
            "[e/Esc] End",
            "[b] Reading",
        ]
    } else {
        &["[b/Enter/Esc] Return to reading"]
    };
    render_footer(frame, app, layout.footer, hints);
}

fn render_summary(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    if let Some(summary) = &app.last_summary {
        let centered = ui::layout::centered_rect(60, 70, area);
        let view = DrillSummaryView::new(summary, app.previous_summary(), app.theme);
        frame.render_widget(view, centered);
    }
}
