use crate::client::AppSnapshot;
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use crossterm::{
    event::{
        self,
        Event,
        KeyCode,
        KeyEvent,
        KeyEventKind,
        KeyModifiers,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use itertools::Itertools;
use prize_wheel::{
    geometry::WheelLayout,
    spin::SpinState,
};
use ratatui::{
    prelude::*,
    widgets::{
        canvas::{
            self,
            Canvas,
            Circle,
            Context,
        },
        *,
    },
};
use std::io::stdout;
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthChar;

const WHEEL_RADIUS: f64 = 1.0;
const LABEL_RADIUS: f64 = 0.62;
const FILL_STEP: f64 = 0.015;

// One colour per sector, repeating after twelve.
const PALETTE: [Color; 12] = [
    Color::Rgb(37, 99, 235),
    Color::Rgb(220, 38, 38),
    Color::Rgb(22, 163, 74),
    Color::Rgb(202, 138, 4),
    Color::Rgb(147, 51, 234),
    Color::Rgb(234, 88, 12),
    Color::Rgb(219, 39, 119),
    Color::Rgb(13, 148, 136),
    Color::Rgb(79, 70, 229),
    Color::Rgb(101, 163, 13),
    Color::Rgb(8, 145, 178),
    Color::Rgb(225, 29, 72),
];

const KEYS: [(&str, &str); 6] = [
    ("Space", "spin"),
    ("a", "add"),
    ("d", "remove"),
    ("Up/Down", "select"),
    ("q", "quit"),
    ("Ctrl-C", "exit"),
];

#[derive(Debug)]
pub enum UserEvent {
    Quit,
    Spin,
    AddEntry(String),
    RemoveSelected,
    NextEntry,
    PrevEntry,
    Redraw,
}

#[derive(Debug, Default)]
pub struct UiState {
    mode: Mode,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
enum Mode {
    #[default]
    Normal,
    AddEntry(InputState),
    QuitModal,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct InputState {
    text: String,
}

pub type InputEventReceiver = mpsc::UnboundedReceiver<std::io::Result<Event>>;

/// Reads terminal events on a blocking thread and forwards them to the loop.
pub fn input_event_stream() -> InputEventReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        loop {
            let ev = event::read();
            let failed = ev.is_err();
            if tx.send(ev).is_err() || failed {
                break;
            }
        }
    });
    rx
}

pub async fn next_raw_event(input_events: &mut InputEventReceiver) -> Result<Event> {
    match input_events.recv().await {
        Some(ev) => ev.wrap_err("reading terminal input failed"),
        None => Err(eyre!("terminal input stream closed")),
    }
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    match open_terminal() {
        Ok(terminal) => {
            state.terminal = Some(terminal);
            Ok(())
        }
        // raw mode is already on, undo it before bailing out
        Err(e) => finish_with_exit(Err(e), terminal_exit()),
    }
}

fn open_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    Ok(Terminal::new(backend)?)
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

/// Combines a result with the outcome of restoring the terminal. The first
/// error wins; a failed restore is attached to it as context.
pub fn finish_with_exit<T>(res: Result<T>, exit: Result<()>) -> Result<T> {
    match (res, exit) {
        (res, Ok(())) => res,
        (Ok(_), Err(exit_err)) => Err(exit_err.wrap_err("restoring the terminal failed")),
        (Err(e), Err(exit_err)) => {
            Err(e.wrap_err(format!("restoring the terminal also failed: {exit_err}")))
        }
    }
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    match event {
        Event::Resize(_, _) => Some(UserEvent::Redraw),
        Event::Key(k) if k.kind == KeyEventKind::Press => interpret_key(state, k),
        _ => None,
    }
}

fn interpret_key(state: &mut UiState, k: KeyEvent) -> Option<UserEvent> {
    // raw mode swallows SIGINT
    if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
        return Some(UserEvent::Quit);
    }
    match &mut state.mode {
        Mode::AddEntry(input) => match k.code {
            KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            KeyCode::Enter => {
                let text = std::mem::take(&mut input.text);
                state.mode = Mode::Normal;
                Some(UserEvent::AddEntry(text))
            }
            KeyCode::Backspace => {
                input.text.pop();
                Some(UserEvent::Redraw)
            }
            KeyCode::Char(c) => {
                input.text.push(c);
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
        Mode::QuitModal => match k.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                state.mode = Mode::Normal;
                Some(UserEvent::Redraw)
            }
            _ => None,
        },
        Mode::Normal => match k.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                state.mode = Mode::QuitModal;
                Some(UserEvent::Redraw)
            }
            KeyCode::Char(' ') | KeyCode::Enter => Some(UserEvent::Spin),
            KeyCode::Char('a') | KeyCode::Char('+') => {
                state.mode = Mode::AddEntry(InputState::default());
                Some(UserEvent::Redraw)
            }
            KeyCode::Char('d') | KeyCode::Delete => Some(UserEvent::RemoveSelected),
            KeyCode::Down | KeyCode::Char('j') => Some(UserEvent::NextEntry),
            KeyCode::Up | KeyCode::Char('k') => Some(UserEvent::PrevEntry),
            _ => None,
        },
    }
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(16),   // wheel + side panel
            Constraint::Length(3), // spin button
            Constraint::Length(4), // status/errors
            Constraint::Length(3), // help
        ])
        .split(f.area());

    let upper = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[0]);

    draw_wheel(f, upper[0], snap);
    draw_side(f, upper[1], snap);
    draw_spin_button(f, chunks[1], snap);
    draw_status(f, chunks[2], snap);
    draw_help(f, chunks[3]);
    draw_modals(f, state);
}

fn draw_wheel(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let count = snap.wheel_entries.len();
    let layout = WheelLayout::new(count, snap.rotation);
    let label_width = label_width_for(count);
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title("Wheel"))
        .marker(ratatui::symbols::Marker::Braille)
        .x_bounds([-1.25, 1.25])
        .y_bounds([-1.25, 1.25])
        .paint(|ctx| {
            for span in &layout.spans {
                let color = sector_color(span.index, count);
                let mut a = span.start;
                while a < span.start + span.width {
                    radial_line(ctx, a, 0.0, WHEEL_RADIUS, color);
                    a += FILL_STEP;
                }
            }
            ctx.layer();
            for span in &layout.spans {
                radial_line(ctx, span.start, 0.0, WHEEL_RADIUS, Color::White);
            }
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: WHEEL_RADIUS,
                color: Color::White,
            });
            for span in &layout.spans {
                let Some(text) = snap.wheel_entries.get(span.index) else {
                    continue;
                };
                let (x, y) = polar(span.mid(), LABEL_RADIUS);
                let label = truncate_label(text, label_width);
                let offset = label_offset(&label);
                ctx.print(
                    x - offset,
                    y,
                    Line::styled(
                        label,
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    ),
                );
            }
            // fixed pointer at the top
            ctx.print(
                -0.02,
                1.12,
                Line::styled("▼", Style::default().fg(Color::Yellow)),
            );
        });
    f.render_widget(canvas, area);
}

/// Canvas position of a pointer-relative angle; zero is the top of the wheel
/// and angles grow counterclockwise.
fn polar(angle: f64, radius: f64) -> (f64, f64) {
    (-radius * angle.sin(), radius * angle.cos())
}

fn radial_line(ctx: &mut Context, angle: f64, from: f64, to: f64, color: Color) {
    let (x1, y1) = polar(angle, from);
    let (x2, y2) = polar(angle, to);
    ctx.draw(&canvas::Line {
        x1,
        y1,
        x2,
        y2,
        color,
    });
}

fn sector_color(index: usize, count: usize) -> Color {
    let mut c = index % PALETTE.len();
    // last sector would repeat the first one's colour
    if count > 1 && index == count - 1 && c == 0 {
        c = PALETTE.len() / 2;
    }
    PALETTE[c]
}

fn label_width_for(count: usize) -> usize {
    if count > 8 {
        10
    } else if count > 4 {
        12
    } else {
        16
    }
}

fn display_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Half the label's on-screen width in canvas units, used to centre it.
fn label_offset(label: &str) -> f64 {
    display_width(label) as f64 * 0.02
}

fn truncate_label(text: &str, max_width: usize) -> String {
    if display_width(text) <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

fn draw_side(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(4),
            Constraint::Length(8),
        ])
        .split(area);

    let count = snap.entries.len();
    let lines: Vec<Line> = snap
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let cur = if i == snap.selected { ">" } else { " " };
            let style = if i == snap.selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::raw(format!("{cur} ")),
                Span::styled("■ ", Style::default().fg(sector_color(i, count))),
                Span::styled(format!("{:>2}. {}", i + 1, entry), style),
            ])
        })
        .collect();
    let list = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Entries ({count})")),
    );
    f.render_widget(list, rows[0]);

    let winner_line = match &snap.winner {
        Some(w) => Line::styled(
            w.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        None if snap.spin_state == SpinState::Spinning => {
            Line::styled("...", Style::default().fg(Color::DarkGray))
        }
        None => Line::styled("None yet", Style::default().fg(Color::DarkGray)),
    };
    let winner = Paragraph::new(winner_line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Winner"));
    f.render_widget(winner, rows[1]);

    let mut hist = Vec::new();
    if snap.history.is_empty() {
        hist.push(Line::styled("None", Style::default().fg(Color::DarkGray)));
    } else {
        for h in &snap.history {
            hist.push(Line::from(format!("{}  {}", h.time, h.winner)));
        }
    }
    let history = Paragraph::new(hist)
        .block(Block::default().borders(Borders::ALL).title("Recent Winners"));
    f.render_widget(history, rows[2]);
}

fn draw_spin_button(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let (label, color) = match snap.spin_state {
        SpinState::Spinning => ("Spinning...", Color::DarkGray),
        SpinState::Idle => ("Spin the Wheel!", Color::Magenta),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(color))
        .ratio(snap.progress.clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, area);
}

fn draw_status(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let status_widget = if snap.errors.is_empty() {
        let text = if snap.status.trim().is_empty() {
            "Ready".to_string()
        } else {
            snap.status.clone()
        };
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .style(Style::default().fg(Color::Green))
    } else {
        let lines: Vec<Line> = snap.errors.iter().map(|e| Line::from(e.clone())).collect();
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Errors"))
            .style(Style::default().fg(Color::Red))
    };
    f.render_widget(status_widget, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let text = KEYS.iter().map(|(k, d)| format!("{k}={d}")).join("  ");
    let help =
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Keys"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState) {
    match &state.mode {
        Mode::AddEntry(input) => {
            let area = centered_rect(50, 20, f.area());
            let block = Block::default().borders(Borders::ALL).title("Add Entry");
            let p = Paragraph::new(format!(
                "Entry: {}█\nEnter=add Esc=cancel",
                input.text
            ));
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::QuitModal => {
            let area = centered_rect(40, 20, f.area());
            let block = Block::default().borders(Borders::ALL).title("Confirm Quit");
            let p = Paragraph::new("Quit the wheel? (Y/N)");
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::Normal => {}
    }
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn space_spins_in_normal_mode() {
        let mut state = UiState::default();
        assert!(matches!(
            interpret_event(&mut state, key(KeyCode::Char(' '))),
            Some(UserEvent::Spin)
        ));
    }

    #[test]
    fn add_modal_collects_text_then_emits_entry() {
        let mut state = UiState::default();
        interpret_event(&mut state, key(KeyCode::Char('a')));
        for c in "Tacos!".chars() {
            interpret_event(&mut state, key(KeyCode::Char(c)));
        }
        interpret_event(&mut state, key(KeyCode::Backspace));

        let ev = interpret_event(&mut state, key(KeyCode::Enter));

        assert!(matches!(ev, Some(UserEvent::AddEntry(ref t)) if t == "Tacos"));
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn add_modal_escape_discards_text() {
        let mut state = UiState::default();
        interpret_event(&mut state, key(KeyCode::Char('a')));
        interpret_event(&mut state, key(KeyCode::Char('x')));
        let ev = interpret_event(&mut state, key(KeyCode::Esc));
        assert!(matches!(ev, Some(UserEvent::Redraw)));
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn quit_requires_confirmation() {
        let mut state = UiState::default();
        assert!(matches!(
            interpret_event(&mut state, key(KeyCode::Char('q'))),
            Some(UserEvent::Redraw)
        ));
        assert_eq!(state.mode, Mode::QuitModal);
        assert!(matches!(
            interpret_event(&mut state, key(KeyCode::Char('y'))),
            Some(UserEvent::Quit)
        ));
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut state = UiState::default();
        interpret_event(&mut state, key(KeyCode::Char('a')));
        let ev = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(interpret_event(&mut state, ev), Some(UserEvent::Quit)));
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut state = UiState::default();
        let mut k = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        k.kind = KeyEventKind::Release;
        assert!(interpret_event(&mut state, Event::Key(k)).is_none());
    }

    #[test]
    fn truncate_label_respects_display_width() {
        assert_eq!(truncate_label("Prize 1", 16), "Prize 1");
        assert_eq!(truncate_label("A very long prize name", 10), "A very lo…");
        assert_eq!(truncate_label("寿司寿司寿司", 7), "寿司寿…");
    }

    #[test]
    fn label_offset_follows_display_width() {
        assert_eq!(label_offset("寿司"), label_offset("abcd"));
        assert!(label_offset("寿司") > label_offset("ab"));
        assert_eq!(label_offset(""), 0.0);
    }

    #[test]
    fn finish_with_exit_keeps_loop_error_when_restore_fails() {
        let res: Result<()> = Err(eyre!("loop failed"));

        let err = finish_with_exit(res, Err(eyre!("raw mode stuck"))).unwrap_err();

        let chain: Vec<String> = err.chain().map(|c| c.to_string()).collect();
        assert!(chain.iter().any(|c| c == "loop failed"), "{chain:?}");
        assert!(chain[0].contains("raw mode stuck"), "{chain:?}");
    }

    #[test]
    fn finish_with_exit_reports_restore_failure_after_clean_loop() {
        let err = finish_with_exit(Ok(()), Err(eyre!("raw mode stuck"))).unwrap_err();
        assert!(err.chain().any(|c| c.to_string() == "raw mode stuck"));

        assert_eq!(finish_with_exit(Ok(7), Ok(())).unwrap(), 7);
        let loop_only = finish_with_exit::<()>(Err(eyre!("loop failed")), Ok(()));
        assert_eq!(loop_only.unwrap_err().to_string(), "loop failed");
    }

    #[test]
    fn adjacent_sectors_never_share_a_colour() {
        for count in 2..=40 {
            for i in 0..count {
                let next = (i + 1) % count;
                assert_ne!(
                    sector_color(i, count),
                    sector_color(next, count),
                    "count={count} i={i}"
                );
            }
        }
    }

    #[test]
    fn polar_zero_is_top_and_grows_counterclockwise() {
        let (x, y) = polar(0.0, 1.0);
        assert!(x.abs() < 1e-12 && (y - 1.0).abs() < 1e-12);
        let (x, y) = polar(FRAC_PI_2, 1.0);
        assert!((x + 1.0).abs() < 1e-12 && y.abs() < 1e-12);
    }
}
