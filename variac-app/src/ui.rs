use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};
use ratatui::{prelude::Rect, Frame};

use variac_core::{Actuator, FeedbackSensor};

use crate::session::{Action, Session, SessionStatus};

/// Map a key press to a session action
///
/// While the load prompt is open, keys edit the path instead.
pub fn action_for(key: KeyEvent, prompting: bool) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if prompting {
        return prompt_action_for(key);
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char(' ') => Some(Action::StartPause),
        KeyCode::Char('s') => Some(Action::Stop),
        KeyCode::Char('h') => Some(Action::ToggleHold),
        KeyCode::Char('l') => Some(Action::OpenLoadPrompt),
        KeyCode::Left => Some(Action::CursorLeft),
        KeyCode::Right => Some(Action::CursorRight),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

fn prompt_action_for(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char(c) => Some(Action::PromptInput(c)),
        KeyCode::Backspace => Some(Action::PromptBackspace),
        KeyCode::Enter => Some(Action::PromptSubmit),
        KeyCode::Esc => Some(Action::PromptCancel),
        _ => None,
    }
}

pub fn render<A, S>(frame: &mut Frame<'_>, session: &Session<A, S>)
where
    A: Actuator + Send + 'static,
    S: FeedbackSensor + Send + 'static,
{
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(34)])
        .split(frame.area());

    render_plot(frame, columns[0], session);
    render_panel(frame, columns[1], session);
}

fn render_plot<A, S>(frame: &mut Frame<'_>, area: Rect, session: &Session<A, S>)
where
    A: Actuator + Send + 'static,
    S: FeedbackSensor + Send + 'static,
{
    let plot = session.plot();
    let target = plot.target_points();
    let feedback = plot.feedback_points();
    let [x_start, x_end] = plot.x_bounds();
    let y_max = f64::from(session.config().y_max_volts);
    let cursor = session
        .cursor_readout()
        .map(|(time_s, _)| [(time_s, 0.0), (time_s, y_max)]);

    let mut datasets = vec![
        Dataset::default()
            .name("Target Voltage")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&target),
        Dataset::default()
            .name("Feedback Voltage")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&feedback),
    ];
    if let Some(cursor) = cursor.as_ref() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(&cursor[..]),
        );
    }

    let title = match session.profile_name() {
        Some(name) => format!("Variac Controller - {name}"),
        None => "Variac Controller".to_string(),
    };

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(title))
        .x_axis(
            Axis::default()
                .title("Time (s)")
                .style(Style::default().fg(Color::Gray))
                .bounds([x_start, x_end])
                .labels(axis_labels(x_start, x_end)),
        )
        .y_axis(
            Axis::default()
                .title("Voltage (V)")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(axis_labels(0.0, y_max)),
        );
    frame.render_widget(chart, area);
}

fn axis_labels(start: f64, end: f64) -> Vec<String> {
    [start, (start + end) / 2.0, end]
        .iter()
        .map(|value| format!("{value:.1}"))
        .collect()
}

fn render_panel<A, S>(frame: &mut Frame<'_>, area: Rect, session: &Session<A, S>)
where
    A: Actuator + Send + 'static,
    S: FeedbackSensor + Send + 'static,
{
    let runner = session.runner().status();
    let heading = Style::default().fg(Color::Yellow);

    let mut lines = vec![
        Line::from(session.voltage_label()),
        Line::from(session.elapsed_label()),
        Line::from(format!("Target: {:.2}V", runner.target_voltage)),
    ];
    if runner.step_count > 0 && !runner.phase.is_stopped() {
        lines.push(Line::from(format!(
            "Step: {}/{}",
            runner.step_index + 1,
            runner.step_count
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "[{}] Hold Voltage on Pause",
        if session.hold_on_pause() { "x" } else { " " }
    )));
    lines.push(Line::from(
        session.profile_name().unwrap_or("No file loaded...").to_string(),
    ));
    lines.push(Line::from(session.status_line()).style(status_style(session.status())));

    if let Some(input) = session.prompt() {
        lines.push(Line::from(""));
        lines.push(Line::from("LOAD PROFILE").style(heading));
        lines.push(Line::from(format!("{input}_")).style(Style::default().fg(Color::Cyan)));
        lines.push(Line::from("enter: load  esc: cancel"));
    }

    if let Some((time_s, sample)) = session.cursor_readout() {
        lines.push(Line::from(""));
        lines.push(Line::from("CURSOR").style(heading));
        lines.push(Line::from(format!("Time: {time_s:.2} s")));
        lines.push(Line::from(format!("Target: {:.2} V", sample.target)));
        lines.push(Line::from(format!("Feedback: {:.2} V", sample.feedback)));
    }

    let start_key = format!("space: {}", session.start_pause_label().to_lowercase());
    let start_style = if session.can_start() {
        Style::default()
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    lines.push(Line::from(""));
    lines.push(Line::from("KEYMAP").style(heading));
    lines.push(Line::from(start_key).style(start_style));
    lines.push(Line::from("s: stop"));
    lines.push(Line::from("h: toggle hold"));
    lines.push(Line::from("l: load profile"));
    lines.push(Line::from("Left/Right: cursor"));
    lines.push(Line::from("q: quit"));

    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title("Control")),
        area,
    );
}

fn status_style(status: &SessionStatus) -> Style {
    match status {
        SessionStatus::Running => Style::default().fg(Color::Green),
        SessionStatus::Paused => Style::default().fg(Color::Yellow),
        SessionStatus::Error(_) => Style::default().fg(Color::Red),
        SessionStatus::Waiting | SessionStatus::Complete => Style::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn key(code: KeyCode) -> Option<Action> {
        action_for(press(code), false)
    }

    fn prompt_key(code: KeyCode) -> Option<Action> {
        action_for(press(code), true)
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(key(KeyCode::Char(' ')), Some(Action::StartPause));
        assert_eq!(key(KeyCode::Char('s')), Some(Action::Stop));
        assert_eq!(key(KeyCode::Char('h')), Some(Action::ToggleHold));
        assert_eq!(key(KeyCode::Char('l')), Some(Action::OpenLoadPrompt));
        assert_eq!(key(KeyCode::Left), Some(Action::CursorLeft));
        assert_eq!(key(KeyCode::Right), Some(Action::CursorRight));
        assert_eq!(key(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(key(KeyCode::Char('x')), None);
        assert_eq!(
            action_for(
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                false
            ),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_prompt_key_bindings() {
        // Command keys become path text
        assert_eq!(prompt_key(KeyCode::Char('q')), Some(Action::PromptInput('q')));
        assert_eq!(prompt_key(KeyCode::Char('/')), Some(Action::PromptInput('/')));
        assert_eq!(prompt_key(KeyCode::Backspace), Some(Action::PromptBackspace));
        assert_eq!(prompt_key(KeyCode::Enter), Some(Action::PromptSubmit));
        assert_eq!(prompt_key(KeyCode::Esc), Some(Action::PromptCancel));
        assert_eq!(prompt_key(KeyCode::Left), None);
        assert_eq!(
            action_for(
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                true
            ),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_release_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char(' '),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(action_for(release, false), None);
        assert_eq!(action_for(release, true), None);
    }

    #[test]
    fn test_axis_labels() {
        assert_eq!(axis_labels(0.0, 10.0), vec!["0.0", "5.0", "10.0"]);
    }
}
