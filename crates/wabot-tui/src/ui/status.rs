//! Status bar
//!
//! Displays the backend URL, connection state and key hints.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use wabot_app::{App, ConnectionState};

/// Key hints shown on every screen.
const HINTS: &str = "Tab/1-3 switch | q quit";

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.connection().state();
    let color = match state {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Error { .. } => Color::Red,
        ConnectionState::Initializing
        | ConnectionState::LoadingQr
        | ConnectionState::DisplayingQr { .. } => Color::Yellow,
    };

    let line = Line::from(vec![
        Span::raw(" "),
        Span::raw(app.api_base().to_string()),
        Span::raw(" | "),
        Span::styled(state.name(), Style::default().fg(color)),
        Span::raw(" | "),
        Span::raw(HINTS),
    ]);

    let paragraph =
        Paragraph::new(line).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    #[test]
    fn status_line_shows_base_and_state() {
        let app = App::new("http://localhost:3000/whatsapp/", Duration::from_secs(3));
        let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();
        terminal.draw(|frame| render(frame, &app, frame.area())).unwrap();

        let line: String =
            terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect();
        insta::assert_snapshot!(
            line.trim_end(),
            @" http://localhost:3000/whatsapp/ | initializing | Tab/1-3 switch | q quit"
        );
    }
}
