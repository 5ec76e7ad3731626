//! Connection screen: session status and the pairing QR code.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use wabot_app::{App, ConnectionState};

use super::{centered, spinner};
use crate::qr::{QrError, QrMatrix};

/// Render the connection screen body.
pub fn render(
    frame: &mut Frame,
    app: &App,
    qr: Option<&Result<QrMatrix, QrError>>,
    area: Rect,
) {
    let block = Block::default().borders(Borders::ALL).title(" Connection ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = match app.connection().state() {
        ConnectionState::Initializing => loading(app, "Checking WhatsApp session"),
        ConnectionState::LoadingQr => loading(app, "Requesting QR code"),
        ConnectionState::DisplayingQr { .. } => qr_lines(qr),
        ConnectionState::Connected => vec![
            Line::styled(
                "WhatsApp connected",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Line::raw(""),
            hints("[t] test connection  [r] reconnect"),
        ],
        ConnectionState::Error { message } => vec![
            Line::styled(message.clone(), Style::default().fg(Color::Red)),
            Line::raw(""),
            hints("[r] retry"),
        ],
    };

    let height = lines.len() as u16;
    let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, centered(inner, width.max(inner.width / 2), height));
}

fn loading(app: &App, label: &str) -> Vec<Line<'static>> {
    vec![Line::from(format!("{} {label}...", spinner(app)))]
}

fn hints(text: &'static str) -> Line<'static> {
    Line::styled(text, Style::default().fg(Color::DarkGray))
}

fn qr_lines(qr: Option<&Result<QrMatrix, QrError>>) -> Vec<Line<'static>> {
    let mut lines = match qr {
        Some(Ok(matrix)) => {
            // Modules are dark glyphs, so the code is drawn on a light background.
            let style = Style::default().fg(Color::Black).bg(Color::White);
            matrix.lines().into_iter().map(|row| Line::from(Span::styled(row, style))).collect()
        },
        Some(Err(e)) => {
            vec![Line::styled(format!("Cannot show QR code: {e}"), Style::default().fg(Color::Red))]
        },
        None => vec![],
    };

    lines.push(Line::raw(""));
    lines.push(Line::raw("Scan with WhatsApp > Linked devices"));
    lines.push(hints("[r] new code"));
    lines
}
