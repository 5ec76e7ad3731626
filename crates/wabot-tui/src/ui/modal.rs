//! Modal overlays: edit forms, delete confirmation and notices.
//!
//! At most one edit modal is open at a time; a notice draws above it.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use wabot_app::{
    App, MessageModalMode, NoticeKind, Screen, TextInput, ValueKind, friendly_name,
};

use super::centered;

const MODAL_WIDTH: u16 = 64;
const MODAL_HEIGHT: u16 = 14;

/// Render whatever overlay the App currently shows.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    match app.screen() {
        Screen::Restrictions => {
            let editor = app.restrictions();
            if let Some(modal) = editor.modal() {
                let mut hints = String::from("Ctrl+S save · Esc cancel");
                if modal.kind != ValueKind::Text {
                    hints.push_str(" · Enter save");
                }
                let form = Form {
                    title: friendly_name(&modal.title),
                    input: &modal.input,
                    error: modal.error.as_deref(),
                    busy: editor.is_updating(),
                    hints: &hints,
                };
                form.render(frame, area);
            }
        },
        Screen::DefaultMessages => {
            let editor = app.messages();
            if let Some(modal) = editor.modal() {
                let title = match modal.mode {
                    MessageModalMode::Create => "New default message",
                    MessageModalMode::Edit(_) => "Edit default message",
                };
                let form = Form {
                    title,
                    input: &modal.input,
                    error: modal.error.as_deref(),
                    busy: editor.is_processing(),
                    hints: "Ctrl+S save · Esc cancel",
                };
                form.render(frame, area);
            } else if let Some(message) = editor.confirming_delete() {
                render_confirm(frame, &message.text, area);
            }
        },
        Screen::Connection => {},
    }

    if let Some(notice) = app.notice() {
        let (title, color) = match notice.kind {
            NoticeKind::Info => (" Info ", Color::Green),
            NoticeKind::Error => (" Error ", Color::Red),
        };
        let lines = vec![
            Line::raw(notice.message.clone()),
            Line::raw(""),
            Line::styled("press any key", Style::default().fg(Color::DarkGray)),
        ];
        let popup = centered(area, 48, 7);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(title);
        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), popup);
    }
}

/// Edit form shared by both editors.
struct Form<'a> {
    title: &'a str,
    input: &'a TextInput,
    error: Option<&'a str>,
    busy: bool,
    hints: &'a str,
}

impl Form<'_> {
    fn render(&self, frame: &mut Frame, area: Rect) {
        let popup = centered(area, MODAL_WIDTH, MODAL_HEIGHT);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", self.title))
            .title_style(Style::default().add_modifier(Modifier::BOLD));
        let inner = block.inner(popup);
        frame.render_widget(Clear, popup);
        frame.render_widget(block, popup);

        let [input_area, error_area, hint_area] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let input_block = Block::default().borders(Borders::ALL);
        let text_area = input_block.inner(input_area);
        frame.render_widget(Paragraph::new(self.input.text()).block(input_block), input_area);

        if !self.busy {
            let (line, column) = cursor_position(self.input);
            let x = text_area.x.saturating_add(column);
            let y = text_area.y.saturating_add(line);
            if x < text_area.right() && y < text_area.bottom() {
                frame.set_cursor_position((x, y));
            }
        }

        if let Some(error) = self.error {
            frame.render_widget(
                Paragraph::new(Line::styled(error.to_string(), Style::default().fg(Color::Red))),
                error_area,
            );
        }

        let hint = if self.busy { "Saving..." } else { self.hints };
        frame.render_widget(
            Paragraph::new(Line::styled(hint.to_string(), Style::default().fg(Color::DarkGray))),
            hint_area,
        );
    }
}

/// Line and column of the input cursor, in characters.
fn cursor_position(input: &TextInput) -> (u16, u16) {
    let before: String = input.text().chars().take(input.cursor()).collect();
    let line = before.matches('\n').count();
    let column = before.rsplit('\n').next().map_or(0, |tail| tail.chars().count());
    (line as u16, column as u16)
}

fn render_confirm(frame: &mut Frame, text: &str, area: Rect) {
    let popup = centered(area, 48, 8);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Delete this message? ");
    let lines = vec![
        Line::raw(text.to_string()),
        Line::raw(""),
        Line::styled("[y] yes  [n] no", Style::default().fg(Color::DarkGray)),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), popup);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_tracks_lines_and_multibyte_columns() {
        assert_eq!(cursor_position(&TextInput::new()), (0, 0));
        assert_eq!(cursor_position(&TextInput::with_text("olá")), (0, 3));
        assert_eq!(cursor_position(&TextInput::with_text("first\nsé")), (1, 2));
        assert_eq!(cursor_position(&TextInput::with_text("end\n")), (1, 0));
    }
}
