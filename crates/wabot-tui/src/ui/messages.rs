//! Default messages screen.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use wabot_app::{App, LoadState};

use super::spinner;

/// Render the default messages screen body.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let editor = app.messages();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Default messages ")
        .title_bottom(" [a] add  [e] edit  [d] delete ");

    match editor.load_state() {
        LoadState::Idle | LoadState::Loading => {
            let text = format!("{} Loading default messages...", spinner(app));
            frame.render_widget(Paragraph::new(text).block(block), area);
            return;
        },
        LoadState::Failed(message) => {
            let text = Line::styled(
                format!("Failed to load default messages: {message}"),
                Style::default().fg(Color::Red),
            );
            frame.render_widget(Paragraph::new(text).block(block), area);
            return;
        },
        LoadState::Loaded => {},
    }

    let banner = u16::from(editor.error().is_some());
    let [list_area, banner_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(banner)]).areas(area);

    if editor.messages().is_empty() {
        let hint = Line::styled(
            "No default messages yet. Press [a] to add one.",
            Style::default().fg(Color::DarkGray),
        );
        frame.render_widget(Paragraph::new(hint).block(block), list_area);
    } else {
        let items: Vec<ListItem> = editor
            .messages()
            .iter()
            .map(|m| ListItem::new(m.text.replace('\n', " ")))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(editor.selected()));
        frame.render_stateful_widget(list, list_area, &mut state);
    }

    if let Some(error) = editor.error() {
        let line = Line::styled(format!(" {error}"), Style::default().fg(Color::Red));
        frame.render_widget(Paragraph::new(line), banner_area);
    }
}
