//! Restrictions screen: the main prompt card above a list of the other rows.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use wabot_api::{Restriction, RestrictionValue};
use wabot_app::{App, LoadState, MAIN_PROMPT, friendly_name};

use super::spinner;

const CARD_HEIGHT: u16 = 6;

/// Render the restrictions screen body.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let editor = app.restrictions();

    match editor.load_state() {
        LoadState::Idle | LoadState::Loading => {
            let text = format!("{} Loading restrictions...", spinner(app));
            frame.render_widget(Paragraph::new(text).block(block()), area);
            return;
        },
        LoadState::Failed(message) => {
            let text = Line::styled(
                format!("Failed to load restrictions: {message}"),
                Style::default().fg(Color::Red),
            );
            frame.render_widget(Paragraph::new(text).block(block()), area);
            return;
        },
        LoadState::Loaded => {},
    }

    let order = editor.display_order();
    let selected = editor.selected();
    let has_card = order.first().is_some_and(|r| r.title == MAIN_PROMPT);
    let banner = u16::from(editor.error().is_some());

    let [card_area, list_area, banner_area] = Layout::vertical([
        Constraint::Length(if has_card { CARD_HEIGHT } else { 0 }),
        Constraint::Min(0),
        Constraint::Length(banner),
    ])
    .areas(area);

    let mut rows = order.iter().enumerate();
    if has_card && let Some((index, main)) = rows.next() {
        render_card(frame, main, index == selected, card_area);
    }

    let offset = usize::from(has_card);
    let items: Vec<ListItem> = rows.map(|(_, row)| ListItem::new(row_line(row))).collect();
    let empty = items.is_empty();
    let list = List::new(items)
        .block(block().title_bottom(" Up/Down select · Enter edit "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state =
        ListState::default().with_selected(selected.checked_sub(offset).filter(|_| !empty));
    frame.render_stateful_widget(list, list_area, &mut state);

    if let Some(error) = editor.error() {
        let line = Line::styled(format!(" {error}"), Style::default().fg(Color::Red));
        frame.render_widget(Paragraph::new(line), banner_area);
    }
}

fn block() -> Block<'static> {
    Block::default().borders(Borders::ALL).title(" Restrictions ")
}

fn render_card(frame: &mut Frame, main: &Restriction, selected: bool, area: Rect) {
    let border = if selected { Color::Green } else { Color::Yellow };
    let card = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {} ", friendly_name(&main.title)),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    let paragraph = Paragraph::new(value_text(&main.value)).block(card).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn row_line(row: &Restriction) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{}: ", friendly_name(&row.title)),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value_text(&row.value).replace('\n', " ")),
    ])
}

fn value_text(value: &RestrictionValue) -> String {
    match value {
        RestrictionValue::Text(text) => text.clone(),
        RestrictionValue::Numeric(n) => n.to_string(),
    }
}
