//! Header navigation
//!
//! Tabs for every screen on wide terminals; a one-line title plus a drawer
//! on narrow ones.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs},
};
use wabot_app::{App, Screen};

const DRAWER_WIDTH: u16 = 24;

fn label(index: usize, screen: Screen) -> String {
    format!("{} {}", index + 1, screen.title())
}

/// Render the header.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.is_narrow() {
        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", app.screen().title()),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" [m] menu", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let titles: Vec<Line> =
        Screen::ALL.iter().enumerate().map(|(i, s)| Line::from(label(i, *s))).collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" WhatsApp bot admin "))
        .select(app.screen().index())
        .highlight_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}

/// Render the navigation drawer over the left edge of `area`.
pub fn render_drawer(frame: &mut Frame, cursor: usize, area: Rect) {
    let height = (Screen::ALL.len() as u16 + 2).min(area.height);
    let drawer = Rect { width: DRAWER_WIDTH.min(area.width), height, ..area };

    let items: Vec<ListItem> = Screen::ALL
        .iter()
        .enumerate()
        .map(|(i, s)| ListItem::new(label(i, *s)))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Menu "))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Green))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(cursor));
    frame.render_widget(Clear, drawer);
    frame.render_stateful_widget(list, drawer, &mut state);
}
