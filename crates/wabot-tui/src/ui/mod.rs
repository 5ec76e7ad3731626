//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod connection;
mod header;
mod messages;
mod modal;
mod restrictions;
mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
};
use wabot_app::{App, Screen};

use crate::qr::{QrError, QrMatrix};

/// Spinner frames, advanced by the App on ticks while loading.
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Render the entire UI.
///
/// `qr` is the matrix for the code on the connection screen, if one is shown.
pub fn render(frame: &mut Frame, app: &App, qr: Option<&Result<QrMatrix, QrError>>) {
    const HEADER_HEIGHT: u16 = 3;
    const NARROW_HEADER_HEIGHT: u16 = 1;
    const STATUS_HEIGHT: u16 = 1;

    let header_height = if app.is_narrow() { NARROW_HEADER_HEIGHT } else { HEADER_HEIGHT };
    let [header_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(header_height),
        Constraint::Min(0),
        Constraint::Length(STATUS_HEIGHT),
    ])
    .areas(frame.area());

    header::render(frame, app, header_area);
    match app.screen() {
        Screen::Connection => connection::render(frame, app, qr, body_area),
        Screen::Restrictions => restrictions::render(frame, app, body_area),
        Screen::DefaultMessages => messages::render(frame, app, body_area),
    }
    status::render(frame, app, status_area);

    if let Some(cursor) = app.drawer() {
        header::render_drawer(frame, cursor, body_area);
    }
    modal::render(frame, app);
}

fn spinner(app: &App) -> &'static str {
    SPINNER[app.spinner() % SPINNER.len()]
}

/// A `width` x `height` rectangle centred in `area`, clipped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ratatui::{Terminal, backend::TestBackend};
    use wabot_api::{DefaultMessage, QrPayload, Restriction, RestrictionValue};
    use wabot_app::{ApiReply, AppEvent, KeyInput, RequestId};

    use super::*;

    fn app() -> App {
        let mut app = App::new("http://localhost:3000/whatsapp/", Duration::from_secs(3));
        app.handle(AppEvent::Resize(100, 30));
        app.mount();
        app
    }

    fn reply(app: &mut App, id: u64, reply: ApiReply) {
        app.handle(AppEvent::Api { request: RequestId::new(id), response: Ok(reply) });
    }

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut cache = crate::qr::QrCache::default();
        cache.refresh(app);
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app, cache.matrix())).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn header_lists_every_screen() {
        let text = draw(&app(), 100, 30);
        for screen in Screen::ALL {
            assert!(text.contains(screen.title()), "missing {}", screen.title());
        }
    }

    #[test]
    fn qr_screen_draws_code() {
        let mut app = app();
        reply(&mut app, 1, ApiReply::Status { logged_in: false });
        reply(&mut app, 2, ApiReply::Qr(QrPayload::Raw("2@ref".into())));

        let text = draw(&app, 100, 40);

        assert!(text.contains('\u{2588}'));
        assert!(text.contains("Linked devices"));
    }

    #[test]
    fn connected_screen_offers_test_and_reconnect() {
        let mut app = app();
        reply(&mut app, 1, ApiReply::Status { logged_in: true });

        let text = draw(&app, 100, 30);

        assert!(text.contains("WhatsApp connected"));
        assert!(text.contains("[t]"));
        assert!(text.contains("[r]"));
    }

    #[test]
    fn restrictions_show_friendly_names_and_main_card() {
        let mut app = app();
        app.navigate(Screen::Restrictions);
        reply(
            &mut app,
            2,
            ApiReply::Restrictions(vec![
                Restriction {
                    id: 1,
                    title: "historyLimit".into(),
                    value: RestrictionValue::Numeric(20.0),
                },
                Restriction {
                    id: 2,
                    title: "mainPrompt".into(),
                    value: RestrictionValue::Text("Be polite".into()),
                },
            ]),
        );

        let text = draw(&app, 100, 30);

        assert!(text.contains("Main AI prompt"));
        assert!(text.contains("Be polite"));
        assert!(text.contains("History limit (messages)"));
        assert!(text.contains("20"));
    }

    #[test]
    fn message_modal_and_confirmation_render() {
        let mut app = app();
        app.navigate(Screen::DefaultMessages);
        reply(
            &mut app,
            2,
            ApiReply::Messages(vec![DefaultMessage { id: 7, text: "We are closed".into() }]),
        );

        app.handle(AppEvent::Key(KeyInput::Char('d')));
        let text = draw(&app, 100, 30);
        assert!(text.contains("Delete this message?"));

        app.handle(AppEvent::Key(KeyInput::Char('n')));
        app.handle(AppEvent::Key(KeyInput::Char('a')));
        let text = draw(&app, 100, 30);
        assert!(text.contains("New default message"));
    }

    #[test]
    fn narrow_terminal_collapses_header_into_drawer() {
        let mut app = app();
        app.handle(AppEvent::Resize(60, 24));
        app.handle(AppEvent::Key(KeyInput::Char('m')));

        let text = draw(&app, 60, 24);

        assert!(text.contains("[m] menu"));
        assert!(text.contains("Default messages"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut app = app();
        app.handle(AppEvent::Key(KeyInput::Char('a')));
        draw(&app, 10, 4);
        draw(&app, 1, 1);
    }
}
