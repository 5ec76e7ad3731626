//! Fuzz target for the App state machine
//!
//! Drives the App with arbitrary keys, ticks, resizes and backend answers,
//! including answers for requests that were never issued or already settled.
//!
//! # Invariants
//!
//! - At most one poll timer is live, and only while a QR code is displayed
//! - List caches never hold duplicate ids
//! - Open modals stay bound to a listed row

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wabot_api::{DefaultMessage, QrPayload, Restriction, RestrictionValue};
use wabot_app::{ApiReply, App, AppEvent, DEFAULT_POLL_INTERVAL, KeyInput, RequestId};
use wabot_harness::{InvariantRegistry, SystemSnapshot, TimerLedger};

#[derive(Debug, Clone, Arbitrary)]
enum AppOp {
    Key(KeyChoice),
    Tick,
    PollTick,
    Resize { cols: u8, rows: u8 },
    Answer { request: u8, reply: ReplyChoice },
}

/// Every key but Interrupt, which ends the session.
#[derive(Debug, Clone, Arbitrary)]
enum KeyChoice {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Tab,
    Esc,
    Up,
    Down,
    Save,
}

#[derive(Debug, Clone, Arbitrary)]
enum ReplyChoice {
    Status(bool),
    Qr,
    Restrictions(Vec<u8>),
    Messages(Vec<u8>),
    MessageCreated(u8),
    MessageDeleted,
    Failure,
}

fn key(choice: KeyChoice) -> KeyInput {
    match choice {
        KeyChoice::Char(c) => KeyInput::Char(c),
        KeyChoice::Enter => KeyInput::Enter,
        KeyChoice::Backspace => KeyInput::Backspace,
        KeyChoice::Delete => KeyInput::Delete,
        KeyChoice::Tab => KeyInput::Tab,
        KeyChoice::Esc => KeyInput::Esc,
        KeyChoice::Up => KeyInput::Up,
        KeyChoice::Down => KeyInput::Down,
        KeyChoice::Save => KeyInput::Save,
    }
}

fn unique(ids: Vec<u8>) -> Vec<u64> {
    let mut ids: Vec<u64> = ids.into_iter().map(u64::from).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn reply(choice: ReplyChoice) -> Result<ApiReply, String> {
    match choice {
        ReplyChoice::Status(logged_in) => Ok(ApiReply::Status { logged_in }),
        ReplyChoice::Qr => Ok(ApiReply::Qr(QrPayload::Raw("2@fuzz".into()))),
        ReplyChoice::Restrictions(ids) => Ok(ApiReply::Restrictions(
            unique(ids)
                .into_iter()
                .map(|id| Restriction {
                    id,
                    title: if id == 0 { "mainPrompt".into() } else { format!("row{id}") },
                    value: if id % 2 == 0 {
                        RestrictionValue::Text(format!("value {id}"))
                    } else {
                        RestrictionValue::Numeric(id as f64)
                    },
                })
                .collect(),
        )),
        ReplyChoice::Messages(ids) => Ok(ApiReply::Messages(
            unique(ids)
                .into_iter()
                .map(|id| DefaultMessage { id, text: format!("message {id}") })
                .collect(),
        )),
        ReplyChoice::MessageCreated(id) => Ok(ApiReply::MessageCreated(DefaultMessage {
            id: u64::from(id),
            text: "created".into(),
        })),
        ReplyChoice::MessageDeleted => Ok(ApiReply::MessageDeleted),
        ReplyChoice::Failure => Err("fuzzed failure".into()),
    }
}

fuzz_target!(|ops: Vec<AppOp>| {
    let registry = InvariantRegistry::standard();
    let mut app = App::new("http://fuzz.invalid/whatsapp/", DEFAULT_POLL_INTERVAL);
    let mut timer = TimerLedger::new();
    timer.observe(&app.mount());

    for op in ops {
        let event = match op {
            AppOp::Key(choice) => AppEvent::Key(key(choice)),
            AppOp::Tick => AppEvent::Tick,
            AppOp::PollTick => AppEvent::PollTick,
            AppOp::Resize { cols, rows } => AppEvent::Resize(u16::from(cols), u16::from(rows)),
            AppOp::Answer { request, reply: choice } => AppEvent::Api {
                request: RequestId::new(u64::from(request)),
                response: reply(choice),
            },
        };

        timer.observe(&app.handle(event));
        registry.assert_all(&SystemSnapshot::capture(&app, &timer), "fuzzed event");
    }
});
