//! Property-based tests for the full runtime.
//!
//! Arbitrary interleavings of key presses, poll ticks, backend failures and
//! session flips run through the real runtime. The scenario checks the
//! standard invariants after every step, so a property only has to drive it.

use proptest::prelude::*;
use wabot_api::{DefaultMessage, Restriction, RestrictionValue};
use wabot_app::{AppEvent, KeyInput};
use wabot_harness::{Endpoint, Scenario, SimBackend};

#[derive(Debug, Clone)]
enum Op {
    Key(KeyInput),
    Poll,
    SetLoggedIn(bool),
    FailNext(Endpoint),
    Resize(u16, u16),
    Hold,
    Release,
}

fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        3 => prop::sample::select(vec!['1', '2', '3', 'a', 'd', 'e', 'r', 't', 'm', 'y', 'n', 'x', '5'])
            .prop_map(KeyInput::Char),
        1 => Just(KeyInput::Enter),
        1 => Just(KeyInput::Tab),
        1 => Just(KeyInput::Esc),
        1 => Just(KeyInput::Up),
        1 => Just(KeyInput::Down),
        1 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Save),
        1 => Just(KeyInput::Delete),
    ]
}

fn endpoint_strategy() -> impl Strategy<Value = Endpoint> {
    prop::sample::select(vec![
        Endpoint::Status,
        Endpoint::Connect,
        Endpoint::Disconnect,
        Endpoint::ListRestrictions,
        Endpoint::UpdateRestriction,
        Endpoint::ListMessages,
        Endpoint::CreateMessage,
        Endpoint::UpdateMessage,
        Endpoint::DeleteMessage,
    ])
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        10 => key_strategy().prop_map(Op::Key),
        3 => Just(Op::Poll),
        1 => any::<bool>().prop_map(Op::SetLoggedIn),
        1 => endpoint_strategy().prop_map(Op::FailNext),
        1 => (40u16..160, 10u16..60).prop_map(|(c, r)| Op::Resize(c, r)),
        1 => Just(Op::Hold),
        1 => Just(Op::Release),
    ]
}

fn backend() -> SimBackend {
    SimBackend::new()
        .with_restrictions(vec![
            Restriction {
                id: 1,
                title: "mainPrompt".into(),
                value: RestrictionValue::Text("Be polite".into()),
            },
            Restriction {
                id: 2,
                title: "historyLimit".into(),
                value: RestrictionValue::Numeric(20.0),
            },
        ])
        .with_messages(vec![
            DefaultMessage { id: 1, text: "Hi".into() },
            DefaultMessage { id: 2, text: "Bye".into() },
        ])
}

async fn run(ops: Vec<Op>) -> Scenario {
    let mut scenario = Scenario::started(backend()).await;
    for op in ops {
        if scenario.has_quit() {
            break;
        }
        match op {
            // Quitting ends the run early; keep the sequence going instead
            Op::Key(KeyInput::Char('q') | KeyInput::Interrupt) => {},
            Op::Key(key) => scenario.key(key).await,
            Op::Poll => {
                scenario.poll().await;
            },
            Op::SetLoggedIn(logged_in) => scenario.backend().set_logged_in(logged_in),
            Op::FailNext(endpoint) => scenario.backend().fail_next(endpoint, "injected"),
            Op::Resize(cols, rows) => {
                scenario.driver_mut().inject(AppEvent::Resize(cols, rows));
                scenario.settle().await;
            },
            Op::Hold => scenario.driver_mut().hold_responses(),
            Op::Release => {
                scenario.driver_mut().release_responses();
                scenario.settle().await;
            },
        }
    }
    scenario.driver_mut().release_responses();
    scenario.settle().await;
    scenario
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Invariants hold under arbitrary operation sequences.
    #[test]
    fn invariants_hold_under_random_ops(ops in prop::collection::vec(op_strategy(), 0..60)) {
        // Scenario panics on the first violated invariant
        let scenario = block_on(run(ops));

        let timer = scenario.driver().timer();
        prop_assert_eq!(timer.overlapping_starts(), 0);
        prop_assert!(timer.stops() <= timer.starts());
    }

    /// Once drained, the cache matches what the backend stores.
    #[test]
    fn drained_message_cache_never_invents_rows(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let scenario = block_on(run(ops));
        let stored: Vec<_> = scenario.backend().stored_messages().iter().map(|m| m.id).collect();

        for message in scenario.app().messages().messages() {
            prop_assert!(
                stored.contains(&message.id),
                "cached message {} not stored by the backend", message.id
            );
        }
    }

    /// The poll timer only runs on the connection screen with a QR showing.
    #[test]
    fn timer_tracks_qr_display(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let scenario = block_on(run(ops));
        let showing_qr = scenario.connection_state().is_displaying_qr();

        prop_assert_eq!(scenario.driver().timer().is_active(), scenario.app().connection().is_polling());
        if scenario.driver().timer().is_active() {
            prop_assert!(showing_qr);
        }
    }
}
