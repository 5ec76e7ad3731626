//! Bookkeeping for the virtual poll timer.

use std::time::Duration;

use wabot_app::AppAction;

/// Tracks poll timer starts and stops as the driver sees them.
///
/// A start while a timer is already live counts as an overlap. Real drivers
/// replace the old timer in that case, so an overlap is never fatal there,
/// but it means the state machine lost track of its timer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerLedger {
    period: Option<Duration>,
    starts: usize,
    stops: usize,
    overlapping_starts: usize,
}

impl TimerLedger {
    /// Create a ledger with no live timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a start.
    pub fn start(&mut self, every: Duration) {
        if self.period.is_some() {
            self.overlapping_starts += 1;
        }
        self.period = Some(every);
        self.starts += 1;
    }

    /// Record a stop.
    pub fn stop(&mut self) {
        self.period = None;
        self.stops += 1;
    }

    /// Record the timer actions in `actions`, in order.
    pub fn observe(&mut self, actions: &[AppAction]) {
        for action in actions {
            match action {
                AppAction::StartPolling { every } => self.start(*every),
                AppAction::StopPolling => self.stop(),
                AppAction::Render | AppAction::Quit | AppAction::Request { .. } => {},
            }
        }
    }

    /// Whether a timer is live.
    pub fn is_active(&self) -> bool {
        self.period.is_some()
    }

    /// Period of the live timer.
    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Total starts.
    pub fn starts(&self) -> usize {
        self.starts
    }

    /// Total stops.
    pub fn stops(&self) -> usize {
        self.stops
    }

    /// Starts that found a timer already live.
    pub fn overlapping_starts(&self) -> usize {
        self.overlapping_starts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_while_live_counts_as_overlap() {
        let mut ledger = TimerLedger::new();
        ledger.start(Duration::from_secs(3));
        ledger.start(Duration::from_secs(3));
        assert_eq!(ledger.overlapping_starts(), 1);
    }

    #[test]
    fn stop_then_start_is_clean() {
        let mut ledger = TimerLedger::new();
        ledger.observe(&[
            AppAction::StartPolling { every: Duration::from_secs(3) },
            AppAction::StopPolling,
            AppAction::StartPolling { every: Duration::from_secs(3) },
        ]);
        assert!(ledger.is_active());
        assert_eq!(ledger.starts(), 2);
        assert_eq!(ledger.stops(), 1);
        assert_eq!(ledger.overlapping_starts(), 0);
    }
}
