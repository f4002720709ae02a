use std::time::Duration;

/// Where a settle wait stands after one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleState {
    Waiting,
    /// The row count moved away from the baseline and then held still.
    Stable,
    /// The bound ran out first; the caller proceeds anyway.
    TimedOut,
}

/// Decides when injected unit rows have stopped arriving.
///
/// Fed with the unit-row count on every poll. The bound is the fallback
/// for floor plans that never inject anything.
#[derive(Debug, Clone)]
pub struct SettleTracker {
    baseline: u64,
    last: Option<u64>,
    changed: bool,
    quiet_polls: u32,
    required_quiet: u32,
    bound: Duration,
}

impl SettleTracker {
    pub fn new(baseline: u64, bound: Duration) -> Self {
        Self {
            baseline,
            last: None,
            changed: false,
            quiet_polls: 0,
            required_quiet: 2,
            bound,
        }
    }

    pub fn observe(&mut self, count: u64, elapsed: Duration) -> SettleState {
        if count != self.baseline {
            self.changed = true;
        }
        if self.last == Some(count) {
            self.quiet_polls += 1;
        } else {
            self.quiet_polls = 0;
        }
        self.last = Some(count);

        if self.changed && self.quiet_polls >= self.required_quiet {
            SettleState::Stable
        } else if elapsed >= self.bound {
            SettleState::TimedOut
        } else {
            SettleState::Waiting
        }
    }
}
