//! Per-step write budget
//!
//! Limits how much of a simulation step the paste scheduler may spend
//! writing blocks. The budget is a time allowance with an optional hard cap
//! on the number of writes.

use std::time::{Duration, Instant};

use crate::generation::config::PlacementConfig;

/// Budget for the block writes of a single step
#[derive(Clone, Debug)]
pub struct StepBudget {
    /// Time the scheduler may spend writing this step
    allowance: Duration,
    /// Optional cap on writes this step
    max_writes: Option<usize>,
    /// When the current step's writing began
    started: Instant,
    /// Writes performed this step
    writes: usize,
}

impl StepBudget {
    /// Create a new budget
    ///
    /// # Arguments
    /// * `allowance` - Time available for writes in each step
    /// * `max_writes` - Optional cap on writes per step
    pub fn new(allowance: Duration, max_writes: Option<usize>) -> Self {
        Self {
            allowance,
            max_writes,
            started: Instant::now(),
            writes: 0,
        }
    }

    /// Budget derived from the configured step length and paste fraction
    pub fn from_config(config: &PlacementConfig) -> Self {
        Self::new(config.paste_allowance(), config.max_writes_per_step)
    }

    /// Budget limited only by a write count. Timing never interferes, which
    /// makes step counts reproducible.
    pub fn writes_per_step(max_writes: usize) -> Self {
        Self::new(Duration::MAX, Some(max_writes))
    }

    /// Budget with no limit at all; a task drains in one step
    pub fn unlimited() -> Self {
        Self::new(Duration::MAX, None)
    }

    // --- Tracking methods ---

    /// Reset for a new step
    pub fn start_step(&mut self) {
        self.started = Instant::now();
        self.writes = 0;
    }

    /// Count one performed write
    pub fn record_write(&mut self) {
        self.writes = self.writes.saturating_add(1);
    }

    // --- Query methods ---

    pub fn allowance(&self) -> Duration {
        self.allowance
    }

    pub fn max_writes(&self) -> Option<usize> {
        self.max_writes
    }

    /// Writes performed this step
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Time spent writing this step
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Writes left under the cap, `None` if uncapped
    pub fn remaining_writes(&self) -> Option<usize> {
        self.max_writes.map(|max| max.saturating_sub(self.writes))
    }

    // --- Decision methods ---

    /// Whether another write fits in this step.
    ///
    /// The first write of a step is always allowed so that progress is
    /// guaranteed even with a zero allowance.
    pub fn can_write(&self) -> bool {
        if self.writes == 0 {
            return true;
        }
        if self.remaining_writes() == Some(0) {
            return false;
        }
        self.elapsed() < self.allowance
    }
}

impl Default for StepBudget {
    fn default() -> Self {
        Self::from_config(&PlacementConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_from_config() {
        let mut config = PlacementConfig::default();
        config.max_writes_per_step = Some(64);
        let budget = StepBudget::from_config(&config);
        assert_eq!(budget.allowance().as_millis(), 10);
        assert_eq!(budget.max_writes(), Some(64));
        assert_eq!(budget.remaining_writes(), Some(64));
    }

    #[test]
    fn test_write_cap() {
        let mut budget = StepBudget::writes_per_step(3);
        let mut count = 0;
        while budget.can_write() {
            budget.record_write();
            count += 1;
        }
        assert_eq!(count, 3);
        assert_eq!(budget.remaining_writes(), Some(0));

        budget.start_step();
        assert_eq!(budget.writes(), 0);
        assert!(budget.can_write());
    }

    #[test]
    fn test_zero_allowance_still_progresses() {
        let mut budget = StepBudget::new(Duration::ZERO, None);
        assert!(budget.can_write());
        budget.record_write();
        assert!(!budget.can_write());
    }

    #[test]
    fn test_zero_cap_still_progresses() {
        let mut budget = StepBudget::writes_per_step(0);
        assert!(budget.can_write());
        budget.record_write();
        assert!(!budget.can_write());
    }

    #[test]
    fn test_unlimited() {
        let mut budget = StepBudget::unlimited();
        for _ in 0..10_000 {
            assert!(budget.can_write());
            budget.record_write();
        }
        assert_eq!(budget.remaining_writes(), None);
    }
}
