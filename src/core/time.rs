//! Simulation step timing

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of recent steps kept for the rolling work average
const HISTORY_LEN: usize = 100;

/// Tracks the discrete simulation step counter and how long each step's
/// scheduled work took.
pub struct StepTimer {
    step: u64,
    step_duration: Duration,
    step_started: Instant,
    /// Work time spent in recently finished steps
    work_history: VecDeque<Duration>,
}

impl StepTimer {
    /// Create a new timer for steps of the given nominal length
    pub fn new(step_duration: Duration) -> Self {
        Self {
            step: 0,
            step_duration,
            step_started: Instant::now(),
            work_history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    /// Begin the next step. Returns the new step number.
    pub fn tick(&mut self) -> u64 {
        self.step += 1;
        self.step_started = Instant::now();
        self.step
    }

    /// Record how long the current step's work took
    pub fn finish_step(&mut self) {
        if self.work_history.len() == HISTORY_LEN {
            self.work_history.pop_front();
        }
        self.work_history.push_back(self.step_started.elapsed());
    }

    /// Current step number (0 before the first tick)
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Nominal length of one step
    pub fn step_duration(&self) -> Duration {
        self.step_duration
    }

    /// Average work time over the recent step history
    pub fn average_work(&self) -> Duration {
        if self.work_history.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.work_history.iter().sum();
        total / self.work_history.len() as u32
    }
}

impl Default for StepTimer {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}
