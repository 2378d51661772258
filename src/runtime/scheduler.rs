use std::time::Duration;

/// Paces a running processor.
///
/// [`Processor::run`](super::processor::Processor::run) asks the scheduler to
/// wait one tick interval before every tick. Returning `false` cancels the run.
pub trait Scheduler {
    fn wait(&mut self, interval: Duration) -> bool;
}

/// Real-time pacing: sleeps the calling thread for each interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalScheduler;

impl Scheduler for IntervalScheduler {
    fn wait(&mut self, interval: Duration) -> bool {
        std::thread::sleep(interval);
        true
    }
}

/// Ticks back to back without sleeping, optionally for a limited number of
/// ticks. Useful for tests and for running a program as fast as possible.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler {
    budget: Option<usize>,
    ticks: usize,
}

impl ImmediateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the run once `budget` ticks have been granted.
    pub fn with_budget(budget: usize) -> Self {
        ImmediateScheduler {
            budget: Some(budget),
            ticks: 0,
        }
    }

    /// Number of ticks granted so far.
    pub fn ticks(&self) -> usize {
        self.ticks
    }
}

impl Scheduler for ImmediateScheduler {
    fn wait(&mut self, _interval: Duration) -> bool {
        if self.budget.is_some_and(|budget| self.ticks >= budget) {
            return false;
        }
        self.ticks += 1;
        true
    }
}
