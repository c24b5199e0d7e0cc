//! Delayed and repeating task scheduling

use std::time::Duration;

/// Task run once when its delay elapses
pub type OnceTask = Box<dyn FnOnce() + Send + 'static>;

/// Task run every time its period elapses
pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

/// Opaque handle identifying an armed task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Wrap a scheduler-assigned id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The scheduler-assigned id
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Scheduler for time-driven callbacks
///
/// Implementations must tolerate `cancel` on a handle that already fired or
/// was already cancelled.
pub trait Scheduler: Send + Sync {
    /// Run `task` once after `delay`
    fn after(&self, delay: Duration, task: OnceTask) -> TimerHandle;

    /// Run `task` every `period`, first firing one period from now
    fn every(&self, period: Duration, task: RepeatingTask) -> TimerHandle;

    /// Disarm a task
    fn cancel(&self, handle: TimerHandle);
}
