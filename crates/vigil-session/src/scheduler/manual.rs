//! Virtual-time scheduler

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use vigil_core::{Clock, OnceTask, RepeatingTask, Scheduler, TimerHandle};

/// Smallest period accepted by `every`, so a zero period cannot spin forever
const MIN_PERIOD: Duration = Duration::from_millis(1);

enum Task {
    Once(OnceTask),
    /// `None` while the task is running outside the lock
    Every {
        period: Duration,
        task: Option<RepeatingTask>,
    },
}

struct Pending {
    /// Offset from the scheduler's origin at which the task fires
    due: Duration,
    task: Task,
}

struct Inner {
    origin: Instant,
    wall_origin: DateTime<Utc>,
    elapsed: Duration,
    next_id: u64,
    pending: BTreeMap<u64, Pending>,
}

/// Deterministic scheduler driven by explicit `advance` calls
///
/// Time only moves when the owner advances it. Due tasks fire in deadline
/// order (ties in arming order), with the clock set to each task's deadline
/// while it runs. The lock is never held while a task runs, so tasks may
/// arm or cancel other tasks.
pub struct ManualScheduler {
    inner: Mutex<Inner>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    /// Start virtual time at the current real time
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Start virtual time at a given wall-clock instant
    pub fn starting_at(wall_origin: DateTime<Utc>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                origin: Instant::now(),
                wall_origin,
                elapsed: Duration::ZERO,
                next_id: 1,
                pending: BTreeMap::new(),
            }),
        }
    }

    /// Virtual time elapsed since creation
    pub fn elapsed(&self) -> Duration {
        self.inner.lock().elapsed
    }

    /// Number of armed tasks
    pub fn armed(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_armed(&self, handle: TimerHandle) -> bool {
        self.inner.lock().pending.contains_key(&handle.id())
    }

    /// Advance virtual time by `by`, firing everything that falls due
    pub fn advance(&self, by: Duration) {
        self.advance_and(by, || {});
    }

    /// Advance virtual time by `by`, calling `after_each` after every firing
    ///
    /// Callers use `after_each` to let consumers react to a firing (and arm
    /// follow-up tasks) before later deadlines are considered.
    pub fn advance_and(&self, by: Duration, mut after_each: impl FnMut()) {
        let target = self.elapsed() + by;
        while self.fire_next(target) {
            after_each();
        }
        let mut inner = self.inner.lock();
        if inner.elapsed < target {
            inner.elapsed = target;
        }
    }

    /// Fire the earliest task due at or before `target`; false if none
    fn fire_next(&self, target: Duration) -> bool {
        let (id, task) = {
            let mut inner = self.inner.lock();
            let next = inner
                .pending
                .iter()
                .filter(|(_, p)| p.due <= target)
                .min_by_key(|(id, p)| (p.due, **id))
                .map(|(id, p)| (*id, p.due));

            let Some((id, due)) = next else {
                return false;
            };
            inner.elapsed = inner.elapsed.max(due);

            let is_repeating = matches!(
                inner.pending.get(&id).map(|p| &p.task),
                Some(Task::Every { .. })
            );

            if is_repeating {
                match inner.pending.get_mut(&id) {
                    Some(Pending {
                        due,
                        task: Task::Every { period, task },
                    }) => {
                        *due += *period;
                        (id, task.take().map(Firing::Every))
                    }
                    _ => (id, None),
                }
            } else {
                match inner.pending.remove(&id) {
                    Some(Pending {
                        task: Task::Once(task),
                        ..
                    }) => (id, Some(Firing::Once(task))),
                    _ => (id, None),
                }
            }
        };

        match task {
            Some(Firing::Once(task)) => task(),
            Some(Firing::Every(mut task)) => {
                task();
                // Put it back unless it was cancelled while running
                let mut inner = self.inner.lock();
                if let Some(Pending {
                    task: Task::Every { task: slot, .. },
                    ..
                }) = inner.pending.get_mut(&id)
                {
                    *slot = Some(task);
                }
            }
            None => {}
        }
        true
    }

    fn arm(&self, delay: Duration, task: Task) -> TimerHandle {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let due = inner.elapsed + delay;
        inner.pending.insert(id, Pending { due, task });
        TimerHandle::new(id)
    }
}

enum Firing {
    Once(OnceTask),
    Every(RepeatingTask),
}

impl Scheduler for ManualScheduler {
    fn after(&self, delay: Duration, task: OnceTask) -> TimerHandle {
        self.arm(delay, Task::Once(task))
    }

    fn every(&self, period: Duration, task: RepeatingTask) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        self.arm(
            period,
            Task::Every {
                period,
                task: Some(task),
            },
        )
    }

    fn cancel(&self, handle: TimerHandle) {
        self.inner.lock().pending.remove(&handle.id());
    }
}

impl Clock for ManualScheduler {
    fn now(&self) -> Instant {
        let inner = self.inner.lock();
        inner.origin + inner.elapsed
    }

    fn wall(&self) -> DateTime<Utc> {
        let inner = self.inner.lock();
        chrono::Duration::from_std(inner.elapsed)
            .map(|elapsed| inner.wall_origin + elapsed)
            .unwrap_or(inner.wall_origin)
    }
}
