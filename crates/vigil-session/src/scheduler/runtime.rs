//! Real-time scheduler on the tokio runtime

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use vigil_core::{Clock, OnceTask, RepeatingTask, Scheduler, TimerHandle};

/// Scheduler backed by tokio timers
///
/// Each armed task is a spawned tokio task; cancelling aborts it. Repeating
/// tasks skip missed ticks rather than bursting to catch up. Dropping the
/// scheduler aborts everything still armed.
///
/// Also a `Clock` reading tokio's notion of now, so deadlines computed from
/// it agree with the timers even when tokio time is paused.
pub struct TokioScheduler {
    runtime: Handle,
    next_id: AtomicU64,
    tasks: Arc<Mutex<HashMap<u64, JoinHandle<()>>>>,
}

impl TokioScheduler {
    /// Create a scheduler on the current runtime
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    /// Create a scheduler on an explicit runtime
    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(1),
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of armed tasks
    pub fn armed(&self) -> usize {
        self.tasks.lock().len()
    }

    fn next_handle(&self) -> TimerHandle {
        TimerHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Scheduler for TokioScheduler {
    fn after(&self, delay: Duration, task: OnceTask) -> TimerHandle {
        let handle = self.next_handle();
        let id = handle.id();
        let tasks = Arc::clone(&self.tasks);

        // Hold the map lock across spawn so the task cannot remove its
        // entry before it has been inserted
        let mut armed = self.tasks.lock();
        let join = self.runtime.spawn(async move {
            time::sleep(delay).await;
            tasks.lock().remove(&id);
            task();
        });
        armed.insert(id, join);
        handle
    }

    fn every(&self, period: Duration, mut task: RepeatingTask) -> TimerHandle {
        let handle = self.next_handle();
        let join = self.runtime.spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                task();
            }
        });
        self.tasks.lock().insert(handle.id(), join);
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(join) = self.tasks.lock().remove(&handle.id()) {
            join.abort();
        }
    }
}

impl Clock for TokioScheduler {
    fn now(&self) -> Instant {
        time::Instant::now().into_std()
    }

    fn wall(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            debug!("Aborting {} scheduled tasks", tasks.len());
        }
        for (_, join) in tasks.drain() {
            join.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_after_fires_after_delay() {
        let scheduler = TokioScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let start = time::Instant::now();
        scheduler.after(
            Duration::from_secs(270),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );

        rx.recv().await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(270));
        tokio::task::yield_now().await;
        assert_eq!(scheduler.armed(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_ticks_until_cancelled() {
        let scheduler = TokioScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = scheduler.every(
            Duration::from_secs(1),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );

        for _ in 0..3 {
            rx.recv().await.unwrap();
        }
        scheduler.cancel(handle);
        assert_eq!(scheduler.armed(), 0);

        // Sender was dropped with the aborted task
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_never_runs() {
        let scheduler = TokioScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let handle = scheduler.after(
            Duration::from_secs(5),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );
        scheduler.cancel(handle);
        scheduler.cancel(handle);

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_follows_paused_time() {
        let scheduler = TokioScheduler::new();
        let before = scheduler.now();
        time::advance(Duration::from_secs(90)).await;
        assert_eq!(scheduler.now() - before, Duration::from_secs(90));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_all() {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        {
            let scheduler = TokioScheduler::new();
            let tx2 = tx.clone();
            scheduler.after(Duration::from_secs(1), Box::new(move || drop(tx2.send(()))));
            scheduler.every(Duration::from_secs(1), Box::new(move || drop(tx.send(()))));
        }
        assert!(rx.recv().await.is_none());
    }
}
