//! # Sweep Scheduler
//!
//! Cancellable timer tasks for the automatic sweep.
//!
//! ## Task Timeline
//! ```text
//! initiate_scan                                   path ends
//!      │                                              │
//!      ▼   tick    tick    tick          tick         ▼
//!      ├────┼───────┼───────┼─── ... ─────┼───────────┤
//!      │◄──►│                                         │◄── settle ──►│
//!      period                                                        ▼
//!                                                               auto-finalize
//!
//!  periodic task ──────────────────────────────────────┘
//!  delayed task                                        └────────────┘
//!
//!  reset / re-initiate / manual finalize: cancel_all() aborts both
//! ```
//!
//! Abort takes effect at the task's next await point, so a tick already
//! holding the session lock still completes; the session epoch check then
//! drops its effect.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::debug;

// =============================================================================
// Task Handle
// =============================================================================

/// A spawned timer task. Dropping the handle aborts the task.
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Aborts the task.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            debug!(task = self.name, "Cancelling scheduled task");
            self.handle.abort();
        }
    }
}

/// Calls `tick` every `period`, first call one period from now.
///
/// Stops when `tick` resolves to `ControlFlow::Break`. Late ticks are
/// delayed rather than bunched up.
pub fn spawn_periodic<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> TaskHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if tick().await.is_break() {
                break;
            }
        }

        debug!(task = name, "Periodic task finished");
    });

    TaskHandle { name, handle }
}

/// Runs `work` once after `delay`.
pub fn spawn_delayed<Fut>(name: &'static str, delay: Duration, work: Fut) -> TaskHandle
where
    Fut: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        sleep(delay).await;
        work.await;
    });

    TaskHandle { name, handle }
}

// =============================================================================
// Sweep Scheduler
// =============================================================================

/// The two timers one scan can own: the sweep ticks and the settle delay.
#[derive(Debug, Default)]
pub struct SweepScheduler {
    periodic: Option<TaskHandle>,
    delayed: Option<TaskHandle>,
}

impl SweepScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the tick task, aborting any previous one.
    pub fn set_periodic(&mut self, task: TaskHandle) {
        self.periodic = Some(task);
    }

    /// Installs the settle task, aborting any previous one.
    pub fn set_delayed(&mut self, task: TaskHandle) {
        self.delayed = Some(task);
    }

    /// Aborts both tasks. Returns true if either was still running.
    pub fn cancel_all(&mut self) -> bool {
        let pending = self.has_pending();
        self.periodic = None;
        self.delayed = None;
        pending
    }

    /// True while a tick or settle task has not finished.
    pub fn has_pending(&self) -> bool {
        [&self.periodic, &self.delayed]
            .into_iter()
            .flatten()
            .any(|task| !task.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_periodic_runs_until_break() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let task = spawn_periodic("test", Duration::from_millis(50), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        });

        sleep(Duration::from_millis(49)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_runs_once_after_delay() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();

        let _task = spawn_delayed("test", Duration::from_millis(1000), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sleep(Duration::from_millis(999)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_stops_both_tasks() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = SweepScheduler::new();

        let ticks = count.clone();
        scheduler.set_periodic(spawn_periodic("ticks", Duration::from_millis(10), move || {
            ticks.fetch_add(1, Ordering::SeqCst);
            async { ControlFlow::Continue(()) }
        }));
        let settle = count.clone();
        scheduler.set_delayed(spawn_delayed("settle", Duration::from_millis(100), async move {
            settle.fetch_add(100, Ordering::SeqCst);
        }));

        sleep(Duration::from_millis(35)).await;
        assert!(scheduler.has_pending());
        assert!(scheduler.cancel_all());

        let seen = count.load(Ordering::SeqCst);
        sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
        assert!(seen < 100);
        assert!(!scheduler.cancel_all());
    }
}
