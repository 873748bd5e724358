//! Monotonic timers and the multi-threaded task scheduler that the rest of
//! the event pipeline runs on.
//!
//! Uses `Notify`-based cancellation and tracing spans around task lifecycle,
//! but owns its own dedicated worker pool rather than relying on an ambient
//! `#[tokio::main]` runtime, matching the original `Scheduler`'s own
//! `io_context` and fixed thread pool.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, trace};

/// Failure kind for timer/runtime waits. Cancellation via [`Interval::reset`]
/// is deliberately *not* represented here: it is folded into the `Ok(())`
/// path (see module docs on [`Interval`]).
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AsyncError {
    pub message: String,
}

impl AsyncError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type AsyncResult<T> = Result<T, AsyncError>;

/// A monotonic, periodic wake-up primitive.
///
/// `tick()` completes once per period; `reset()` rearms the deadline and, if
/// a `tick()` is currently pending, wakes it with a *successful* result
/// rather than an error. This lets a caller that owns a reference to the
/// same `Interval` interrupt a pending wait (e.g. on shutdown) without the
/// waiting side having to distinguish "timed out" from "was told to stop
/// waiting" — both look like a normal, successful tick.
///
/// Not thread-safe in the sense that two overlapping `tick()` calls on the
/// same instance are undefined; a single logical waiter plus any number of
/// `reset()` callers is the supported usage.
#[derive(Debug)]
pub struct Interval {
    period: Duration,
    deadline: Mutex<Instant>,
    reset_signal: Notify,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: Mutex::new(Instant::now() + period),
            reset_signal: Notify::new(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Rearm the deadline to `now + period`. If a `tick()` is currently
    /// pending, it resolves immediately with `Ok(())`.
    pub fn reset(&self) {
        let mut deadline = self.deadline.lock().expect("interval deadline mutex poisoned");
        *deadline = Instant::now() + self.period;
        drop(deadline);
        self.reset_signal.notify_one();
    }

    fn rearm(&self) {
        let mut deadline = self.deadline.lock().expect("interval deadline mutex poisoned");
        *deadline = Instant::now() + self.period;
    }

    /// Wait for the next period boundary (or an external [`Interval::reset`]).
    /// Both outcomes resolve to `Ok(())`; only an underlying runtime failure
    /// surfaces as `Err`.
    pub async fn tick(&self) -> AsyncResult<()> {
        let deadline = *self.deadline.lock().expect("interval deadline mutex poisoned");
        tokio::select! {
            () = tokio::time::sleep_until(deadline) => {
                self.rearm();
                Ok(())
            }
            () = self.reset_signal.notified() => {
                trace!("interval reset observed while tick pending; treating as success");
                Ok(())
            }
        }
    }
}

/// Callback-driven repeating timer: waits an interval, invokes an async
/// callback, and loops until [`RepeatingTimer::stop`] is called.
pub struct RepeatingTimer {
    interval: Interval,
    stopped: AtomicBool,
}

impl RepeatingTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            interval: Interval::new(period),
            stopped: AtomicBool::new(false),
        }
    }

    /// Cancel the current (or next) wait. Cancellation is folded into the
    /// loop exiting cleanly with `Ok(())`, never an error.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.interval.reset();
    }

    /// Repeatedly wait the configured interval and invoke `callback`. Errors
    /// returned by `callback` propagate immediately and are not caught here.
    pub async fn await_with<F, Fut, E>(&self, mut callback: F) -> Result<(), E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: From<AsyncError>,
    {
        loop {
            if self.stopped.load(Ordering::Acquire) {
                return Ok(());
            }
            self.interval.tick().await.map_err(E::from)?;
            if self.stopped.load(Ordering::Acquire) {
                return Ok(());
            }
            callback().await?;
        }
    }
}

struct SchedulerInner {
    runtime: tokio::runtime::Runtime,
    stopped: AtomicBool,
    inflight: Mutex<Vec<JoinHandle<()>>>,
}

/// Multi-threaded cooperative task executor. Owns a dedicated `tokio`
/// runtime (rather than borrowing an ambient one) sized per the default
/// pool policy, spawns async tasks, and exposes a single process-wide stop
/// flag every long-running loop in the pipeline polls cooperatively.
///
/// Cheap to clone: cloning shares the same worker pool and stop flag, the
/// way a `tokio::runtime::Handle` is shared between call sites.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

impl Scheduler {
    /// Build a scheduler with the default pool size: `max(2, 2 *
    /// hardware_concurrency)`.
    pub fn new() -> AsyncResult<Self> {
        let hardware_concurrency = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        Self::with_pool_size((2 * hardware_concurrency).max(2))
    }

    pub fn with_pool_size(worker_threads: usize) -> AsyncResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads.max(1))
            .thread_name("evget-worker")
            .enable_all()
            .build()
            .map_err(|e| AsyncError::new(format!("failed to build scheduler runtime: {e}")))?;

        debug!(worker_threads, "scheduler runtime built");

        Ok(Self {
            inner: Arc::new(SchedulerInner {
                runtime,
                stopped: AtomicBool::new(false),
                inflight: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Queue `task` for execution. `on_complete` runs with the task's return
    /// value, or with `T::default()` if the task panicked — a panic is
    /// logged and swallowed at this boundary so one misbehaving task cannot
    /// take down the whole pipeline.
    pub fn spawn<T, Fut, C>(&self, task: Fut, on_complete: C)
    where
        T: Default + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        let task_handle = self.inner.runtime.spawn(task);
        let wrapper = self.inner.runtime.spawn(async move {
            match task_handle.await {
                Ok(value) => on_complete(value),
                Err(join_err) => {
                    error!(error = %join_err, "scheduler task panicked; swallowing");
                    on_complete(T::default());
                }
            }
        });

        let mut inflight = self.inner.inflight.lock().expect("scheduler inflight mutex poisoned");
        inflight.retain(|h| !h.is_finished());
        inflight.push(wrapper);
    }

    /// Set the process-wide stop flag. Does not itself cancel in-flight
    /// tasks; cooperative loops observe this via [`Scheduler::is_stopped`].
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::Release);
    }

    /// Async so callers inside tasks can poll it as a natural suspension
    /// point alongside other `.await`s, even though the read itself never
    /// suspends.
    pub async fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Block the calling thread until every task spawned so far has
    /// completed. Must be called from outside the scheduler's own runtime.
    pub fn join(&self) {
        let handles = std::mem::take(
            &mut *self.inner.inflight.lock().expect("scheduler inflight mutex poisoned"),
        );
        self.inner.runtime.block_on(async {
            for handle in handles {
                let _ = handle.await;
            }
        });
    }

    /// Handle to the scheduler's own runtime, for integrators who need to
    /// `block_on` outside of `spawn`/`join` (e.g. the demo binary's shutdown
    /// signal wait).
    pub fn handle(&self) -> tokio::runtime::Handle {
        self.inner.runtime.handle().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    #[tokio::test]
    async fn interval_first_tick_completes_after_period() {
        let interval = Interval::new(Duration::from_millis(20));
        let start = std::time::Instant::now();
        interval.tick().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[tokio::test]
    async fn interval_reset_while_pending_resolves_as_success() {
        let interval = Arc::new(Interval::new(Duration::from_secs(5)));
        let waiter = {
            let interval = interval.clone();
            tokio::spawn(async move { interval.tick().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        interval.reset();
        let result = tokio::time::timeout(Duration::from_millis(200), waiter)
            .await
            .expect("tick should resolve promptly after reset")
            .expect("task should not panic");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn interval_reset_then_tick_completes_within_one_period() {
        let interval = Interval::new(Duration::from_millis(20));
        interval.reset();
        let start = std::time::Instant::now();
        interval.tick().await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(10) && elapsed <= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn repeating_timer_invokes_callback_until_stopped() {
        let timer = Arc::new(RepeatingTimer::new(Duration::from_millis(5)));
        let calls = Arc::new(AtomicU32::new(0));

        let timer_for_task = timer.clone();
        let calls_for_task = calls.clone();
        let task = tokio::spawn(async move {
            timer_for_task
                .await_with(|| {
                    let calls = calls_for_task.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok::<(), AsyncError>(())
                    }
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        timer.stop();
        task.await.unwrap().unwrap();
        assert!(calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn repeating_timer_propagates_callback_errors() {
        let timer = RepeatingTimer::new(Duration::from_millis(1));
        let result = timer
            .await_with(|| async { Err::<(), AsyncError>(AsyncError::new("boom")) })
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn scheduler_default_pool_size_is_at_least_two() {
        let scheduler = Scheduler::new().unwrap();
        assert!(!scheduler.inner.stopped.load(Ordering::Acquire));
    }

    #[test]
    fn scheduler_spawn_and_join_runs_task() {
        let scheduler = Scheduler::with_pool_size(2).unwrap();
        let result = Arc::new(AtomicU32::new(0));
        let result_for_task = result.clone();
        scheduler.spawn(
            async move { 7u32 },
            move |value| {
                result_for_task.store(value, Ordering::SeqCst);
            },
        );
        scheduler.join();
        assert_eq!(result.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn scheduler_swallows_panics_and_still_runs_completion_handler() {
        let scheduler = Scheduler::with_pool_size(2).unwrap();
        let completed = Arc::new(AtomicBool::new(false));
        let completed_for_task = completed.clone();
        scheduler.spawn(
            async move {
                panic!("simulated task failure");
            },
            move |(): ()| {
                completed_for_task.store(true, Ordering::SeqCst);
            },
        );
        scheduler.join();
        assert!(completed.load(Ordering::SeqCst));
    }

    #[test]
    fn scheduler_stop_flag_is_observable() {
        let scheduler = Scheduler::with_pool_size(2).unwrap();
        let handle = scheduler.handle();
        assert!(!handle.block_on(scheduler.is_stopped()));
        scheduler.stop();
        assert!(handle.block_on(scheduler.is_stopped()));
    }
}
