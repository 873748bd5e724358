//! `DatabaseManager` (spec §4.10): owns the shared buffer, enforces the two
//! flush triggers, and fans each flush out to every registered sink.
//!
//! Grounded on `examples/original_source/evgetcore/src/Storage/DatabaseManager.cpp`'s
//! `store`/`spawn_store_data`/`store_after_coroutine` shape, replacing the
//! `shared_ptr`-plus-mutex pattern with a single `Arc<DatabaseManagerInner>`
//! (REDESIGN FLAGS: "shared mutable state via shared_ptr + mutex").

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{debug, error, info};

use evget_async::{Interval, Scheduler};

use crate::error::{database_manager_error, Error, Result};
use crate::event::{Data, EventBatch};
use crate::locking_vector::LockingVector;

/// A boxed, pinned future — the dyn-safe substitute for `async fn` in a
/// trait object, since [`Sink`] must support `Vec<Arc<dyn Sink>>` and
/// native async-fn-in-traits isn't object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A storage sink (spec §6). Concrete sinks (`evget-sink-json`,
/// `evget-sink-stdout`, `evget-sink-db`) live in their own crates and depend
/// on this one, not the other way around — so unlike most of the other
/// capability boundaries in this crate, this is a `dyn` trait object rather
/// than a closed `enum`: a fixed enum here would force every concrete sink
/// crate to be a dependency of `evget-core` itself. `store` may be called
/// concurrently by multiple in-flight flush tasks; implementors must be
/// internally thread-safe (spec §5 "Sinks are shared across flush tasks").
pub trait Sink: Send + Sync + 'static {
    /// Best-effort one-time setup (e.g. opening a file, a connection pool).
    /// Default is a no-op.
    fn init(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async { Ok(()) })
    }

    fn store(&self, batch: EventBatch) -> BoxFuture<'_, Result<()>>;
}

/// The synchronous contract an [`crate::handler::EventHandler`] stores
/// through (spec §4.10 `store(event)`). Implemented by [`DatabaseManager`];
/// kept as its own trait so the handler doesn't need to depend on the
/// manager's concrete flush/threshold machinery.
pub trait EventStorage: Send + Sync {
    fn store(&self, event: Data) -> Result<()>;
}

struct DatabaseManagerInner {
    scheduler: Scheduler,
    sinks: RwLock<Vec<Arc<dyn Sink>>>,
    buffer: LockingVector<Data>,
    size_threshold: usize,
}

/// Owns the shared buffer, the size/time flush triggers, and the sink fan-out.
/// Cheap to clone: clones share the same buffer, sink list, and scheduler, the
/// way the original shares a `shared_ptr<LockingVector>` between its spawned
/// tasks (spec §3 "Ownership").
#[derive(Clone)]
pub struct DatabaseManager {
    inner: Arc<DatabaseManagerInner>,
}

impl DatabaseManager {
    /// Construct a manager and immediately spawn its time-flush task (spec
    /// §4.10 "On construction"). `size_threshold` is the inclusive `N`;
    /// `time_threshold` is `T`.
    pub fn new(
        scheduler: Scheduler,
        sinks: Vec<Arc<dyn Sink>>,
        size_threshold: usize,
        time_threshold: Duration,
    ) -> Self {
        let manager = Self {
            inner: Arc::new(DatabaseManagerInner {
                scheduler,
                sinks: RwLock::new(sinks),
                buffer: LockingVector::new(),
                size_threshold,
            }),
        };
        manager.spawn_time_flush(time_threshold);
        manager
    }

    /// Append a sink after construction (spec.md §3 "Supplemented
    /// features": the original's `add_store`), for integrators who build
    /// the manager before every sink is ready (e.g. a slow connection pool
    /// warm-up).
    pub fn add_sink(&self, sink: Arc<dyn Sink>) {
        self.inner.sinks.write().expect("sink list lock poisoned").push(sink);
    }

    /// Fast path: push the event, and if the buffer just reached
    /// `size_threshold`, spawn a flush. Never blocks on sink I/O.
    pub fn store(&self, event: Data) -> Result<()> {
        self.inner.buffer.push_back(event);
        if let Some(batch) = self.inner.buffer.drain_if_at(self.inner.size_threshold) {
            self.spawn_flush(batch);
        }
        Ok(())
    }

    fn spawn_time_flush(&self, period: Duration) {
        let manager = self.clone();
        let manager_for_complete = self.clone();
        self.inner.scheduler.spawn(
            async move {
                let interval = Interval::new(period);
                loop {
                    if manager.inner.scheduler.is_stopped().await {
                        return None;
                    }
                    if let Err(err) = interval.tick().await {
                        return Some(database_manager_error("time-flush", err));
                    }
                    debug!(period_secs = period.as_secs(), "time-flush threshold reached");
                    if let Some(batch) = manager.inner.buffer.drain_all() {
                        manager.spawn_flush(batch);
                    }
                }
            },
            move |maybe_err: Option<Error>| {
                resolve_flush_outcome(maybe_err, &manager_for_complete);
            },
        );
    }

    /// Spawn a task that hands `batch` to every sink, in registration order,
    /// aborting on the first sink error (spec §4.10 `spawn_flush`).
    fn spawn_flush(&self, batch: EventBatch) {
        info!(count = batch.len(), "flushing batch to sinks");
        let manager_for_task = self.clone();
        let manager_for_complete = self.clone();
        self.inner.scheduler.spawn(
            async move {
                let sinks: Vec<Arc<dyn Sink>> =
                    manager_for_task.inner.sinks.read().expect("sink list lock poisoned").clone();
                for sink in &sinks {
                    if let Err(err) = sink.store(batch.clone()).await {
                        return Some(err);
                    }
                }
                None
            },
            move |maybe_err: Option<Error>| {
                resolve_flush_outcome(maybe_err, &manager_for_complete);
            },
        );
    }
}

/// Shared completion-handler logic for both flush paths (spec §4.10/§7: "on
/// `Err`, log and stop the scheduler" — the fail-closed retention policy).
fn resolve_flush_outcome(maybe_err: Option<Error>, manager: &DatabaseManager) {
    if let Some(err) = maybe_err {
        error!(error = %err, "storage flush failed; stopping scheduler (fail-closed retention policy)");
        manager.inner.scheduler.stop();
    }
}

impl EventStorage for DatabaseManager {
    fn store(&self, event: Data) -> Result<()> {
        DatabaseManager::store(self, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::storage_error;
    use crate::event::entry::MouseMoveBuilder;
    use crate::event::Entry;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct RecordingSink {
        calls: Arc<std::sync::Mutex<Vec<usize>>>,
        fail_on_call: Option<usize>,
        seen: AtomicUsize,
    }

    impl Sink for RecordingSink {
        fn store(&self, batch: EventBatch) -> BoxFuture<'_, Result<()>> {
            let call_index = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
            Box::pin(async move {
                self.calls.lock().unwrap().push(batch.len());
                if self.fail_on_call == Some(call_index) {
                    return Err(storage_error("simulated sink failure"));
                }
                Ok(())
            })
        }
    }

    fn sample_data() -> Data {
        Data::new(Entry::MouseMove(MouseMoveBuilder::default().build()))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn size_threshold_exactly_met_triggers_flush() {
        let scheduler = Scheduler::with_pool_size(2).unwrap();
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::new(RecordingSink { calls: calls.clone(), fail_on_call: None, seen: AtomicUsize::new(0) });
        let manager = DatabaseManager::new(scheduler, vec![sink], 3, Duration::from_secs(3600));

        manager.store(sample_data()).unwrap();
        manager.store(sample_data()).unwrap();
        assert!(calls.lock().unwrap().is_empty());
        manager.store(sample_data()).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.lock().unwrap().as_slice(), &[3]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn s5_second_sink_failure_stops_scheduler_after_first_flush_succeeds() {
        let scheduler = Scheduler::with_pool_size(2).unwrap();
        let calls_a = Arc::new(std::sync::Mutex::new(Vec::new()));
        let calls_b = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink_a = Arc::new(RecordingSink { calls: calls_a.clone(), fail_on_call: None, seen: AtomicUsize::new(0) });
        let sink_b = Arc::new(RecordingSink { calls: calls_b.clone(), fail_on_call: Some(2), seen: AtomicUsize::new(0) });
        let manager = DatabaseManager::new(scheduler.clone(), vec![sink_a, sink_b], 2, Duration::from_secs(3600));

        manager.store(sample_data()).unwrap();
        manager.store(sample_data()).unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!scheduler.is_stopped().await);

        manager.store(sample_data()).unwrap();
        manager.store(sample_data()).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(calls_a.lock().unwrap().len(), 2);
        assert_eq!(calls_b.lock().unwrap().len(), 2);
        assert!(scheduler.is_stopped().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn time_threshold_with_empty_buffer_spawns_no_flush() {
        let scheduler = Scheduler::with_pool_size(2).unwrap();
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::new(RecordingSink { calls: calls.clone(), fail_on_call: None, seen: AtomicUsize::new(0) });
        let _manager = DatabaseManager::new(scheduler, vec![sink], 1000, Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn add_sink_after_construction_receives_subsequent_flushes() {
        let scheduler = Scheduler::with_pool_size(2).unwrap();
        let manager = DatabaseManager::new(scheduler, vec![], 1, Duration::from_secs(3600));
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::new(RecordingSink { calls: calls.clone(), fail_on_call: None, seen: AtomicUsize::new(0) });
        manager.add_sink(sink);

        manager.store(sample_data()).unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(calls.lock().unwrap().len(), 1);
    }
}
