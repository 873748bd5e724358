//! `EventLoop` (spec §4.8): drives the abstract raw event source and
//! forwards each event to a single registered listener.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::Error;
use crate::raw::{RawEvent, RawEventSource};

/// The single downstream consumer an [`EventLoop`] forwards raw events to
/// (spec §4.8/§4.9: the [`crate::handler::EventHandler`] in practice).
/// Generic rather than `dyn`, mirroring [`RawEventSource`]: exactly one
/// listener is wired up once, at construction time.
pub trait EventListener: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn notify(
        &mut self,
        event: RawEvent,
    ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;
}

/// Drives `source.next_event()` in a loop, forwarding each event to the
/// registered listener. A second [`EventLoop::register_listener`] call
/// replaces the first (spec §4.8) — modeled here as `Option<L>` rather than
/// a list, since at most one listener is ever meaningful at a time.
///
/// `listener` and `stopped` use interior mutability so `start()` and
/// `stop()` can both be called through a shared reference: `stop()` is
/// meant to be invoked from a different task than the one running the
/// loop (spec §5 "Scheduler.stop is the single cancellation signal").
pub struct EventLoop<S, L> {
    source: Mutex<S>,
    listener: Mutex<Option<L>>,
    stopped: AtomicBool,
}

impl<S, L> EventLoop<S, L>
where
    S: RawEventSource,
    L: EventListener,
{
    pub fn new(source: S) -> Self {
        Self { source: Mutex::new(source), listener: Mutex::new(None), stopped: AtomicBool::new(false) }
    }

    /// Register the single downstream listener, replacing any previous one.
    pub fn register_listener(&self, listener: L) {
        *self.listener.lock().expect("event loop listener mutex poisoned") = Some(listener);
    }

    /// Cooperative stop signal; checked between iterations (spec §5).
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Run until `stop()` is called, the source errors, or the listener
    /// errors. Events are silently dropped if no listener is registered
    /// (spec §4.8).
    pub async fn start(&self) -> Result<(), Error> {
        loop {
            if self.is_stopped() {
                return Ok(());
            }

            let event = {
                let mut source = self.source.lock().expect("event loop source mutex poisoned");
                source.next_event().await.map_err(|e| Error::Async(format!("event source failed: {e}")))?
            };

            let mut listener = self.listener.lock().expect("event loop listener mutex poisoned");
            if let Some(listener) = listener.as_mut() {
                listener
                    .notify(event)
                    .await
                    .map_err(|e| Error::Async(format!("event listener failed: {e}")))?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    struct UnboundedSource;

    impl RawEventSource for UnboundedSource {
        type Error = Infallible;

        async fn next_event(&mut self) -> Result<RawEvent, Infallible> {
            Ok(sample_event())
        }
    }

    fn sample_event() -> RawEvent {
        use crate::raw::RawEventType;
        RawEvent {
            event_type: RawEventType::Motion,
            timestamp: chrono::DateTime::<chrono::Utc>::from_timestamp(0, 0).unwrap(),
            device_id: 0,
            source_device_id: 0,
            pointer_emulated: false,
            auto_repeat: false,
            modifier_mask: 0,
            position_x: 0.0,
            position_y: 0.0,
            detail: 0,
            character: String::new(),
            key_name: String::new(),
            valuators: Vec::new(),
            focus_window: None,
        }
    }

    struct CountingListener {
        count: Arc<AtomicUsize>,
    }

    impl EventListener for CountingListener {
        type Error = Infallible;

        async fn notify(&mut self, _event: RawEvent) -> Result<(), Infallible> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn events_without_a_listener_are_dropped_silently() {
        let event_loop: Arc<EventLoop<UnboundedSource, CountingListener>> =
            Arc::new(EventLoop::new(UnboundedSource));
        let loop_for_stop = event_loop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            loop_for_stop.stop();
        });
        assert!(event_loop.start().await.is_ok());
    }

    #[tokio::test]
    async fn stop_flag_exits_loop_before_next_iteration() {
        let event_loop = Arc::new(EventLoop::new(UnboundedSource));
        let count = Arc::new(AtomicUsize::new(0));
        event_loop.register_listener(CountingListener { count: count.clone() });

        let loop_for_stop = event_loop.clone();
        let stopper = tokio::spawn(async move {
            while count.load(Ordering::SeqCst) < 3 {
                tokio::task::yield_now().await;
            }
            loop_for_stop.stop();
        });

        event_loop.start().await.unwrap();
        stopper.await.unwrap();
    }

    #[tokio::test]
    async fn second_listener_registration_replaces_first() {
        let event_loop = Arc::new(EventLoop::new(UnboundedSource));
        let first_count = Arc::new(AtomicUsize::new(0));
        let second_count = Arc::new(AtomicUsize::new(0));
        event_loop.register_listener(CountingListener { count: first_count.clone() });
        event_loop.register_listener(CountingListener { count: second_count.clone() });

        let loop_for_stop = event_loop.clone();
        let second_for_stop = second_count.clone();
        tokio::spawn(async move {
            while second_for_stop.load(Ordering::SeqCst) < 2 {
                tokio::task::yield_now().await;
            }
            loop_for_stop.stop();
        });
        event_loop.start().await.unwrap();

        assert_eq!(first_count.load(Ordering::SeqCst), 0);
        assert!(second_count.load(Ordering::SeqCst) >= 2);
    }
}
