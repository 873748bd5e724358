//! `EventHandler` (spec §4.9): the glue between the raw [`EventLoop`] and
//! storage. Owns an [`EventTransformer`] and something implementing
//! [`EventStorage`], and is itself the loop's [`EventListener`].

use crate::error::{Error, Result};
use crate::event_loop::EventListener;
use crate::raw::{DeviceSnapshotSource, RawEvent};
use crate::storage::EventStorage;
use crate::transformer::EventTransformer;

/// Implements [`EventListener`] by running every notified raw event through
/// a transformer and storing each resulting [`crate::event::Data`] in turn.
/// A storage failure on any one `Data` stops processing the rest of that
/// batch and is propagated to the caller (spec §4.9 "a store `Err`
/// terminates the handler chain"), which in turn stops the [`EventLoop`]
/// that owns this handler.
pub struct EventHandler<S: DeviceSnapshotSource, T: EventStorage> {
    transformer: EventTransformer<S>,
    storage: T,
}

impl<S: DeviceSnapshotSource, T: EventStorage> EventHandler<S, T> {
    pub fn new(transformer: EventTransformer<S>, storage: T) -> Self {
        Self { transformer, storage }
    }

    pub fn transformer(&self) -> &EventTransformer<S> {
        &self.transformer
    }
}

impl<S: DeviceSnapshotSource, T: EventStorage> EventListener for EventHandler<S, T> {
    type Error = Error;

    async fn notify(&mut self, event: RawEvent) -> Result<()> {
        let batch = self.transformer.transform(&event).await?;
        for data in batch {
            self.storage.store(data)?;
        }
        Ok(())
    }
}
