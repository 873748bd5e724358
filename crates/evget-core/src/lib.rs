//! Platform-independent core of the input event pipeline: normalizes raw
//! device events into typed records and drives them through pluggable
//! storage sinks. Concrete platform event sources and sinks live in their
//! own crates and depend on this one.

pub mod error;
pub mod event;
pub mod event_loop;
pub mod handler;
pub mod locking_vector;
pub mod raw;
pub mod registry;
pub mod storage;
pub mod transformer;

pub use error::{Error, Result};
pub use event_loop::{EventListener, EventLoop};
pub use handler::EventHandler;
pub use locking_vector::LockingVector;
pub use raw::{
    DeviceSnapshot, DeviceSnapshotSource, FocusWindow, RawButton, RawDevice, RawDeviceKindHint,
    RawEvent, RawEventSource, RawEventType, RawScrollAxis, ValuatorSample,
};
pub use registry::{DeviceEntry, DeviceRegistry, ScrollAxisState, ScrollOrientation};
pub use storage::{BoxFuture, DatabaseManager, EventStorage, Sink};
pub use transformer::EventTransformer;
