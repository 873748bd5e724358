//! The error taxonomy every fallible boundary in the pipeline returns.
//!
//! Each variant carries a human-readable message, mirroring the original
//! `evgetcore::Error<ErrorType>` this crate is distilled from. Unlike that
//! original, each kind gets its own variant rather than a shared
//! `{errorType, message}` pair, so call sites can match on the kind with
//! ordinary `enum` matching instead of comparing against an `ErrorType`.

use evget_async::AsyncError;

/// Crate-wide error type. Every public, fallible operation returns
/// `Result<T, Error>` (aliased below as [`Result`]).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A timer, event source, or scheduler wait failed for a reason other
    /// than cancellation (cancellation is folded into success, see
    /// `evget_async::Interval`).
    #[error("async wait failed: {0}")]
    Async(String),

    /// The device snapshot handed to `DeviceRegistry::refresh_all` was
    /// internally inconsistent (e.g. a device id enumerated once but whose
    /// button/scroll classes reference a different id).
    #[error("device registry error: {0}")]
    DeviceRegistry(String),

    /// A raw platform event could not be classified (unexpected event
    /// class, missing valuator data the event type requires, etc).
    #[error("transform error: {0}")]
    Transform(String),

    /// A sink failed to persist a batch (connection, serialization,
    /// constraint violation).
    #[error("storage error: {0}")]
    Storage(String),

    /// The database manager's flush path failed, wrapping the underlying
    /// cause with context about which flush trigger produced it.
    #[error("database manager error: {0}")]
    DatabaseManager(String),
}

impl From<AsyncError> for Error {
    fn from(err: AsyncError) -> Self {
        Error::Async(err.message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Construct an [`Error::DeviceRegistry`] from a `Display`-able cause.
pub fn device_registry_error(message: impl Into<String>) -> Error {
    Error::DeviceRegistry(message.into())
}

/// Construct an [`Error::Transform`] from a `Display`-able cause.
pub fn transform_error(message: impl Into<String>) -> Error {
    Error::Transform(message.into())
}

/// Construct an [`Error::Storage`] from a `Display`-able cause.
pub fn storage_error(message: impl Into<String>) -> Error {
    Error::Storage(message.into())
}

/// Construct an [`Error::DatabaseManager`] from a `Display`-able cause,
/// tagging which flush path (`"size"` or `"time"`) the failure came from.
pub fn database_manager_error(context: &str, cause: impl std::fmt::Display) -> Error {
    Error::DatabaseManager(format!("{context}: {cause}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn async_error_converts_with_message_preserved() {
        let async_err = AsyncError::new("timer wait failed");
        let err: Error = async_err.into();
        assert_eq!(err.to_string(), "async wait failed: timer wait failed");
    }
}
