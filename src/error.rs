//! Error types for watcher runs and descriptor handling.
//!
//! Two layers are distinguished: [`RemoteError`] is what the remote client
//! collaborator raises, [`WatchError`] is what a watcher run or the registry
//! surfaces to the host. The host marks the owning task failed on any
//! `WatchError`; remote error messages are carried through unchanged.

use thiserror::Error;

/// Errors surfaced by a watcher run, the registry, or descriptor handling.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The polled operation reported an error in its own status payload.
    ///
    /// Fatal for the poll watcher: the run ends without emitting an event and
    /// the remote message is preserved for the host.
    #[error("environment operation failed: {0}")]
    OperationFailed(String),

    /// A remote call failed and the failure is not handled at the watcher
    /// level (transport, auth, or an operational error outside the one path
    /// the command watcher converts to an event).
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A persisted descriptor could not be turned back into a watcher.
    #[error("invalid watcher descriptor: {0}")]
    InvalidDescriptor(String),

    /// No factory is registered for the descriptor's type tag.
    #[error("unknown watcher type '{0}'")]
    UnknownWatcherType(String),

    /// A factory for this type tag is already registered.
    #[error("watcher type '{0}' is already registered")]
    AlreadyRegistered(String),

    /// The host dropped the event receiver while the watcher was running.
    #[error("event channel closed before the watcher finished")]
    ChannelClosed,

    /// The run was abandoned at a suspension point.
    #[error("watcher run was cancelled")]
    Cancelled,

    /// The spawned watcher task failed outside the watcher's own logic.
    #[error("watcher task failed: {0}")]
    Join(String),

    /// Serialization error while encoding or decoding watcher parameters.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Errors raised by the remote client collaborator.
///
/// `Operational` is the one variant a watcher may handle itself (the command
/// watcher converts it into a terminal error event); everything else always
/// propagates to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// A known operational failure reported by the remote service, e.g. the
    /// command execution itself failed. Displays as the bare message so the
    /// text reaches the host verbatim.
    #[error("{message}")]
    Operational { message: String },

    /// Network-level failure reaching the remote service.
    #[error("transport error: {0}")]
    Transport(String),

    /// Credential or authorization failure.
    #[error("authentication error: {0}")]
    Auth(String),
}

impl RemoteError {
    /// Known operational failure with the given message.
    pub fn operational(message: impl Into<String>) -> Self {
        Self::Operational {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operational_error_displays_bare_message() {
        let err = RemoteError::operational("boom");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_operation_failed_preserves_remote_message() {
        let err = WatchError::OperationFailed("quota exceeded in us-central1".to_string());
        assert!(err.to_string().contains("quota exceeded in us-central1"));
    }

    #[test]
    fn test_remote_error_passes_through_transparently() {
        let err = WatchError::from(RemoteError::Transport("connection reset".to_string()));
        assert_eq!(err.to_string(), "transport error: connection reset");
    }
}
