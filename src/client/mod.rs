//! Remote client boundary.
//!
//! Watchers never talk to the network themselves. Everything that involves
//! credentials, transport, and service-specific request plumbing sits behind
//! [`RemoteClient`], which the host implements against its real cloud client
//! and tests implement with [`crate::testing::MockRemoteClient`]. One client
//! instance may be shared across many concurrently suspended watchers, so
//! implementations must be safe for concurrent invocation.

use crate::error::RemoteError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Connection id used when a descriptor does not name one.
pub const DEFAULT_CONNECTION_ID: &str = "cloud_default";

/// Opaque description of the remote command to execute and how (command name,
/// arguments, execution context). Watchers pass it through to the client
/// unchanged.
pub type CommandExecutionSpec = Map<String, Value>;

/// Status snapshot of a long-running remote operation.
///
/// A fresh handle is returned on every poll call and never mutated; the next
/// poll's handle supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationHandle {
    pub project_id: String,
    pub region: String,
    /// Fully qualified operation name.
    pub name: String,
    /// Whether the operation reached a terminal state.
    pub done: bool,
    /// Error message reported by the operation, if any. Absent or empty means
    /// no error has been reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationHandle {
    /// The reported error message, treating an empty string as no error.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|message| !message.is_empty())
    }
}

/// Blocking-style remote calls the watchers are built on.
///
/// Both calls make their own network requests and do their own auth; failures
/// come back as [`RemoteError`] and are translated (or not) per watcher.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Fetch the current status of a long-running operation.
    async fn get_operation_status(
        &self,
        operation_name: &str,
    ) -> Result<OperationHandle, RemoteError>;

    /// Wait for a remote command execution to finish and return its result.
    ///
    /// The client does its own internal polling at `poll_interval`; the
    /// caller suspends on this single call until a terminal outcome.
    async fn wait_for_command_result(
        &self,
        project_id: &str,
        region: &str,
        environment_id: &str,
        execution: &CommandExecutionSpec,
        poll_interval: Duration,
    ) -> Result<Value, RemoteError>;
}
