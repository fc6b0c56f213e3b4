//! Wait for the result of a remote CLI command execution.

use crate::client::{CommandExecutionSpec, RemoteClient, DEFAULT_CONNECTION_ID};
use crate::error::{RemoteError, Result, WatchError};
use crate::event::LifecycleEvent;
use crate::runner::EventSink;
use crate::watcher::{
    deserialize_impersonation_chain, encode_params, SuspendableWatcher, WatcherDescriptor,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Type tag under which command-result descriptors are persisted.
pub const COMMAND_RESULT_TYPE_TAG: &str = "opwatcher.command_result";

const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 10;

fn default_connection_id() -> String {
    DEFAULT_CONNECTION_ID.to_string()
}

fn default_poll_interval_seconds() -> u64 {
    DEFAULT_POLL_INTERVAL_SECONDS
}

/// Constructor parameters of a [`CommandResultWatcher`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResultParams {
    pub project_id: String,
    pub region: String,
    pub environment_id: String,
    /// Opaque description of the command execution, passed through to the
    /// remote client unchanged.
    pub execution: CommandExecutionSpec,
    #[serde(default = "default_connection_id")]
    pub connection_id: String,
    #[serde(
        default,
        deserialize_with = "deserialize_impersonation_chain",
        skip_serializing_if = "Option::is_none"
    )]
    pub impersonation_chain: Option<Vec<String>>,
    /// Interval handed to the remote client for its internal polling; this
    /// watcher itself never loops.
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
}

/// Watcher that suspends on a single wait call for a command's result and
/// reports success or failure as a terminal event.
pub struct CommandResultWatcher {
    params: CommandResultParams,
    client: Arc<dyn RemoteClient>,
}

impl CommandResultWatcher {
    pub fn new(params: CommandResultParams, client: Arc<dyn RemoteClient>) -> Self {
        Self { params, client }
    }

    /// Reconstruct a watcher from a persisted descriptor, validating the tag
    /// and every parameter up front.
    pub fn from_descriptor(
        descriptor: &WatcherDescriptor,
        client: Arc<dyn RemoteClient>,
    ) -> Result<Self> {
        if descriptor.type_tag != COMMAND_RESULT_TYPE_TAG {
            return Err(WatchError::UnknownWatcherType(descriptor.type_tag.clone()));
        }
        Ok(Self::new(descriptor.decode_params()?, client))
    }

    pub fn params(&self) -> &CommandResultParams {
        &self.params
    }
}

impl std::fmt::Debug for CommandResultWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandResultWatcher")
            .field("params", &self.params)
            .field("client", &"<client>")
            .finish()
    }
}

#[async_trait]
impl SuspendableWatcher for CommandResultWatcher {
    fn type_tag(&self) -> &'static str {
        COMMAND_RESULT_TYPE_TAG
    }

    fn serialize(&self) -> Result<WatcherDescriptor> {
        Ok(WatcherDescriptor::new(
            COMMAND_RESULT_TYPE_TAG,
            encode_params(&self.params)?,
        ))
    }

    async fn run(&self, sink: &EventSink) -> Result<()> {
        let outcome = self
            .client
            .wait_for_command_result(
                &self.params.project_id,
                &self.params.region,
                &self.params.environment_id,
                &self.params.execution,
                Duration::from_secs(self.params.poll_interval_seconds),
            )
            .await;

        match outcome {
            Ok(result) => {
                debug!(environment_id = %self.params.environment_id, "command finished");
                sink.emit(LifecycleEvent::command_success(result)).await
            }
            // A known operational failure is reported as data, not raised:
            // the owning workflow step branches on the error event.
            Err(RemoteError::Operational { message }) => {
                warn!(environment_id = %self.params.environment_id, %message, "command failed");
                sink.emit(LifecycleEvent::command_error(message)).await
            }
            Err(other) => Err(other.into()),
        }
    }
}
