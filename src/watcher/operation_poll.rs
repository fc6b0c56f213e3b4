//! Poll a long-running environment operation until it reports done.

use crate::client::{RemoteClient, DEFAULT_CONNECTION_ID};
use crate::error::{Result, WatchError};
use crate::event::LifecycleEvent;
use crate::runner::EventSink;
use crate::watcher::{
    deserialize_impersonation_chain, encode_params, SuspendableWatcher, WatcherDescriptor,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Type tag under which operation-poll descriptors are persisted.
pub const OPERATION_POLL_TYPE_TAG: &str = "opwatcher.operation_poll";

const DEFAULT_POLL_PERIOD_SECONDS: u64 = 30;

fn default_connection_id() -> String {
    DEFAULT_CONNECTION_ID.to_string()
}

fn default_poll_period_seconds() -> u64 {
    DEFAULT_POLL_PERIOD_SECONDS
}

/// Constructor parameters of an [`OperationPollWatcher`], all plain values so
/// the descriptor round-trips through persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationPollParams {
    pub project_id: String,
    pub region: String,
    /// Fully qualified name of the operation to poll.
    pub operation_name: String,
    #[serde(default = "default_connection_id")]
    pub connection_id: String,
    #[serde(
        default,
        deserialize_with = "deserialize_impersonation_chain",
        skip_serializing_if = "Option::is_none"
    )]
    pub impersonation_chain: Option<Vec<String>>,
    /// Fixed interval between status polls. No backoff and no retry cap: the
    /// host's surrounding retry/timeout policy bounds total wait time.
    #[serde(default = "default_poll_period_seconds")]
    pub poll_period_seconds: u64,
}

/// Watcher that polls a named remote operation at a fixed interval until the
/// operation reports done or errored.
pub struct OperationPollWatcher {
    params: OperationPollParams,
    client: Arc<dyn RemoteClient>,
}

impl OperationPollWatcher {
    pub fn new(params: OperationPollParams, client: Arc<dyn RemoteClient>) -> Self {
        Self { params, client }
    }

    /// Reconstruct a watcher from a persisted descriptor, validating the tag
    /// and every parameter up front.
    pub fn from_descriptor(
        descriptor: &WatcherDescriptor,
        client: Arc<dyn RemoteClient>,
    ) -> Result<Self> {
        if descriptor.type_tag != OPERATION_POLL_TYPE_TAG {
            return Err(WatchError::UnknownWatcherType(descriptor.type_tag.clone()));
        }
        Ok(Self::new(descriptor.decode_params()?, client))
    }

    pub fn params(&self) -> &OperationPollParams {
        &self.params
    }
}

impl std::fmt::Debug for OperationPollWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationPollWatcher")
            .field("params", &self.params)
            .field("client", &"<client>")
            .finish()
    }
}

#[async_trait]
impl SuspendableWatcher for OperationPollWatcher {
    fn type_tag(&self) -> &'static str {
        OPERATION_POLL_TYPE_TAG
    }

    fn serialize(&self) -> Result<WatcherDescriptor> {
        Ok(WatcherDescriptor::new(
            OPERATION_POLL_TYPE_TAG,
            encode_params(&self.params)?,
        ))
    }

    async fn run(&self, sink: &EventSink) -> Result<()> {
        let period = Duration::from_secs(self.params.poll_period_seconds);
        loop {
            let operation = self
                .client
                .get_operation_status(&self.params.operation_name)
                .await?;

            // `done` wins even when an error message is also set.
            if operation.done {
                debug!(operation_name = %operation.name, "operation finished");
                sink.emit(LifecycleEvent::operation_done(operation.name))
                    .await?;
                return Ok(());
            }
            if let Some(message) = operation.error_message() {
                return Err(WatchError::OperationFailed(message.to_string()));
            }

            debug!(
                operation_name = %self.params.operation_name,
                period_seconds = self.params.poll_period_seconds,
                "operation still running"
            );
            tokio::time::sleep(period).await;
        }
    }
}
