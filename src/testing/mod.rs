//! Mock remote client for testing watchers in isolation.

use crate::client::{CommandExecutionSpec, OperationHandle, RemoteClient};
use crate::error::RemoteError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Mock implementation of [`RemoteClient`] with scripted responses and
/// recorded calls.
///
/// Responses are consumed in order; once the script runs out, further calls
/// fail with a transport error so a runaway poll loop fails the test fast
/// instead of hanging.
///
/// # Example
///
/// ```ignore
/// use opwatcher::testing::{finished_operation, running_operation, MockRemoteClient};
///
/// let client = MockRemoteClient::new();
/// client.queue_operation(running_operation("operations/op-1"));
/// client.queue_operation(finished_operation("operations/op-1"));
///
/// // Run the watcher against the mock, then verify the interaction.
/// assert_eq!(client.operation_call_count(), 2);
/// ```
#[derive(Clone)]
pub struct MockRemoteClient {
    inner: Arc<MockRemoteClientInner>,
}

struct MockRemoteClientInner {
    operation_responses: Mutex<VecDeque<Result<OperationHandle, RemoteError>>>,
    command_response: Mutex<Option<Result<Value, RemoteError>>>,
    operation_calls: Mutex<Vec<String>>,
    command_calls: Mutex<Vec<CommandWaitCall>>,
}

/// A recorded `wait_for_command_result` call.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandWaitCall {
    pub project_id: String,
    pub region: String,
    pub environment_id: String,
    pub execution: CommandExecutionSpec,
    pub poll_interval: Duration,
}

impl MockRemoteClient {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MockRemoteClientInner {
                operation_responses: Mutex::new(VecDeque::new()),
                command_response: Mutex::new(None),
                operation_calls: Mutex::new(Vec::new()),
                command_calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Queue one operation status response.
    pub fn queue_operation(&self, handle: OperationHandle) {
        self.inner
            .operation_responses
            .lock()
            .push_back(Ok(handle));
    }

    /// Queue one failing operation status call.
    pub fn queue_operation_error(&self, error: RemoteError) {
        self.inner.operation_responses.lock().push_back(Err(error));
    }

    /// Queue `pending_polls` still-running statuses followed by one done
    /// status for `operation_name`.
    pub fn script_poll_sequence(&self, operation_name: &str, pending_polls: usize) {
        for _ in 0..pending_polls {
            self.queue_operation(running_operation(operation_name));
        }
        self.queue_operation(finished_operation(operation_name));
    }

    /// Set the outcome of the (single) command wait call.
    pub fn set_command_result(&self, result: Result<Value, RemoteError>) {
        *self.inner.command_response.lock() = Some(result);
    }

    /// Operation names passed to `get_operation_status`, in call order.
    pub fn operation_calls(&self) -> Vec<String> {
        self.inner.operation_calls.lock().clone()
    }

    /// Number of `get_operation_status` calls made so far.
    pub fn operation_call_count(&self) -> usize {
        self.inner.operation_calls.lock().len()
    }

    /// Recorded `wait_for_command_result` calls, in call order.
    pub fn command_calls(&self) -> Vec<CommandWaitCall> {
        self.inner.command_calls.lock().clone()
    }
}

impl Default for MockRemoteClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteClient for MockRemoteClient {
    async fn get_operation_status(
        &self,
        operation_name: &str,
    ) -> Result<OperationHandle, RemoteError> {
        self.inner
            .operation_calls
            .lock()
            .push(operation_name.to_string());
        self.inner
            .operation_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Err(RemoteError::Transport(format!(
                    "no scripted status for operation '{operation_name}'"
                )))
            })
    }

    async fn wait_for_command_result(
        &self,
        project_id: &str,
        region: &str,
        environment_id: &str,
        execution: &CommandExecutionSpec,
        poll_interval: Duration,
    ) -> Result<Value, RemoteError> {
        self.inner.command_calls.lock().push(CommandWaitCall {
            project_id: project_id.to_string(),
            region: region.to_string(),
            environment_id: environment_id.to_string(),
            execution: execution.clone(),
            poll_interval,
        });
        self.inner
            .command_response
            .lock()
            .take()
            .unwrap_or_else(|| Err(RemoteError::Transport("no scripted command result".into())))
    }
}

/// Status snapshot for an operation that is still running.
pub fn running_operation(name: &str) -> OperationHandle {
    OperationHandle {
        project_id: "test-project".to_string(),
        region: "us-central1".to_string(),
        name: name.to_string(),
        done: false,
        error: None,
    }
}

/// Status snapshot for an operation that finished successfully.
pub fn finished_operation(name: &str) -> OperationHandle {
    OperationHandle {
        project_id: "test-project".to_string(),
        region: "us-central1".to_string(),
        name: name.to_string(),
        done: true,
        error: None,
    }
}

/// Status snapshot for an operation that reported an error.
pub fn failed_operation(name: &str, message: &str) -> OperationHandle {
    OperationHandle {
        project_id: "test-project".to_string(),
        region: "us-central1".to_string(),
        name: name.to_string(),
        done: false,
        error: Some(message.to_string()),
    }
}
