//! Lifecycle events emitted by watchers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The single structured value a watcher emits to signal completion.
///
/// A successful run produces exactly one of these; the serde representation
/// matches the shapes the host persists and workflow steps branch on:
///
/// - `{"operation_name": ..., "operation_done": true}`
/// - `{"status": "success", "result": ...}`
/// - `{"status": "error", "message": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LifecycleEvent {
    /// A polled operation reached its terminal `done` state.
    OperationDone {
        operation_name: String,
        operation_done: bool,
    },
    /// A waited-on remote command finished, one way or the other.
    CommandOutcome(CommandOutcome),
}

/// Outcome of a remote command execution, tagged by `status` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CommandOutcome {
    /// The command completed and returned a result payload.
    Success { result: Value },
    /// The command failed with a known operational error.
    Error { message: String },
}

impl LifecycleEvent {
    /// Terminal event for a completed operation poll.
    pub fn operation_done(operation_name: impl Into<String>) -> Self {
        Self::OperationDone {
            operation_name: operation_name.into(),
            operation_done: true,
        }
    }

    /// Terminal event for a command that returned a result.
    pub fn command_success(result: Value) -> Self {
        Self::CommandOutcome(CommandOutcome::Success { result })
    }

    /// Terminal event for a command that failed with a known error.
    pub fn command_error(message: impl Into<String>) -> Self {
        Self::CommandOutcome(CommandOutcome::Error {
            message: message.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_done_wire_shape() {
        let event = LifecycleEvent::operation_done("operations/env-create-123");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "operation_name": "operations/env-create-123",
                "operation_done": true,
            })
        );
    }

    #[test]
    fn test_command_success_wire_shape() {
        let event = LifecycleEvent::command_success(json!({"exit_code": 0}));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "status": "success",
                "result": {"exit_code": 0},
            })
        );
    }

    #[test]
    fn test_command_error_wire_shape() {
        let event = LifecycleEvent::command_error("boom");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "status": "error",
                "message": "boom",
            })
        );
    }

    #[test]
    fn test_events_round_trip() {
        for event in [
            LifecycleEvent::operation_done("operations/op-1"),
            LifecycleEvent::command_success(json!(["dag_a", "dag_b"])),
            LifecycleEvent::command_error("command exited with code 1"),
        ] {
            let value = serde_json::to_value(&event).unwrap();
            let back: LifecycleEvent = serde_json::from_value(value).unwrap();
            assert_eq!(back, event);
        }
    }
}
