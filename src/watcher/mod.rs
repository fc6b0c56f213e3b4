//! Watcher abstraction: serializable, suspendable units of waiting.
//!
//! A watcher is a description of "what to wait for and how". The host runs it
//! as an independently suspended task, persists its [`WatcherDescriptor`]
//! across process restarts, and reconstructs it through the
//! [`WatcherRegistry`] to resume waiting from scratch. Watchers hold no
//! mutable remote state beyond their constructor parameters, which is what
//! makes abandonment-at-a-suspension-point a safe cancellation model.

pub mod command_result;
pub mod operation_poll;
pub mod registry;

pub use command_result::{CommandResultParams, CommandResultWatcher, COMMAND_RESULT_TYPE_TAG};
pub use operation_poll::{OperationPollParams, OperationPollWatcher, OPERATION_POLL_TYPE_TAG};
pub use registry::{WatcherFactory, WatcherRegistry};

use crate::error::{Result, WatchError};
use crate::runner::EventSink;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Parameter mapping carried by a [`WatcherDescriptor`]: named, plain values
/// only (strings, numbers, nested string-keyed maps), no live handles.
pub type WatcherParams = Map<String, Value>;

/// Serializable identity of a watcher instance: its type tag plus every
/// constructor parameter.
///
/// Reconstructing a watcher from its descriptor and running the fresh
/// instance is behaviorally equivalent to running the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatcherDescriptor {
    pub type_tag: String,
    pub params: WatcherParams,
}

impl WatcherDescriptor {
    pub fn new(type_tag: impl Into<String>, params: WatcherParams) -> Self {
        Self {
            type_tag: type_tag.into(),
            params,
        }
    }

    /// Decode the parameter mapping into a typed params struct, failing fast
    /// on missing or mistyped fields.
    pub fn decode_params<P: DeserializeOwned>(&self) -> Result<P> {
        serde_json::from_value(Value::Object(self.params.clone()))
            .map_err(|e| WatchError::InvalidDescriptor(format!("{}: {}", self.type_tag, e)))
    }
}

/// Encode a typed params struct into a descriptor parameter mapping.
pub(crate) fn encode_params<P: Serialize>(params: &P) -> Result<WatcherParams> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(map),
        other => Err(WatchError::InvalidDescriptor(format!(
            "watcher parameters must be a mapping, got {other}"
        ))),
    }
}

/// Accepts an impersonation chain written either as a single principal or as
/// a delegation list, normalized to a list.
pub(crate) fn deserialize_impersonation_chain<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Chain {
        One(String),
        Many(Vec<String>),
    }

    Ok(Option::<Chain>::deserialize(deserializer)?.map(|chain| match chain {
        Chain::One(principal) => vec![principal],
        Chain::Many(principals) => principals,
    }))
}

/// Minimal capability every watcher implements so the host can run it
/// opaquely.
#[async_trait]
pub trait SuspendableWatcher: Send + Sync {
    /// Stable tag identifying this watcher type in persisted descriptors.
    fn type_tag(&self) -> &'static str;

    /// Capture every constructor parameter. Reconstructing from the returned
    /// descriptor must produce a behaviorally identical watcher.
    fn serialize(&self) -> Result<WatcherDescriptor>;

    /// Wait for the remote condition, emitting terminal events through
    /// `sink`.
    ///
    /// Suspends only on remote calls and timed delays, produces a finite
    /// sequence of events (at most one terminal event per run), then
    /// terminates. Not restartable; construct a fresh instance to re-run.
    async fn run(&self, sink: &EventSink) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Params {
        name: String,
        #[serde(default, deserialize_with = "deserialize_impersonation_chain")]
        impersonation_chain: Option<Vec<String>>,
    }

    #[test]
    fn test_decode_params_reports_missing_fields() {
        let descriptor = WatcherDescriptor::new("example.watcher", WatcherParams::new());
        let err = descriptor.decode_params::<Params>().unwrap_err();
        assert!(matches!(err, WatchError::InvalidDescriptor(_)));
        assert!(err.to_string().contains("example.watcher"));
    }

    #[test]
    fn test_impersonation_chain_accepts_single_principal() {
        let descriptor = WatcherDescriptor::new(
            "example.watcher",
            encode_params(&json!({
                "name": "op",
                "impersonation_chain": "sa@project.iam.gserviceaccount.com",
            }))
            .unwrap(),
        );
        let params: Params = descriptor.decode_params().unwrap();
        assert_eq!(
            params.impersonation_chain,
            Some(vec!["sa@project.iam.gserviceaccount.com".to_string()])
        );
    }

    #[test]
    fn test_impersonation_chain_accepts_list() {
        let descriptor = WatcherDescriptor::new(
            "example.watcher",
            encode_params(&json!({
                "name": "op",
                "impersonation_chain": ["first@p.iam", "second@p.iam"],
            }))
            .unwrap(),
        );
        let params: Params = descriptor.decode_params().unwrap();
        assert_eq!(
            params.impersonation_chain,
            Some(vec!["first@p.iam".to_string(), "second@p.iam".to_string()])
        );
    }

    #[test]
    fn test_encode_params_rejects_non_mapping() {
        let err = encode_params(&"just a string").unwrap_err();
        assert!(matches!(err, WatchError::InvalidDescriptor(_)));
    }

    #[test]
    fn test_descriptor_round_trips_through_json() {
        let descriptor = WatcherDescriptor::new(
            "example.watcher",
            encode_params(&json!({"name": "op", "count": 3})).unwrap(),
        );
        let text = serde_json::to_string(&descriptor).unwrap();
        let back: WatcherDescriptor = serde_json::from_str(&text).unwrap();
        assert_eq!(back, descriptor);
    }
}
