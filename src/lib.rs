//! # opwatcher
//!
//! Suspendable watchers for long-running cloud operations, built to be
//! embedded in a workflow-orchestration host.
//!
//! A watcher is a serializable description of "what to wait for and how",
//! run as an independently suspended task so that waiting never blocks a
//! worker thread. Two watchers are built in:
//!
//! - [`OperationPollWatcher`] polls a named remote operation at a fixed
//!   interval until it reports done or errored.
//! - [`CommandResultWatcher`] suspends on a single wait call for a remote
//!   command's result and reports success or failure.
//!
//! Both produce at most one terminal [`LifecycleEvent`] per run and can be
//! persisted as a [`WatcherDescriptor`] and reconstructed through the
//! [`WatcherRegistry`] after a host restart, resuming the wait from scratch.
//!
//! ## Modules
//!
//! - [`client`] - the remote client boundary the watchers are built on
//! - [`watcher`] - the watcher trait, descriptors, built-in watchers, registry
//! - [`event`] - terminal lifecycle events
//! - [`runner`] - spawning, event delivery, and cancellation
//! - [`error`] - error types
//! - [`testing`] - mock remote client and status helpers

pub mod client;
pub mod error;
pub mod event;
pub mod runner;
pub mod testing;
pub mod watcher;

// Re-export error types
pub use error::{RemoteError, Result, WatchError};

// Re-export the remote client boundary
pub use client::{CommandExecutionSpec, OperationHandle, RemoteClient, DEFAULT_CONNECTION_ID};

// Re-export event types
pub use event::{CommandOutcome, LifecycleEvent};

// Re-export watcher types
pub use watcher::{
    CommandResultParams, CommandResultWatcher, OperationPollParams, OperationPollWatcher,
    SuspendableWatcher, WatcherDescriptor, WatcherParams, WatcherRegistry,
    COMMAND_RESULT_TYPE_TAG, OPERATION_POLL_TYPE_TAG,
};

// Re-export runner types
pub use runner::{spawn_watcher, EventSink, WatcherHandle};
