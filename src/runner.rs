//! Host-facing runner: spawn watchers as independently suspended tasks.
//!
//! The host's scheduler owns when watchers start and when their terminal
//! events are consumed; this module is the contract between the two. A
//! spawned watcher multiplexes onto the runtime with everything else, yields
//! at its remote-call and delay suspension points, and hands events to the
//! host over a channel. Cancellation is abandonment: aborting the task at a
//! suspension point leaves no partial state, because watchers hold nothing
//! beyond their constructor parameters.

use crate::error::{Result, WatchError};
use crate::event::LifecycleEvent;
use crate::watcher::SuspendableWatcher;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Capacity of the event channel between a watcher and the host. Watchers
/// emit at most one terminal event, so this never applies backpressure in
/// practice.
const EVENT_CHANNEL_CAPACITY: usize = 8;

/// Sending half of the watcher event channel.
pub struct EventSink {
    tx: mpsc::Sender<LifecycleEvent>,
}

impl EventSink {
    /// Create a sink paired with its receiver, for driving a watcher
    /// directly rather than through [`spawn_watcher`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<LifecycleEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Emit one event to the host. Fails if the host dropped the receiving
    /// end.
    pub async fn emit(&self, event: LifecycleEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| WatchError::ChannelClosed)
    }
}

/// Spawn a watcher onto the current tokio runtime and hand back its handle.
pub fn spawn_watcher(watcher: Box<dyn SuspendableWatcher>) -> WatcherHandle {
    let run_id = Uuid::new_v4();
    let type_tag = watcher.type_tag();
    let (sink, events) = EventSink::channel(EVENT_CHANNEL_CAPACITY);

    let task = tokio::spawn(async move {
        debug!(%run_id, type_tag = watcher.type_tag(), "watcher started");
        let outcome = watcher.run(&sink).await;
        match &outcome {
            Ok(()) => debug!(%run_id, type_tag = watcher.type_tag(), "watcher finished"),
            Err(e) => {
                warn!(%run_id, type_tag = watcher.type_tag(), error = %e, "watcher run failed")
            }
        }
        outcome
    });

    WatcherHandle {
        run_id,
        type_tag,
        events,
        task,
    }
}

/// Handle to a spawned watcher: its event stream plus cancellation and join.
pub struct WatcherHandle {
    run_id: Uuid,
    type_tag: &'static str,
    events: mpsc::Receiver<LifecycleEvent>,
    task: JoinHandle<Result<()>>,
}

impl WatcherHandle {
    /// Identifier of this run, for correlation in host logs.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Type tag of the watcher behind this handle.
    pub fn type_tag(&self) -> &'static str {
        self.type_tag
    }

    /// Receive the next event. Returns `None` once the watcher has
    /// terminated and all events were consumed.
    pub async fn next_event(&mut self) -> Option<LifecycleEvent> {
        self.events.recv().await
    }

    /// Abandon the watcher at its current suspension point.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Wait for the run to finish and surface its outcome. A cancelled run
    /// reports [`WatchError::Cancelled`].
    pub async fn join(self) -> Result<()> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Err(WatchError::Cancelled),
            Err(e) => Err(WatchError::Join(e.to_string())),
        }
    }
}
