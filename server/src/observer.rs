use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Result, anyhow};
use pokeduel_protocol::ServerEvent;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Events queued for one connection before it counts as stalled
pub const OBSERVER_QUEUE_LIMIT: usize = 256;

/// Identifies one connection for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

impl ObserverId {
    fn next() -> Self {
        Self(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obs-{}", self.0)
    }
}

/// Cloneable handle for pushing events to one connection.
///
/// Sending never waits on the network: events are queued and a writer
/// task drains them onto the socket. A full queue makes `send` fail, so a
/// peer that stops reading gets dropped instead of buffering forever.
#[derive(Debug, Clone)]
pub struct ObserverHandle {
    id: ObserverId,
    outgoing: mpsc::Sender<ServerEvent>,
}

impl ObserverHandle {
    pub fn new(outgoing: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id: ObserverId::next(),
            outgoing,
        }
    }

    /// Create a handle together with the receiving end of its queue
    pub fn channel() -> (Self, mpsc::Receiver<ServerEvent>) {
        Self::with_capacity(OBSERVER_QUEUE_LIMIT)
    }

    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Queue an event for this connection
    pub fn send(&self, event: ServerEvent) -> Result<()> {
        self.outgoing.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => anyhow!("Observer {} stalled", self.id),
            TrySendError::Closed(_) => anyhow!("Observer {} disconnected", self.id),
        })
    }
}
