pub mod broker;
pub mod client;
pub mod host;
pub mod protocol;

pub use broker::{BrokerEvent, ConnectionBroker, LoopbackBroker, PeerId};
pub use client::ClientSession;
pub use host::HostSession;
pub use protocol::{Message, RoomState};

/// Failures in the synchronization layer.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("gave up rejoining after {0} attempts")]
    RetriesExhausted(u32),
    #[error("malformed snapshot: {0}")]
    BadSnapshot(#[from] serde_json::Error),
}
