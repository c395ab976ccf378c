// ═══════════════════════════════════════════════════════════════════════
// Connection broker — the injected transport seam
//
// The real transport (WebRTC data channels, TCP, ...) lives outside this
// crate. Sessions only ever see send/broadcast plus a stream of lifecycle
// and data events; transport failures come back as Disconnected events.
// ═══════════════════════════════════════════════════════════════════════

use crate::protocol::Message;
use std::collections::BTreeMap;

/// Transport-level identity of one connected peer. Distinct from player
/// names: a reconnecting player shows up under a fresh peer id.
pub type PeerId = u64;

#[derive(Debug, Clone)]
pub enum BrokerEvent {
    Connected(PeerId),
    Disconnected(PeerId),
    /// Raw wire text; the session parses and validates it.
    Data(PeerId, String),
}

/// What a session needs from the transport: reliable, ordered, per-peer
/// delivery. Implementations serialize however their wire requires.
pub trait ConnectionBroker {
    fn send(&mut self, peer: PeerId, message: &Message);
    fn broadcast(&mut self, message: &Message);
}

/// In-memory broker for tests and the local runner: delivered messages pile
/// up per peer until drained.
#[derive(Debug, Default)]
pub struct LoopbackBroker {
    inboxes: BTreeMap<PeerId, Vec<Message>>,
}

impl LoopbackBroker {
    pub fn new() -> LoopbackBroker {
        LoopbackBroker::default()
    }

    /// Register a peer so broadcasts reach it.
    pub fn attach(&mut self, peer: PeerId) {
        self.inboxes.entry(peer).or_default();
    }

    pub fn detach(&mut self, peer: PeerId) {
        self.inboxes.remove(&peer);
    }

    /// Take everything delivered to `peer` since the last drain.
    pub fn drain(&mut self, peer: PeerId) -> Vec<Message> {
        self.inboxes.get_mut(&peer).map(std::mem::take).unwrap_or_default()
    }
}

impl ConnectionBroker for LoopbackBroker {
    fn send(&mut self, peer: PeerId, message: &Message) {
        if let Some(inbox) = self.inboxes.get_mut(&peer) {
            inbox.push(message.clone());
        }
    }

    fn broadcast(&mut self, message: &Message) {
        for inbox in self.inboxes.values_mut() {
            inbox.push(message.clone());
        }
    }
}
