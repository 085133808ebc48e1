use tandem_core::{PeerId, RoomToken, SignalEvent};

/// Commands the signaling service sends to the room manager.
#[derive(Debug)]
pub enum RoomCommand {
    /// A peer asked to enter a room.
    Join { peer_id: PeerId, room: RoomToken },

    /// A peer-to-peer event to forward to the other occupant.
    Relay { peer_id: PeerId, event: SignalEvent },

    /// The peer's WebSocket went away.
    Disconnect { peer_id: PeerId },
}
