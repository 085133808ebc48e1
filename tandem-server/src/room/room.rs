use tandem_core::PeerId;

/// Result of a peer asking to enter a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The peer is the first occupant.
    Created,
    /// The peer joined `existing`, who is now told a new peer arrived.
    Joined { existing: PeerId },
    /// Both slots are taken.
    Full,
    AlreadyMember,
}

/// A two-slot rendezvous point. The manager keys rooms by token.
#[derive(Debug, Clone, Default)]
pub struct Room {
    occupants: Vec<PeerId>,
}

impl Room {
    pub const CAPACITY: usize = 2;

    pub fn new() -> Self {
        Self {
            occupants: Vec::with_capacity(Self::CAPACITY),
        }
    }

    pub fn occupants(&self) -> &[PeerId] {
        &self.occupants
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.occupants.contains(peer_id)
    }

    pub fn join(&mut self, peer_id: PeerId) -> JoinOutcome {
        if self.contains(&peer_id) {
            return JoinOutcome::AlreadyMember;
        }
        match self.occupants.as_slice() {
            [] => {
                self.occupants.push(peer_id);
                JoinOutcome::Created
            }
            [existing] => {
                let existing = *existing;
                self.occupants.push(peer_id);
                JoinOutcome::Joined { existing }
            }
            _ => JoinOutcome::Full,
        }
    }

    /// Returns `true` if the peer was an occupant.
    pub fn leave(&mut self, peer_id: &PeerId) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|p| p != peer_id);
        self.occupants.len() != before
    }

    /// The occupant other than `peer_id`, if any.
    pub fn other(&self, peer_id: &PeerId) -> Option<PeerId> {
        self.occupants.iter().copied().find(|p| p != peer_id)
    }
}
