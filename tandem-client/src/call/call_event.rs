use crate::channel::{ChannelState, TranscriptEntry};
use crate::error::CallError;
use crate::negotiation::NegotiationState;
use tandem_core::{Role, RoomToken, SessionId};

/// Notifications for the user interface.
#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    /// Failure the user must see before anything else happens.
    Notice(CallError),
    StateChanged(NegotiationState),
    RoleAssigned(Role),
    RemoteStream { id: String },
    ChannelOpen,
    Message(TranscriptEntry),
    /// Final confirmation that the call's resources were released.
    ChannelClosed,
}

/// Snapshot of the manager's view of the current (or last) call.
#[derive(Debug, Clone)]
pub struct CallStatus {
    pub session: Option<SessionId>,
    pub room: Option<RoomToken>,
    pub state: NegotiationState,
    pub role: Option<Role>,
    pub channel: ChannelState,
    pub transcript: Vec<TranscriptEntry>,
}

impl CallStatus {
    pub fn is_live(&self) -> bool {
        self.session.is_some()
    }

    pub fn has_received(&self, text: &str) -> bool {
        self.transcript
            .iter()
            .any(|e| e.origin == crate::channel::Origin::Remote && e.text == text)
    }
}
