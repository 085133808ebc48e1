use crate::model::room::RoomToken;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// Opaque session description, shaped like the browser's
/// `RTCSessionDescriptionInit` so either side can pass it straight through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}

/// Events carried by the signaling channel, relayed by the server within
/// one room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SignalEvent {
    /// client -> server
    Join(RoomToken),
    /// server -> client: first occupant
    Created,
    /// server -> client: second occupant
    Joined,
    /// server -> client: room already holds two occupants
    Full,
    /// server -> first occupant: the second occupant arrived
    NewPeer(RoomToken),
    #[serde(rename = "invite")]
    Offer(SessionDescription),
    #[serde(rename = "ok")]
    Answer(SessionDescription),
    IceCandidate(IceCandidate),
    Bye(RoomToken),
}

impl SignalEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SignalEvent::Join(_) => "join",
            SignalEvent::Created => "created",
            SignalEvent::Joined => "joined",
            SignalEvent::Full => "full",
            SignalEvent::NewPeer(_) => "new_peer",
            SignalEvent::Offer(_) => "invite",
            SignalEvent::Answer(_) => "ok",
            SignalEvent::IceCandidate(_) => "ice_candidate",
            SignalEvent::Bye(_) => "bye",
        }
    }

    /// Events the server forwards verbatim to the other occupant.
    pub fn is_peer_relayed(&self) -> bool {
        matches!(
            self,
            SignalEvent::Offer(_)
                | SignalEvent::Answer(_)
                | SignalEvent::IceCandidate(_)
                | SignalEvent::Bye(_)
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
