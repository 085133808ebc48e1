use crate::negotiation::NegotiationState;
use thiserror::Error;

/// Failures a call can run into, from acquisition through teardown.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("no camera or screen-share source could be acquired")]
    MediaUnavailable,

    #[error("room name is empty")]
    EmptyRoomName,

    #[error("room is unavailable: it already has two participants")]
    RoomUnavailable,

    /// Description or candidate message that the current state does not
    /// expect. Absorbed by the call; never fatal.
    #[error("out-of-order `{signal}` while {state:?}")]
    OutOfOrderSignal {
        signal: &'static str,
        state: NegotiationState,
    },

    #[error("data channel is not open")]
    ChannelNotOpen,

    #[error("signaling transport is closed")]
    TransportClosed,

    #[error("a call is already in progress")]
    SessionActive,

    #[error("no call in progress")]
    NoActiveSession,

    #[error("negotiation engine failed to {operation}: {reason}")]
    Engine {
        operation: &'static str,
        reason: String,
    },
}
