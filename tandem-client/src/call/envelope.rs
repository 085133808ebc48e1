use crate::engine::EngineEvent;
use crate::negotiation::Input;
use tandem_core::SessionId;

/// Anything that arrives at the manager on behalf of a session.
pub(crate) struct Envelope {
    pub session: SessionId,
    pub event: Inbound,
}

pub(crate) enum Inbound {
    Signal(tandem_core::SignalEvent),
    TransportLost,
    Engine(EngineEvent),
    /// Result of an engine operation the coordinator asked for.
    Completion(Input),
    /// The user's answer to the room prompt of a pending start.
    RoomChosen(Option<String>),
}
