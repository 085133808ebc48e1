use tandem_core::{IceCandidate, SessionDescription, SignalEvent};

/// Everything the coordinator reacts to: relayed signaling events, engine
/// discoveries, and the completions of engine operations it asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// The user started a call; ask the relay to join the room.
    Join,
    /// An event received from the signaling transport.
    Signal(SignalEvent),
    /// A locally discovered candidate. `None` marks the end of gathering.
    LocalCandidate(Option<IceCandidate>),
    OfferCreated(SessionDescription),
    AnswerCreated(SessionDescription),
    LocalDescriptionApplied,
    RemoteDescriptionApplied,
    EngineFailed {
        operation: &'static str,
        reason: String,
    },
    /// Local hang-up or client shutdown.
    HangUp,
}

impl Input {
    pub fn name(&self) -> &'static str {
        match self {
            Input::Join => "join",
            Input::Signal(event) => event.name(),
            Input::LocalCandidate(_) => "local_candidate",
            Input::OfferCreated(_) => "offer_created",
            Input::AnswerCreated(_) => "answer_created",
            Input::LocalDescriptionApplied => "local_description_applied",
            Input::RemoteDescriptionApplied => "remote_description_applied",
            Input::EngineFailed { .. } => "engine_failed",
            Input::HangUp => "hang_up",
        }
    }
}

/// Outbound actions requested by the coordinator, executed in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(SignalEvent),
    /// Create the negotiation handle for this session.
    CreateEngine,
    CreateDataChannel,
    CreateOffer,
    CreateAnswer,
    SetLocalDescription(SessionDescription),
    SetRemoteDescription(SessionDescription),
    AddRemoteCandidate(IceCandidate),
    /// Release every resource of the session.
    Release { notify_peer: bool },
}

impl Effect {
    /// Whether the effect is an operation on the negotiation engine.
    pub fn is_engine_operation(&self) -> bool {
        matches!(
            self,
            Effect::CreateDataChannel
                | Effect::CreateOffer
                | Effect::CreateAnswer
                | Effect::SetLocalDescription(_)
                | Effect::SetRemoteDescription(_)
                | Effect::AddRemoteCandidate(_)
        )
    }
}
