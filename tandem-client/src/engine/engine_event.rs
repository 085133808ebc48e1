use crate::call::{Envelope, Inbound};
use crate::media::MediaStream;
use std::sync::Arc;
use tandem_core::{IceCandidate, SessionId};
use tokio::sync::mpsc;
use tracing::debug;

/// Events the negotiation engine reports back to the session.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// `None` signals that candidate gathering is complete.
    LocalCandidate(Option<IceCandidate>),
    RemoteTrack(Arc<dyn MediaStream>),
    /// The peer created the session's data channel.
    RemoteDataChannel { label: String },
    DataChannelOpen,
    DataChannelMessage(String),
}

/// Sender for [`EngineEvent`]s, bound to the session that owns the engine.
#[derive(Clone)]
pub struct EngineEvents {
    session: SessionId,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl EngineEvents {
    pub(crate) fn new(session: SessionId, tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Returns `false` once the call manager has stopped.
    pub fn emit(&self, event: EngineEvent) -> bool {
        let envelope = Envelope {
            session: self.session,
            event: Inbound::Engine(event),
        };
        if self.tx.send(envelope).is_err() {
            debug!("Engine event for session {} dropped: manager stopped", self.session);
            return false;
        }
        true
    }
}
