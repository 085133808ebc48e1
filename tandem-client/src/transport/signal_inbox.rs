use crate::call::{Envelope, Inbound};
use tandem_core::{SessionId, SignalEvent};
use tokio::sync::mpsc;
use tracing::debug;

/// Delivers inbound signaling events to the call manager, tagged with the
/// session the transport was opened for.
#[derive(Clone)]
pub struct SignalInbox {
    session: SessionId,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl SignalInbox {
    pub(crate) fn new(session: SessionId, tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Returns `false` once the call manager has stopped.
    pub fn deliver(&self, event: SignalEvent) -> bool {
        self.push(Inbound::Signal(event))
    }

    /// Reports that the connection to the relay ended on its own.
    pub fn transport_lost(&self) {
        self.push(Inbound::TransportLost);
    }

    fn push(&self, event: Inbound) -> bool {
        let envelope = Envelope {
            session: self.session,
            event,
        };
        if self.tx.send(envelope).is_err() {
            debug!("Signal for session {} dropped: manager stopped", self.session);
            return false;
        }
        true
    }
}
