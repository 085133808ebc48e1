mod signal_inbox;
mod ws_transport;

pub use signal_inbox::*;
pub use ws_transport::*;

use crate::error::CallError;
use async_trait::async_trait;
use std::sync::Arc;
use tandem_core::SignalEvent;

/// Ordered, bidirectional event channel to the relay server.
#[async_trait]
pub trait SignalingTransport: Send + Sync {
    /// Fails with [`CallError::TransportClosed`] once the channel is gone.
    async fn send(&self, event: SignalEvent) -> Result<(), CallError>;

    async fn close(&self);
}

/// Opens a [`SignalingTransport`] whose inbound events go to `inbox`.
#[async_trait]
pub trait TransportConnector: Send + Sync {
    async fn connect(&self, inbox: SignalInbox) -> anyhow::Result<Arc<dyn SignalingTransport>>;
}
