use async_trait::async_trait;
use tandem_core::{PeerId, SignalEvent};

/// Implemented by whatever holds the peers' connections so the room
/// manager can reach them.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Deliver `event` to one peer. Unknown peers are skipped.
    async fn send_signal(&self, peer_id: PeerId, event: SignalEvent);
}
