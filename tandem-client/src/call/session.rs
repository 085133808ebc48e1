use crate::channel::DataChannelSession;
use crate::engine::NegotiationEngine;
use crate::media::MediaStream;
use crate::negotiation::Coordinator;
use crate::transport::SignalingTransport;
use std::sync::Arc;
use tandem_core::SessionId;

/// The single live call. Owns every resource acquired for it.
pub(crate) struct Session {
    pub id: SessionId,
    pub coordinator: Coordinator,
    pub local_stream: Arc<dyn MediaStream>,
    pub remote_streams: Vec<Arc<dyn MediaStream>>,
    /// Created on role assignment.
    pub engine: Option<Arc<dyn NegotiationEngine>>,
    pub channel: DataChannelSession,
    pub transport: Arc<dyn SignalingTransport>,
}
