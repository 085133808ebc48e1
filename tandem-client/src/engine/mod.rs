mod engine_event;
mod webrtc_engine;

pub use engine_event::*;
pub use webrtc_engine::*;

use crate::media::MediaStream;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tandem_core::{IceCandidate, SessionDescription};

/// The real-time-communication stack a session drives.
///
/// Discoveries (candidates, tracks, channel activity) are reported through
/// the [`EngineEvents`] handed to [`EngineFactory::create`].
#[async_trait]
pub trait NegotiationEngine: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, description: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    async fn add_remote_candidate(&self, candidate: IceCandidate) -> Result<()>;

    /// Create the session's text channel. Must precede offer creation.
    async fn create_data_channel(&self, label: &str) -> Result<()>;

    async fn send_text(&self, text: &str) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Creates one negotiation handle per session.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn create(
        &self,
        local_stream: Arc<dyn MediaStream>,
        events: EngineEvents,
    ) -> Result<Arc<dyn NegotiationEngine>>;
}
