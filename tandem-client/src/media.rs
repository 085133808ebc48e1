use crate::error::CallError;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Opaque handle to a set of media tracks.
pub trait MediaStream: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    /// Stop every track of the stream. Safe to call more than once.
    fn stop_all_tracks(&self);
}

/// Provider of the local stream.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire_camera(&self) -> Result<Arc<dyn MediaStream>>;

    async fn acquire_display(&self) -> Result<Arc<dyn MediaStream>>;
}

/// Rendering surface for a stream.
pub trait MediaSink: Send + Sync {
    fn attach(&self, stream: Arc<dyn MediaStream>);

    fn detach(&self);
}

/// Acquires the camera stream, falling back to screen share only after the
/// camera attempt has failed.
pub async fn acquire_local_stream(source: &dyn MediaSource) -> Result<Arc<dyn MediaStream>, CallError> {
    let camera_err = match source.acquire_camera().await {
        Ok(stream) => {
            info!("Acquired camera stream {}", stream.id());
            return Ok(stream);
        }
        Err(e) => e,
    };
    warn!("Camera unavailable ({:#}), trying screen share", camera_err);

    match source.acquire_display().await {
        Ok(stream) => {
            info!("Acquired display stream {}", stream.id());
            Ok(stream)
        }
        Err(e) => {
            warn!("Screen share unavailable: {:#}", e);
            Err(CallError::MediaUnavailable)
        }
    }
}
