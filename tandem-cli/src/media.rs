use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tandem_client::{MediaSink, MediaSource, MediaStream};
use tracing::info;

/// Stand-in for a capture device on hosts without one.
#[derive(Debug)]
pub struct SyntheticStream {
    id: String,
    stopped: AtomicBool,
}

impl SyntheticStream {
    fn new(id: String) -> Self {
        Self {
            id,
            stopped: AtomicBool::new(false),
        }
    }
}

impl MediaStream for SyntheticStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn stop_all_tracks(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            info!("Stopped tracks of {}", self.id);
        }
    }
}

pub struct SyntheticMediaSource {
    camera: bool,
}

impl SyntheticMediaSource {
    pub fn new(camera: bool) -> Self {
        Self { camera }
    }
}

#[async_trait]
impl MediaSource for SyntheticMediaSource {
    async fn acquire_camera(&self) -> Result<Arc<dyn MediaStream>> {
        if !self.camera {
            bail!("camera disabled");
        }
        Ok(Arc::new(SyntheticStream::new(format!(
            "camera-{}",
            std::process::id()
        ))))
    }

    async fn acquire_display(&self) -> Result<Arc<dyn MediaStream>> {
        Ok(Arc::new(SyntheticStream::new(format!(
            "screen-{}",
            std::process::id()
        ))))
    }
}

/// Reports what would be on screen.
pub struct TerminalSink {
    name: &'static str,
}

impl TerminalSink {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl MediaSink for TerminalSink {
    fn attach(&self, stream: Arc<dyn MediaStream>) {
        info!("{} view shows {}", self.name, stream.id());
    }

    fn detach(&self) {
        info!("{} view cleared", self.name);
    }
}
