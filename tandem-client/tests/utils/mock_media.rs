use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tandem_client::{MediaSink, MediaSource, MediaStream};

/// Stream that counts how often it was stopped.
#[derive(Debug)]
pub struct RecordingStream {
    id: String,
    stops: AtomicUsize,
}

impl RecordingStream {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stops: AtomicUsize::new(0),
        }
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl MediaStream for RecordingStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn stop_all_tracks(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Media source with switchable camera and display failures.
#[derive(Default)]
pub struct RecordingMediaSource {
    camera_fails: AtomicBool,
    display_fails: AtomicBool,
    camera_calls: AtomicUsize,
    display_calls: AtomicUsize,
    streams: Mutex<Vec<Arc<RecordingStream>>>,
}

impl RecordingMediaSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_camera(&self) {
        self.camera_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_display(&self) {
        self.display_fails.store(true, Ordering::SeqCst);
    }

    pub fn camera_calls(&self) -> usize {
        self.camera_calls.load(Ordering::SeqCst)
    }

    pub fn display_calls(&self) -> usize {
        self.display_calls.load(Ordering::SeqCst)
    }

    /// Streams handed out so far, oldest first.
    pub fn streams(&self) -> Vec<Arc<RecordingStream>> {
        self.streams.lock().unwrap().clone()
    }

    fn hand_out(&self, id: String) -> Arc<dyn MediaStream> {
        let stream = Arc::new(RecordingStream::new(id));
        self.streams.lock().unwrap().push(stream.clone());
        stream
    }
}

#[async_trait]
impl MediaSource for RecordingMediaSource {
    async fn acquire_camera(&self) -> Result<Arc<dyn MediaStream>> {
        let n = self.camera_calls.fetch_add(1, Ordering::SeqCst);
        if self.camera_fails.load(Ordering::SeqCst) {
            bail!("camera permission denied");
        }
        Ok(self.hand_out(format!("camera-{}", n)))
    }

    async fn acquire_display(&self) -> Result<Arc<dyn MediaStream>> {
        let n = self.display_calls.fetch_add(1, Ordering::SeqCst);
        if self.display_fails.load(Ordering::SeqCst) {
            bail!("screen share cancelled");
        }
        Ok(self.hand_out(format!("display-{}", n)))
    }
}

/// Sink that remembers what it shows.
#[derive(Default)]
pub struct RecordingSink {
    attached: Mutex<Option<String>>,
    detaches: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached(&self) -> Option<String> {
        self.attached.lock().unwrap().clone()
    }

    pub fn detach_count(&self) -> usize {
        self.detaches.load(Ordering::SeqCst)
    }
}

impl MediaSink for RecordingSink {
    fn attach(&self, stream: Arc<dyn MediaStream>) {
        *self.attached.lock().unwrap() = Some(stream.id().to_owned());
    }

    fn detach(&self) {
        self.attached.lock().unwrap().take();
        self.detaches.fetch_add(1, Ordering::SeqCst);
    }
}
