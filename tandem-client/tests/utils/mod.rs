pub mod mock_media;

pub use fake_engine::*;
pub use mock_media::*;
pub use mock_relay::*;

use std::sync::Arc;
use std::time::Duration;
use tandem_client::{
    CallDeps, CallHandle, CallManager, CallStatus, ClientConfig, TransportConnector,
};
use tracing::Level;

/// Timeout for a call to reach an expected state (ms).
pub const CALL_TIMEOUT_MS: u64 = 5000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// One client with its fakes kept around for inspection.
pub struct TestPeer {
    pub handle: CallHandle,
    pub media: Arc<RecordingMediaSource>,
    pub local_sink: Arc<RecordingSink>,
    pub remote_sink: Arc<RecordingSink>,
}

impl TestPeer {
    /// Polls the status until `check` holds, failing after [`CALL_TIMEOUT_MS`].
    pub async fn wait_for(&self, what: &str, check: impl Fn(&CallStatus) -> bool) -> CallStatus {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(CALL_TIMEOUT_MS);
        loop {
            let status = self.handle.status().await.expect("call manager alive");
            if check(&status) {
                return status;
            }
            if tokio::time::Instant::now() > deadline {
                panic!("Timeout waiting for {}: last status {:?}", what, status);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub fn local_stream(&self) -> Arc<RecordingStream> {
        self.media.streams().last().cloned().expect("a stream was acquired")
    }
}

pub fn spawn_peer(connector: Arc<dyn TransportConnector>, network: &FakeNetwork) -> TestPeer {
    let media = Arc::new(RecordingMediaSource::new());
    let local_sink = Arc::new(RecordingSink::new());
    let remote_sink = Arc::new(RecordingSink::new());

    let deps = CallDeps {
        media: media.clone(),
        connector,
        engines: Arc::new(network.factory()),
        local_sink: local_sink.clone(),
        remote_sink: remote_sink.clone(),
    };
    let handle = CallManager::spawn(deps, ClientConfig::default());

    TestPeer {
        handle,
        media,
        local_sink,
        remote_sink,
    }
}

/// Waits for the first event matching `check`, skipping the rest.
pub async fn next_event(
    rx: &mut tokio::sync::broadcast::Receiver<tandem_client::CallEvent>,
    what: &str,
    check: impl Fn(&tandem_client::CallEvent) -> bool,
) -> tandem_client::CallEvent {
    let wait = async {
        loop {
            match rx.recv().await {
                Ok(event) if check(&event) => return event,
                Ok(_) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(e) => panic!("event stream ended while waiting for {}: {}", what, e),
            }
        }
    };
    tokio::time::timeout(Duration::from_millis(CALL_TIMEOUT_MS), wait)
        .await
        .unwrap_or_else(|_| panic!("Timeout waiting for {}", what))
}

/// Polls `check` until it holds or [`CALL_TIMEOUT_MS`] passes.
pub async fn eventually(what: &str, check: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(CALL_TIMEOUT_MS);
    while !check() {
        if tokio::time::Instant::now() > deadline {
            panic!("Timeout waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
