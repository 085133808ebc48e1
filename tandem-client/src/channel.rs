use crate::engine::NegotiationEngine;
use crate::error::CallError;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No channel created or adopted yet.
    Absent,
    /// Created or adopted, waiting for the open event.
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub origin: Origin,
    pub text: String,
}

/// The session's single text channel and its transcript.
#[derive(Debug)]
pub struct DataChannelSession {
    label: Option<String>,
    state: ChannelState,
    ready_marker: String,
    transcript: Vec<TranscriptEntry>,
}

impl DataChannelSession {
    pub fn new(ready_marker: impl Into<String>) -> Self {
        Self {
            label: None,
            state: ChannelState::Absent,
            ready_marker: ready_marker.into(),
            transcript: Vec::new(),
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Records the channel the Caller created. Returns `false` if the
    /// session already has one.
    pub fn create(&mut self, label: &str) -> bool {
        self.bind(label, "create")
    }

    /// Records the channel the Callee received from its peer.
    pub fn adopt(&mut self, label: &str) -> bool {
        self.bind(label, "adopt")
    }

    fn bind(&mut self, label: &str, how: &str) -> bool {
        if self.state != ChannelState::Absent {
            warn!(
                "Ignoring request to {} channel '{}': session already has {:?}",
                how, label, self.label
            );
            return false;
        }
        self.label = Some(label.to_owned());
        self.state = ChannelState::Connecting;
        true
    }

    /// Handles the engine's open event. Returns the ready marker to send
    /// when the channel has just opened.
    pub fn on_open(&mut self) -> Option<String> {
        if self.state != ChannelState::Connecting {
            warn!("Channel open event while {:?}", self.state);
            return None;
        }
        info!("DataChannel OPEN ({:?})", self.label);
        self.state = ChannelState::Open;
        Some(self.ready_marker.clone())
    }

    /// Sends `text` on the channel and records it in the transcript.
    pub async fn send(
        &mut self,
        engine: &dyn NegotiationEngine,
        text: &str,
    ) -> Result<&TranscriptEntry, CallError> {
        if !self.is_open() {
            return Err(CallError::ChannelNotOpen);
        }
        engine
            .send_text(text)
            .await
            .map_err(|e| CallError::Engine {
                operation: "send on data channel",
                reason: format!("{:#}", e),
            })?;
        Ok(self.record(Origin::Local, text.to_owned()))
    }

    pub fn on_message(&mut self, text: String) -> &TranscriptEntry {
        self.record(Origin::Remote, text)
    }

    /// Returns `true` if the channel was not already closed.
    pub fn close(&mut self) -> bool {
        if self.state == ChannelState::Closed {
            return false;
        }
        self.state = ChannelState::Closed;
        true
    }

    fn record(&mut self, origin: Origin, text: String) -> &TranscriptEntry {
        self.transcript.push(TranscriptEntry { origin, text });
        &self.transcript[self.transcript.len() - 1]
    }
}
