use crate::call::{CallCommand, CallEvent, CallStatus, RoomPrompt};
use crate::error::CallError;
use tandem_core::SessionId;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Cloneable front end of a running [`CallManager`](crate::CallManager).
#[derive(Clone)]
pub struct CallHandle {
    command_tx: mpsc::Sender<CallCommand>,
    events: broadcast::Sender<CallEvent>,
}

impl CallHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<CallCommand>,
        events: broadcast::Sender<CallEvent>,
    ) -> Self {
        Self { command_tx, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CallEvent> {
        self.events.subscribe()
    }

    /// Acquires media, connects to the relay, asks `prompt` for a room and
    /// joins it.
    pub async fn start<P>(&self, prompt: P) -> Result<SessionId, CallError>
    where
        P: RoomPrompt + 'static,
    {
        let (reply, rx) = oneshot::channel();
        let cmd = CallCommand::Start {
            prompt: Box::new(prompt),
            reply,
        };
        self.request(cmd, rx)
            .await
            .unwrap_or(Err(CallError::NoActiveSession))
    }

    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), CallError> {
        let (reply, rx) = oneshot::channel();
        let cmd = CallCommand::SendText {
            text: text.into(),
            reply,
        };
        self.request(cmd, rx)
            .await
            .unwrap_or(Err(CallError::ChannelNotOpen))
    }

    /// Ends the live call, if any. Calling it again is a no-op.
    pub async fn hang_up(&self) {
        let (reply, rx) = oneshot::channel();
        let _ = self.request(CallCommand::HangUp { reply }, rx).await;
    }

    /// `None` once the manager has stopped.
    pub async fn status(&self) -> Option<CallStatus> {
        let (reply, rx) = oneshot::channel();
        self.request(CallCommand::Status { reply }, rx).await
    }

    pub async fn shutdown(&self) {
        let (reply, rx) = oneshot::channel();
        let _ = self.request(CallCommand::Shutdown { reply }, rx).await;
    }

    async fn request<T>(&self, cmd: CallCommand, rx: oneshot::Receiver<T>) -> Option<T> {
        self.command_tx.send(cmd).await.ok()?;
        rx.await.ok()
    }
}
