use crate::call::{CallStatus, RoomPrompt};
use crate::error::CallError;
use tandem_core::SessionId;
use tokio::sync::oneshot;

/// Requests from the user-facing [`CallHandle`](crate::CallHandle) to the
/// call manager's event loop.
pub enum CallCommand {
    Start {
        prompt: Box<dyn RoomPrompt>,
        reply: oneshot::Sender<Result<SessionId, CallError>>,
    },
    SendText {
        text: String,
        reply: oneshot::Sender<Result<(), CallError>>,
    },
    HangUp {
        reply: oneshot::Sender<()>,
    },
    Status {
        reply: oneshot::Sender<CallStatus>,
    },
    /// Tear down any live call and stop the event loop.
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}
