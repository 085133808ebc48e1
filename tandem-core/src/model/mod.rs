mod peer;
mod room;
mod session;
mod signaling;

pub use peer::PeerId;
pub use room::{RoomToken, TokenError};
pub use session::{Role, SessionId};
pub use signaling::{IceCandidate, IceServerConfig, SdpKind, SessionDescription, SignalEvent};
