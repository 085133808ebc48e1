pub use tandem_core::model::{PeerId, RoomToken, SessionId};

pub mod model {
    pub use tandem_core::model::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use tandem_client::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use tandem_server::*;
}
