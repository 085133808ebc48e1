mod call;
mod channel;
mod config;
mod engine;
mod error;
mod media;
mod negotiation;
mod transport;

pub use call::*;
pub use channel::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use media::*;
pub use negotiation::*;
pub use transport::*;
