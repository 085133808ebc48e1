mod coordinator;
mod input;
mod role;

pub use coordinator::*;
pub use input::*;
pub use role::*;
