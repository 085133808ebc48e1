mod call_command;
mod call_event;
mod call_handle;
mod call_manager;
mod envelope;
mod room_prompt;
mod session;

pub use call_command::*;
pub use call_event::*;
pub use call_handle::*;
pub use call_manager::*;
pub(crate) use envelope::*;
pub use room_prompt::*;
