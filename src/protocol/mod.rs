//! Command protocol
//!
//! One JSON object per line in each direction: a command from the controller,
//! a response from the board.

pub mod command;
pub mod response;

pub use command::{Command, CommandMessage, Target};
pub use response::{ErrorKind, Response, ResponseStatus};
