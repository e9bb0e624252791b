//! Bot commands issued as chat replies
//!
//! Commands are plain chat messages that start with the configured prefix and
//! reply to the message they act on.

mod parser;
mod types;

pub use parser::parse_command;
pub use types::BotCommand;
