//! Gateway protocol definitions
//!
//! Op codes, message framing, payloads, intents, and close codes of the chat
//! platform's websocket gateway.

mod close_codes;
mod intents;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use intents::GatewayIntents;
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{HelloPayload, IdentifyPayload, IdentifyProperties, ResumePayload};
