//! Gateway events
//!
//! Dispatch events the bot consumes, decoded from their wire payloads.

mod decode;
mod event_types;
mod payloads;

pub use decode::DispatchEvent;
pub use event_types::GatewayEventType;
pub use payloads::{
    MemberPayload, MessageCreateEvent, MessageReferencePayload, ReactionPayload,
    ReactionRemoveEmojiPayload, ReadyEvent, UnavailableGuild, UserPayload,
};
