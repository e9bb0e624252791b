//! # reactrole-core
//!
//! Domain layer for the reaction-role synchronizer: tracked messages and their
//! emote→role bindings, bot command parsing, reconciliation events, and the
//! ports (store and chat gateway) the engine depends on.
//! This crate has zero dependencies on infrastructure (database, HTTP, websockets).

pub mod command;
pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use command::{parse_command, BotCommand};
pub use entities::{Binding, BindingRemoval, TrackedMessage, TrackedMessageHeader};
pub use error::{DomainError, InvariantViolation};
pub use events::{CommandMessage, ReactionClearEvent, ReactionEvent, ReactionRoleEvent};
pub use traits::{GatewayClient, PlatformResult, RepoResult, RoleBindingRepository};
pub use value_objects::{
    Emote, EmoteParseError, MessageRef, Snowflake, SnowflakeParseError, TrackedMessageId,
};
