//! Event payload definitions
//!
//! Wire shapes of the dispatch events the bot consumes, and their conversion
//! into the engine's platform-neutral events.

use reactrole_core::events::{CommandMessage, ReactionClearEvent, ReactionEvent};
use reactrole_core::{Emote, Snowflake};
use serde::{Deserialize, Serialize};

// === Connection Events ===

/// READY event payload
///
/// Sent after successful Identify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyEvent {
    /// Gateway protocol version
    pub v: u8,

    /// The bot's own user
    pub user: UserPayload,

    /// Guilds the bot is in (initially unavailable)
    #[serde(default)]
    pub guilds: Vec<UnavailableGuild>,

    /// Session ID for resuming
    pub session_id: String,

    /// Gateway URL for resuming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_gateway_url: Option<String>,
}

/// Unavailable guild in READY event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailableGuild {
    pub id: Snowflake,
    #[serde(default)]
    pub unavailable: bool,
}

// === User Payloads ===

/// User data included in events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    pub id: Snowflake,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

/// Guild member data; only the role set matters here
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberPayload {
    #[serde(default)]
    pub roles: Vec<Snowflake>,
}

// === Message Events ===

/// Reference to the message a reply answers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReferencePayload {
    #[serde(default)]
    pub message_id: Option<Snowflake>,
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

/// MESSAGE_CREATE event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreateEvent {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub author: UserPayload,
    /// Partial member of the author, present for guild messages
    #[serde(default)]
    pub member: Option<MemberPayload>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub message_reference: Option<MessageReferencePayload>,
}

impl From<MessageCreateEvent> for CommandMessage {
    fn from(event: MessageCreateEvent) -> Self {
        Self {
            guild_id: event.guild_id,
            channel_id: event.channel_id,
            message_id: event.id,
            author_id: event.author.id,
            author_role_ids: event.member.map(|m| m.roles).unwrap_or_default(),
            author_is_bot: event.author.bot,
            referenced_message_id: event.message_reference.and_then(|r| r.message_id),
            content: event.content,
        }
    }
}

// === Reaction Events ===

/// MESSAGE_REACTION_ADD and MESSAGE_REACTION_REMOVE event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionPayload {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub emoji: Emote,
}

impl From<ReactionPayload> for ReactionEvent {
    fn from(payload: ReactionPayload) -> Self {
        Self {
            guild_id: payload.guild_id,
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            user_id: payload.user_id,
            emote: payload.emoji,
        }
    }
}

/// MESSAGE_REACTION_REMOVE_EMOJI event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRemoveEmojiPayload {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub emoji: Emote,
}

impl From<ReactionRemoveEmojiPayload> for ReactionClearEvent {
    fn from(payload: ReactionRemoveEmojiPayload) -> Self {
        Self {
            guild_id: payload.guild_id,
            channel_id: payload.channel_id,
            message_id: payload.message_id,
            emote: payload.emoji,
        }
    }
}
