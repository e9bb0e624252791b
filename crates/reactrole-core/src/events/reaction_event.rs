//! Reaction and command events delivered by the chat gateway

use crate::value_objects::{Emote, MessageRef, Snowflake};

/// A single user adding or removing a reaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    /// Guild the message lives in (None for direct messages)
    pub guild_id: Option<Snowflake>,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub user_id: Snowflake,
    pub emote: Emote,
}

impl ReactionEvent {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef::new(self.channel_id, self.message_id)
    }
}

/// Every reaction of one emote stripped from a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionClearEvent {
    pub guild_id: Option<Snowflake>,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub emote: Emote,
}

/// A chat message that may carry a bot command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    pub guild_id: Option<Snowflake>,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub author_id: Snowflake,
    /// Role ids of the author's guild membership, when the platform sends them
    pub author_role_ids: Vec<Snowflake>,
    pub author_is_bot: bool,
    /// Message this one replies to
    pub referenced_message_id: Option<Snowflake>,
    pub content: String,
}

impl CommandMessage {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef::new(self.channel_id, self.message_id)
    }

    /// Address of the message being replied to
    pub fn target_ref(&self) -> Option<MessageRef> {
        self.referenced_message_id
            .map(|id| MessageRef::new(self.channel_id, id))
    }
}

/// All events the reconciliation engine handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionRoleEvent {
    ReactionAdded(ReactionEvent),
    ReactionRemoved(ReactionEvent),
    ReactionClearedForEmote(ReactionClearEvent),
    CommandMessage(CommandMessage),
}

impl ReactionRoleEvent {
    /// Event name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReactionAdded(_) => "reaction_added",
            Self::ReactionRemoved(_) => "reaction_removed",
            Self::ReactionClearedForEmote(_) => "reaction_cleared_for_emote",
            Self::CommandMessage(_) => "command_message",
        }
    }
}
