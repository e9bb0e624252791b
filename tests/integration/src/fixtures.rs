//! Test fixtures and event builders
//!
//! Provides reusable ids and events for integration tests.

use std::sync::atomic::{AtomicI64, Ordering};

use reactrole_core::{
    Binding, CommandMessage, Emote, ReactionClearEvent, ReactionEvent, ReactionRoleEvent, Snowflake,
};

pub const GUILD: Snowflake = Snowflake::new(10);
pub const CHANNEL: Snowflake = Snowflake::new(50);
pub const MESSAGE: Snowflake = Snowflake::new(1000);
pub const OTHER_MESSAGE: Snowflake = Snowflake::new(2000);
pub const FIRE: Snowflake = Snowflake::new(111);
pub const WATER: Snowflake = Snowflake::new(112);
pub const ROLE: Snowflake = Snowflake::new(222);
pub const OTHER_ROLE: Snowflake = Snowflake::new(333);
pub const USER: Snowflake = Snowflake::new(7001);
pub const BOT: Snowflake = Snowflake::new(42);
pub const MODERATOR_ROLE: Snowflake = Snowflake::new(9000);

/// Counter for unique command message ids
static COUNTER: AtomicI64 = AtomicI64::new(500_000);

/// Get a unique snowflake for messages the test does not care about
pub fn unique_id() -> Snowflake {
    Snowflake::new(COUNTER.fetch_add(1, Ordering::SeqCst))
}

pub fn fire() -> Emote {
    Emote::custom(FIRE, "fire", false)
}

pub fn water() -> Emote {
    Emote::custom(WATER, "water", false)
}

pub fn binding(emote_id: Snowflake, role_id: Snowflake) -> Binding {
    Binding::new(emote_id, role_id)
}

fn reaction(message_id: Snowflake, user_id: Snowflake, emote: Emote) -> ReactionEvent {
    ReactionEvent {
        guild_id: Some(GUILD),
        channel_id: CHANNEL,
        message_id,
        user_id,
        emote,
    }
}

pub fn reaction_added(message_id: Snowflake, user_id: Snowflake, emote: Emote) -> ReactionRoleEvent {
    ReactionRoleEvent::ReactionAdded(reaction(message_id, user_id, emote))
}

pub fn reaction_removed(message_id: Snowflake, user_id: Snowflake, emote: Emote) -> ReactionRoleEvent {
    ReactionRoleEvent::ReactionRemoved(reaction(message_id, user_id, emote))
}

pub fn cleared(message_id: Snowflake, emote: Emote) -> ReactionRoleEvent {
    ReactionRoleEvent::ReactionClearedForEmote(ReactionClearEvent {
        guild_id: Some(GUILD),
        channel_id: CHANNEL,
        message_id,
        emote,
    })
}

/// A chat message from an ordinary member, optionally replying to `reply_to`
pub fn command_message(content: &str, reply_to: Option<Snowflake>) -> CommandMessage {
    CommandMessage {
        guild_id: Some(GUILD),
        channel_id: CHANNEL,
        message_id: unique_id(),
        author_id: USER,
        author_role_ids: Vec::new(),
        author_is_bot: false,
        referenced_message_id: reply_to,
        content: content.to_string(),
    }
}

pub fn command(content: &str, reply_to: Option<Snowflake>) -> ReactionRoleEvent {
    ReactionRoleEvent::CommandMessage(command_message(content, reply_to))
}

/// `?addReaction` replying to `target`
pub fn add_reaction_command(target: Snowflake, emote: &Emote, role_id: Snowflake) -> ReactionRoleEvent {
    command(&format!("?addReaction {emote} <@&{role_id}>"), Some(target))
}

/// `?removeReaction` replying to `target`
pub fn remove_reaction_command(target: Snowflake, emote: &Emote) -> ReactionRoleEvent {
    command(&format!("?removeReaction {emote}"), Some(target))
}
