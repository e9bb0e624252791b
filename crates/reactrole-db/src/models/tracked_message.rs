//! Tracked message and binding database models

use sqlx::FromRow;

/// Database model for guild_messages table
#[derive(Debug, Clone, FromRow)]
pub struct TrackedMessageModel {
    pub id: i64,
    pub message_id: i64,
    pub channel_id: i64,
    pub guild_id: i64,
}

/// Database model for message_reactions table
#[derive(Debug, Clone, FromRow)]
pub struct BindingModel {
    pub emote_id: i64,
    pub role_id: i64,
}
