//! Chat gateway port - the platform operations the engine invokes

use async_trait::async_trait;

use crate::error::DomainError;
use crate::value_objects::{Emote, MessageRef, Snowflake};

/// Result type for platform calls (errors are `DomainError::PlatformError`)
pub type PlatformResult<T> = Result<T, DomainError>;

#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Give a member a role
    async fn grant_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<()>;

    /// Take a role away from a member
    async fn revoke_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<()>;

    /// Check a member's current role set
    async fn user_has_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<bool>;

    /// React to a message as the bot
    async fn add_reaction(&self, message: MessageRef, emote: &Emote) -> PlatformResult<()>;

    /// Strip every reaction of one emote from a message
    async fn remove_all_reactions_for_emote(
        &self,
        message: MessageRef,
        emote: &Emote,
    ) -> PlatformResult<()>;

    async fn delete_message(&self, message: MessageRef) -> PlatformResult<()>;

    /// Post a reply to a message in its channel
    async fn reply(&self, message: MessageRef, content: &str) -> PlatformResult<()>;
}
