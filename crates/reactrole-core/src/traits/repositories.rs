//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Each operation is a unit on its own; callers
//! never rely on a transaction spanning several of them.

use async_trait::async_trait;

use crate::entities::{Binding, TrackedMessageHeader};
use crate::error::DomainError;
use crate::value_objects::{Snowflake, TrackedMessageId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Role Binding Repository
// ============================================================================

#[async_trait]
pub trait RoleBindingRepository: Send + Sync {
    /// List every tracked message (without bindings)
    async fn list_tracked_messages(&self) -> RepoResult<Vec<TrackedMessageHeader>>;

    /// List the bindings of one tracked message
    async fn list_bindings(&self, id: TrackedMessageId) -> RepoResult<Vec<Binding>>;

    /// Start tracking a message; returns the store-assigned id
    async fn create_tracked_message(
        &self,
        message_id: Snowflake,
        channel_id: Snowflake,
        guild_id: Snowflake,
    ) -> RepoResult<TrackedMessageId>;

    /// Add a binding; fails with `BindingAlreadyExists` if the emote is already bound
    async fn add_binding(&self, id: TrackedMessageId, binding: &Binding) -> RepoResult<()>;

    /// Remove the binding for an emote; returns whether a row was removed
    async fn remove_binding(&self, id: TrackedMessageId, emote_id: Snowflake) -> RepoResult<bool>;

    /// Stop tracking a message, removing any bindings left
    async fn delete_tracked_message(&self, id: TrackedMessageId) -> RepoResult<()>;

    /// Find the store id of a tracked platform message
    async fn find_internal_id_by_message_id(
        &self,
        message_id: Snowflake,
    ) -> RepoResult<Option<TrackedMessageId>>;
}
