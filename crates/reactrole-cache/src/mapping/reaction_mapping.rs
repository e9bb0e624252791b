//! Reaction mapping cache.
//!
//! Holds every tracked message with its bindings, indexed by store id and by
//! `(guild, message)`. Both indexes live under one lock so they can never
//! disagree.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use reactrole_core::{InvariantViolation, Snowflake, TrackedMessage, TrackedMessageId};
use tracing::trace;

/// Shared handle to the cache
pub type SharedMappingCache = Arc<ReactionMappingCache>;

/// Result type for cache writes
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache write errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The message breaks a binding-set invariant and was not stored
    #[error("Refusing to cache tracked message: {0}")]
    InvariantViolation(#[from] InvariantViolation),

    /// Another store id already claims the same platform message
    #[error("Message {message_id} is already cached as tracked message {existing}")]
    MessageAlreadyTracked {
        message_id: Snowflake,
        existing: TrackedMessageId,
    },
}

impl CacheError {
    /// Tracked message the error concerns
    pub fn tracked(&self) -> TrackedMessageId {
        match self {
            Self::InvariantViolation(violation) => violation.tracked(),
            Self::MessageAlreadyTracked { existing, .. } => *existing,
        }
    }
}

type MessageKey = (Snowflake, Snowflake);

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<TrackedMessageId, TrackedMessage>,
    by_message: HashMap<MessageKey, TrackedMessageId>,
}

impl Inner {
    fn insert(&mut self, message: TrackedMessage) -> CacheResult<()> {
        message.validate()?;

        let key = (message.guild_id, message.message_id);
        if let Some(&existing) = self.by_message.get(&key) {
            if existing != message.id {
                return Err(CacheError::MessageAlreadyTracked {
                    message_id: message.message_id,
                    existing,
                });
            }
        }

        if let Some(previous) = self.by_id.get(&message.id) {
            let previous_key = (previous.guild_id, previous.message_id);
            if previous_key != key {
                self.by_message.remove(&previous_key);
            }
        }

        self.by_message.insert(key, message.id);
        self.by_id.insert(message.id, message);
        Ok(())
    }
}

/// In-memory projection of the role binding store
///
/// Every accessor returns an owned copy; a reader holding a snapshot is
/// unaffected by later writes. Writers are expected to be serialized by the
/// caller, which pairs each cache write with a store write.
#[derive(Debug, Default)]
pub struct ReactionMappingCache {
    inner: RwLock<Inner>,
}

impl ReactionMappingCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache behind an `Arc`
    #[must_use]
    pub fn shared() -> SharedMappingCache {
        Arc::new(Self::new())
    }

    /// Look up the tracked message for a platform message in a guild
    pub fn find_by_message(
        &self,
        guild_id: Snowflake,
        message_id: Snowflake,
    ) -> Option<TrackedMessage> {
        let inner = self.inner.read();
        inner
            .by_message
            .get(&(guild_id, message_id))
            .and_then(|id| inner.by_id.get(id))
            .cloned()
    }

    pub fn find_by_internal_id(&self, id: TrackedMessageId) -> Option<TrackedMessage> {
        self.inner.read().by_id.get(&id).cloned()
    }

    /// Insert or replace a tracked message by store id
    ///
    /// Messages with an empty or duplicated binding set are rejected and the
    /// cache is left as it was.
    pub fn upsert(&self, message: TrackedMessage) -> CacheResult<()> {
        let id = message.id;
        self.inner.write().insert(message)?;
        trace!(tracked = %id, "Cached tracked message");
        Ok(())
    }

    /// Remove a tracked message, returning it if it was cached
    pub fn remove(&self, id: TrackedMessageId) -> Option<TrackedMessage> {
        let mut inner = self.inner.write();
        let removed = inner.by_id.remove(&id)?;
        inner
            .by_message
            .remove(&(removed.guild_id, removed.message_id));
        trace!(tracked = %id, "Evicted tracked message");
        Some(removed)
    }

    /// Replace the whole content in one step
    ///
    /// Either every message is accepted or the cache keeps its old content.
    pub fn replace_all(&self, messages: Vec<TrackedMessage>) -> CacheResult<()> {
        let mut next = Inner::default();
        for message in messages {
            next.insert(message)?;
        }
        *self.inner.write() = next;
        Ok(())
    }

    /// Snapshot of every tracked message, ordered by store id
    pub fn all(&self) -> Vec<TrackedMessage> {
        let mut messages: Vec<TrackedMessage> =
            self.inner.read().by_id.values().cloned().collect();
        messages.sort_by_key(|m| m.id);
        messages
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().by_id.is_empty()
    }
}
