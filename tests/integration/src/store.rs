//! In-memory role binding store
//!
//! Behaves like the PostgreSQL repository (unique emote per message,
//! cascading delete) and can be told to fail specific operations or to stall
//! after committing a write.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reactrole_core::traits::{RepoResult, RoleBindingRepository};
use reactrole_core::{Binding, DomainError, Snowflake, TrackedMessageHeader, TrackedMessageId};

/// Store operations, for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListTrackedMessages,
    ListBindings,
    CreateTrackedMessage,
    AddBinding,
    RemoveBinding,
    DeleteTrackedMessage,
    FindInternalId,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    messages: BTreeMap<TrackedMessageId, TrackedMessageHeader>,
    bindings: BTreeMap<TrackedMessageId, Vec<Binding>>,
}

#[derive(Debug, Default)]
struct Failures {
    all: bool,
    once: HashSet<StoreOp>,
}

/// Role binding store kept in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    failures: Mutex<Failures>,
    commit_delay: Mutex<Option<Duration>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail with a database error
    pub fn fail_next(&self, op: StoreOp) {
        self.failures.lock().once.insert(op);
    }

    /// Make every call fail until switched off
    pub fn fail_all(&self, enabled: bool) {
        self.failures.lock().all = enabled;
    }

    /// Hold every write for `delay` after it has been applied
    pub fn set_commit_delay(&self, delay: Option<Duration>) {
        *self.commit_delay.lock() = delay;
    }

    async fn after_commit(&self) {
        let delay = *self.commit_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check(&self, op: StoreOp) -> RepoResult<()> {
        let mut failures = self.failures.lock();
        if failures.all || failures.once.remove(&op) {
            return Err(DomainError::DatabaseError(format!("injected failure in {op:?}")));
        }
        Ok(())
    }

    /// Put a tracked message straight into the store, bypassing failure injection
    ///
    /// Bindings are stored as given, duplicates included.
    pub fn seed(
        &self,
        message_id: Snowflake,
        channel_id: Snowflake,
        guild_id: Snowflake,
        bindings: &[Binding],
    ) -> TrackedMessageId {
        let mut state = self.state.lock();
        let id = next_id(&mut state);
        state.messages.insert(
            id,
            TrackedMessageHeader {
                id,
                message_id,
                channel_id,
                guild_id,
            },
        );
        state.bindings.insert(id, bindings.to_vec());
        id
    }

    /// Drop a tracked message behind the engine's back
    pub fn forget(&self, id: TrackedMessageId) {
        let mut state = self.state.lock();
        state.messages.remove(&id);
        state.bindings.remove(&id);
    }

    pub fn tracked_count(&self) -> usize {
        self.state.lock().messages.len()
    }

    /// Stored header and bindings for a platform message
    pub fn find_by_message(&self, message_id: Snowflake) -> Option<(TrackedMessageHeader, Vec<Binding>)> {
        let state = self.state.lock();
        let header = state
            .messages
            .values()
            .find(|h| h.message_id == message_id)
            .copied()?;
        let bindings = state.bindings.get(&header.id).cloned().unwrap_or_default();
        Some((header, bindings))
    }

    pub fn bindings_of(&self, id: TrackedMessageId) -> Vec<Binding> {
        self.state.lock().bindings.get(&id).cloned().unwrap_or_default()
    }
}

fn next_id(state: &mut State) -> TrackedMessageId {
    state.next_id += 1;
    TrackedMessageId::new(state.next_id)
}

#[async_trait]
impl RoleBindingRepository for InMemoryStore {
    async fn list_tracked_messages(&self) -> RepoResult<Vec<TrackedMessageHeader>> {
        self.check(StoreOp::ListTrackedMessages)?;
        Ok(self.state.lock().messages.values().copied().collect())
    }

    async fn list_bindings(&self, id: TrackedMessageId) -> RepoResult<Vec<Binding>> {
        self.check(StoreOp::ListBindings)?;
        Ok(self.bindings_of(id))
    }

    async fn create_tracked_message(
        &self,
        message_id: Snowflake,
        channel_id: Snowflake,
        guild_id: Snowflake,
    ) -> RepoResult<TrackedMessageId> {
        self.check(StoreOp::CreateTrackedMessage)?;
        let id = {
            let mut state = self.state.lock();
            if state.messages.values().any(|h| h.message_id == message_id) {
                return Err(DomainError::DatabaseError(format!(
                    "duplicate key: message {message_id} already tracked"
                )));
            }

            let id = next_id(&mut state);
            state.messages.insert(
                id,
                TrackedMessageHeader {
                    id,
                    message_id,
                    channel_id,
                    guild_id,
                },
            );
            state.bindings.insert(id, Vec::new());
            id
        };

        self.after_commit().await;
        Ok(id)
    }

    async fn add_binding(&self, id: TrackedMessageId, binding: &Binding) -> RepoResult<()> {
        self.check(StoreOp::AddBinding)?;
        {
            let mut state = self.state.lock();
            if !state.messages.contains_key(&id) {
                return Err(DomainError::TrackedMessageNotFound(id));
            }

            let bindings = state.bindings.entry(id).or_default();
            if bindings.iter().any(|b| b.emote_id == binding.emote_id) {
                return Err(DomainError::BindingAlreadyExists {
                    tracked: id,
                    emote_id: binding.emote_id,
                });
            }
            bindings.push(*binding);
        }

        self.after_commit().await;
        Ok(())
    }

    async fn remove_binding(&self, id: TrackedMessageId, emote_id: Snowflake) -> RepoResult<bool> {
        self.check(StoreOp::RemoveBinding)?;
        let removed = {
            let mut state = self.state.lock();
            let Some(bindings) = state.bindings.get_mut(&id) else {
                return Ok(false);
            };
            let before = bindings.len();
            bindings.retain(|b| b.emote_id != emote_id);
            bindings.len() < before
        };

        self.after_commit().await;
        Ok(removed)
    }

    async fn delete_tracked_message(&self, id: TrackedMessageId) -> RepoResult<()> {
        self.check(StoreOp::DeleteTrackedMessage)?;
        {
            let mut state = self.state.lock();
            state.messages.remove(&id);
            state.bindings.remove(&id);
        }

        self.after_commit().await;
        Ok(())
    }

    async fn find_internal_id_by_message_id(
        &self,
        message_id: Snowflake,
    ) -> RepoResult<Option<TrackedMessageId>> {
        self.check(StoreOp::FindInternalId)?;
        Ok(self
            .state
            .lock()
            .messages
            .values()
            .find(|h| h.message_id == message_id)
            .map(|h| h.id))
    }
}
