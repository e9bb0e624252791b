//! Mapping service
//!
//! Owns every mutation of the binding mapping. Each mutation writes the store
//! first and the cache second while holding the context's write lock, so a
//! failed store write leaves the cache untouched and no reader ever sees a
//! half-applied binding set. Mutations run in their own task and finish even
//! when the caller stops waiting.

use std::collections::HashSet;
use std::future::Future;

use reactrole_cache::CacheError;
use reactrole_core::entities::{Binding, BindingRemoval, TrackedMessage, TrackedMessageHeader};
use reactrole_core::value_objects::{MessageRef, Snowflake, TrackedMessageId};
use tracing::{error, info, instrument, warn, Instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::outcome::{IgnoreReason, Outcome};

/// Summary of a full store-to-cache load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Tracked messages now in the cache
    pub loaded: usize,
    /// Bindings across those messages
    pub bindings: usize,
    /// Tracked messages without bindings, deleted from the store
    pub discarded_empty: usize,
    /// Stored bindings dropped because their emote was already bound
    pub duplicate_bindings: usize,
}

/// Mapping service
pub struct MappingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MappingService<'a> {
    /// Create a new MappingService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Replace the cache with the store's content
    ///
    /// Any store error aborts the load and leaves the cache as it was.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> ServiceResult<LoadReport> {
        let _guard = self.ctx.lock_writes().await;
        let store = self.ctx.store();

        let headers = store.list_tracked_messages().await?;
        let mut report = LoadReport::default();
        let mut messages = Vec::with_capacity(headers.len());

        for header in headers {
            let bindings = store.list_bindings(header.id).await?;
            let (assembled, duplicates) = assemble(header, bindings);
            report.duplicate_bindings += duplicates;

            match assembled {
                Some(message) => {
                    report.bindings += message.bindings().len();
                    messages.push(message);
                }
                None => {
                    warn!(
                        tracked = %header.id,
                        message_id = %header.message_id,
                        "Tracked message has no bindings, deleting it"
                    );
                    store.delete_tracked_message(header.id).await?;
                    report.discarded_empty += 1;
                }
            }
        }

        report.loaded = messages.len();
        self.ctx.cache().replace_all(messages)?;

        info!(
            loaded = report.loaded,
            bindings = report.bindings,
            discarded_empty = report.discarded_empty,
            duplicate_bindings = report.duplicate_bindings,
            "Reaction mapping loaded"
        );

        Ok(report)
    }

    /// Bind an emote to a role on a message, tracking the message if needed
    ///
    /// Returns the updated tracked message and whether it was newly tracked.
    #[instrument(skip(self))]
    pub async fn bind(
        &self,
        guild_id: Snowflake,
        target: MessageRef,
        binding: Binding,
    ) -> ServiceResult<(TrackedMessage, bool)> {
        let ctx = self.ctx.clone();
        run_to_completion(async move {
            MappingService::new(&ctx)
                .bind_locked(guild_id, target, binding)
                .await
        })
        .await
    }

    async fn bind_locked(
        &self,
        guild_id: Snowflake,
        target: MessageRef,
        binding: Binding,
    ) -> ServiceResult<(TrackedMessage, bool)> {
        let _guard = self.ctx.lock_writes().await;
        let store = self.ctx.store();

        let current = match self.ctx.cache().find_by_message(guild_id, target.message_id) {
            Some(message) => Some(message),
            None => self.recover_untracked(target.message_id).await?,
        };

        let Some(current) = current else {
            let id = store
                .create_tracked_message(target.message_id, target.channel_id, guild_id)
                .await?;

            if let Err(e) = store.add_binding(id, &binding).await {
                // Never leave a tracked message without bindings behind
                if let Err(cleanup) = store.delete_tracked_message(id).await {
                    error!(tracked = %id, error = %cleanup, "Failed to drop unbound tracked message");
                }
                return Err(e.into());
            }

            let header = TrackedMessageHeader {
                id,
                message_id: target.message_id,
                channel_id: target.channel_id,
                guild_id,
            };
            let message = self.install(TrackedMessage::new(header, binding)).await?;

            info!(
                tracked = %id,
                message_id = %target.message_id,
                emote_id = %binding.emote_id,
                role_id = %binding.role_id,
                "Message tracked with first binding"
            );
            return Ok((message, true));
        };

        // Cache-side rejection before touching the store
        let next = current.with_binding(binding)?;

        if let Err(e) = store.add_binding(current.id, &binding).await {
            if e.is_conflict() || e.is_not_found() {
                error!(
                    tracked = %current.id,
                    error = %e,
                    "Store disagrees with cache, reloading tracked message"
                );
                self.reload_locked(target.message_id, current.id).await?;
            }
            return Err(e.into());
        }

        let message = self.install(next).await?;

        info!(
            tracked = %current.id,
            emote_id = %binding.emote_id,
            role_id = %binding.role_id,
            bindings = message.bindings().len(),
            "Binding added"
        );
        Ok((message, false))
    }

    /// Drop the binding for an emote after its reactions were cleared
    ///
    /// Removing the last binding stops tracking the message.
    #[instrument(skip(self))]
    pub async fn unbind(
        &self,
        guild_id: Option<Snowflake>,
        message_id: Snowflake,
        emote_id: Snowflake,
    ) -> ServiceResult<Outcome> {
        let Some(guild_id) = guild_id else {
            return Ok(Outcome::Ignored(IgnoreReason::NotInGuild));
        };

        let ctx = self.ctx.clone();
        run_to_completion(async move {
            MappingService::new(&ctx)
                .unbind_locked(guild_id, message_id, emote_id)
                .await
        })
        .await
    }

    async fn unbind_locked(
        &self,
        guild_id: Snowflake,
        message_id: Snowflake,
        emote_id: Snowflake,
    ) -> ServiceResult<Outcome> {
        let _guard = self.ctx.lock_writes().await;
        let store = self.ctx.store();

        let current = match self.ctx.cache().find_by_message(guild_id, message_id) {
            Some(message) => Some(message),
            None => self.recover_untracked(message_id).await?,
        };
        let Some(current) = current else {
            return Ok(Outcome::Ignored(IgnoreReason::NotTracked));
        };

        match current.without_binding(emote_id) {
            BindingRemoval::NotBound => Ok(Outcome::Ignored(IgnoreReason::EmoteNotBound)),
            BindingRemoval::Remaining(next) => {
                if !store.remove_binding(current.id, emote_id).await? {
                    warn!(tracked = %current.id, emote_id = %emote_id, "Binding was already gone from store");
                }
                let message = self.install(next).await?;

                info!(
                    tracked = %current.id,
                    emote_id = %emote_id,
                    remaining = message.bindings().len(),
                    "Binding removed"
                );
                Ok(Outcome::Unbound {
                    tracked: current.id,
                    exhausted: false,
                })
            }
            BindingRemoval::Exhausted => {
                // One store call; the bindings go with the message
                store.delete_tracked_message(current.id).await?;
                self.ctx.cache().remove(current.id);

                info!(
                    tracked = %current.id,
                    message_id = %message_id,
                    "Last binding removed, message no longer tracked"
                );
                Ok(Outcome::Unbound {
                    tracked: current.id,
                    exhausted: true,
                })
            }
        }
    }

    /// Cache miss: if the store still tracks the message, the two diverged
    async fn recover_untracked(
        &self,
        message_id: Snowflake,
    ) -> ServiceResult<Option<TrackedMessage>> {
        let Some(id) = self
            .ctx
            .store()
            .find_internal_id_by_message_id(message_id)
            .await?
        else {
            return Ok(None);
        };

        error!(
            tracked = %id,
            message_id = %message_id,
            "Message tracked in store but missing from cache, reloading"
        );
        self.reload_by_id(id).await
    }

    async fn reload_locked(
        &self,
        message_id: Snowflake,
        stale: TrackedMessageId,
    ) -> ServiceResult<Option<TrackedMessage>> {
        let found = self
            .ctx
            .store()
            .find_internal_id_by_message_id(message_id)
            .await?;

        if found != Some(stale) {
            self.ctx.cache().remove(stale);
        }

        match found {
            Some(id) => self.reload_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn reload_by_id(&self, id: TrackedMessageId) -> ServiceResult<Option<TrackedMessage>> {
        let store = self.ctx.store();

        let header = store
            .list_tracked_messages()
            .await?
            .into_iter()
            .find(|header| header.id == id);
        let Some(header) = header else {
            self.ctx.cache().remove(id);
            return Ok(None);
        };

        let bindings = store.list_bindings(id).await?;
        match assemble(header, bindings).0 {
            Some(message) => {
                self.replace_cached(message.clone())?;
                Ok(Some(message))
            }
            None => {
                warn!(tracked = %id, "Reloaded tracked message has no bindings, deleting it");
                store.delete_tracked_message(id).await?;
                self.ctx.cache().remove(id);
                Ok(None)
            }
        }
    }

    /// Put a freshly computed message in the cache, reloading on rejection
    async fn install(&self, message: TrackedMessage) -> ServiceResult<TrackedMessage> {
        match self.ctx.cache().upsert(message.clone()) {
            Ok(()) => Ok(message),
            Err(e) => {
                error!(
                    tracked = %e.tracked(),
                    error = %e,
                    "Cache rejected tracked message, reloading from store"
                );
                self.reload_by_id(message.id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Tracked message", message.id.to_string()))
            }
        }
    }

    /// Store content wins over whatever the cache holds for the same message
    fn replace_cached(&self, message: TrackedMessage) -> ServiceResult<()> {
        let cache = self.ctx.cache();
        match cache.upsert(message.clone()) {
            Err(CacheError::MessageAlreadyTracked { existing, .. }) => {
                warn!(stale = %existing, tracked = %message.id, "Evicting stale cache entry");
                cache.remove(existing);
                cache.upsert(message)?;
                Ok(())
            }
            other => other.map_err(ServiceError::from),
        }
    }
}

/// Run a mapping mutation in its own task
///
/// Dropping the returned future (an event timeout) does not cancel the
/// mutation, so a committed store write always reaches the cache.
async fn run_to_completion<T, F>(mutation: F) -> ServiceResult<T>
where
    T: Send + 'static,
    F: Future<Output = ServiceResult<T>> + Send + 'static,
{
    tokio::spawn(mutation.in_current_span())
        .await
        .map_err(|e| ServiceError::internal(format!("mapping task failed: {e}")))?
}

/// Build a tracked message from stored rows
///
/// Keeps the first binding of each emote; returns `None` when nothing is
/// bound, plus the number of duplicates dropped.
fn assemble(header: TrackedMessageHeader, bindings: Vec<Binding>) -> (Option<TrackedMessage>, usize) {
    let mut seen = HashSet::with_capacity(bindings.len());
    let mut kept = Vec::with_capacity(bindings.len());
    let mut duplicates = 0;

    for binding in bindings {
        if seen.insert(binding.emote_id) {
            kept.push(binding);
        } else {
            duplicates += 1;
            error!(
                tracked = %header.id,
                emote_id = %binding.emote_id,
                role_id = %binding.role_id,
                "Emote bound twice in store, keeping the first binding"
            );
        }
    }

    match TrackedMessage::from_parts(header, kept) {
        Ok(message) => (Some(message), duplicates),
        Err(_) => (None, duplicates),
    }
}
