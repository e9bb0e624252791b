//! Reconciliation engine
//!
//! Entry point for the gateway: loads the mapping at startup, routes each
//! event to the service that owns it, and applies the error policy (store
//! failures are errors, platform failures drop the event).

use reactrole_core::events::{ReactionClearEvent, ReactionRoleEvent};
use reactrole_core::Snowflake;
use tracing::{debug, error, info, instrument, warn};

use super::command::CommandService;
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::mapping::{LoadReport, MappingService};
use super::outcome::{IgnoreReason, Outcome};
use super::roles::RoleSyncService;

/// Summary of re-adding the bot's reactions to tracked messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub messages: usize,
    pub attempted: usize,
    pub failed: usize,
}

/// Reconciliation engine
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    ctx: ServiceContext,
}

impl ReconciliationEngine {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Fill the cache from the store
    ///
    /// Must succeed before any event is handled.
    pub async fn load_cache(&self) -> ServiceResult<LoadReport> {
        MappingService::new(&self.ctx).load_all().await
    }

    /// Record the bot's own user id (from READY)
    pub fn set_self_id(&self, id: Snowflake) {
        if self.ctx.self_id() != Some(id) {
            info!(self_id = %id, "Bot identity recorded");
        }
        self.ctx.set_self_id(id);
    }

    /// Put the bot's reaction for every bound emote back on its message
    ///
    /// Failures are logged per reaction and do not stop the sweep.
    #[instrument(skip(self))]
    pub async fn restore_affordances(&self) -> RestoreReport {
        let mut report = RestoreReport::default();

        for tracked in self.ctx.cache().all() {
            report.messages += 1;
            for binding in tracked.bindings() {
                report.attempted += 1;
                let emote = binding.emote();
                if let Err(e) = self
                    .ctx
                    .gateway()
                    .add_reaction(tracked.message_ref(), &emote)
                    .await
                {
                    report.failed += 1;
                    warn!(
                        tracked = %tracked.id,
                        emote_id = %binding.emote_id,
                        error = %e,
                        "Failed to restore reaction"
                    );
                }
            }
        }

        info!(
            messages = report.messages,
            reactions = report.attempted,
            failed = report.failed,
            "Reactions restored"
        );
        report
    }

    /// Handle one gateway event
    ///
    /// Errors are logged here before being returned; callers only need the
    /// result for bookkeeping.
    #[instrument(skip(self, event), fields(kind = event.kind()))]
    pub async fn handle_event(&self, event: ReactionRoleEvent) -> ServiceResult<Outcome> {
        let result = match &event {
            ReactionRoleEvent::ReactionAdded(e) => RoleSyncService::new(&self.ctx).reaction_added(e).await,
            ReactionRoleEvent::ReactionRemoved(e) => {
                RoleSyncService::new(&self.ctx).reaction_removed(e).await
            }
            ReactionRoleEvent::ReactionClearedForEmote(e) => self.reaction_cleared(e).await,
            ReactionRoleEvent::CommandMessage(m) => CommandService::new(&self.ctx).handle(m).await,
        };

        match &result {
            Ok(outcome) => debug!(?outcome, "Event handled"),
            Err(e) if e.is_platform() => {
                warn!(code = e.error_code(), error = %e, "Platform call failed, event dropped");
            }
            Err(e) if e.is_store() => {
                error!(code = e.error_code(), error = %e, "Store operation failed, event aborted");
            }
            Err(e) => error!(code = e.error_code(), error = %e, "Event handling failed"),
        }

        result
    }

    async fn reaction_cleared(&self, event: &ReactionClearEvent) -> ServiceResult<Outcome> {
        let Some(emote_id) = event.emote.id else {
            // Unicode emoji are never bound
            return Ok(Outcome::Ignored(IgnoreReason::EmoteNotBound));
        };

        MappingService::new(&self.ctx)
            .unbind(event.guild_id, event.message_id, emote_id)
            .await
    }
}
