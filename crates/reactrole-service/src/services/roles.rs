//! Role sync service
//!
//! Turns reaction add/remove events into role grants and revokes. Reads the
//! mapping cache only; never writes the store or the cache.

use reactrole_core::events::ReactionEvent;
use reactrole_core::Snowflake;
use tokio::time::Instant;
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::outcome::{IgnoreReason, Outcome};

/// Role sync service
pub struct RoleSyncService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoleSyncService<'a> {
    /// Create a new RoleSyncService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Grant the bound role to a user who reacted
    #[instrument(skip(self))]
    pub async fn reaction_added(&self, event: &ReactionEvent) -> ServiceResult<Outcome> {
        let started = Instant::now();
        let (guild_id, role_id) = match self.bound_role(event) {
            Ok(bound) => bound,
            Err(reason) => return Ok(Outcome::Ignored(reason)),
        };

        // The bot's own affordance reactions never earn it a role
        if self.ctx.is_self(event.user_id) {
            return Ok(Outcome::Ignored(IgnoreReason::OwnReaction));
        }

        let gateway = self.ctx.gateway();
        if gateway
            .user_has_role(guild_id, event.user_id, role_id)
            .await?
        {
            return Ok(Outcome::Ignored(IgnoreReason::AlreadyHasRole));
        }

        gateway.grant_role(guild_id, event.user_id, role_id).await?;

        info!(
            guild_id = %guild_id,
            user_id = %event.user_id,
            role_id = %role_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Role granted"
        );

        Ok(Outcome::RoleGranted { role_id })
    }

    /// Revoke the bound role from a user who took their reaction back
    ///
    /// When the removed reaction is the bot's own, it is put back instead.
    #[instrument(skip(self))]
    pub async fn reaction_removed(&self, event: &ReactionEvent) -> ServiceResult<Outcome> {
        let started = Instant::now();
        let (guild_id, role_id) = match self.bound_role(event) {
            Ok(bound) => bound,
            Err(reason) => return Ok(Outcome::Ignored(reason)),
        };

        let gateway = self.ctx.gateway();

        if self.ctx.is_self(event.user_id) {
            gateway
                .add_reaction(event.message_ref(), &event.emote)
                .await?;
            info!(
                message = %event.message_ref(),
                emote = %event.emote,
                "Own reaction was removed, added it back"
            );
            return Ok(Outcome::AffordanceRestored);
        }

        if !gateway
            .user_has_role(guild_id, event.user_id, role_id)
            .await?
        {
            return Ok(Outcome::Ignored(IgnoreReason::DoesNotHaveRole));
        }

        gateway.revoke_role(guild_id, event.user_id, role_id).await?;

        info!(
            guild_id = %guild_id,
            user_id = %event.user_id,
            role_id = %role_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Role revoked"
        );

        Ok(Outcome::RoleRevoked { role_id })
    }

    /// Guild and role an event's emote is bound to on its message
    fn bound_role(&self, event: &ReactionEvent) -> Result<(Snowflake, Snowflake), IgnoreReason> {
        let guild_id = event.guild_id.ok_or(IgnoreReason::NotInGuild)?;
        let tracked = self
            .ctx
            .cache()
            .find_by_message(guild_id, event.message_id)
            .ok_or(IgnoreReason::NotTracked)?;
        let role_id = tracked
            .role_for(&event.emote)
            .ok_or(IgnoreReason::EmoteNotBound)?;
        Ok((guild_id, role_id))
    }
}
