//! Command service
//!
//! Handles `addReaction` and `removeReaction` sent as replies to the message
//! they act on.

use reactrole_core::entities::Binding;
use reactrole_core::events::CommandMessage;
use reactrole_core::value_objects::{Emote, MessageRef, Snowflake};
use reactrole_core::{parse_command, BotCommand, DomainError};
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::mapping::MappingService;
use super::outcome::{IgnoreReason, Outcome};

/// Command service
pub struct CommandService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommandService<'a> {
    /// Create a new CommandService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Run the command carried by a chat message, if any
    ///
    /// Bad input is answered with a reply and the command message is kept;
    /// a command that went through has its message deleted.
    #[instrument(skip(self, message), fields(message_id = %message.message_id, author_id = %message.author_id))]
    pub async fn handle(&self, message: &CommandMessage) -> ServiceResult<Outcome> {
        if message.author_is_bot {
            return Ok(Outcome::Ignored(IgnoreReason::BotAuthor));
        }

        let settings = self.ctx.settings();
        let parsed = parse_command(&message.content, &settings.command_prefix);
        if matches!(parsed, Ok(None)) {
            return Ok(Outcome::Ignored(IgnoreReason::NotACommand));
        }

        let Some(guild_id) = message.guild_id else {
            return Ok(Outcome::Ignored(IgnoreReason::NotInGuild));
        };

        // Unauthorized authors get no reply, even for malformed commands
        if !settings.allows(&message.author_role_ids) {
            warn!(guild_id = %guild_id, "Command from member without a command role ignored");
            return Ok(Outcome::Ignored(IgnoreReason::Unauthorized));
        }

        let command = match parsed {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Outcome::Ignored(IgnoreReason::NotACommand)),
            Err(e) => return self.reject(message, "command", e.into()).await,
        };

        let Some(target) = message.target_ref() else {
            return self
                .reject(message, command.name(), DomainError::NotAReply.into())
                .await;
        };

        let result = match &command {
            BotCommand::AddReaction { emote, role_id } => {
                self.add_reaction(guild_id, target, emote, *role_id).await
            }
            BotCommand::RemoveReaction { emote } => {
                self.remove_reaction(guild_id, target, emote).await
            }
        };

        match result {
            Ok(outcome) => {
                self.delete_command(message).await;
                Ok(outcome)
            }
            Err(e) if e.is_user_facing() => self.reject(message, command.name(), e).await,
            Err(e) => Err(e),
        }
    }

    async fn add_reaction(
        &self,
        guild_id: Snowflake,
        target: MessageRef,
        emote: &Emote,
        role_id: Snowflake,
    ) -> ServiceResult<Outcome> {
        let emote_id = emote
            .id
            .ok_or_else(|| DomainError::NotCustomEmote(emote.to_string()))?;
        let binding = Binding::new(emote_id, role_id);

        let (tracked, created) = MappingService::new(self.ctx)
            .bind(guild_id, target, binding)
            .await?;

        // The binding is stored either way; a missing affordance only costs looks
        if let Err(e) = self.ctx.gateway().add_reaction(target, emote).await {
            warn!(message = %target, emote = %emote, error = %e, "Failed to add bound reaction");
        }

        Ok(Outcome::Bound {
            tracked: tracked.id,
            created,
        })
    }

    async fn remove_reaction(
        &self,
        guild_id: Snowflake,
        target: MessageRef,
        emote: &Emote,
    ) -> ServiceResult<Outcome> {
        let bound = self
            .ctx
            .cache()
            .find_by_message(guild_id, target.message_id)
            .and_then(|tracked| tracked.role_for(emote));
        if bound.is_none() {
            return Err(ServiceError::validation(format!(
                "{emote} is not bound on that message"
            )));
        }

        // The resulting clear event unbinds through the normal path
        self.ctx
            .gateway()
            .remove_all_reactions_for_emote(target, emote)
            .await?;

        info!(message = %target, emote = %emote, "Requested reaction clear");
        Ok(Outcome::ClearRequested)
    }

    async fn reject(
        &self,
        message: &CommandMessage,
        command: &str,
        err: ServiceError,
    ) -> ServiceResult<Outcome> {
        let reason = match &err {
            ServiceError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        };
        info!(command, code = err.error_code(), %reason, "Command rejected");

        let reply = format!("Could not run `{command}`: {reason}");
        if let Err(e) = self.ctx.gateway().reply(message.message_ref(), &reply).await {
            warn!(error = %e, "Failed to send command error reply");
        }

        Ok(Outcome::Rejected(reason))
    }

    async fn delete_command(&self, message: &CommandMessage) {
        if let Err(e) = self.ctx.gateway().delete_message(message.message_ref()).await {
            warn!(message = %message.message_ref(), error = %e, "Failed to delete command message");
        }
    }
}
