//! Parser for bot commands in chat message content.

use crate::error::DomainError;
use crate::value_objects::{parse_role_token, Emote};

use super::types::BotCommand;

/// Parses a bot command from message content.
///
/// # Parsing Rules
///
/// - The content must start with `prefix` (leading whitespace is ignored)
/// - The command name follows the prefix directly and must match exactly
/// - Arguments are separated by any run of whitespace; extra trailing
///   arguments are ignored
///
/// Returns `Ok(None)` when the content is not a command this bot knows, and
/// a validation error when a known command has malformed arguments.
///
/// # Examples
///
/// ```
/// use reactrole_core::{parse_command, BotCommand, Emote, Snowflake};
///
/// let cmd = parse_command("?addReaction <:fire:111> <@&222>", "?").unwrap();
/// assert_eq!(
///     cmd,
///     Some(BotCommand::AddReaction {
///         emote: Emote::custom(Snowflake::new(111), "fire", false),
///         role_id: Snowflake::new(222),
///     })
/// );
/// assert_eq!(parse_command("hello there", "?").unwrap(), None);
/// assert!(parse_command("?addReaction 🔥 <@&222>", "?").is_err());
/// ```
pub fn parse_command(content: &str, prefix: &str) -> Result<Option<BotCommand>, DomainError> {
    let Some(rest) = content.trim_start().strip_prefix(prefix) else {
        return Ok(None);
    };

    let mut tokens = rest.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };

    match name {
        "addReaction" => {
            let emote = parse_emote(tokens.next())?;
            let role = tokens.next().ok_or(DomainError::MissingArgument("role"))?;
            let role_id =
                parse_role_token(role).map_err(|_| DomainError::InvalidRole(role.to_string()))?;
            Ok(Some(BotCommand::AddReaction { emote, role_id }))
        }
        "removeReaction" => {
            let emote = parse_emote(tokens.next())?;
            Ok(Some(BotCommand::RemoveReaction { emote }))
        }
        _ => Ok(None),
    }
}

fn parse_emote(token: Option<&str>) -> Result<Emote, DomainError> {
    let token = token.ok_or(DomainError::MissingArgument("emote"))?;
    Emote::parse_mention(token).map_err(|_| DomainError::NotCustomEmote(token.to_string()))
}
