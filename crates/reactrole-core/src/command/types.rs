//! Command type definitions

use crate::value_objects::{Emote, Snowflake};

/// A parsed bot command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `addReaction <emote> <role>` - bind a custom emote to a role on the replied-to message
    AddReaction { emote: Emote, role_id: Snowflake },

    /// `removeReaction <emote>` - clear every reaction of the emote, which unbinds it
    RemoveReaction { emote: Emote },
}

impl BotCommand {
    /// Returns the command name as typed after the prefix
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddReaction { .. } => "addReaction",
            Self::RemoveReaction { .. } => "removeReaction",
        }
    }
}
