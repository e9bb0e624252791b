//! What handling an event amounted to

use std::fmt;

use reactrole_core::{Snowflake, TrackedMessageId};

/// Why an event needed no action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotInGuild,
    NotTracked,
    EmoteNotBound,
    AlreadyHasRole,
    DoesNotHaveRole,
    OwnReaction,
    BotAuthor,
    NotACommand,
    Unauthorized,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInGuild => "not_in_guild",
            Self::NotTracked => "not_tracked",
            Self::EmoteNotBound => "emote_not_bound",
            Self::AlreadyHasRole => "already_has_role",
            Self::DoesNotHaveRole => "does_not_have_role",
            Self::OwnReaction => "own_reaction",
            Self::BotAuthor => "bot_author",
            Self::NotACommand => "not_a_command",
            Self::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to do
    Ignored(IgnoreReason),
    RoleGranted { role_id: Snowflake },
    RoleRevoked { role_id: Snowflake },
    /// The bot put its own reaction back
    AffordanceRestored,
    /// A binding was stored; `created` when the message was not tracked before
    Bound {
        tracked: TrackedMessageId,
        created: bool,
    },
    /// A binding was removed; `exhausted` when that was the last one
    Unbound {
        tracked: TrackedMessageId,
        exhausted: bool,
    },
    /// Reactions for an emote were stripped; unbinding follows from the clear event
    ClearRequested,
    /// The command was refused and the author told why
    Rejected(String),
}

impl Outcome {
    /// Whether anything changed, on the platform or in the mapping
    pub fn is_effective(&self) -> bool {
        !matches!(self, Self::Ignored(_) | Self::Rejected(_))
    }
}
