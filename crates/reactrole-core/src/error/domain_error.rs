//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{Snowflake, TrackedMessageId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Tracked message not found: {0}")]
    TrackedMessageNotFound(TrackedMessageId),

    #[error("Message is not tracked: {0}")]
    MessageNotTracked(Snowflake),

    #[error("No binding for emote {emote_id} on tracked message {tracked}")]
    BindingNotFound {
        tracked: TrackedMessageId,
        emote_id: Snowflake,
    },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Only custom server emotes can be bound to roles (got '{0}')")]
    NotCustomEmote(String),

    #[error("Could not read a role from '{0}'; mention the role or give its id")]
    InvalidRole(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Command must be sent as a reply to the target message")]
    NotAReply,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Emote {emote_id} is already bound on tracked message {tracked}")]
    BindingAlreadyExists {
        tracked: TrackedMessageId,
        emote_id: Snowflake,
    },

    // =========================================================================
    // Consistency Errors
    // =========================================================================
    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Platform error: {0}")]
    PlatformError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A tracked message whose binding set breaks the model's rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("tracked message {0} has no bindings")]
    EmptyBindings(TrackedMessageId),

    #[error("tracked message {tracked} binds emote {emote_id} more than once")]
    DuplicateEmote {
        tracked: TrackedMessageId,
        emote_id: Snowflake,
    },
}

impl InvariantViolation {
    /// The tracked message the violation was found on
    pub fn tracked(&self) -> TrackedMessageId {
        match self {
            Self::EmptyBindings(tracked) | Self::DuplicateEmote { tracked, .. } => *tracked,
        }
    }
}

impl DomainError {
    /// Get an error code string for logs and replies
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::TrackedMessageNotFound(_) => "UNKNOWN_TRACKED_MESSAGE",
            Self::MessageNotTracked(_) => "MESSAGE_NOT_TRACKED",
            Self::BindingNotFound { .. } => "UNKNOWN_BINDING",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::NotCustomEmote(_) => "NOT_CUSTOM_EMOTE",
            Self::InvalidRole(_) => "INVALID_ROLE",
            Self::MissingArgument(_) => "MISSING_ARGUMENT",
            Self::NotAReply => "NOT_A_REPLY",

            // Conflict
            Self::BindingAlreadyExists { .. } => "BINDING_ALREADY_EXISTS",

            // Consistency
            Self::Invariant(_) => "INVARIANT_VIOLATION",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::PlatformError(_) => "PLATFORM_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TrackedMessageNotFound(_)
                | Self::MessageNotTracked(_)
                | Self::BindingNotFound { .. }
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::NotCustomEmote(_)
                | Self::InvalidRole(_)
                | Self::MissingArgument(_)
                | Self::NotAReply
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::BindingAlreadyExists { .. })
    }

    /// Check if this error came from the persistent store
    pub fn is_store(&self) -> bool {
        matches!(self, Self::DatabaseError(_))
    }
}
