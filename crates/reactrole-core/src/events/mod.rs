//! Reconciliation events
//!
//! Platform-neutral forms of the gateway events the engine consumes.

mod reaction_event;

pub use reaction_event::{CommandMessage, ReactionClearEvent, ReactionEvent, ReactionRoleEvent};
