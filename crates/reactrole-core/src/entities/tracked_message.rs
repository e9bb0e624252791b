//! Tracked message entity - a chat message under reaction-role management

use std::collections::HashSet;

use crate::error::{DomainError, InvariantViolation};
use crate::value_objects::{Emote, MessageRef, Snowflake, TrackedMessageId};

use super::Binding;

/// Tracked message as stored, without its bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedMessageHeader {
    pub id: TrackedMessageId,
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Snowflake,
}

/// Tracked message entity
///
/// Always holds at least one binding and never two bindings for the same
/// emote. Mutators return a new value so a half-applied binding set is never
/// observable through a shared reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedMessage {
    pub id: TrackedMessageId,
    pub message_id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Snowflake,
    bindings: Vec<Binding>,
}

/// Outcome of removing a binding from a tracked message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingRemoval {
    /// The emote was not bound on this message
    NotBound,
    /// Bindings remain; the updated message
    Remaining(TrackedMessage),
    /// The last binding was removed; the message is no longer tracked
    Exhausted,
}

impl TrackedMessage {
    /// Create a tracked message with its first binding
    pub fn new(header: TrackedMessageHeader, first: Binding) -> Self {
        Self {
            id: header.id,
            message_id: header.message_id,
            channel_id: header.channel_id,
            guild_id: header.guild_id,
            bindings: vec![first],
        }
    }

    /// Assemble a tracked message from stored parts, checking invariants
    pub fn from_parts(
        header: TrackedMessageHeader,
        bindings: Vec<Binding>,
    ) -> Result<Self, InvariantViolation> {
        let message = Self {
            id: header.id,
            message_id: header.message_id,
            channel_id: header.channel_id,
            guild_id: header.guild_id,
            bindings,
        };
        message.validate()?;
        Ok(message)
    }

    /// Header fields only
    pub fn header(&self) -> TrackedMessageHeader {
        TrackedMessageHeader {
            id: self.id,
            message_id: self.message_id,
            channel_id: self.channel_id,
            guild_id: self.guild_id,
        }
    }

    /// Platform address of the message
    pub fn message_ref(&self) -> MessageRef {
        MessageRef::new(self.channel_id, self.message_id)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Find the binding for an emote id
    pub fn binding_for(&self, emote_id: Snowflake) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.emote_id == emote_id)
    }

    /// Role bound to the emote of a reaction, if any
    pub fn role_for(&self, emote: &Emote) -> Option<Snowflake> {
        self.bindings
            .iter()
            .find(|b| b.matches(emote))
            .map(|b| b.role_id)
    }

    /// Return a copy with an extra binding
    pub fn with_binding(&self, binding: Binding) -> Result<Self, DomainError> {
        if self.binding_for(binding.emote_id).is_some() {
            return Err(DomainError::BindingAlreadyExists {
                tracked: self.id,
                emote_id: binding.emote_id,
            });
        }

        let mut next = self.clone();
        next.bindings.push(binding);
        Ok(next)
    }

    /// Return the message with the binding for `emote_id` removed
    pub fn without_binding(&self, emote_id: Snowflake) -> BindingRemoval {
        if self.binding_for(emote_id).is_none() {
            return BindingRemoval::NotBound;
        }

        let remaining: Vec<Binding> = self
            .bindings
            .iter()
            .filter(|b| b.emote_id != emote_id)
            .copied()
            .collect();

        if remaining.is_empty() {
            BindingRemoval::Exhausted
        } else {
            BindingRemoval::Remaining(Self {
                bindings: remaining,
                ..self.clone()
            })
        }
    }

    /// Check the binding-set invariants
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if self.bindings.is_empty() {
            return Err(InvariantViolation::EmptyBindings(self.id));
        }

        let mut seen = HashSet::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            if !seen.insert(binding.emote_id) {
                return Err(InvariantViolation::DuplicateEmote {
                    tracked: self.id,
                    emote_id: binding.emote_id,
                });
            }
        }

        Ok(())
    }
}
