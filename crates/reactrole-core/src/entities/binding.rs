//! Binding entity - one emote→role rule on a tracked message

use crate::value_objects::{Emote, Snowflake};

/// Binding entity
///
/// Immutable once created; removed when every reaction of its emote is
/// cleared from the owning message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub emote_id: Snowflake,
    pub role_id: Snowflake,
}

impl Binding {
    /// Create a new Binding
    pub const fn new(emote_id: Snowflake, role_id: Snowflake) -> Self {
        Self { emote_id, role_id }
    }

    /// Check if this binding is for the given emote
    #[inline]
    pub fn matches(&self, emote: &Emote) -> bool {
        emote.id == Some(self.emote_id)
    }

    /// Rebuild an emote usable for reaction calls from the stored id
    pub fn emote(&self) -> Emote {
        Emote::from_id(self.emote_id)
    }
}
