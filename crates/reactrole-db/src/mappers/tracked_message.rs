//! Tracked message model -> entity mappers

use reactrole_core::entities::{Binding, TrackedMessageHeader};
use reactrole_core::value_objects::{Snowflake, TrackedMessageId};

use crate::models::{BindingModel, TrackedMessageModel};

impl From<TrackedMessageModel> for TrackedMessageHeader {
    fn from(model: TrackedMessageModel) -> Self {
        TrackedMessageHeader {
            id: TrackedMessageId::new(model.id),
            message_id: Snowflake::new(model.message_id),
            channel_id: Snowflake::new(model.channel_id),
            guild_id: Snowflake::new(model.guild_id),
        }
    }
}

impl From<BindingModel> for Binding {
    fn from(model: BindingModel) -> Self {
        Binding::new(Snowflake::new(model.emote_id), Snowflake::new(model.role_id))
    }
}
