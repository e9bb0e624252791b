//! Dispatch decoding

use reactrole_core::events::ReactionRoleEvent;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::payloads::{MessageCreateEvent, ReactionPayload, ReactionRemoveEmojiPayload, ReadyEvent};
use super::GatewayEventType;

/// A dispatch event, decoded
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    Ready(ReadyEvent),
    Resumed,
    /// An event for the reconciliation engine
    Engine(ReactionRoleEvent),
}

impl DispatchEvent {
    /// Decode the data of a dispatch named `name`
    ///
    /// Returns `Ok(None)` for events the bot does not act on.
    pub fn decode(name: &str, data: Value) -> Result<Option<Self>, serde_json::Error> {
        let Some(kind) = GatewayEventType::from_name(name) else {
            return Ok(None);
        };

        let event = match kind {
            GatewayEventType::Ready => Self::Ready(parse(data)?),
            GatewayEventType::Resumed => Self::Resumed,
            GatewayEventType::MessageCreate => Self::Engine(ReactionRoleEvent::CommandMessage(
                parse::<MessageCreateEvent>(data)?.into(),
            )),
            GatewayEventType::MessageReactionAdd => Self::Engine(ReactionRoleEvent::ReactionAdded(
                parse::<ReactionPayload>(data)?.into(),
            )),
            GatewayEventType::MessageReactionRemove => Self::Engine(
                ReactionRoleEvent::ReactionRemoved(parse::<ReactionPayload>(data)?.into()),
            ),
            GatewayEventType::MessageReactionRemoveEmoji => {
                Self::Engine(ReactionRoleEvent::ReactionClearedForEmote(
                    parse::<ReactionRemoveEmojiPayload>(data)?.into(),
                ))
            }
        };

        Ok(Some(event))
    }
}

fn parse<T: DeserializeOwned>(data: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(data)
}
