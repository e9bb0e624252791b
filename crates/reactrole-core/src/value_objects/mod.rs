//! Value objects - immutable types that represent domain concepts

mod emote;
mod snowflake;

pub use emote::{parse_role_token, Emote, EmoteParseError};
pub use snowflake::{MessageRef, Snowflake, SnowflakeParseError, TrackedMessageId};
