//! Emote value object and chat-token parsing
//!
//! Custom (guild) emotes carry a snowflake id; plain Unicode emoji do not.
//! Only custom emotes can be bound to roles.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Snowflake;

/// An emote as seen in reaction events and chat text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Emote {
    /// Custom emote id (None for Unicode emoji)
    #[serde(default)]
    pub id: Option<Snowflake>,
    /// Emote name, or the emoji itself for Unicode emoji
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub animated: bool,
}

/// Error when a chat token is not a usable emote or role reference
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmoteParseError {
    #[error("'{0}' is not a custom emote")]
    NotCustom(String),

    #[error("'{0}' is not a role mention")]
    NotRole(String),
}

impl Emote {
    /// Create a custom emote
    pub fn custom(id: Snowflake, name: impl Into<String>, animated: bool) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
            animated,
        }
    }

    /// Create a custom emote known only by id (e.g. rebuilt from a stored binding)
    pub fn from_id(id: Snowflake) -> Self {
        Self {
            id: Some(id),
            name: None,
            animated: false,
        }
    }

    /// Create a Unicode emoji
    pub fn unicode(emoji: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(emoji.into()),
            animated: false,
        }
    }

    /// Check if this is a custom (guild) emote
    #[inline]
    pub fn is_custom(&self) -> bool {
        self.id.is_some()
    }

    /// Parse a custom emote mention: `<:name:id>` or `<a:name:id>`
    pub fn parse_mention(token: &str) -> Result<Self, EmoteParseError> {
        let not_custom = || EmoteParseError::NotCustom(token.to_string());

        let inner = token
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .ok_or_else(not_custom)?;

        let (animated, rest) = match inner.strip_prefix("a:") {
            Some(rest) => (true, rest),
            None => (false, inner.strip_prefix(':').ok_or_else(not_custom)?),
        };

        let (name, id) = rest.rsplit_once(':').ok_or_else(not_custom)?;
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(not_custom());
        }
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(not_custom());
        }
        let id = Snowflake::parse(id).map_err(|_| not_custom())?;

        Ok(Self::custom(id, name, animated))
    }

    /// Render the emote the way the REST reaction endpoints expect it
    ///
    /// Custom emotes become `name:id`; the platform resolves by id, so a
    /// placeholder name is used when the real one is unknown.
    pub fn api_name(&self) -> String {
        match (self.id, self.name.as_deref()) {
            (Some(id), Some(name)) => format!("{name}:{id}"),
            (Some(id), None) => format!("_:{id}"),
            (None, Some(name)) => name.to_string(),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Display for Emote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => {
                let prefix = if self.animated { "a" } else { "" };
                write!(f, "<{prefix}:{}:{id}>", self.name.as_deref().unwrap_or("_"))
            }
            None => write!(f, "{}", self.name.as_deref().unwrap_or("")),
        }
    }
}

/// Parse a role token: a role mention `<@&id>` or a bare numeric id
pub fn parse_role_token(token: &str) -> Result<Snowflake, EmoteParseError> {
    let digits = token
        .strip_prefix("<@&")
        .and_then(|t| t.strip_suffix('>'))
        .unwrap_or(token);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EmoteParseError::NotRole(token.to_string()));
    }

    match Snowflake::parse(digits) {
        Ok(id) if !id.is_zero() => Ok(id),
        _ => Err(EmoteParseError::NotRole(token.to_string())),
    }
}
