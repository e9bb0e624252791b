//! Gateway intents
//!
//! Which event groups the platform delivers on this connection.

use bitflags::bitflags;

bitflags! {
    /// Gateway intent flags sent with Identify
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GatewayIntents: u64 {
        /// Guild availability (needed for READY guild list)
        const GUILDS                  = 1 << 0;
        /// Member data, including role sets (privileged)
        const GUILD_MEMBERS           = 1 << 1;
        /// Messages in guild channels
        const GUILD_MESSAGES          = 1 << 9;
        /// Reaction add/remove/clear in guild channels
        const GUILD_MESSAGE_REACTIONS = 1 << 10;
        /// Message text for commands (privileged)
        const MESSAGE_CONTENT         = 1 << 15;

        /// Everything the reaction-role bot listens to
        const REACTION_ROLES = Self::GUILDS.bits()
            | Self::GUILD_MEMBERS.bits()
            | Self::GUILD_MESSAGES.bits()
            | Self::GUILD_MESSAGE_REACTIONS.bits()
            | Self::MESSAGE_CONTENT.bits();
    }
}

impl Default for GatewayIntents {
    fn default() -> Self {
        Self::REACTION_ROLES
    }
}
