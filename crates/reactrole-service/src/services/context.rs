//! Service context - dependency container for services
//!
//! Holds the store, the platform client, the mapping cache, and the
//! single-writer lock shared by every service.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use reactrole_cache::{ReactionMappingCache, SharedMappingCache};
use reactrole_common::BotConfig;
use reactrole_core::traits::{GatewayClient, RoleBindingRepository};
use reactrole_core::Snowflake;
use tokio::sync::{Mutex, MutexGuard};

use super::error::{ServiceError, ServiceResult};

/// Command handling settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Prefix that marks a chat message as a command
    pub command_prefix: String,
    /// Roles allowed to issue commands; empty means anyone
    pub command_role_ids: Vec<Snowflake>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            command_prefix: "?".to_string(),
            command_role_ids: Vec::new(),
        }
    }
}

impl EngineSettings {
    pub fn from_bot_config(bot: &BotConfig) -> Self {
        Self {
            command_prefix: bot.command_prefix.clone(),
            command_role_ids: bot.command_role_ids.clone(),
        }
    }

    /// Check whether a member with these roles may issue commands
    pub fn allows(&self, author_roles: &[Snowflake]) -> bool {
        self.command_role_ids.is_empty()
            || author_roles
                .iter()
                .any(|role| self.command_role_ids.contains(role))
    }
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    store: Arc<dyn RoleBindingRepository>,
    gateway: Arc<dyn GatewayClient>,
    cache: SharedMappingCache,
    settings: Arc<EngineSettings>,

    // 0 until READY arrives
    self_id: Arc<AtomicI64>,

    // Held across every Store-then-Cache write pair, never across platform calls
    write_lock: Arc<Mutex<()>>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        store: Arc<dyn RoleBindingRepository>,
        gateway: Arc<dyn GatewayClient>,
        cache: SharedMappingCache,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            gateway,
            cache,
            settings: Arc::new(settings),
            self_id: Arc::new(AtomicI64::new(0)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get the role binding store
    pub fn store(&self) -> &dyn RoleBindingRepository {
        self.store.as_ref()
    }

    /// Get the chat platform client
    pub fn gateway(&self) -> &dyn GatewayClient {
        self.gateway.as_ref()
    }

    /// Get the reaction mapping cache
    pub fn cache(&self) -> &ReactionMappingCache {
        self.cache.as_ref()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The bot's own user id, once known
    pub fn self_id(&self) -> Option<Snowflake> {
        let id = Snowflake::new(self.self_id.load(Ordering::Acquire));
        (!id.is_zero()).then_some(id)
    }

    pub fn set_self_id(&self, id: Snowflake) {
        self.self_id.store(id.into_inner(), Ordering::Release);
    }

    /// Whether a user id is the bot itself
    pub fn is_self(&self, user_id: Snowflake) -> bool {
        self.self_id() == Some(user_id)
    }

    /// Acquire the single-writer lock for a Store-then-Cache mutation
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("store", &"RoleBindingRepository")
            .field("gateway", &"GatewayClient")
            .field("cached_messages", &self.cache.len())
            .field("settings", &self.settings)
            .field("self_id", &self.self_id())
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    store: Option<Arc<dyn RoleBindingRepository>>,
    gateway: Option<Arc<dyn GatewayClient>>,
    cache: Option<SharedMappingCache>,
    settings: Option<EngineSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn RoleBindingRepository>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn gateway(mut self, gateway: Arc<dyn GatewayClient>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Use an existing cache instead of a fresh empty one
    pub fn cache(mut self, cache: SharedMappingCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if the store or gateway is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.store
                .ok_or_else(|| ServiceError::validation("store is required"))?,
            self.gateway
                .ok_or_else(|| ServiceError::validation("gateway is required"))?,
            self.cache.unwrap_or_else(ReactionMappingCache::shared),
            self.settings.unwrap_or_default(),
        ))
    }
}
