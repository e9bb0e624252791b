//! # reactrole-gateway
//!
//! Connects the reconciliation engine to the chat platform: a websocket
//! gateway client that receives reaction and message events, and a REST
//! client that carries out role and reaction changes.

pub mod connection;
pub mod dispatch;
pub mod events;
pub mod protocol;
pub mod rest;

use std::sync::Arc;

use reactrole_cache::ReactionMappingCache;
use reactrole_common::{AppConfig, AppError, AppResult};
use reactrole_db::{create_pool, ensure_schema, DatabaseConfig, PgRoleBindingRepository};
use reactrole_service::{EngineSettings, ReconciliationEngine, ServiceContextBuilder};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::connection::{Shard, ShardConfig};
use crate::dispatch::EventDispatcher;
use crate::protocol::GatewayIntents;
use crate::rest::RestClient;

/// Dispatches buffered between the shard and the dispatcher
const EVENT_BUFFER: usize = 256;

/// Run the bot until Ctrl-C or a fatal gateway error
///
/// The mapping is loaded from the store before the gateway connects; a failed
/// load aborts startup.
pub async fn run(config: AppConfig) -> AppResult<()> {
    let db_config = DatabaseConfig::from_settings(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::startup(format!("database connection failed: {e}")))?;
    ensure_schema(&pool)
        .await
        .map_err(|e| AppError::startup(format!("schema setup failed: {e}")))?;

    let store = Arc::new(
        PgRoleBindingRepository::new(pool).with_statement_logging(config.logging.database),
    );
    let rest = Arc::new(
        RestClient::new(&config.gateway.api_base, config.bot.token.clone())
            .map_err(AppError::startup)?,
    );

    let ctx = ServiceContextBuilder::new()
        .store(store)
        .gateway(rest)
        .cache(ReactionMappingCache::shared())
        .settings(EngineSettings::from_bot_config(&config.bot))
        .build()?;
    let engine = ReconciliationEngine::new(ctx);

    engine
        .load_cache()
        .await
        .map_err(|e| AppError::startup(format!("loading reaction mapping failed: {e}")))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);

    let dispatcher = EventDispatcher::new(
        engine,
        config.bot.event_timeout(),
        config.bot.restore_reactions_on_ready,
    );
    let dispatch_task = tokio::spawn(dispatcher.run(events_rx));

    let shard = Shard::new(
        ShardConfig {
            url: config.gateway.url.clone(),
            token: config.bot.token.clone(),
            intents: GatewayIntents::REACTION_ROLES,
        },
        events_tx,
        shutdown_rx,
    );
    let mut shard_task = tokio::spawn(shard.run());

    info!(gateway = %config.gateway.url, "Reaction-role bot started");

    let shard_result = tokio::select! {
        result = &mut shard_task => result,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
            shard_task.await
        }
    };

    // The shard owned the only sender, so the dispatcher drains and stops
    if let Err(e) = dispatch_task.await {
        error!(error = %e, "Event dispatcher task failed");
    }

    match shard_result {
        Ok(Ok(())) => {
            info!("Reaction-role bot stopped");
            Ok(())
        }
        Ok(Err(e)) => Err(AppError::Platform(e.to_string())),
        Err(e) => Err(AppError::internal(e)),
    }
}
