//! PostgreSQL implementation of RoleBindingRepository

use std::future::Future;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::time::Instant;
use tracing::{debug, instrument};

use reactrole_core::entities::{Binding, TrackedMessageHeader};
use reactrole_core::error::DomainError;
use reactrole_core::traits::{RepoResult, RoleBindingRepository};
use reactrole_core::value_objects::{Snowflake, TrackedMessageId};

use crate::models::{BindingModel, TrackedMessageModel};

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of RoleBindingRepository
#[derive(Clone)]
pub struct PgRoleBindingRepository {
    pool: PgPool,
    log_statements: bool,
}

impl PgRoleBindingRepository {
    /// Create a new PgRoleBindingRepository
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            log_statements: false,
        }
    }

    /// Log every statement with its duration at debug level
    #[must_use]
    pub fn with_statement_logging(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    async fn timed<T, F>(&self, statement: &'static str, query: F) -> Result<T, sqlx::Error>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let started = Instant::now();
        let result = query.await;
        if self.log_statements {
            debug!(
                statement,
                elapsed_us = started.elapsed().as_micros() as u64,
                ok = result.is_ok(),
                "store statement"
            );
        }
        result
    }
}

#[async_trait]
impl RoleBindingRepository for PgRoleBindingRepository {
    #[instrument(skip(self))]
    async fn list_tracked_messages(&self) -> RepoResult<Vec<TrackedMessageHeader>> {
        let query = sqlx::query_as::<_, TrackedMessageModel>(
            r#"
            SELECT id, message_id, channel_id, guild_id
            FROM guild_messages
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool);

        let results = self
            .timed("list_tracked_messages", query)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(TrackedMessageHeader::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_bindings(&self, id: TrackedMessageId) -> RepoResult<Vec<Binding>> {
        let query = sqlx::query_as::<_, BindingModel>(
            r#"
            SELECT emote_id, role_id
            FROM message_reactions
            WHERE gm_id = $1
            ORDER BY id
            "#,
        )
        .bind(id.into_inner())
        .fetch_all(&self.pool);

        let results = self
            .timed("list_bindings", query)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(Binding::from).collect())
    }

    #[instrument(skip(self))]
    async fn create_tracked_message(
        &self,
        message_id: Snowflake,
        channel_id: Snowflake,
        guild_id: Snowflake,
    ) -> RepoResult<TrackedMessageId> {
        let query = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO guild_messages (message_id, channel_id, guild_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(message_id.into_inner())
        .bind(channel_id.into_inner())
        .bind(guild_id.into_inner())
        .fetch_one(&self.pool);

        let id = self
            .timed("create_tracked_message", query)
            .await
            .map_err(|e| {
                map_unique_violation(e, || {
                    DomainError::DatabaseError(format!("message {message_id} is already tracked"))
                })
            })?;

        Ok(TrackedMessageId::new(id))
    }

    #[instrument(skip(self))]
    async fn add_binding(&self, id: TrackedMessageId, binding: &Binding) -> RepoResult<()> {
        let query = sqlx::query(
            r#"
            INSERT INTO message_reactions (gm_id, emote_id, role_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id.into_inner())
        .bind(binding.emote_id.into_inner())
        .bind(binding.role_id.into_inner())
        .execute(&self.pool);

        self.timed("add_binding", query).await.map_err(|e| {
            let parent_missing = e
                .as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation());
            if parent_missing {
                return DomainError::TrackedMessageNotFound(id);
            }
            map_unique_violation(e, || DomainError::BindingAlreadyExists {
                tracked: id,
                emote_id: binding.emote_id,
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_binding(&self, id: TrackedMessageId, emote_id: Snowflake) -> RepoResult<bool> {
        let query = sqlx::query(
            r#"
            DELETE FROM message_reactions WHERE gm_id = $1 AND emote_id = $2
            "#,
        )
        .bind(id.into_inner())
        .bind(emote_id.into_inner())
        .execute(&self.pool);

        let result = self
            .timed("remove_binding", query)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_tracked_message(&self, id: TrackedMessageId) -> RepoResult<()> {
        // Bindings go with it through ON DELETE CASCADE
        let query = sqlx::query(
            r#"
            DELETE FROM guild_messages WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .execute(&self.pool);

        self.timed("delete_tracked_message", query)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_internal_id_by_message_id(
        &self,
        message_id: Snowflake,
    ) -> RepoResult<Option<TrackedMessageId>> {
        let query = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM guild_messages WHERE message_id = $1
            "#,
        )
        .bind(message_id.into_inner())
        .fetch_optional(&self.pool);

        let result = self
            .timed("find_internal_id_by_message_id", query)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(TrackedMessageId::new))
    }
}
