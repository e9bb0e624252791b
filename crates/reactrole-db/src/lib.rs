//! # reactrole-db
//!
//! Role binding store backed by PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides the PostgreSQL implementation of the
//! `RoleBindingRepository` port defined in `reactrole-core`. It handles:
//!
//! - Connection pool management
//! - Schema bootstrap
//! - Database models with SQLx `FromRow` derives
//! - Model → entity mappers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reactrole_db::{create_pool, ensure_schema, DatabaseConfig, PgRoleBindingRepository};
//!
//! async fn example(settings: &reactrole_common::DatabaseConfig) -> Result<(), sqlx::Error> {
//!     let pool = create_pool(&DatabaseConfig::from_settings(settings)).await?;
//!     ensure_schema(&pool).await?;
//!     let store = PgRoleBindingRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, ensure_schema, DatabaseConfig, PgPool, SCHEMA};
pub use repositories::PgRoleBindingRepository;
