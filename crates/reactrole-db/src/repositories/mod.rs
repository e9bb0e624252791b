//! Repository implementations
//!
//! PostgreSQL implementation of the role binding store port defined in
//! reactrole-core.

mod error;
mod role_binding;

pub use role_binding::PgRoleBindingRepository;
