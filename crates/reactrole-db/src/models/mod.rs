//! Database models - SQLx-compatible structs for PostgreSQL tables

mod tracked_message;

pub use tracked_message::{BindingModel, TrackedMessageModel};
