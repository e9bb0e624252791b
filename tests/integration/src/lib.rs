//! Integration test utilities for the reaction-role bot
//!
//! In-memory stand-ins for the role binding store and the chat platform, so
//! the reconciliation engine can be driven end to end without PostgreSQL or
//! a gateway connection.

pub mod fixtures;
pub mod store;

pub use fixtures::*;
pub use helpers::*;
pub use platform::{GatewayCall, RecordingGateway};
pub use store::{InMemoryStore, StoreOp};
