//! Gateway connection
//!
//! The websocket session with the chat platform and its resume state.

mod error;
mod session;
mod shard;

pub use error::ConnectionError;
pub use session::SessionState;
pub use shard::{Shard, ShardConfig};
