//! Domain entities - core business objects

mod binding;
mod tracked_message;

pub use binding::Binding;
pub use tracked_message::{BindingRemoval, TrackedMessage, TrackedMessageHeader};
