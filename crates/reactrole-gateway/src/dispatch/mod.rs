//! Event dispatch
//!
//! Hands decoded gateway events to the reconciliation engine.

mod dispatcher;

pub use dispatcher::EventDispatcher;
