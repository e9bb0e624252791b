//! Chat platform REST adapter

mod client;
mod error;

pub use client::RestClient;
pub use error::GatewayError;
