//! Ports - the interfaces the domain needs from infrastructure

mod gateway;
mod repositories;

pub use gateway::{GatewayClient, PlatformResult};
pub use repositories::{RepoResult, RoleBindingRepository};
