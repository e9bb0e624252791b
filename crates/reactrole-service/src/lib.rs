//! # reactrole-service
//!
//! Application layer: the reconciliation engine that keeps live role
//! membership, the mapping cache, and the role binding store in step with
//! reaction events and bind commands.

pub mod services;

pub use services::{
    CommandService, EngineSettings, IgnoreReason, LoadReport, MappingService, Outcome,
    ReconciliationEngine, RestoreReport, RoleSyncService, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult,
};
