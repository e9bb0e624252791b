//! Reconciliation services
//!
//! Each service borrows the shared [`ServiceContext`]; the
//! [`ReconciliationEngine`] routes gateway events to them.

pub mod command;
pub mod context;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod outcome;
pub mod roles;

pub use command::CommandService;
pub use context::{EngineSettings, ServiceContext, ServiceContextBuilder};
pub use engine::{ReconciliationEngine, RestoreReport};
pub use error::{ServiceError, ServiceResult};
pub use mapping::{LoadReport, MappingService};
pub use outcome::{IgnoreReason, Outcome};
pub use roles::RoleSyncService;
