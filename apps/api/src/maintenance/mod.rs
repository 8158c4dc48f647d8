//! Operator-only destructive operations. Never reached from normal request flow.

pub mod handlers;
pub mod outcome;
pub mod service;

pub use outcome::OperationOutcome;
pub use service::MaintenanceService;
