//! Order workflow management for Playdesk.
//!
//! This module implements the order status state machine: approval,
//! rejection and the administrative status override.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (OrderStatus, WorkflowAction, OrderWorkflow)
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::{ErrorKind, WorkflowError};
pub use service::WorkflowService;
pub use types::{ApprovalAction, OrderStatus, OrderWorkflow, WorkflowAction};
