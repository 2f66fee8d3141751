//! Orders and the services that operate on them.
//!
//! # Modules
//!
//! - `types` - Order records, inputs and batch results
//! - `store` - The persistence boundary implemented by the database crate
//! - `service` - Create, edit, approve, reject, override and batch operations
//! - `account` - Customer recharges and balance lookups

pub mod account;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod memory;
#[cfg(test)]
mod tests;

pub use account::{CustomerAccountService, RechargeOutcome, RechargeRequest};
pub use service::OrderApprovalService;
pub use store::{OrderStore, OrderUnitOfWork, finish_unit};
pub use types::{
    BatchAction, BatchFailure, BatchResult, NewOrder, Order, OrderDetails, OrderDraft, OrderPatch,
    OrderPricing,
};
