//! Read-side repositories.
//!
//! Repositories serve list and report queries. State changes go through
//! [`crate::SeaOrmOrderStore`] so they share one transaction per operation.

pub mod customer;
pub mod history;
pub mod order;

pub use customer::{CustomerRepository, RechargeRecord};
pub use history::{HistoryFilter, HistoryRepository};
pub use order::{DateField, OrderFilter, OrderListItem, OrderRepository};
