//! Core business logic for Playdesk.
//!
//! This crate contains the order approval and settlement rules with ZERO web or
//! database dependencies. Persistence is reached only through the
//! [`order::OrderStore`] trait, which the database crate implements.
//!
//! # Modules
//!
//! - `pricing` - Order price breakdown from unit price, duration and discount flag
//! - `workflow` - Order status state machine
//! - `settlement` - Balance debits, recharges and payment summaries
//! - `history` - Approval audit entries
//! - `statistics` - Order aggregates for reporting
//! - `order` - Order records, the store boundary and the approval service

pub mod history;
pub mod order;
pub mod pricing;
pub mod settlement;
pub mod statistics;
pub mod workflow;
