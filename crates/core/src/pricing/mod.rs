//! Order pricing.
//!
//! Derives total, discount and final price from unit price, duration and the
//! exclusive-discount flag.

pub mod calculator;

#[cfg(test)]
mod props;

pub use calculator::{PriceBreakdown, PricingCalculator};
