//! Storefront Pricing
//!
//! Order pricing and discount engine: resolves a promotion snapshot into a
//! discount strategy, allocates the discount across cart lines and aggregates
//! order totals. Pricing is pure and deterministic, so an order priced for
//! persistence and the same order priced for a dashboard preview always agree.

pub mod discounts;
pub mod fixtures;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod receipt;
pub mod requests;
