//! Pricing module.
//!
//! Turns cart lines, a coupon and a shipping method into an itemized
//! breakdown under a configurable pricing policy.

mod breakdown;
mod engine;
mod policy;

pub use breakdown::PricingBreakdown;
pub use engine::compute_breakdown;
pub use policy::{PricingPolicy, ShippingRate, TaxBasis};
