//! Itemized price breakdown.

use crate::checkout::ShippingMethod;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Subtotal, discount, shipping, tax and total for one cart.
///
/// Amounts are exact. Call [`PricingBreakdown::rounded`] at the point of
/// display or serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    /// Sum of quantities.
    pub item_count: u64,
    /// Sum of `unit_price * quantity`.
    pub subtotal: Money,
    /// Coupon discount.
    pub discount: Money,
    /// Applied coupon code.
    pub coupon_code: Option<String>,
    /// Shipping method priced.
    pub shipping_method: ShippingMethod,
    /// Shipping cost.
    pub shipping: Money,
    /// Tax.
    pub tax: Money,
    /// `subtotal - discount + shipping + tax`.
    pub total: Money,
    /// Additional subtotal needed for free shipping on this method.
    pub free_shipping_remaining: Option<Money>,
}

impl PricingBreakdown {
    /// Copy with every amount rounded to the currency's minor unit.
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: self.subtotal.rounded(),
            discount: self.discount.rounded(),
            shipping: self.shipping.rounded(),
            tax: self.tax.rounded(),
            total: self.total.rounded(),
            free_shipping_remaining: self.free_shipping_remaining.map(|m| m.rounded()),
            coupon_code: self.coupon_code.clone(),
            ..*self
        }
    }

    /// Check if a discount was taken.
    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }

    /// Check if shipping is free.
    pub fn has_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}
