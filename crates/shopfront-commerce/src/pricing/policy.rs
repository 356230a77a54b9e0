//! Pricing policy: tax, shipping rates and the coupon table.

use crate::cart::CouponResolver;
use crate::checkout::ShippingMethod;
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which amount tax is charged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBasis {
    /// The subtotal before any coupon discount.
    #[default]
    Subtotal,
    /// The subtotal after the coupon discount.
    DiscountedSubtotal,
}

/// Price of one shipping method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingRate {
    /// Method this rate applies to.
    pub method: ShippingMethod,
    /// Flat price.
    pub price: Decimal,
    /// Subtotal at or above which this method is free. `None` means never free.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_over: Option<Decimal>,
}

impl ShippingRate {
    /// Create a rate that is never free.
    pub fn new(method: ShippingMethod, price: Decimal) -> Self {
        Self {
            method,
            price,
            free_over: None,
        }
    }

    /// Make this rate free at or above `threshold`.
    pub fn free_over(mut self, threshold: Decimal) -> Self {
        self.free_over = Some(threshold);
        self
    }
}

/// Everything the pricing engine needs besides the cart itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// Currency of every price.
    pub currency: Currency,
    /// Tax rate as a fraction (0.08 = 8%).
    pub tax_rate: Decimal,
    /// Amount tax is charged on.
    pub tax_basis: TaxBasis,
    /// One rate per shipping method.
    pub shipping: Vec<ShippingRate>,
    /// Coupon code table.
    pub coupons: CouponResolver,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            currency: Currency::USD,
            tax_rate: dec!(0.08),
            tax_basis: TaxBasis::Subtotal,
            shipping: vec![
                ShippingRate::new(ShippingMethod::Standard, dec!(9.99)).free_over(dec!(50.00)),
                ShippingRate::new(ShippingMethod::Express, dec!(9.99)),
                ShippingRate::new(ShippingMethod::Overnight, dec!(19.99)),
            ],
            coupons: CouponResolver::default(),
        }
    }
}

impl PricingPolicy {
    /// Parse and validate a policy from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, CommerceError> {
        let policy: PricingPolicy = toml::from_str(s)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Rate for a shipping method.
    pub fn rate(&self, method: ShippingMethod) -> Result<&ShippingRate, CommerceError> {
        self.shipping
            .iter()
            .find(|r| r.method == method)
            .ok_or_else(|| {
                CommerceError::InvalidPolicy(format!("no shipping rate for {}", method))
            })
    }

    /// Subtotal that unlocks free standard shipping, if any.
    pub fn free_shipping_threshold(&self) -> Option<Money> {
        self.rate(ShippingMethod::Standard)
            .ok()
            .and_then(|r| r.free_over)
            .map(|t| Money::new(t, self.currency))
    }

    /// Check the policy is internally consistent.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE {
            return Err(CommerceError::InvalidPolicy(format!(
                "tax_rate {} is outside [0, 1]",
                self.tax_rate
            )));
        }

        let mut seen = HashSet::new();
        for rate in &self.shipping {
            if !seen.insert(rate.method) {
                return Err(CommerceError::InvalidPolicy(format!(
                    "duplicate shipping rate for {}",
                    rate.method
                )));
            }
            if rate.price < Decimal::ZERO {
                return Err(CommerceError::InvalidPolicy(format!(
                    "negative price for {}",
                    rate.method
                )));
            }
            if rate.free_over.is_some_and(|t| t < Decimal::ZERO) {
                return Err(CommerceError::InvalidPolicy(format!(
                    "negative free_over for {}",
                    rate.method
                )));
            }
        }
        if let Some(missing) = ShippingMethod::ALL.iter().find(|m| !seen.contains(*m)) {
            return Err(CommerceError::InvalidPolicy(format!(
                "no shipping rate for {}",
                missing
            )));
        }

        self.coupons.validate()
    }
}
