//! Coupon codes and the coupon state applied to a cart.

use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resolved coupon: a code and the percentage it takes off the subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Canonical (upper-case) code.
    pub code: String,
    /// Discount percentage, `1..=100`.
    pub discount_percent: u8,
}

/// Resolves user-entered codes against a fixed code -> percentage table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, u8>", into = "BTreeMap<String, u8>")]
pub struct CouponResolver {
    table: BTreeMap<String, u8>,
}

impl CouponResolver {
    /// Build a resolver from `(code, percent)` pairs. Codes are stored upper-case.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u8)>,
        S: AsRef<str>,
    {
        Self {
            table: entries
                .into_iter()
                .map(|(code, percent)| (code.as_ref().trim().to_uppercase(), percent))
                .collect(),
        }
    }

    /// Resolve a code, case-insensitively.
    pub fn resolve(&self, input: &str) -> Result<Coupon, CommerceError> {
        let code = input.trim();
        if code.is_empty() {
            return Err(CommerceError::EmptyCode);
        }
        let code = code.to_uppercase();
        match self.table.get(&code) {
            Some(&discount_percent) if discount_percent > 0 => Ok(Coupon {
                code,
                discount_percent,
            }),
            _ => Err(CommerceError::CouponNotFound(code)),
        }
    }

    /// Iterate over the table in code order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, u8)> {
        self.table.iter().map(|(code, pct)| (code.as_str(), *pct))
    }

    /// Check every percentage lies in `1..=100`.
    pub fn validate(&self) -> Result<(), CommerceError> {
        for (code, pct) in &self.table {
            if code.is_empty() {
                return Err(CommerceError::InvalidPolicy("empty coupon code".into()));
            }
            if *pct == 0 || *pct > 100 {
                return Err(CommerceError::InvalidPolicy(format!(
                    "coupon {} has discount {}%, expected 1-100",
                    code, pct
                )));
            }
        }
        Ok(())
    }
}

impl From<BTreeMap<String, u8>> for CouponResolver {
    fn from(table: BTreeMap<String, u8>) -> Self {
        Self::new(table)
    }
}

impl From<CouponResolver> for BTreeMap<String, u8> {
    fn from(resolver: CouponResolver) -> Self {
        resolver.table
    }
}

impl Default for CouponResolver {
    fn default() -> Self {
        Self::new([("SAVE10", 10), ("SAVE20", 20), ("WELCOME", 15)])
    }
}

/// The coupon currently applied to a cart. At most one at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponState {
    code: Option<String>,
    discount_percent: u8,
    applied: bool,
}

impl CouponState {
    /// No coupon.
    pub fn none() -> Self {
        Self::default()
    }

    /// State for an applied coupon.
    pub fn applied(coupon: Coupon) -> Self {
        Self {
            code: Some(coupon.code),
            discount_percent: coupon.discount_percent,
            applied: true,
        }
    }

    /// Resolve `input` and return the replacement state.
    ///
    /// On error the caller keeps its current state; on success the result
    /// replaces it entirely.
    pub fn resolve(resolver: &CouponResolver, input: &str) -> Result<Self, CommerceError> {
        resolver.resolve(input).map(Self::applied)
    }

    /// Applied code, if any.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Discount percentage (0 when nothing is applied).
    pub fn discount_percent(&self) -> u8 {
        self.discount_percent
    }

    /// Whether a coupon is applied.
    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Discount taken off `subtotal`.
    pub fn discount_on(&self, subtotal: &Money) -> Result<Money, CommerceError> {
        if !self.applied {
            return Ok(Money::zero(subtotal.currency));
        }
        subtotal.percentage(self.discount_percent)
    }
}
