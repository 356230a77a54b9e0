//! Price a cart scenario file.
//!
//! A scenario is a TOML document:
//!
//! ```toml
//! coupon = "SAVE10"
//! shipping = "standard"
//!
//! [[lines]]
//! product = "trail-shoe"
//! price = 40.00
//! quantity = 3
//! stock = 10
//! compare_at = 55.00
//! ```

use std::collections::HashSet;

use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_commerce::cart::{CartLine, CouponState};
use shopfront_commerce::checkout::ShippingMethod;
use shopfront_commerce::pricing::{compute_breakdown, PricingBreakdown, PricingPolicy};
use shopfront_commerce::{Currency, Money, ProductRef};

use super::QuoteArgs;
use crate::context::Context;

/// A cart to price.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub lines: Vec<ScenarioLine>,
    #[serde(default)]
    pub coupon: Option<String>,
    #[serde(default)]
    pub shipping: Option<String>,
}

/// One product in a scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioLine {
    pub product: String,
    #[serde(default)]
    pub name: Option<String>,
    pub price: Decimal,
    pub quantity: i64,
    pub stock: u32,
    #[serde(default)]
    pub compare_at: Option<Decimal>,
}

impl Scenario {
    /// Parse a scenario from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Build cart lines, checking prices, quantities and duplicates.
    pub fn cart_lines(&self, currency: Currency) -> Result<Vec<CartLine>> {
        let mut seen = HashSet::new();
        let mut lines = Vec::with_capacity(self.lines.len());

        for entry in &self.lines {
            if !seen.insert(entry.product.as_str()) {
                bail!("product {} is listed more than once", entry.product);
            }
            if entry.price < Decimal::ZERO {
                bail!("product {} has a negative price", entry.product);
            }

            let name = entry.name.clone().unwrap_or_else(|| entry.product.clone());
            let mut line = CartLine::new(
                ProductRef::new(entry.product.clone()),
                name,
                Money::new(entry.price, currency),
                0,
                entry.stock,
            );
            if let Some(compare_at) = entry.compare_at.filter(|p| *p > Decimal::ZERO) {
                line = line.with_compare_at(Money::new(compare_at, currency));
            }
            line.quantity = line.check_quantity(entry.quantity)?;
            lines.push(line);
        }

        Ok(lines)
    }
}

/// Price a scenario. `coupon` and `shipping` override the scenario's own.
pub fn price(
    scenario: &Scenario,
    coupon: Option<&str>,
    shipping: Option<&str>,
    policy: &PricingPolicy,
) -> Result<PricingBreakdown> {
    let lines = scenario.cart_lines(policy.currency)?;

    let coupon = match coupon.or(scenario.coupon.as_deref()) {
        Some(code) => CouponState::resolve(&policy.coupons, code)?,
        None => CouponState::none(),
    };

    let method = match shipping.or(scenario.shipping.as_deref()) {
        Some(name) => parse_shipping(name)?,
        None => ShippingMethod::default(),
    };

    Ok(compute_breakdown(&lines, &coupon, method, policy)?)
}

fn parse_shipping(name: &str) -> Result<ShippingMethod> {
    match ShippingMethod::parse(&name.trim().to_lowercase()) {
        Some(method) => Ok(method),
        None => {
            let known: Vec<&str> = ShippingMethod::ALL.iter().map(|m| m.as_str()).collect();
            bail!(
                "unknown shipping method {:?}, expected one of: {}",
                name,
                known.join(", ")
            )
        }
    }
}

#[derive(Serialize)]
struct QuoteReport<'a> {
    scenario: &'a str,
    quoted_at: DateTime<Utc>,
    #[serde(flatten)]
    breakdown: &'a PricingBreakdown,
}

/// Run the quote command.
pub async fn run(args: QuoteArgs, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(&args.scenario);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
    let scenario = Scenario::from_toml_str(&content)
        .with_context(|| format!("Failed to parse scenario: {}", path.display()))?;

    tracing::debug!(lines = scenario.lines.len(), "pricing scenario");

    let quote = price(
        &scenario,
        args.coupon.as_deref(),
        args.shipping.as_deref(),
        &ctx.config.pricing,
    )?
    .rounded();

    if ctx.output.is_json() {
        ctx.output.json(&QuoteReport {
            scenario: &args.scenario,
            quoted_at: Utc::now(),
            breakdown: &quote,
        });
        return Ok(());
    }

    ctx.output.header("Quote");
    ctx.output.breakdown(&quote);

    if let Some(remaining) = &quote.free_shipping_remaining {
        ctx.output.info(&format!(
            "Add {} more for free {} shipping",
            remaining.display(),
            quote.shipping_method
        ));
    }
    ctx.output.debug(&format!(
        "Estimated delivery: {}",
        quote.shipping_method.delivery_estimate()
    ));

    Ok(())
}
