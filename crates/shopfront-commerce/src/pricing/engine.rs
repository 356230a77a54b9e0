//! The pricing engine.

use crate::cart::{CartLine, CouponState};
use crate::checkout::ShippingMethod;
use crate::error::CommerceError;
use crate::money::Money;
use crate::pricing::{PricingBreakdown, PricingPolicy, TaxBasis};

/// Price `lines` with an optional coupon and a shipping method.
///
/// Pure: the same inputs always give the same breakdown. Nothing is rounded.
pub fn compute_breakdown(
    lines: &[CartLine],
    coupon: &CouponState,
    shipping_method: ShippingMethod,
    policy: &PricingPolicy,
) -> Result<PricingBreakdown, CommerceError> {
    let currency = policy.currency;

    let line_totals = lines
        .iter()
        .map(CartLine::line_total)
        .collect::<Result<Vec<_>, _>>()?;
    let subtotal = Money::try_sum(line_totals.iter(), currency)?;
    let discount = coupon.discount_on(&subtotal)?;

    let rate = policy.rate(shipping_method)?;
    let shipping = match rate.free_over {
        Some(threshold) if subtotal.amount >= threshold => Money::zero(currency),
        _ => Money::new(rate.price, currency),
    };
    let free_shipping_remaining = rate
        .free_over
        .filter(|threshold| subtotal.amount < *threshold)
        .map(|threshold| Money::new(threshold - subtotal.amount, currency));

    let taxable = match policy.tax_basis {
        TaxBasis::Subtotal => subtotal,
        TaxBasis::DiscountedSubtotal => subtotal.try_subtract(&discount)?,
    };
    let tax = taxable.try_scale(policy.tax_rate)?;

    let total = subtotal
        .try_subtract(&discount)?
        .try_add(&shipping)?
        .try_add(&tax)?;

    Ok(PricingBreakdown {
        item_count: lines.iter().map(|l| u64::from(l.quantity)).sum(),
        subtotal,
        discount,
        coupon_code: coupon.code().map(str::to_string),
        shipping_method,
        shipping,
        tax,
        total,
        free_shipping_remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CouponResolver;
    use crate::ids::ProductRef;
    use crate::money::Currency;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn line(id: &str, price: Decimal, quantity: u32) -> CartLine {
        CartLine::new(
            ProductRef::new(id),
            id,
            Money::new(price, Currency::USD),
            quantity,
            99,
        )
    }

    fn coupon(code: &str) -> CouponState {
        CouponState::resolve(&CouponResolver::default(), code).unwrap()
    }

    #[test]
    fn test_free_standard_shipping_with_coupon() {
        let lines = [line("a", dec!(40.00), 3)];
        let b = compute_breakdown(
            &lines,
            &coupon("SAVE10"),
            ShippingMethod::Standard,
            &PricingPolicy::default(),
        )
        .unwrap();

        assert_eq!(b.subtotal.amount, dec!(120.00));
        assert_eq!(b.discount.amount, dec!(12.00));
        assert!(b.has_free_shipping());
        assert_eq!(b.tax.amount, dec!(9.60));
        assert_eq!(b.total.amount, dec!(117.60));
        assert_eq!(b.free_shipping_remaining, None);
        assert_eq!(b.coupon_code.as_deref(), Some("SAVE10"));
    }

    #[test]
    fn test_express_is_never_free() {
        let policy = PricingPolicy::default();
        let cheap = [line("a", dec!(30.00), 1)];
        let b = compute_breakdown(&cheap, &CouponState::none(), ShippingMethod::Express, &policy)
            .unwrap();
        assert_eq!(b.shipping.amount, dec!(9.99));
        assert_eq!(b.tax.amount, dec!(2.40));
        assert_eq!(b.total.amount, dec!(42.39));
        assert_eq!(b.free_shipping_remaining, None);

        let big = [line("a", dec!(500.00), 1)];
        let b = compute_breakdown(&big, &CouponState::none(), ShippingMethod::Overnight, &policy)
            .unwrap();
        assert_eq!(b.shipping.amount, dec!(19.99));
    }

    #[test]
    fn test_standard_below_threshold() {
        let lines = [line("a", dec!(20.00), 2)];
        let b = compute_breakdown(
            &lines,
            &CouponState::none(),
            ShippingMethod::Standard,
            &PricingPolicy::default(),
        )
        .unwrap();
        assert_eq!(b.shipping.amount, dec!(9.99));
        assert_eq!(b.free_shipping_remaining.unwrap().amount, dec!(10.00));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let lines = [line("a", dec!(25.00), 2)];
        let b = compute_breakdown(
            &lines,
            &CouponState::none(),
            ShippingMethod::Standard,
            &PricingPolicy::default(),
        )
        .unwrap();
        assert!(b.has_free_shipping());
    }

    #[test]
    fn test_discount_does_not_reduce_free_shipping_eligibility() {
        let lines = [line("a", dec!(50.00), 1)];
        let b = compute_breakdown(
            &lines,
            &coupon("SAVE20"),
            ShippingMethod::Standard,
            &PricingPolicy::default(),
        )
        .unwrap();
        assert!(b.has_free_shipping());
        assert_eq!(b.discount.amount, dec!(10.00));
    }

    #[test]
    fn test_tax_on_discounted_subtotal() {
        let policy = PricingPolicy {
            tax_basis: TaxBasis::DiscountedSubtotal,
            ..PricingPolicy::default()
        };
        let lines = [line("a", dec!(100.00), 1)];
        let b = compute_breakdown(&lines, &coupon("SAVE10"), ShippingMethod::Standard, &policy)
            .unwrap();
        assert_eq!(b.tax.amount, dec!(7.20));
        assert_eq!(b.total.amount, dec!(97.20));
    }

    #[test]
    fn test_rounding_happens_only_on_request() {
        let lines = [line("a", dec!(10.01), 1)];
        let b = compute_breakdown(
            &lines,
            &coupon("WELCOME"),
            ShippingMethod::Express,
            &PricingPolicy::default(),
        )
        .unwrap();
        assert_eq!(b.discount.amount, dec!(1.5015));
        assert_eq!(b.tax.amount, dec!(0.8008));

        let r = b.rounded();
        assert_eq!(r.discount.amount, dec!(1.50));
        assert_eq!(r.tax.amount, dec!(0.80));
        assert_eq!(r.total.amount, dec!(19.30));
    }

    #[test]
    fn test_is_deterministic() {
        let lines = [line("a", dec!(19.99), 3), line("b", dec!(5.25), 2)];
        let policy = PricingPolicy::default();
        let first = compute_breakdown(&lines, &coupon("SAVE10"), ShippingMethod::Express, &policy);
        let second = compute_breakdown(&lines, &coupon("SAVE10"), ShippingMethod::Express, &policy);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_cart() {
        let b = compute_breakdown(
            &[],
            &CouponState::none(),
            ShippingMethod::Standard,
            &PricingPolicy::default(),
        )
        .unwrap();
        assert_eq!(b.item_count, 0);
        assert!(b.subtotal.is_zero());
        assert_eq!(b.shipping.amount, dec!(9.99));
    }
}
