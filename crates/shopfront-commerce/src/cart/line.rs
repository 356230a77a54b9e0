//! Cart and cart line types.

use crate::error::CommerceError;
use crate::ids::ProductRef;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Stock levels below this are flagged as low on the cart page.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// One product-and-quantity entry in a cart.
///
/// Pricing and stock fields are snapshots supplied by the catalog; the
/// cart service is authoritative for `quantity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Product being purchased.
    pub product: ProductRef,
    /// Product name (denormalized for display and order snapshots).
    pub name: String,
    /// Primary image URL.
    pub image: Option<String>,
    /// Unit price.
    pub unit_price: Money,
    /// Original price shown struck through, if the product is on sale.
    pub compare_at_price: Option<Money>,
    /// Quantity, `1..=stock_limit` for purchasable lines.
    pub quantity: u32,
    /// Units available. Zero means unpurchasable.
    pub stock_limit: u32,
}

impl CartLine {
    /// Create a new cart line.
    pub fn new(
        product: ProductRef,
        name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
        stock_limit: u32,
    ) -> Self {
        Self {
            product,
            name: name.into(),
            image: None,
            unit_price,
            compare_at_price: None,
            quantity,
            stock_limit,
        }
    }

    /// Set the compare-at price.
    pub fn with_compare_at(mut self, price: Money) -> Self {
        self.compare_at_price = Some(price);
        self
    }

    /// `unit_price * quantity`.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price.try_multiply(self.quantity)
    }

    /// Amount saved against the compare-at price, if it is higher.
    pub fn savings(&self) -> Result<Option<Money>, CommerceError> {
        match self.compare_at_price {
            Some(compare) if compare.amount > self.unit_price.amount => {
                let per_unit = compare.try_subtract(&self.unit_price)?;
                Ok(Some(per_unit.try_multiply(self.quantity)?))
            }
            _ => Ok(None),
        }
    }

    /// Whether this line can be bought at all.
    pub fn is_purchasable(&self) -> bool {
        self.stock_limit > 0
    }

    /// Whether only a handful of units remain.
    pub fn is_low_stock(&self) -> bool {
        self.stock_limit > 0 && self.stock_limit < LOW_STOCK_THRESHOLD
    }

    /// Check `quantity` against this line's stock bound.
    pub fn check_quantity(&self, quantity: i64) -> Result<u32, CommerceError> {
        if quantity < 1 || quantity > i64::from(self.stock_limit) {
            return Err(CommerceError::InvalidQuantity {
                product: self.product.clone(),
                requested: quantity,
                stock_limit: self.stock_limit,
            });
        }
        // Bounded by stock_limit above.
        Ok(quantity as u32)
    }
}

/// Totals derived from the current cart lines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// Sum of quantities.
    pub item_count: u64,
    /// Sum of `unit_price * quantity`.
    pub subtotal: Money,
}

/// A snapshot of cart contents as returned by the cart service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Lines in the cart. Order carries no meaning.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Create a cart from lines.
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get a line by product.
    pub fn line(&self, product: &ProductRef) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product == product)
    }

    /// Take `product`'s line from `source`: replace ours, add it, or drop
    /// ours when `source` has none. Other lines are left alone.
    pub fn merge_line_from(&mut self, source: &Cart, product: &ProductRef) {
        let incoming = source.line(product).cloned();
        let existing = self.lines.iter().position(|l| &l.product == product);
        match (existing, incoming) {
            (Some(i), Some(line)) => self.lines[i] = line,
            (Some(i), None) => {
                self.lines.remove(i);
            }
            (None, Some(line)) => self.lines.push(line),
            (None, None) => {}
        }
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Recompute totals from the lines.
    pub fn totals(&self, currency: Currency) -> Result<CartTotals, CommerceError> {
        let line_totals = self
            .lines
            .iter()
            .map(CartLine::line_total)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CartTotals {
            item_count: self.item_count(),
            subtotal: Money::try_sum(line_totals.iter(), currency)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    #[test]
    fn test_totals() {
        let cart = Cart::new(vec![
            CartLine::new(ProductRef::new("a"), "A", usd(dec!(10.00)), 2, 5),
            CartLine::new(ProductRef::new("b"), "B", usd(dec!(20.50)), 1, 5),
        ]);
        let totals = cart.totals(Currency::USD).unwrap();
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.subtotal.amount, dec!(40.50));
    }

    #[test]
    fn test_merge_line_from_touches_one_line() {
        let a = |q| CartLine::new(ProductRef::new("a"), "A", usd(dec!(10.00)), q, 9);
        let b = |q| CartLine::new(ProductRef::new("b"), "B", usd(dec!(5.00)), q, 9);
        let mut cart = Cart::new(vec![a(1), b(5)]);

        // The response still shows b at its old quantity; only a is taken.
        cart.merge_line_from(&Cart::new(vec![a(2), b(1)]), &ProductRef::new("a"));
        assert_eq!(cart, Cart::new(vec![a(2), b(5)]));

        cart.merge_line_from(&Cart::new(vec![b(1)]), &ProductRef::new("a"));
        assert_eq!(cart, Cart::new(vec![b(5)]));

        cart.merge_line_from(&Cart::new(vec![a(3)]), &ProductRef::new("a"));
        assert_eq!(cart, Cart::new(vec![b(5), a(3)]));
    }

    #[test]
    fn test_empty_cart_totals() {
        let totals = Cart::default().totals(Currency::USD).unwrap();
        assert_eq!(totals.item_count, 0);
        assert!(totals.subtotal.is_zero());
    }

    #[test]
    fn test_check_quantity_bounds() {
        let line = CartLine::new(ProductRef::new("a"), "A", usd(dec!(5)), 1, 3);
        assert_eq!(line.check_quantity(3).unwrap(), 3);
        assert!(matches!(
            line.check_quantity(0),
            Err(CommerceError::InvalidQuantity { requested: 0, .. })
        ));
        assert!(line.check_quantity(4).is_err());
    }

    #[test]
    fn test_savings() {
        let line = CartLine::new(ProductRef::new("a"), "A", usd(dec!(80)), 2, 10)
            .with_compare_at(usd(dec!(100)));
        assert_eq!(line.savings().unwrap().unwrap().amount, dec!(40));

        let no_sale = CartLine::new(ProductRef::new("b"), "B", usd(dec!(80)), 1, 10)
            .with_compare_at(usd(dec!(60)));
        assert_eq!(no_sale.savings().unwrap(), None);
    }

    #[test]
    fn test_stock_flags() {
        let low = CartLine::new(ProductRef::new("a"), "A", usd(dec!(1)), 1, 4);
        assert!(low.is_low_stock());
        assert!(low.is_purchasable());

        let gone = CartLine::new(ProductRef::new("b"), "B", usd(dec!(1)), 1, 0);
        assert!(!gone.is_low_stock());
        assert!(!gone.is_purchasable());
    }
}
