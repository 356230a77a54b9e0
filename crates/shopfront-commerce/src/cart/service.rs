//! Remote collaborators the cart store talks to.

use crate::cart::{Cart, CartLine};
use crate::error::CommerceError;
use crate::ids::ProductRef;
use crate::money::Money;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Remote cart persistence.
///
/// Every mutation returns the full updated cart; the server is
/// authoritative on stock clamping.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Fetch the current cart.
    async fn get_cart(&self) -> Result<Cart, CommerceError>;

    /// Add `quantity` units of `product`, merging with an existing line.
    async fn add_to_cart(&self, product: &ProductRef, quantity: u32)
        -> Result<Cart, CommerceError>;

    /// Replace the quantity of an existing line.
    async fn update_item(&self, product: &ProductRef, quantity: u32)
        -> Result<Cart, CommerceError>;

    /// Remove a line.
    async fn remove_item(&self, product: &ProductRef) -> Result<Cart, CommerceError>;

    /// Remove every line.
    async fn clear_cart(&self) -> Result<(), CommerceError>;
}

/// Pricing and stock snapshot of a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    /// Product reference.
    pub product: ProductRef,
    /// Display name.
    pub name: String,
    /// Primary image URL.
    pub image: Option<String>,
    /// Current unit price.
    pub unit_price: Money,
    /// Compare-at price, if on sale.
    pub compare_at_price: Option<Money>,
    /// Units in stock.
    pub stock_limit: u32,
}

impl ProductSnapshot {
    /// Whether the product can be added to a cart.
    pub fn in_stock(&self) -> bool {
        self.stock_limit > 0
    }

    /// Build a cart line for `quantity` units of this product.
    pub fn to_line(&self, quantity: u32) -> CartLine {
        CartLine {
            product: self.product.clone(),
            name: self.name.clone(),
            image: self.image.clone(),
            unit_price: self.unit_price,
            compare_at_price: self.compare_at_price,
            quantity,
            stock_limit: self.stock_limit,
        }
    }
}

/// Source of product pricing and stock snapshots.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Look up a product.
    async fn snapshot(&self, product: &ProductRef) -> Result<ProductSnapshot, CommerceError>;
}
