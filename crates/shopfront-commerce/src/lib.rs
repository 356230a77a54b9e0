//! Storefront cart, pricing and checkout core.
//!
//! - **Cart**: a session cart store that commits changes only after the
//!   remote cart service acknowledges them, plus coupon handling
//! - **Pricing**: a pure engine that itemizes subtotal, discount, shipping,
//!   tax and total under a configurable policy
//! - **Checkout**: the shipping / payment / review state machine and order
//!   placement
//! - **Identity**: who is signed in, for gating and form pre-fill
//!
//! Remote collaborators sit behind the [`CartService`], [`Catalog`] and
//! [`OrderService`] traits.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_commerce::prelude::*;
//!
//! let cart = Arc::new(CartStore::new(cart_service, catalog, identity.clone(), Currency::USD));
//! cart.refresh().await?;
//! cart.add_item(&ProductRef::new("65f1c0"), 2).await?;
//! cart.apply_coupon(&policy.coupons, "save10")?;
//!
//! let quote = cart.quote(&policy)?.rounded();
//! println!("Total: {}", quote.total);
//!
//! let checkout = Checkout::begin(&identity, cart.clone(), orders, Arc::new(policy))?;
//! checkout.submit_shipping()?;
//! checkout.with_session(|s| *s.card_mut() = CardDetails::new("4242424242424242", "Ada", "1227", "123"))?;
//! checkout.submit_payment()?;
//! let order = checkout.place_order().await?;
//! ```

pub mod cart;
pub mod checkout;
pub mod error;
pub mod identity;
pub mod ids;
pub mod money;
pub mod pricing;

pub use cart::{CartService, Catalog};
pub use checkout::OrderService;
pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Cart
    pub use crate::cart::{
        Cart, CartLine, CartService, CartStore, CartTotals, Catalog, Coupon, CouponResolver,
        CouponState, ProductSnapshot,
    };

    // Pricing
    pub use crate::pricing::{compute_breakdown, PricingBreakdown, PricingPolicy, TaxBasis};

    // Checkout
    pub use crate::checkout::{
        CardDetails, Checkout, CheckoutSession, CheckoutStage, Field, GiftOptions, Navigation,
        OrderRequest, OrderService, OrderStatus, PaymentMethod, PlacedOrder, ShippingAddress,
        ShippingMethod, ValidationErrors,
    };

    // Identity
    pub use crate::identity::{IdentityStore, UserProfile};
}
