//! Shopping cart module.
//!
//! Contains the cart line types, coupon handling, the remote cart service
//! seam, and the session cart store.

mod coupon;
mod line;
mod service;
mod store;

pub use coupon::{Coupon, CouponResolver, CouponState};
pub use line::{Cart, CartLine, CartTotals, LOW_STOCK_THRESHOLD};
pub use service::{CartService, Catalog, ProductSnapshot};
pub use store::CartStore;
