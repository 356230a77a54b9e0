//! Commerce error types.

use crate::checkout::ValidationErrors;
use crate::ids::ProductRef;
use thiserror::Error;

/// Errors that can occur in cart, pricing and checkout operations.
///
/// Every variant is recoverable: the operation that produced it is rejected
/// and the state it would have mutated is left as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// No signed-in user. `return_to` is where to go after signing in.
    #[error("Authentication required")]
    AuthenticationRequired { return_to: Option<String> },

    /// The product has no stock.
    #[error("Out of stock: {0}")]
    OutOfStock(ProductRef),

    /// Quantity outside `1..=stock_limit`.
    #[error("Invalid quantity {requested} for {product} (available: {stock_limit})")]
    InvalidQuantity {
        product: ProductRef,
        requested: i64,
        stock_limit: u32,
    },

    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(ProductRef),

    /// Coupon code does not match any entry.
    #[error("Invalid coupon code: {0}")]
    CouponNotFound(String),

    /// Coupon input was blank.
    #[error("Please enter a coupon code")]
    EmptyCode,

    /// One or more form fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Network or server error from a remote service.
    #[error("{0}")]
    RemoteFailure(String),

    /// Invalid checkout state transition.
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidCheckoutTransition { from: String, to: String },

    /// Checkout needs a non-empty cart.
    #[error("Your cart is empty")]
    EmptyCart,

    /// An order submission is already running.
    #[error("Order submission already in progress")]
    SubmissionInFlight,

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Pricing policy failed validation.
    #[error("Invalid pricing policy: {0}")]
    InvalidPolicy(String),
}

impl CommerceError {
    /// Build an authentication error that returns to `path` after sign-in.
    pub fn auth_required(path: impl Into<String>) -> Self {
        CommerceError::AuthenticationRequired {
            return_to: Some(path.into()),
        }
    }

    /// Whether the caller can retry or correct input. Nothing here is fatal.
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Check if this carries per-field validation errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, CommerceError::Validation(_))
    }

    /// Check if this came from a remote service.
    pub fn is_remote(&self) -> bool {
        matches!(self, CommerceError::RemoteFailure(_))
    }

    /// Per-field errors, if any.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            CommerceError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::RemoteFailure(format!("Malformed response: {}", e))
    }
}

impl From<toml::de::Error> for CommerceError {
    fn from(e: toml::de::Error) -> Self {
        CommerceError::InvalidPolicy(e.to_string())
    }
}
