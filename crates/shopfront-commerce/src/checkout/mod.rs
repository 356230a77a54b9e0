//! Checkout module.
//!
//! Contains the checkout state machine, its forms and their validation,
//! the order payload, and the orchestrator that places orders.

mod address;
mod controller;
mod flow;
mod format;
mod order;
mod payment;
mod shipping;
mod validation;

pub use address::{ShippingAddress, DEFAULT_COUNTRY};
pub use controller::Checkout;
pub use flow::{CheckoutSession, CheckoutStage, Navigation, CHECKOUT_PATH};
pub use format::{format_card_number, format_cvv, format_expiry};
pub use order::{GiftOptions, OrderLine, OrderRequest, OrderService, OrderStatus, PlacedOrder};
pub use payment::{validate_payment, CardDetails, PaymentMethod};
pub use shipping::ShippingMethod;
pub use validation::{Field, ValidationErrors};
