//! Order request payload and the remote order service.

use crate::cart::CartLine;
use crate::checkout::{PaymentMethod, ShippingAddress, ShippingMethod};
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductRef};
use crate::pricing::PricingBreakdown;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status as reported by the order service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting processing.
    #[default]
    Pending,
    /// Order being prepared.
    Processing,
    /// Order shipped.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a wire value. Unknown values fall back to pending.
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "processing" => OrderStatus::Processing,
            "shipped" => OrderStatus::Shipped,
            "delivered" => OrderStatus::Delivered,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Pending,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gift wrapping options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftOptions {
    pub is_gift: bool,
    pub message: String,
}

impl GiftOptions {
    /// Message sent with the order; empty unless this is a gift.
    pub fn order_message(&self) -> &str {
        if self.is_gift {
            &self.message
        } else {
            ""
        }
    }
}

/// A line snapshot inside an order request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: ProductRef,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product: line.product.clone(),
            name: line.name.clone(),
            image: line.image.clone(),
            price: line.unit_price.rounded().amount,
            quantity: line.quantity,
        }
    }
}

/// Payload for the order service's create call.
///
/// Card details are deliberately absent; only the payment method travels.
///
/// Each amount is rounded to the currency's minor unit on its own, and
/// `total_price` is the exact total rounded once. The rounded parts can
/// therefore miss `total_price` by a cent; the server is expected to trust
/// `total_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(rename = "items")]
    pub lines: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
    #[serde(with = "rust_decimal::serde::float")]
    pub items_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub is_gift: bool,
    pub gift_message: String,
}

impl OrderRequest {
    /// Assemble a request. Amounts are rounded here, at the wire boundary.
    pub fn new(
        lines: &[CartLine],
        shipping_address: &ShippingAddress,
        payment_method: PaymentMethod,
        breakdown: &PricingBreakdown,
        gift: &GiftOptions,
    ) -> Self {
        let priced = breakdown.rounded();
        Self {
            lines: lines.iter().map(OrderLine::from).collect(),
            shipping_address: shipping_address.clone(),
            shipping_method: priced.shipping_method,
            payment_method,
            items_price: priced.subtotal.amount,
            discount_price: priced.discount.amount,
            coupon_code: priced.coupon_code,
            shipping_price: priced.shipping.amount,
            tax_price: priced.tax.amount,
            total_price: priced.total.amount,
            is_gift: gift.is_gift,
            gift_message: gift.order_message().to_string(),
        }
    }
}

/// What the order service returns for a created order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub order_number: Option<String>,
    pub status: OrderStatus,
}

impl PlacedOrder {
    /// Order number if the server assigned one, otherwise the ID.
    pub fn display_number(&self) -> &str {
        self.order_number.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Remote order creation.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Create an order. Not idempotent: each call may create an order.
    async fn create_order(&self, request: &OrderRequest) -> Result<PlacedOrder, CommerceError>;
}
