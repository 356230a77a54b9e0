//! JSON shapes used by the storefront API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_commerce::cart::{Cart, ProductSnapshot};
use shopfront_commerce::checkout::{OrderStatus, PlacedOrder};
use shopfront_commerce::{Currency, Money, OrderId, ProductRef};

#[derive(Debug, Deserialize)]
pub(crate) struct ImageDto {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub compare_price: Option<Decimal>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub images: Vec<ImageDto>,
}

impl ProductDto {
    pub fn into_snapshot(self, currency: Currency) -> ProductSnapshot {
        ProductSnapshot {
            product: ProductRef::new(self.id),
            name: self.name,
            image: self.images.into_iter().next().map(|i| i.url),
            unit_price: Money::new(self.price, currency),
            compare_at_price: self
                .compare_price
                .filter(|p| *p > Decimal::ZERO)
                .map(|p| Money::new(p, currency)),
            stock_limit: u32::try_from(self.stock.max(0)).unwrap_or(u32::MAX),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartItemDto {
    /// Null when the product was deleted after being carted.
    pub product: Option<ProductDto>,
    pub quantity: u32,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CartDto {
    #[serde(default)]
    pub items: Vec<CartItemDto>,
}

impl CartDto {
    pub fn into_cart(self, currency: Currency) -> Cart {
        Cart::new(
            self.items
                .into_iter()
                .filter_map(|item| {
                    item.product
                        .map(|p| p.into_snapshot(currency).to_line(item.quantity))
                })
                .collect(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartEnvelope {
    #[serde(default)]
    pub cart: Option<CartDto>,
}

impl CartEnvelope {
    pub fn into_cart(self, currency: Currency) -> Cart {
        self.cart.unwrap_or_default().into_cart(currency)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductEnvelope {
    pub product: ProductDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderDto {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<OrderDto> for PlacedOrder {
    fn from(dto: OrderDto) -> Self {
        PlacedOrder {
            id: OrderId::new(dto.id),
            order_number: dto.order_number,
            status: dto
                .status
                .as_deref()
                .map(OrderStatus::parse_lenient)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderEnvelope {
    pub order: OrderDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemRequest<'a> {
    pub product_id: &'a str,
    pub quantity: u32,
}
