//! Remote cart, order and catalog services over the storefront API.

use crate::wire::{CartEnvelope, CartItemRequest, OrderEnvelope, ProductEnvelope};
use crate::{ApiClient, FetchError};
use async_trait::async_trait;
use shopfront_commerce::cart::{Cart, CartService, Catalog, ProductSnapshot};
use shopfront_commerce::checkout::{OrderRequest, OrderService, PlacedOrder};
use shopfront_commerce::{CommerceError, Currency, ProductRef};
use std::sync::Arc;

/// Opaque IDs go into URL paths as-is; refuse anything that would change
/// the path.
fn path_segment(product: &ProductRef) -> Result<&str, FetchError> {
    let id = product.as_str();
    if id.is_empty() || id.contains(&['/', '?', '#', '%'][..]) || id.chars().any(char::is_whitespace) {
        return Err(FetchError::InvalidUrl(format!("bad product id {:?}", id)));
    }
    Ok(id)
}

/// Cart persistence at `/cart`.
pub struct HttpCartService {
    client: Arc<ApiClient>,
    currency: Currency,
}

impl HttpCartService {
    /// Create a new cart service.
    pub fn new(client: Arc<ApiClient>, currency: Currency) -> Self {
        Self { client, currency }
    }

    async fn cart_from(&self, request: crate::RequestBuilder) -> Result<Cart, CommerceError> {
        let envelope: CartEnvelope = request.send().await?.error_for_status()?.json()?;
        Ok(envelope.into_cart(self.currency))
    }
}

#[async_trait]
impl CartService for HttpCartService {
    #[tracing::instrument(skip(self))]
    async fn get_cart(&self) -> Result<Cart, CommerceError> {
        self.cart_from(self.client.get("/cart")).await
    }

    #[tracing::instrument(skip(self))]
    async fn add_to_cart(&self, product: &ProductRef, quantity: u32) -> Result<Cart, CommerceError> {
        let body = CartItemRequest {
            product_id: path_segment(product)?,
            quantity,
        };
        self.cart_from(self.client.post("/cart/add").json(&body)?)
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn update_item(&self, product: &ProductRef, quantity: u32) -> Result<Cart, CommerceError> {
        let body = CartItemRequest {
            product_id: path_segment(product)?,
            quantity,
        };
        self.cart_from(self.client.put("/cart/update").json(&body)?)
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn remove_item(&self, product: &ProductRef) -> Result<Cart, CommerceError> {
        let path = format!("/cart/remove/{}", path_segment(product)?);
        self.cart_from(self.client.delete(path)).await
    }

    #[tracing::instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), CommerceError> {
        self.client
            .delete("/cart/clear")
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Order creation at `/orders`.
pub struct HttpOrderService {
    client: Arc<ApiClient>,
}

impl HttpOrderService {
    /// Create a new order service.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrderService for HttpOrderService {
    #[tracing::instrument(skip(self, request), fields(total = %request.total_price))]
    async fn create_order(&self, request: &OrderRequest) -> Result<PlacedOrder, CommerceError> {
        let envelope: OrderEnvelope = self
            .client
            .post("/orders")
            .json(request)?
            .send()
            .await?
            .error_for_status()?
            .json()?;
        Ok(envelope.order.into())
    }
}

/// Product snapshots from `/products/id/{id}`.
pub struct HttpCatalog {
    client: Arc<ApiClient>,
    currency: Currency,
}

impl HttpCatalog {
    /// Create a new catalog.
    pub fn new(client: Arc<ApiClient>, currency: Currency) -> Self {
        Self { client, currency }
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    #[tracing::instrument(skip(self))]
    async fn snapshot(&self, product: &ProductRef) -> Result<ProductSnapshot, CommerceError> {
        let path = format!("/products/id/{}", path_segment(product)?);
        let envelope: ProductEnvelope = self
            .client
            .get(path)
            .send()
            .await?
            .error_for_status()?
            .json()?;
        Ok(envelope.product.into_snapshot(self.currency))
    }
}
