//! Cart store: the single owner of cart contents for a session.
//!
//! Mutations are committed only after the cart service acknowledges them,
//! so a remote failure leaves local state exactly as it was. In-flight
//! mutations are tracked per product so a UI can disable one line's
//! controls without locking the whole cart.
//!
//! A mutation response only updates the line it was issued for, so
//! overlapping edits on different lines never undo each other. When two
//! mutations on the same line overlap, only the response to the most
//! recently submitted one is applied. Clearing or discarding the cart
//! invalidates every mutation still in flight.

use crate::cart::service::{CartService, Catalog};
use crate::cart::{Cart, CartLine, CartTotals, CouponResolver, CouponState};
use crate::checkout::ShippingMethod;
use crate::error::CommerceError;
use crate::identity::IdentityStore;
use crate::ids::ProductRef;
use crate::money::Currency;
use crate::pricing::{compute_breakdown, PricingBreakdown, PricingPolicy};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Session-scoped cart state.
pub struct CartStore {
    service: Arc<dyn CartService>,
    catalog: Arc<dyn Catalog>,
    identity: Arc<IdentityStore>,
    currency: Currency,
    cart: Mutex<Cart>,
    coupon: Mutex<CouponState>,
    in_flight: DashMap<ProductRef, u64>,
    next_ticket: AtomicU64,
    /// Tickets below this were issued before the last reset. Written with
    /// the cart lock held.
    reset_mark: AtomicU64,
    /// Highest ticket whose result reached the cart. Written with the cart
    /// lock held.
    last_applied: AtomicU64,
}

impl CartStore {
    /// Create an empty store. Call [`CartStore::refresh`] to load the
    /// remote cart.
    pub fn new(
        service: Arc<dyn CartService>,
        catalog: Arc<dyn Catalog>,
        identity: Arc<IdentityStore>,
        currency: Currency,
    ) -> Self {
        Self {
            service,
            catalog,
            identity,
            currency,
            cart: Mutex::new(Cart::default()),
            coupon: Mutex::new(CouponState::none()),
            in_flight: DashMap::new(),
            next_ticket: AtomicU64::new(1),
            reset_mark: AtomicU64::new(0),
            last_applied: AtomicU64::new(0),
        }
    }

    /// Copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.cart().clone()
    }

    /// Copy of the current lines.
    pub fn lines(&self) -> Vec<CartLine> {
        self.cart().lines.clone()
    }

    /// Copy of one line.
    pub fn line(&self, product: &ProductRef) -> Option<CartLine> {
        self.cart().line(product).cloned()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.cart().is_empty()
    }

    /// Item count and subtotal, recomputed from the current lines.
    pub fn totals(&self) -> Result<CartTotals, CommerceError> {
        self.cart().totals(self.currency)
    }

    /// Whether a mutation on `product` is awaiting the cart service.
    pub fn is_mutating(&self, product: &ProductRef) -> bool {
        self.in_flight.contains_key(product)
    }

    /// Products with a mutation in flight.
    pub fn mutating(&self) -> Vec<ProductRef> {
        self.in_flight.iter().map(|e| e.key().clone()).collect()
    }

    /// Reload the cart from the cart service.
    ///
    /// If the cart changed locally while the load was in flight, the loaded
    /// copy is older than what the store holds and is dropped.
    pub async fn refresh(&self) -> Result<CartTotals, CommerceError> {
        let started = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        let loaded = self.service.get_cart().await.inspect_err(|e| {
            warn!(error = %e, "failed to load cart");
        })?;
        {
            let mut cart = self.cart();
            if self.last_applied.load(Ordering::SeqCst) > started {
                debug!("cart changed during reload, keeping local copy");
            } else {
                *cart = loaded;
                self.last_applied.fetch_max(started, Ordering::SeqCst);
            }
        }
        self.totals()
    }

    /// Add `quantity` units of `product`, merging into an existing line.
    ///
    /// The merged quantity is clamped to the product's stock; adding to a
    /// line already at its limit is a no-op.
    #[tracing::instrument(skip(self, product), fields(product = %product))]
    pub async fn add_item(
        &self,
        product: &ProductRef,
        quantity: u32,
    ) -> Result<CartTotals, CommerceError> {
        if !self.identity.is_authenticated() {
            return Err(CommerceError::AuthenticationRequired { return_to: None });
        }

        let snapshot = self.catalog.snapshot(product).await?;
        if !snapshot.in_stock() {
            return Err(CommerceError::OutOfStock(product.clone()));
        }
        if quantity == 0 {
            return Err(CommerceError::InvalidQuantity {
                product: product.clone(),
                requested: 0,
                stock_limit: snapshot.stock_limit,
            });
        }

        let existing = self.line(product).map(|l| l.quantity).unwrap_or(0);
        let room = snapshot.stock_limit.saturating_sub(existing);
        let to_add = quantity.min(room);
        if to_add == 0 {
            debug!(existing, "line already at stock limit");
            return self.totals();
        }

        let flight = self.begin(product);
        let cart = self
            .service
            .add_to_cart(product, to_add)
            .await
            .inspect_err(|e| warn!(error = %e, "add to cart failed"))?;
        self.commit(&flight, cart);
        debug!(added = to_add, "item added");
        self.totals()
    }

    /// Replace the quantity of an existing line.
    ///
    /// Fails with [`CommerceError::InvalidQuantity`] outside
    /// `1..=stock_limit`, leaving the line untouched.
    #[tracing::instrument(skip(self, product), fields(product = %product))]
    pub async fn set_quantity(
        &self,
        product: &ProductRef,
        quantity: i64,
    ) -> Result<CartTotals, CommerceError> {
        let line = self
            .line(product)
            .ok_or_else(|| CommerceError::ItemNotInCart(product.clone()))?;
        let quantity = line.check_quantity(quantity)?;

        let flight = self.begin(product);
        let cart = self
            .service
            .update_item(product, quantity)
            .await
            .inspect_err(|e| warn!(error = %e, "quantity update failed"))?;
        self.commit(&flight, cart);
        debug!(quantity, "quantity updated");
        self.totals()
    }

    /// Add one unit to a line.
    pub async fn increment(&self, product: &ProductRef) -> Result<CartTotals, CommerceError> {
        let line = self
            .line(product)
            .ok_or_else(|| CommerceError::ItemNotInCart(product.clone()))?;
        if !line.is_purchasable() {
            return Err(CommerceError::OutOfStock(product.clone()));
        }
        self.set_quantity(product, i64::from(line.quantity) + 1).await
    }

    /// Take one unit off a line; the line is removed when it would drop
    /// below one.
    pub async fn decrement(&self, product: &ProductRef) -> Result<CartTotals, CommerceError> {
        let line = self
            .line(product)
            .ok_or_else(|| CommerceError::ItemNotInCart(product.clone()))?;
        if line.quantity <= 1 {
            return self.remove_item(product).await;
        }
        self.set_quantity(product, i64::from(line.quantity) - 1).await
    }

    /// Remove a line. Removing a product that is not in the cart succeeds
    /// without contacting the cart service.
    #[tracing::instrument(skip(self, product), fields(product = %product))]
    pub async fn remove_item(&self, product: &ProductRef) -> Result<CartTotals, CommerceError> {
        if self.line(product).is_none() {
            return self.totals();
        }

        let flight = self.begin(product);
        let cart = self
            .service
            .remove_item(product)
            .await
            .inspect_err(|e| warn!(error = %e, "remove from cart failed"))?;
        self.commit(&flight, cart);
        debug!("item removed");
        self.totals()
    }

    /// Empty the cart remotely, then locally. Also drops the coupon.
    pub async fn clear(&self) -> Result<(), CommerceError> {
        self.service
            .clear_cart()
            .await
            .inspect_err(|e| warn!(error = %e, "clear cart failed"))?;
        self.discard();
        debug!("cart cleared");
        Ok(())
    }

    /// Drop local cart state without contacting the cart service (sign-out).
    ///
    /// Responses to mutations still in flight are ignored from here on.
    pub fn discard(&self) {
        {
            let mut cart = self.cart();
            *cart = Cart::default();
            let mark = self.next_ticket.fetch_add(1, Ordering::SeqCst);
            self.reset_mark.store(mark, Ordering::SeqCst);
            self.last_applied.fetch_max(mark, Ordering::SeqCst);
        }
        *self.coupon_state() = CouponState::none();
    }

    /// Apply a coupon code, replacing any coupon already applied.
    ///
    /// On error the current coupon is kept.
    pub fn apply_coupon(
        &self,
        resolver: &CouponResolver,
        input: &str,
    ) -> Result<CouponState, CommerceError> {
        let state = CouponState::resolve(resolver, input)?;
        *self.coupon_state() = state.clone();
        debug!(code = ?state.code(), "coupon applied");
        Ok(state)
    }

    /// Remove the applied coupon.
    pub fn remove_coupon(&self) {
        *self.coupon_state() = CouponState::none();
    }

    /// Current coupon state.
    pub fn coupon(&self) -> CouponState {
        self.coupon_state().clone()
    }

    /// Price the cart for the cart page (standard shipping).
    pub fn quote(&self, policy: &PricingPolicy) -> Result<PricingBreakdown, CommerceError> {
        self.quote_with(ShippingMethod::Standard, policy)
    }

    /// Price the cart with a given shipping method.
    pub fn quote_with(
        &self,
        shipping: ShippingMethod,
        policy: &PricingPolicy,
    ) -> Result<PricingBreakdown, CommerceError> {
        let lines = self.lines();
        let coupon = self.coupon();
        compute_breakdown(&lines, &coupon, shipping, policy)
    }

    fn cart(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn coupon_state(&self) -> MutexGuard<'_, CouponState> {
        self.coupon.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, product: &ProductRef) -> InFlight<'_> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        self.in_flight.insert(product.clone(), ticket);
        InFlight {
            in_flight: &self.in_flight,
            product: product.clone(),
            ticket,
        }
    }

    /// Apply the mutated product's line from a service response.
    fn commit(&self, flight: &InFlight<'_>, response: Cart) {
        let mut cart = self.cart();
        if flight.ticket < self.reset_mark.load(Ordering::SeqCst) {
            debug!(product = %flight.product, "discarding cart response issued before reset");
        } else if !flight.is_latest() {
            debug!(product = %flight.product, "discarding superseded cart response");
        } else {
            cart.merge_line_from(&response, &flight.product);
            self.last_applied.fetch_max(flight.ticket, Ordering::SeqCst);
        }
    }
}

/// Marks a product as having a mutation in flight until dropped.
struct InFlight<'a> {
    in_flight: &'a DashMap<ProductRef, u64>,
    product: ProductRef,
    ticket: u64,
}

impl InFlight<'_> {
    fn is_latest(&self) -> bool {
        self.in_flight
            .get(&self.product)
            .map(|t| *t == self.ticket)
            .unwrap_or(false)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.in_flight
            .remove_if(&self.product, |_, ticket| *ticket == self.ticket);
    }
}
