//! End-to-end cart and checkout tests against in-memory services.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shopfront_commerce::checkout::CHECKOUT_PATH;
use shopfront_commerce::identity::ProfileAddress;
use shopfront_commerce::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

struct FakeCartService {
    products: HashMap<ProductRef, ProductSnapshot>,
    cart: Mutex<Cart>,
    fail: AtomicBool,
}

#[async_trait]
impl CartService for FakeCartService {
    async fn get_cart(&self) -> Result<Cart, CommerceError> {
        self.check()?;
        Ok(self.cart.lock().unwrap().clone())
    }

    async fn add_to_cart(&self, product: &ProductRef, quantity: u32) -> Result<Cart, CommerceError> {
        self.check()?;
        let snapshot = &self.products[product];
        let mut cart = self.cart.lock().unwrap();
        match cart.lines.iter_mut().find(|l| &l.product == product) {
            Some(line) => line.quantity = (line.quantity + quantity).min(snapshot.stock_limit),
            None => cart.lines.push(snapshot.to_line(quantity)),
        }
        Ok(cart.clone())
    }

    async fn update_item(&self, product: &ProductRef, quantity: u32) -> Result<Cart, CommerceError> {
        self.check()?;
        let mut cart = self.cart.lock().unwrap();
        if let Some(line) = cart.lines.iter_mut().find(|l| &l.product == product) {
            line.quantity = quantity;
        }
        Ok(cart.clone())
    }

    async fn remove_item(&self, product: &ProductRef) -> Result<Cart, CommerceError> {
        self.check()?;
        let mut cart = self.cart.lock().unwrap();
        cart.lines.retain(|l| &l.product != product);
        Ok(cart.clone())
    }

    async fn clear_cart(&self) -> Result<(), CommerceError> {
        self.check()?;
        self.cart.lock().unwrap().lines.clear();
        Ok(())
    }
}

impl FakeCartService {
    fn check(&self) -> Result<(), CommerceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CommerceError::RemoteFailure("Network Error".into()));
        }
        Ok(())
    }
}

struct FakeCatalog(HashMap<ProductRef, ProductSnapshot>);

#[async_trait]
impl Catalog for FakeCatalog {
    async fn snapshot(&self, product: &ProductRef) -> Result<ProductSnapshot, CommerceError> {
        self.0
            .get(product)
            .cloned()
            .ok_or_else(|| CommerceError::RemoteFailure("Product not found".into()))
    }
}

/// Counts calls; can fail, or hold each call until released.
#[derive(Default)]
struct FakeOrderService {
    calls: AtomicUsize,
    fail: AtomicBool,
    hold: AtomicBool,
    release: Notify,
    last_request: Mutex<Option<OrderRequest>>,
}

#[async_trait]
impl OrderService for FakeOrderService {
    async fn create_order(&self, request: &OrderRequest) -> Result<PlacedOrder, CommerceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_request.lock().unwrap() = Some(request.clone());
        if self.hold.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(CommerceError::RemoteFailure(
                "Failed to place order. Please try again.".into(),
            ));
        }
        Ok(PlacedOrder {
            id: OrderId::new(format!("order-{}", n)),
            order_number: Some(format!("ORD-{:04}", n)),
            status: OrderStatus::Pending,
        })
    }
}

struct Harness {
    identity: Arc<IdentityStore>,
    service: Arc<FakeCartService>,
    orders: Arc<FakeOrderService>,
    cart: Arc<CartStore>,
    policy: Arc<PricingPolicy>,
}

impl Harness {
    fn new() -> Self {
        let products: HashMap<_, _> = [
            snapshot("widget", dec!(40.00), 10),
            snapshot("gadget", dec!(30.00), 3),
            snapshot("sold-out", dec!(5.00), 0),
        ]
        .into_iter()
        .map(|p| (p.product.clone(), p))
        .collect();

        let identity = Arc::new(IdentityStore::signed_in(
            UserProfile::new(UserId::new("u1"), "Ada Lovelace", "ada@example.com")
                .with_phone("555-0100")
                .with_address(ProfileAddress {
                    street: "1 Main St".into(),
                    city: "Springfield".into(),
                    state: "IL".into(),
                    zip_code: "62701".into(),
                    country: Some("United States".into()),
                }),
        ));
        let service = Arc::new(FakeCartService {
            products: products.clone(),
            cart: Mutex::new(Cart::default()),
            fail: AtomicBool::new(false),
        });
        let cart = Arc::new(CartStore::new(
            service.clone(),
            Arc::new(FakeCatalog(products)),
            identity.clone(),
            Currency::USD,
        ));

        Self {
            identity,
            service,
            orders: Arc::new(FakeOrderService::default()),
            cart,
            policy: Arc::new(PricingPolicy::default()),
        }
    }

    fn checkout(&self) -> Result<Checkout, CommerceError> {
        Checkout::begin(
            &self.identity,
            self.cart.clone(),
            self.orders.clone(),
            self.policy.clone(),
        )
    }

    /// Drive a fresh checkout to the review stage with a valid card.
    fn checkout_at_review(&self) -> Checkout {
        let checkout = self.checkout().unwrap();
        checkout.submit_shipping().unwrap();
        checkout
            .with_session(|s| {
                *s.card_mut() = CardDetails::new("4242 4242 4242 4242", "Ada Lovelace", "1227", "123")
            })
            .unwrap();
        checkout.submit_payment().unwrap();
        checkout
    }
}

fn snapshot(id: &str, price: Decimal, stock: u32) -> ProductSnapshot {
    ProductSnapshot {
        product: ProductRef::new(id),
        name: id.to_string(),
        image: Some(format!("https://img.example.com/{}.jpg", id)),
        unit_price: Money::new(price, Currency::USD),
        compare_at_price: None,
        stock_limit: stock,
    }
}

#[tokio::test]
async fn test_scenario_a_coupon_and_free_shipping() {
    let h = Harness::new();
    h.cart.add_item(&ProductRef::new("widget"), 3).await.unwrap();
    h.cart.apply_coupon(&h.policy.coupons, "save10").unwrap();

    let quote = h.cart.quote(&h.policy).unwrap();
    assert_eq!(quote.subtotal.amount, dec!(120.00));
    assert_eq!(quote.discount.amount, dec!(12.00));
    assert!(quote.shipping.is_zero());
    assert_eq!(quote.tax.amount, dec!(9.60));
    assert_eq!(quote.total.amount, dec!(117.60));
    assert_eq!(quote.rounded().total.display(), "$117.60");

    let checkout = h.checkout_at_review();
    let order = checkout.place_order().await.unwrap();
    assert_eq!(order.display_number(), "ORD-0001");

    let request = h.orders.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.total_price, dec!(117.60));
    assert_eq!(request.discount_price, dec!(12.00));
    assert_eq!(request.coupon_code.as_deref(), Some("SAVE10"));
    assert_eq!(request.lines[0].quantity, 3);
    assert_eq!(request.shipping_address.zip_code, "62701");

    assert!(h.cart.is_empty());
    assert!(!h.cart.coupon().is_applied());
    assert_eq!(checkout.stage(), Some(CheckoutStage::Complete));
}

#[tokio::test]
async fn test_scenario_b_express_is_never_free() {
    let h = Harness::new();
    h.cart.add_item(&ProductRef::new("gadget"), 1).await.unwrap();

    let checkout = h.checkout().unwrap();
    checkout
        .with_session(|s| s.set_shipping_method(ShippingMethod::Express))
        .unwrap();

    let breakdown = checkout.breakdown().unwrap();
    assert_eq!(breakdown.subtotal.amount, dec!(30.00));
    assert_eq!(breakdown.shipping.amount, dec!(9.99));
    assert_eq!(breakdown.tax.amount, dec!(2.40));
    assert_eq!(breakdown.total.amount, dec!(42.39));
}

#[tokio::test]
async fn test_scenario_c_zero_quantity_is_rejected() {
    let h = Harness::new();
    let widget = ProductRef::new("widget");
    h.cart.add_item(&widget, 2).await.unwrap();

    let err = h.cart.set_quantity(&widget, 0).await.unwrap_err();
    assert!(matches!(err, CommerceError::InvalidQuantity { requested: 0, .. }));
    assert_eq!(h.cart.line(&widget).unwrap().quantity, 2);
    assert_eq!(h.cart.totals().unwrap().subtotal.amount, dec!(80.00));
}

#[tokio::test]
async fn test_scenario_d_duplicate_submission_is_rejected() {
    let h = Harness::new();
    h.cart.add_item(&ProductRef::new("widget"), 1).await.unwrap();
    let checkout = h.checkout_at_review();
    h.orders.hold.store(true, Ordering::SeqCst);

    let (first, second) = futures::join!(checkout.place_order(), async {
        let second = checkout.place_order().await;
        h.orders.release.notify_one();
        second
    });

    assert!(first.is_ok());
    assert_eq!(second.unwrap_err(), CommerceError::SubmissionInFlight);
    assert_eq!(h.orders.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_order_returns_to_review_and_retries() {
    let h = Harness::new();
    h.cart.add_item(&ProductRef::new("widget"), 1).await.unwrap();
    let checkout = h.checkout_at_review();

    h.orders.fail.store(true, Ordering::SeqCst);
    assert!(checkout.place_order().await.unwrap_err().is_remote());
    assert_eq!(checkout.stage(), Some(CheckoutStage::Review));
    assert_eq!(h.cart.lines().len(), 1);
    let card_kept = checkout.with_session(|s| s.card().number().to_string()).unwrap();
    assert_eq!(card_kept, "4242 4242 4242 4242");

    h.orders.fail.store(false, Ordering::SeqCst);
    checkout.place_order().await.unwrap();
    assert_eq!(h.orders.calls.load(Ordering::SeqCst), 2);
    assert!(h.cart.is_empty());
}

#[tokio::test]
async fn test_late_order_response_after_leaving() {
    let h = Harness::new();
    h.cart.add_item(&ProductRef::new("widget"), 1).await.unwrap();
    let checkout = h.checkout_at_review();
    h.orders.hold.store(true, Ordering::SeqCst);

    let (placed, ()) = futures::join!(checkout.place_order(), async {
        checkout.leave();
        h.orders.release.notify_one();
    });

    assert!(placed.is_ok());
    assert_eq!(checkout.stage(), None);
    assert!(h.cart.is_empty());
    assert!(checkout.submit_shipping().is_err());
}

#[tokio::test]
async fn test_checkout_entry_guards() {
    let h = Harness::new();
    assert_eq!(h.checkout().err(), Some(CommerceError::EmptyCart));

    h.cart.add_item(&ProductRef::new("widget"), 1).await.unwrap();
    h.identity.sign_out();
    h.cart.discard();
    assert_eq!(
        h.checkout().err(),
        Some(CommerceError::auth_required(CHECKOUT_PATH))
    );
}

#[tokio::test]
async fn test_stage_guard_and_back_navigation() {
    let h = Harness::new();
    h.cart.add_item(&ProductRef::new("widget"), 1).await.unwrap();
    let checkout = h.checkout().unwrap();

    checkout
        .with_session(|s| s.shipping_address_mut().phone.clear())
        .unwrap();
    let err = checkout.submit_shipping().unwrap_err();
    assert!(err.validation_errors().unwrap().get(Field::Phone).is_some());
    assert_eq!(checkout.stage(), Some(CheckoutStage::Shipping));

    checkout
        .with_session(|s| s.shipping_address_mut().phone = "555-0100".into())
        .unwrap();
    checkout.submit_shipping().unwrap();
    assert_eq!(checkout.go_back().unwrap(), Navigation::Stage(CheckoutStage::Shipping));
    checkout.submit_shipping().unwrap();
    assert_eq!(checkout.stage(), Some(CheckoutStage::Payment));

    checkout.go_back().unwrap();
    assert_eq!(checkout.go_back().unwrap(), Navigation::LeaveCheckout);
    assert!(!checkout.is_active());
}

#[tokio::test]
async fn test_remote_failure_leaves_cart_untouched() {
    let h = Harness::new();
    let widget = ProductRef::new("widget");
    h.cart.add_item(&widget, 2).await.unwrap();

    h.service.fail.store(true, Ordering::SeqCst);
    assert!(h.cart.increment(&widget).await.is_err());
    assert!(h.cart.add_item(&ProductRef::new("gadget"), 1).await.is_err());
    assert_eq!(h.cart.line(&widget).unwrap().quantity, 2);
    assert_eq!(h.cart.lines().len(), 1);

    assert_eq!(
        h.cart.add_item(&ProductRef::new("sold-out"), 1).await.unwrap_err(),
        CommerceError::OutOfStock(ProductRef::new("sold-out"))
    );
}

#[tokio::test]
async fn test_sign_out_discards_local_cart_only() {
    let h = Harness::new();
    h.cart.add_item(&ProductRef::new("widget"), 2).await.unwrap();

    h.identity.sign_out();
    h.cart.discard();
    assert!(h.cart.is_empty());

    h.identity.sign_in(UserProfile::new(UserId::new("u1"), "Ada", "ada@example.com"));
    let totals = h.cart.refresh().await.unwrap();
    assert_eq!(totals.item_count, 2);
}
