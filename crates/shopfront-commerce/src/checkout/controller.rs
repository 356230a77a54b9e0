//! Checkout orchestration: drives a [`CheckoutSession`] against the cart
//! store and the remote order service.

use crate::cart::CartStore;
use crate::checkout::flow::{CheckoutSession, CheckoutStage, Navigation};
use crate::checkout::order::{OrderService, PlacedOrder};
use crate::error::CommerceError;
use crate::identity::IdentityStore;
use crate::pricing::{PricingBreakdown, PricingPolicy};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// A live checkout for one session.
///
/// The session lock is never held across an await; a second placement while
/// one is in flight is rejected by the `Submitting` stage.
pub struct Checkout {
    cart: Arc<CartStore>,
    orders: Arc<dyn OrderService>,
    policy: Arc<PricingPolicy>,
    session: Mutex<Option<CheckoutSession>>,
}

impl Checkout {
    /// Enter checkout. See [`CheckoutSession::begin`] for the entry guard.
    pub fn begin(
        identity: &IdentityStore,
        cart: Arc<CartStore>,
        orders: Arc<dyn OrderService>,
        policy: Arc<PricingPolicy>,
    ) -> Result<Self, CommerceError> {
        let session = CheckoutSession::begin(identity, &cart.snapshot())?;
        Ok(Self {
            cart,
            orders,
            policy,
            session: Mutex::new(Some(session)),
        })
    }

    /// Whether the user is still in checkout.
    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    /// Current stage, or `None` after leaving.
    pub fn stage(&self) -> Option<CheckoutStage> {
        self.lock().as_ref().map(CheckoutSession::stage)
    }

    /// Run `f` against the live session (form edits, reads).
    pub fn with_session<R>(
        &self,
        f: impl FnOnce(&mut CheckoutSession) -> R,
    ) -> Result<R, CommerceError> {
        let mut guard = self.lock();
        let session = guard.as_mut().ok_or_else(closed)?;
        Ok(f(session))
    }

    /// Submit the shipping stage.
    pub fn submit_shipping(&self) -> Result<CheckoutStage, CommerceError> {
        self.with_session(CheckoutSession::submit_shipping)?
    }

    /// Submit the payment stage.
    pub fn submit_payment(&self) -> Result<CheckoutStage, CommerceError> {
        self.with_session(CheckoutSession::submit_payment)?
    }

    /// Step back; backing out of shipping leaves checkout.
    pub fn go_back(&self) -> Result<Navigation, CommerceError> {
        let nav = self.with_session(CheckoutSession::go_back)??;
        if nav == Navigation::LeaveCheckout {
            self.leave();
        }
        Ok(nav)
    }

    /// Price the cart with the session's shipping method.
    pub fn breakdown(&self) -> Result<PricingBreakdown, CommerceError> {
        let cart = self.cart.snapshot();
        let coupon = self.cart.coupon();
        self.with_session(|s| s.breakdown(&cart, &coupon, &self.policy))?
    }

    /// Place the order.
    ///
    /// At most one `create_order` call is made per placement: a call made
    /// while another is in flight fails with
    /// [`CommerceError::SubmissionInFlight`]. On success the cart is cleared
    /// and the session completes; on failure the session returns to review
    /// with its forms intact.
    pub async fn place_order(&self) -> Result<PlacedOrder, CommerceError> {
        let request = {
            let cart = self.cart.snapshot();
            let coupon = self.cart.coupon();
            let mut guard = self.lock();
            let session = guard.as_mut().ok_or_else(closed)?;
            session.begin_submission(&cart, &coupon, &self.policy)?
        };
        debug!(lines = request.lines.len(), total = %request.total_price, "submitting order");

        match self.orders.create_order(&request).await {
            Ok(order) => {
                if let Err(e) = self.cart.clear().await {
                    warn!(error = %e, "order placed but cart clear failed");
                    self.cart.discard();
                }
                match self.lock().as_mut() {
                    Some(session) => session.complete_submission(order.clone())?,
                    None => debug!(order = %order.id, "checkout left before order response"),
                }
                info!(
                    order = %order.id,
                    number = order.display_number(),
                    status = %order.status,
                    "order placed"
                );
                Ok(order)
            }
            Err(e) => {
                warn!(error = %e, "order submission failed");
                if let Some(session) = self.lock().as_mut() {
                    session.fail_submission(e.to_string())?;
                }
                Err(e)
            }
        }
    }

    /// Leave checkout, dropping the session. A response to an order still
    /// in flight will not bring it back.
    pub fn leave(&self) {
        if self.lock().take().is_some() {
            debug!("checkout left");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<CheckoutSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn closed() -> CommerceError {
    CommerceError::InvalidCheckoutTransition {
        from: "closed".to_string(),
        to: "checkout".to_string(),
    }
}
