//! Checkout flow state machine.
//!
//! `Shipping -> Payment -> Review -> Submitting -> Complete`. Forward moves
//! are guarded by form validation; backward moves never re-validate.
//! `Submitting` is transient and falls back to `Review` when the order
//! service rejects the order.

use crate::cart::{Cart, CouponState};
use crate::checkout::address::ShippingAddress;
use crate::checkout::order::{GiftOptions, OrderRequest, PlacedOrder};
use crate::checkout::payment::{validate_payment, CardDetails, PaymentMethod};
use crate::checkout::shipping::ShippingMethod;
use crate::checkout::validation::ValidationErrors;
use crate::error::CommerceError;
use crate::identity::IdentityStore;
use crate::pricing::{compute_breakdown, PricingBreakdown, PricingPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where checkout sends the user when sign-in is needed.
pub const CHECKOUT_PATH: &str = "/checkout";

/// Stages in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStage {
    /// Shipping address and method.
    Shipping,
    /// Payment details.
    Payment,
    /// Order review before submission.
    Review,
    /// Order request in flight.
    Submitting,
    /// Order placed.
    Complete,
}

impl CheckoutStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStage::Shipping => "shipping",
            CheckoutStage::Payment => "payment",
            CheckoutStage::Review => "review",
            CheckoutStage::Submitting => "submitting",
            CheckoutStage::Complete => "complete",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutStage::Shipping => "Shipping",
            CheckoutStage::Payment => "Payment",
            CheckoutStage::Review => "Review",
            CheckoutStage::Submitting => "Placing order",
            CheckoutStage::Complete => "Complete",
        }
    }

    /// Get the step number shown in the progress bar (1-indexed).
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStage::Shipping => 1,
            CheckoutStage::Payment => 2,
            CheckoutStage::Review | CheckoutStage::Submitting => 3,
            CheckoutStage::Complete => 4,
        }
    }
}

/// Result of a backward move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Stay in checkout at this stage.
    Stage(CheckoutStage),
    /// Back out of checkout to the cart.
    LeaveCheckout,
}

/// One checkout attempt. Created on entry, dropped on leaving.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    stage: CheckoutStage,
    shipping_address: ShippingAddress,
    shipping_method: ShippingMethod,
    payment_method: PaymentMethod,
    card: CardDetails,
    gift: GiftOptions,
    errors: ValidationErrors,
    last_error: Option<String>,
    placed: Option<PlacedOrder>,
}

impl CheckoutSession {
    /// Enter checkout.
    ///
    /// Fails with [`CommerceError::AuthenticationRequired`] (returning to
    /// checkout after sign-in) when nobody is signed in, and with
    /// [`CommerceError::EmptyCart`] when there is nothing to buy. The
    /// shipping form is pre-filled from the user's profile.
    pub fn begin(identity: &IdentityStore, cart: &Cart) -> Result<Self, CommerceError> {
        let user = identity
            .current()
            .ok_or_else(|| CommerceError::auth_required(CHECKOUT_PATH))?;
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        debug!(user = %user.id, "checkout started");
        Ok(Self {
            stage: CheckoutStage::Shipping,
            shipping_address: ShippingAddress::from_profile(&user),
            shipping_method: ShippingMethod::Standard,
            payment_method: PaymentMethod::Card,
            card: CardDetails::default(),
            gift: GiftOptions::default(),
            errors: ValidationErrors::new(),
            last_error: None,
            placed: None,
        })
    }

    /// Current stage.
    pub fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// Errors from the last rejected stage submission.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Message from the last failed order submission.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The placed order, once complete.
    pub fn placed_order(&self) -> Option<&PlacedOrder> {
        self.placed.as_ref()
    }

    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    /// Edit the shipping address form.
    pub fn shipping_address_mut(&mut self) -> &mut ShippingAddress {
        &mut self.shipping_address
    }

    pub fn shipping_method(&self) -> ShippingMethod {
        self.shipping_method
    }

    pub fn set_shipping_method(&mut self, method: ShippingMethod) {
        self.shipping_method = method;
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    pub fn card(&self) -> &CardDetails {
        &self.card
    }

    /// Edit card inputs. Setters on [`CardDetails`] format as they go.
    pub fn card_mut(&mut self) -> &mut CardDetails {
        &mut self.card
    }

    pub fn gift(&self) -> &GiftOptions {
        &self.gift
    }

    pub fn set_gift(&mut self, gift: GiftOptions) {
        self.gift = gift;
    }

    /// Whether the place-order control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.stage == CheckoutStage::Review
    }

    /// Submit the shipping stage.
    pub fn submit_shipping(&mut self) -> Result<CheckoutStage, CommerceError> {
        self.expect_stage(CheckoutStage::Shipping, CheckoutStage::Payment)?;
        self.check(self.shipping_address.validate())?;
        self.stage = CheckoutStage::Payment;
        debug!(stage = self.stage.as_str(), "checkout advanced");
        Ok(self.stage)
    }

    /// Submit the payment stage.
    pub fn submit_payment(&mut self) -> Result<CheckoutStage, CommerceError> {
        self.expect_stage(CheckoutStage::Payment, CheckoutStage::Review)?;
        self.check(validate_payment(self.payment_method, &self.card))?;
        self.stage = CheckoutStage::Review;
        debug!(stage = self.stage.as_str(), "checkout advanced");
        Ok(self.stage)
    }

    /// Step back one stage. From shipping this leaves checkout.
    pub fn go_back(&mut self) -> Result<Navigation, CommerceError> {
        let prev = match self.stage {
            CheckoutStage::Shipping => return Ok(Navigation::LeaveCheckout),
            CheckoutStage::Payment => CheckoutStage::Shipping,
            CheckoutStage::Review => CheckoutStage::Payment,
            CheckoutStage::Submitting => return Err(CommerceError::SubmissionInFlight),
            CheckoutStage::Complete => {
                return Err(CommerceError::InvalidCheckoutTransition {
                    from: "complete".to_string(),
                    to: "back".to_string(),
                })
            }
        };
        self.stage = prev;
        self.errors = ValidationErrors::new();
        Ok(Navigation::Stage(prev))
    }

    /// Price the session's cart with its shipping method.
    pub fn breakdown(
        &self,
        cart: &Cart,
        coupon: &CouponState,
        policy: &PricingPolicy,
    ) -> Result<PricingBreakdown, CommerceError> {
        compute_breakdown(&cart.lines, coupon, self.shipping_method, policy)
    }

    /// Move `Review -> Submitting` and build the order request.
    ///
    /// Both forms are checked again since they stay editable after their
    /// stage was submitted.
    pub fn begin_submission(
        &mut self,
        cart: &Cart,
        coupon: &CouponState,
        policy: &PricingPolicy,
    ) -> Result<OrderRequest, CommerceError> {
        if self.stage == CheckoutStage::Submitting {
            return Err(CommerceError::SubmissionInFlight);
        }
        self.expect_stage(CheckoutStage::Review, CheckoutStage::Submitting)?;
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }

        let mut errors = self.shipping_address.validate();
        for (field, message) in validate_payment(self.payment_method, &self.card).iter() {
            errors.add(field, message);
        }
        self.check(errors)?;

        let breakdown = self.breakdown(cart, coupon, policy)?;
        let request = OrderRequest::new(
            &cart.lines,
            &self.shipping_address,
            self.payment_method,
            &breakdown,
            &self.gift,
        );
        self.stage = CheckoutStage::Submitting;
        self.last_error = None;
        Ok(request)
    }

    /// Move `Submitting -> Complete`.
    pub fn complete_submission(&mut self, order: PlacedOrder) -> Result<(), CommerceError> {
        self.expect_stage(CheckoutStage::Submitting, CheckoutStage::Complete)?;
        self.stage = CheckoutStage::Complete;
        self.placed = Some(order);
        Ok(())
    }

    /// Move `Submitting -> Review`, keeping every form as it was.
    pub fn fail_submission(&mut self, message: impl Into<String>) -> Result<(), CommerceError> {
        self.expect_stage(CheckoutStage::Submitting, CheckoutStage::Review)?;
        self.stage = CheckoutStage::Review;
        self.last_error = Some(message.into());
        Ok(())
    }

    fn expect_stage(&self, from: CheckoutStage, to: CheckoutStage) -> Result<(), CommerceError> {
        if self.stage != from {
            return Err(CommerceError::InvalidCheckoutTransition {
                from: self.stage.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        Ok(())
    }

    fn check(&mut self, errors: ValidationErrors) -> Result<(), CommerceError> {
        match errors.into_result() {
            Ok(()) => {
                self.errors = ValidationErrors::new();
                Ok(())
            }
            Err(errors) => {
                debug!(stage = self.stage.as_str(), failed = errors.len(), "validation failed");
                self.errors = errors.clone();
                Err(CommerceError::Validation(errors))
            }
        }
    }
}
