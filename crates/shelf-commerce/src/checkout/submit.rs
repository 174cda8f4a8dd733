//! Checkout submission.
//!
//! One checkout attempt ends in exactly one [`CheckoutOutcome`]:
//!
//! - empty cart: nothing happens
//! - backend accepts: cart cleared, go to the orders view
//! - backend reports a stock conflict: cart untouched, message shown
//! - anything else: order recorded in the local ledger, cart cleared, go to
//!   the orders view
//!
//! The backend payload carries no idempotency key, so a submission is never
//! retried automatically.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use shelf_core::CheckoutConfig;

use crate::api::{StorefrontApi, SubmissionResult};
use crate::cart::{CartStore, PricingPolicy};
use crate::checkout::{OrderLedger, OrderPayload, OrderRecord};
use crate::error::CommerceError;
use crate::session::SessionUser;

/// Views a checkout can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The order history page.
    Orders,
}

/// Result of one checkout attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// The cart was empty; no request was made.
    EmptyCart,
    /// The backend accepted the order.
    Submitted,
    /// The backend refused the order; the cart is unchanged.
    Rejected { message: String },
    /// The backend was unreachable; the order was saved on this device.
    SubmittedLocally { record: OrderRecord },
}

impl CheckoutOutcome {
    /// Where to navigate after this outcome, if anywhere.
    pub fn redirect(&self) -> Option<View> {
        match self {
            CheckoutOutcome::Submitted | CheckoutOutcome::SubmittedLocally { .. } => {
                Some(View::Orders)
            }
            CheckoutOutcome::EmptyCart | CheckoutOutcome::Rejected { .. } => None,
        }
    }

    /// Check if the order left the cart (remotely or locally).
    pub fn is_placed(&self) -> bool {
        self.redirect().is_some()
    }
}

/// Drives checkout attempts and refuses overlapping ones.
#[derive(Debug)]
pub struct CheckoutSubmitter {
    policy: PricingPolicy,
    payment_method: String,
    in_flight: AtomicBool,
}

/// Releases the in-flight flag when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CheckoutSubmitter {
    pub fn new(policy: PricingPolicy, payment_method: impl Into<String>) -> Self {
        Self {
            policy,
            payment_method: payment_method.into(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Build a submitter from the `[checkout]` configuration section.
    pub fn from_config(policy: PricingPolicy, config: &CheckoutConfig) -> Self {
        Self::new(policy, config.payment_method.clone())
    }

    /// Pricing rules used for totals.
    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Check if a submission is currently running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.in_flight))
    }

    /// Build the payload for the cart's current contents.
    pub fn build_payload(&self, user: &SessionUser, cart: &CartStore) -> OrderPayload {
        let total = self.policy.final_total(cart.items(), user.user_type);
        OrderPayload::new(
            cart.items(),
            total,
            user.shipping_address.clone(),
            self.payment_method.clone(),
            Utc::now(),
        )
    }

    /// Run one checkout attempt for `user`.
    ///
    /// Returns [`CommerceError::CheckoutInProgress`] without side effects if
    /// another attempt is still running. Returns a storage error only when
    /// the backend was unreachable and the order could not be recorded
    /// locally either; the cart is then left intact.
    pub async fn submit<A: StorefrontApi + ?Sized>(
        &self,
        api: &A,
        user: &SessionUser,
        cart: &mut CartStore,
        ledger: &OrderLedger,
    ) -> Result<CheckoutOutcome, CommerceError> {
        let _guard = self.begin().ok_or(CommerceError::CheckoutInProgress)?;

        if cart.is_empty() {
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let payload = self.build_payload(user, cart);
        match api.create_order(&user.user_id, &payload).await {
            SubmissionResult::Accepted => {
                clear_after_checkout(cart);
                Ok(CheckoutOutcome::Submitted)
            }
            SubmissionResult::Conflict(message) => {
                tracing::info!(user_id = %user.user_id, %message, "order rejected for stock");
                Ok(CheckoutOutcome::Rejected { message })
            }
            SubmissionResult::Transient(error) => {
                tracing::warn!(
                    user_id = %user.user_id,
                    error = %error,
                    "order submission failed, saving order locally"
                );
                let pricing = self.policy.price(cart.items(), user.user_type);
                let record = OrderRecord::local(
                    user.user_id.clone(),
                    user.email.clone(),
                    cart.items().to_vec(),
                    &pricing,
                    payload.order_timestamp,
                );
                ledger.append(record.clone())?;
                clear_after_checkout(cart);
                Ok(CheckoutOutcome::SubmittedLocally { record })
            }
        }
    }
}

/// Clear the cart once an order is placed. Storage failures are only logged.
fn clear_after_checkout(cart: &mut CartStore) {
    if let Err(e) = cart.clear() {
        tracing::warn!(error = %e, "cart cleared in memory but not in storage");
    }
}
