//! Cart Store
//!
//! Owns the current [`CartState`] snapshot. State only changes through
//! [`CartStore::begin`] and [`CartStore::dispatch`], each of which swaps in a
//! new snapshot built from a named event.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    amounts::Amount,
    cart::{
        models::{AppliedCoupon, CartData, PaymentType, VipPlan, VipPlanId},
        state::{AmountOptions, CartState},
        status::{CartStatus, StatusError},
    },
    config::FeatureFlags,
    sequencing::{RequestToken, Sequencer},
};

/// Backend requests that drive the cart page.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CartRequest {
    /// Cart refetch.
    Fetch,

    /// Removal of a cart line.
    Delete,

    /// Addition of a service or package.
    AddItem,

    /// Change of the booking date and time slot.
    UpdateBookingSlot,

    /// Change of the delivery address.
    UpdateAddress,

    /// Coupon validation.
    ApplyCoupon,

    /// Provider availability check before checkout.
    CheckAvailability,

    /// Checkout creation and payment.
    Checkout,

    /// VIP plan listing.
    VipPlans,

    /// Donation options listing.
    Donations,
}

impl CartRequest {
    /// Status shown while this request is in flight, if it changes the page.
    fn pending_status(self) -> Option<CartStatus> {
        match self {
            CartRequest::Fetch
            | CartRequest::AddItem
            | CartRequest::UpdateBookingSlot
            | CartRequest::UpdateAddress => Some(CartStatus::CartLoading),
            CartRequest::Delete => Some(CartStatus::DeleteLoading),
            CartRequest::Checkout => Some(CartStatus::PaymentProcessing),
            CartRequest::ApplyCoupon
            | CartRequest::CheckAvailability
            | CartRequest::VipPlans
            | CartRequest::Donations => None,
        }
    }

    /// Whether a failure of this request takes the whole page to `failure`.
    fn fails_page(self) -> bool {
        self.replaces_cart() || self == CartRequest::Checkout
    }

    /// Whether the response carries a whole new cart.
    ///
    /// These requests share one ordering: a cart from an older request never
    /// replaces one from a newer request, whatever their kinds.
    fn replaces_cart(self) -> bool {
        matches!(
            self,
            CartRequest::Fetch
                | CartRequest::Delete
                | CartRequest::AddItem
                | CartRequest::UpdateBookingSlot
                | CartRequest::UpdateAddress
        )
    }
}

/// Token issued for a cart request.
pub type CartToken = RequestToken<CartRequest>;

/// Named events that change the cart snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    /// A cart fetch or update completed. `None` means the backend has no cart.
    CartLoaded {
        /// Token of the request.
        token: CartToken,
        /// Refreshed cart.
        data: Option<CartData>,
    },

    /// A line removal completed with the refreshed cart.
    ItemRemoved {
        /// Token of the removal.
        token: CartToken,
        /// Refreshed cart.
        data: Option<CartData>,
    },

    /// VIP plans arrived.
    VipPlansLoaded {
        /// Token of the plan listing.
        token: CartToken,
        /// Plans on offer.
        plans: Vec<VipPlan>,
    },

    /// Donation options arrived.
    DonationOptionsLoaded {
        /// Token of the donation listing.
        token: CartToken,
        /// Donation amounts on offer.
        options: AmountOptions,
    },

    /// The backend accepted a coupon.
    CouponApplied {
        /// Token of the coupon request.
        token: CartToken,
        /// Coupon with its pricing.
        coupon: AppliedCoupon,
    },

    /// The customer removed the coupon.
    CouponRemoved,

    /// Availability check finished.
    AvailabilityChecked {
        /// Token of the checkout request.
        token: CartToken,
        /// Whether a provider can take the booking.
        available: bool,
        /// Reason shown when nobody is available.
        message: Option<String>,
    },

    /// The gateway captured the payment.
    PaymentSucceeded {
        /// Token of the checkout request.
        token: CartToken,
    },

    /// The gateway reported a failed payment.
    PaymentFailed {
        /// Token of the checkout request.
        token: CartToken,
        /// Error text from the gateway.
        reason: String,
    },

    /// The customer closed the payment sheet.
    PaymentDismissed {
        /// Token of the checkout request.
        token: CartToken,
    },

    /// Any request failed.
    RequestFailed {
        /// Token of the failed request.
        token: CartToken,
        /// Message for the customer.
        message: String,
    },

    /// The customer picked a payment mode.
    PaymentTypeSelected(PaymentType),

    /// The customer picked or cleared a VIP plan.
    VipPlanSelected(Option<VipPlanId>),

    /// The customer tapped a tip amount.
    TipToggled(Amount),

    /// The customer tapped a donation amount.
    DonationToggled(Amount),

    /// The customer toggled wallet credit.
    WalletToggled(bool),

    /// The page was left; start over.
    Reset,
}

impl CartEvent {
    /// Event name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            CartEvent::CartLoaded { .. } => "cart_loaded",
            CartEvent::ItemRemoved { .. } => "item_removed",
            CartEvent::VipPlansLoaded { .. } => "vip_plans_loaded",
            CartEvent::DonationOptionsLoaded { .. } => "donation_options_loaded",
            CartEvent::CouponApplied { .. } => "coupon_applied",
            CartEvent::CouponRemoved => "coupon_removed",
            CartEvent::AvailabilityChecked { .. } => "availability_checked",
            CartEvent::PaymentSucceeded { .. } => "payment_succeeded",
            CartEvent::PaymentFailed { .. } => "payment_failed",
            CartEvent::PaymentDismissed { .. } => "payment_dismissed",
            CartEvent::RequestFailed { .. } => "request_failed",
            CartEvent::PaymentTypeSelected(_) => "payment_type_selected",
            CartEvent::VipPlanSelected(_) => "vip_plan_selected",
            CartEvent::TipToggled(_) => "tip_toggled",
            CartEvent::DonationToggled(_) => "donation_toggled",
            CartEvent::WalletToggled(_) => "wallet_toggled",
            CartEvent::Reset => "reset",
        }
    }

    /// Sequence of the request whose cart this event installs.
    fn cart_seq(&self) -> Option<u64> {
        match self {
            CartEvent::CartLoaded { token, .. } | CartEvent::ItemRemoved { token, .. } => {
                Some(token.seq())
            }
            _ => None,
        }
    }

    fn token(&self) -> Option<&CartToken> {
        match self {
            CartEvent::CartLoaded { token, .. }
            | CartEvent::ItemRemoved { token, .. }
            | CartEvent::VipPlansLoaded { token, .. }
            | CartEvent::DonationOptionsLoaded { token, .. }
            | CartEvent::CouponApplied { token, .. }
            | CartEvent::AvailabilityChecked { token, .. }
            | CartEvent::PaymentSucceeded { token }
            | CartEvent::PaymentFailed { token, .. }
            | CartEvent::PaymentDismissed { token }
            | CartEvent::RequestFailed { token, .. } => Some(token),
            CartEvent::CouponRemoved
            | CartEvent::PaymentTypeSelected(_)
            | CartEvent::VipPlanSelected(_)
            | CartEvent::TipToggled(_)
            | CartEvent::DonationToggled(_)
            | CartEvent::WalletToggled(_)
            | CartEvent::Reset => None,
        }
    }
}

/// What happened to a dispatched event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// A new snapshot was published.
    Applied,

    /// The event answered a superseded request and was dropped.
    Stale,
}

/// Events the store refuses to apply.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartStoreError {
    /// The cart status cannot make the transition.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// Partial payment was chosen while the feature is off.
    #[error("partial payments are disabled")]
    PartialPaymentDisabled,

    /// Wallet credit was requested with a VIP payment.
    #[error("wallet credit cannot be used with a VIP payment")]
    WalletUnavailableForVip,

    /// The coupon predicate does not hold.
    #[error("coupons cannot be applied to this cart")]
    CouponNotApplicable,

    /// The plan is not on offer.
    #[error("unknown VIP plan {0}")]
    UnknownVipPlan(VipPlanId),

    /// The tip is not on offer.
    #[error("{0} is not an offered tip")]
    UnknownTip(Amount),

    /// The donation is not on offer.
    #[error("{0} is not an offered donation")]
    UnknownDonation(Amount),
}

/// Reducer-style holder of the cart snapshot.
#[derive(Debug, Clone)]
pub struct CartStore {
    state: Arc<CartState>,
    sequencer: Sequencer<CartRequest>,
    cart_seq: u64,
    flags: FeatureFlags,
}

impl CartStore {
    /// Creates a store with an empty snapshot.
    pub fn new(flags: FeatureFlags) -> Self {
        Self::from_state(CartState::default(), flags)
    }

    /// Creates a store around an existing snapshot.
    pub fn from_state(state: CartState, flags: FeatureFlags) -> Self {
        Self {
            state: Arc::new(state),
            sequencer: Sequencer::new(),
            cart_seq: 0,
            flags,
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<CartState> {
        Arc::clone(&self.state)
    }

    /// Feature flags the store enforces.
    pub fn flags(&self) -> &FeatureFlags {
        &self.flags
    }

    /// Starts a request, moving to its loading status when it has one.
    ///
    /// Starting a request whose loading status is already showing supersedes
    /// the earlier one of the same kind. Requests that replace the cart are
    /// also ordered against each other, whatever their kinds.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError::Status`] when the page cannot start this
    /// request from its current status.
    pub fn begin(&mut self, request: CartRequest) -> Result<CartToken, CartStoreError> {
        if let Some(pending) = request.pending_status()
            && self.state.status != pending
        {
            let status = self.state.status.transition(pending)?;

            self.publish(CartState {
                status,
                last_error: None,
                ..(*self.state).clone()
            });
        }

        let token = self.sequencer.issue(request);

        debug!(?request, seq = token.seq(), "cart request started");

        Ok(token)
    }

    /// Applies an event, publishing a new snapshot.
    ///
    /// Events carrying a superseded token are dropped and reported as
    /// [`Dispatch::Stale`].
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] when the event breaks a cart rule or an
    /// illegal status transition; the snapshot is left untouched.
    pub fn dispatch(&mut self, event: CartEvent) -> Result<Dispatch, CartStoreError> {
        if let Some(token) = event.token()
            && (!self.sequencer.is_current(token)
                || (token.kind().replaces_cart() && token.seq() < self.cart_seq))
        {
            debug!(
                event = event.name(),
                seq = token.seq(),
                "dropping response for superseded request"
            );

            return Ok(Dispatch::Stale);
        }

        let name = event.name();
        let cart_seq = event.cart_seq();

        match self.reduce(event) {
            Ok(next) => {
                debug!(event = name, status = %next.status, "cart event applied");

                if let Some(seq) = cart_seq {
                    self.cart_seq = seq;
                }

                self.publish(next);

                Ok(Dispatch::Applied)
            }
            Err(error) => {
                warn!(event = name, %error, "cart event rejected");

                Err(error)
            }
        }
    }

    fn publish(&mut self, state: CartState) {
        self.state = Arc::new(state);
    }

    fn reduce(&mut self, event: CartEvent) -> Result<CartState, CartStoreError> {
        let current = &*self.state;
        let mut next = current.clone();

        match event {
            CartEvent::CartLoaded { data, .. } | CartEvent::ItemRemoved { data, .. } => {
                let status = match &data {
                    Some(cart) if !cart.is_empty() => CartStatus::Success,
                    _ => CartStatus::NoDataFound,
                };

                next.status = current.status.transition(status)?;
                next.cart_data = data;
                next.last_error = None;

                if next.is_coupon_applied() && !next.coupon_affordance_visible() {
                    warn!("refreshed cart no longer accepts coupons, removing it");

                    next.coupon = None;
                }
            }
            CartEvent::VipPlansLoaded { plans, .. } => {
                let withdrawn = next
                    .selected_vip_plan
                    .as_ref()
                    .is_some_and(|id| plans.iter().all(|plan| &plan.id != id));

                if withdrawn {
                    next.selected_vip_plan = None;

                    if next.payment_type == PaymentType::Vip {
                        next.payment_type = PaymentType::FullAmount;
                    }
                }

                next.vip_plans = plans;
            }
            CartEvent::DonationOptionsLoaded { options, .. } => {
                if !options.contains(&next.selected_donation_tip) {
                    next.selected_donation_tip = Amount::ZERO;
                }

                next.donation_options = options;
            }
            CartEvent::CouponApplied { coupon, .. } => {
                if !current.coupon_affordance_visible() {
                    return Err(CartStoreError::CouponNotApplicable);
                }

                next.coupon = Some(coupon);
                next.last_error = None;
            }
            CartEvent::CouponRemoved => {
                next.coupon = None;
            }
            CartEvent::AvailabilityChecked {
                available, message, ..
            } => {
                if available {
                    next.status = current.status.transition(CartStatus::AllowCheckout)?;
                    next.last_error = None;
                } else {
                    next.last_error = message;
                }
            }
            CartEvent::PaymentSucceeded { .. } => {
                next.status = current.status.transition(CartStatus::PaymentSuccessed)?;
            }
            CartEvent::PaymentFailed { reason, .. } => {
                next.status = current.status.transition(CartStatus::Failure)?;
                next.last_error = Some(reason);
            }
            CartEvent::PaymentDismissed { .. } => {
                next.status = current.status.transition(CartStatus::AllowCheckout)?;
            }
            CartEvent::RequestFailed { token, message } => {
                if token.kind().fails_page() {
                    next.status = current.status.transition(CartStatus::Failure)?;
                }

                next.last_error = Some(message);
            }
            CartEvent::PaymentTypeSelected(payment_type) => {
                if payment_type == PaymentType::Partial && !self.flags.partial_payment_enabled {
                    return Err(CartStoreError::PartialPaymentDisabled);
                }

                next.payment_type = payment_type;

                match payment_type {
                    PaymentType::Vip => {
                        next.is_wallet_enabled = false;
                        next.coupon = None;
                    }
                    PaymentType::Partial => {
                        next.selected_vip_plan = None;
                        next.coupon = None;
                    }
                    PaymentType::FullAmount => {
                        next.selected_vip_plan = None;
                    }
                }
            }
            CartEvent::VipPlanSelected(Some(id)) => {
                if !current.vip_plans.iter().any(|plan| plan.id == id) {
                    return Err(CartStoreError::UnknownVipPlan(id));
                }

                next.selected_vip_plan = Some(id);
                next.payment_type = PaymentType::Vip;
                next.is_wallet_enabled = false;
                next.coupon = None;
            }
            CartEvent::VipPlanSelected(None) => {
                next.selected_vip_plan = None;

                if next.payment_type == PaymentType::Vip {
                    next.payment_type = PaymentType::FullAmount;
                }
            }
            CartEvent::TipToggled(tip) => {
                next.selected_tip = toggle(current.selected_tip, tip, &current.tip_options)
                    .ok_or(CartStoreError::UnknownTip(tip))?;
            }
            CartEvent::DonationToggled(donation) => {
                next.selected_donation_tip = toggle(
                    current.selected_donation_tip,
                    donation,
                    &current.donation_options,
                )
                .ok_or(CartStoreError::UnknownDonation(donation))?;
            }
            CartEvent::WalletToggled(enabled) => {
                if enabled && current.payment_type == PaymentType::Vip {
                    return Err(CartStoreError::WalletUnavailableForVip);
                }

                next.is_wallet_enabled = enabled;

                if enabled {
                    next.coupon = None;
                }
            }
            CartEvent::Reset => {
                self.sequencer.invalidate_all();

                next = CartState {
                    tip_options: current.tip_options.clone(),
                    ..CartState::default()
                };
            }
        }

        Ok(next)
    }
}

/// Selecting the current choice again clears it; zero always clears.
fn toggle(current: Amount, picked: Amount, options: &AmountOptions) -> Option<Amount> {
    if picked.is_zero() || picked == current {
        Some(Amount::ZERO)
    } else if options.contains(&picked) {
        Some(picked)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::cart::models::CartCategory;

    use super::*;

    fn flags() -> FeatureFlags {
        FeatureFlags::default()
    }

    fn non_empty_cart() -> CartData {
        CartData {
            total_service_amount: Amount::from_major(500),
            categories: vec![CartCategory {
                category_id: "cleaning".to_string(),
                name: "Cleaning".to_string(),
                items: vec![crate::cart::models::CartItem {
                    id: "line-1".to_string(),
                    service_id: "sofa".to_string(),
                    name: "Sofa cleaning".to_string(),
                    quantity: 1,
                    amount: Amount::from_major(500),
                }],
                packages: Vec::new(),
            }],
            ..CartData::default()
        }
    }

    fn gold() -> VipPlan {
        VipPlan {
            id: VipPlanId::new("gold"),
            name: "Gold".to_string(),
            amount: Amount::from_major(199),
            validity_days: Some(365),
            benefits: Vec::new(),
        }
    }

    fn loaded_store() -> Result<CartStore, CartStoreError> {
        let mut store = CartStore::new(flags());
        let token = store.begin(CartRequest::Fetch)?;

        store.dispatch(CartEvent::CartLoaded {
            token,
            data: Some(non_empty_cart()),
        })?;

        Ok(store)
    }

    #[test]
    fn fetch_moves_through_loading_to_success() -> TestResult {
        let mut store = CartStore::new(flags());

        let token = store.begin(CartRequest::Fetch)?;

        assert_eq!(store.snapshot().status, CartStatus::CartLoading);

        store.dispatch(CartEvent::CartLoaded {
            token,
            data: Some(non_empty_cart()),
        })?;

        assert_eq!(store.snapshot().status, CartStatus::Success);

        Ok(())
    }

    #[test]
    fn empty_cart_is_no_data_found() -> TestResult {
        let mut store = CartStore::new(flags());
        let token = store.begin(CartRequest::Fetch)?;

        store.dispatch(CartEvent::CartLoaded {
            token,
            data: Some(CartData::default()),
        })?;

        assert_eq!(store.snapshot().status, CartStatus::NoDataFound);

        Ok(())
    }

    #[test]
    fn stale_fetch_is_dropped() -> TestResult {
        let mut store = loaded_store()?;

        let slow = store.begin(CartRequest::Fetch)?;
        let fast = store.begin(CartRequest::Fetch)?;

        let updated = CartData {
            total_service_amount: Amount::from_major(800),
            ..non_empty_cart()
        };

        store.dispatch(CartEvent::CartLoaded {
            token: fast,
            data: Some(updated),
        })?;

        let outcome = store.dispatch(CartEvent::CartLoaded {
            token: slow,
            data: Some(non_empty_cart()),
        })?;

        assert_eq!(outcome, Dispatch::Stale);
        assert_eq!(
            store
                .snapshot()
                .cart_data
                .as_ref()
                .map(|cart| cart.total_service_amount),
            Some(Amount::from_major(800))
        );

        Ok(())
    }

    #[test]
    fn selecting_vip_disables_wallet_and_coupon() -> TestResult {
        let mut store = CartStore::from_state(
            CartState {
                vip_plans: vec![gold()],
                is_wallet_enabled: true,
                ..(*loaded_store()?.snapshot()).clone()
            },
            flags(),
        );

        store.dispatch(CartEvent::VipPlanSelected(Some(VipPlanId::new("gold"))))?;

        let state = store.snapshot();

        assert_eq!(state.payment_type, PaymentType::Vip);
        assert!(!state.is_wallet_enabled);
        assert!(state.coupon.is_none());

        Ok(())
    }

    #[test]
    fn wallet_rejected_while_vip() -> TestResult {
        let mut store = loaded_store()?;

        store.dispatch(CartEvent::PaymentTypeSelected(PaymentType::Vip))?;

        let result = store.dispatch(CartEvent::WalletToggled(true));

        assert_eq!(result, Err(CartStoreError::WalletUnavailableForVip));
        assert!(!store.snapshot().is_wallet_enabled);

        Ok(())
    }

    #[test]
    fn partial_rejected_when_flag_off() {
        let mut store = CartStore::new(FeatureFlags {
            partial_payment_enabled: false,
            ..FeatureFlags::default()
        });

        let result = store.dispatch(CartEvent::PaymentTypeSelected(PaymentType::Partial));

        assert_eq!(result, Err(CartStoreError::PartialPaymentDisabled));
    }

    #[test]
    fn tip_toggles_off_when_picked_twice() -> TestResult {
        let mut store = loaded_store()?;

        store.dispatch(CartEvent::TipToggled(Amount::from_major(30)))?;

        assert_eq!(store.snapshot().selected_tip, Amount::from_major(30));

        store.dispatch(CartEvent::TipToggled(Amount::from_major(30)))?;

        assert_eq!(store.snapshot().selected_tip, Amount::ZERO);

        Ok(())
    }

    #[test]
    fn unknown_tip_is_rejected() -> TestResult {
        let mut store = loaded_store()?;

        let result = store.dispatch(CartEvent::TipToggled(Amount::from_major(17)));

        assert_eq!(result, Err(CartStoreError::UnknownTip(Amount::from_major(17))));

        Ok(())
    }

    #[test]
    fn donation_options_reset_stale_selection() -> TestResult {
        let mut store = loaded_store()?;

        let token = store.begin(CartRequest::Donations)?;
        store.dispatch(CartEvent::DonationOptionsLoaded {
            token,
            options: smallvec![Amount::from_major(10), Amount::from_major(25)],
        })?;
        store.dispatch(CartEvent::DonationToggled(Amount::from_major(25)))?;

        let token = store.begin(CartRequest::Donations)?;
        store.dispatch(CartEvent::DonationOptionsLoaded {
            token,
            options: smallvec![Amount::from_major(5)],
        })?;

        assert_eq!(store.snapshot().selected_donation_tip, Amount::ZERO);

        Ok(())
    }

    #[test]
    fn coupon_rejected_with_wallet_on() -> TestResult {
        let mut store = loaded_store()?;

        store.dispatch(CartEvent::WalletToggled(true))?;

        let token = store.begin(CartRequest::ApplyCoupon)?;
        let result = store.dispatch(CartEvent::CouponApplied {
            token,
            coupon: AppliedCoupon {
                code: "FIRST50".to_string(),
                coupon_item_discount_amount: Amount::from_major(450),
                coupon_value: Amount::from_major(50),
            },
        });

        assert_eq!(result, Err(CartStoreError::CouponNotApplicable));

        Ok(())
    }

    #[test]
    fn failed_fetch_moves_to_failure() -> TestResult {
        let mut store = CartStore::new(flags());
        let token = store.begin(CartRequest::Fetch)?;

        store.dispatch(CartEvent::RequestFailed {
            token,
            message: "network down".to_string(),
        })?;

        let state = store.snapshot();

        assert_eq!(state.status, CartStatus::Failure);
        assert_eq!(state.last_error.as_deref(), Some("network down"));

        Ok(())
    }

    #[test]
    fn failed_coupon_keeps_page() -> TestResult {
        let mut store = loaded_store()?;
        let token = store.begin(CartRequest::ApplyCoupon)?;

        store.dispatch(CartEvent::RequestFailed {
            token,
            message: "Invalid coupon".to_string(),
        })?;

        assert_eq!(store.snapshot().status, CartStatus::Success);

        Ok(())
    }

    #[test]
    fn delete_from_empty_cart_is_illegal() {
        let mut store = CartStore::new(flags());

        let result = store.begin(CartRequest::Delete);

        assert!(
            matches!(result, Err(CartStoreError::Status(_))),
            "expected illegal transition, got {result:?}"
        );
    }

    #[test]
    fn reset_invalidates_outstanding_requests() -> TestResult {
        let mut store = loaded_store()?;
        let token = store.begin(CartRequest::Fetch)?;

        store.dispatch(CartEvent::Reset)?;

        let outcome = store.dispatch(CartEvent::CartLoaded {
            token,
            data: Some(non_empty_cart()),
        })?;

        assert_eq!(outcome, Dispatch::Stale);
        assert_eq!(store.snapshot().status, CartStatus::Initial);

        Ok(())
    }

    #[test]
    fn older_fetch_cannot_replace_cart_from_newer_delete() -> TestResult {
        let mut store = loaded_store()?;

        let fetch = store.begin(CartRequest::Fetch)?;
        let delete = store.begin(CartRequest::Delete)?;

        store.dispatch(CartEvent::ItemRemoved {
            token: delete,
            data: Some(CartData {
                total_service_amount: Amount::from_major(400),
                ..non_empty_cart()
            }),
        })?;

        let outcome = store.dispatch(CartEvent::CartLoaded {
            token: fetch,
            data: Some(CartData {
                total_service_amount: Amount::from_major(900),
                ..non_empty_cart()
            }),
        })?;

        let snapshot = store.snapshot();

        assert_eq!(outcome, Dispatch::Stale);
        assert_eq!(
            snapshot.cart_data.as_ref().map(|cart| cart.total_service_amount),
            Some(Amount::from_major(400))
        );
        assert_eq!(snapshot.status, CartStatus::Success);

        Ok(())
    }

    #[test]
    fn older_fetch_arriving_first_is_still_applied() -> TestResult {
        let mut store = loaded_store()?;

        let fetch = store.begin(CartRequest::Fetch)?;
        let delete = store.begin(CartRequest::Delete)?;

        let first = store.dispatch(CartEvent::CartLoaded {
            token: fetch,
            data: Some(CartData {
                total_service_amount: Amount::from_major(900),
                ..non_empty_cart()
            }),
        })?;

        store.dispatch(CartEvent::ItemRemoved {
            token: delete,
            data: Some(CartData {
                total_service_amount: Amount::from_major(400),
                ..non_empty_cart()
            }),
        })?;

        assert_eq!(first, Dispatch::Applied);
        assert_eq!(
            store
                .snapshot()
                .cart_data
                .as_ref()
                .map(|cart| cart.total_service_amount),
            Some(Amount::from_major(400))
        );

        Ok(())
    }

    #[test]
    fn failure_of_superseded_cart_request_is_dropped() -> TestResult {
        let mut store = loaded_store()?;

        let fetch = store.begin(CartRequest::Fetch)?;
        let address = store.begin(CartRequest::UpdateAddress)?;

        store.dispatch(CartEvent::CartLoaded {
            token: address,
            data: Some(non_empty_cart()),
        })?;

        let outcome = store.dispatch(CartEvent::RequestFailed {
            token: fetch,
            message: "timeout".to_string(),
        })?;

        assert_eq!(outcome, Dispatch::Stale);
        assert_eq!(store.snapshot().status, CartStatus::Success);

        Ok(())
    }

    #[test]
    fn vip_choice_survives_plans_arriving_later() -> TestResult {
        let mut store = loaded_store()?;

        store.dispatch(CartEvent::PaymentTypeSelected(PaymentType::Vip))?;

        let token = store.begin(CartRequest::VipPlans)?;

        store.dispatch(CartEvent::VipPlansLoaded {
            token,
            plans: vec![gold()],
        })?;

        assert_eq!(store.snapshot().payment_type, PaymentType::Vip);

        Ok(())
    }

    #[test]
    fn withdrawn_vip_plan_falls_back_to_full_amount() -> TestResult {
        let mut store = CartStore::from_state(
            CartState {
                vip_plans: vec![gold()],
                ..(*loaded_store()?.snapshot()).clone()
            },
            flags(),
        );

        store.dispatch(CartEvent::VipPlanSelected(Some(VipPlanId::new("gold"))))?;

        let token = store.begin(CartRequest::VipPlans)?;

        store.dispatch(CartEvent::VipPlansLoaded {
            token,
            plans: Vec::new(),
        })?;

        let snapshot = store.snapshot();

        assert_eq!(snapshot.payment_type, PaymentType::FullAmount);
        assert_eq!(snapshot.selected_vip_plan, None);

        Ok(())
    }

    #[test]
    fn reload_with_packages_drops_the_coupon() -> TestResult {
        let mut store = loaded_store()?;
        let token = store.begin(CartRequest::ApplyCoupon)?;

        store.dispatch(CartEvent::CouponApplied {
            token,
            coupon: AppliedCoupon {
                code: "FIRST100".to_string(),
                coupon_item_discount_amount: Amount::from_major(400),
                coupon_value: Amount::from_major(100),
            },
        })?;

        let mut with_package = non_empty_cart();

        if let Some(category) = with_package.categories.first_mut() {
            category.packages.push(crate::cart::models::CartPackage {
                id: "pkg-1".to_string(),
                name: "Deep clean".to_string(),
                amount: Amount::from_major(999),
                items: Vec::new(),
            });
        }

        let token = store.begin(CartRequest::Fetch)?;

        store.dispatch(CartEvent::CartLoaded {
            token,
            data: Some(with_package),
        })?;

        assert_eq!(store.snapshot().coupon, None);

        Ok(())
    }
}
