//! Checkout
//!
//! Drives the cart store through the backend calls of the checkout flow and
//! keeps the backend's payment audit trail up to date.

use std::sync::Arc;

use jiff::{Timestamp, civil::Date};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    amounts::Amount,
    api::{
        ApiError, CheckoutApi,
        models::{
            AddToCartRequest, CheckoutOrder, CheckoutRequest, FrequentlyAddedService,
            PaymentRecord, PaymentStatus, UpdateBookingDateRequest,
        },
    },
    cart::{
        models::PaymentType,
        state::{AmountOptions, CartState},
        store::{CartEvent, CartRequest, CartStore, CartStoreError, CartToken, Dispatch},
    },
    coupons::Coupon,
    payments::{
        calculator::{Amounts, calculate},
        rules::{coupon_pricing_active, vip_pricing_active},
    },
    providers::{ProviderEvent, ProviderRequest, ProviderStore, ProviderStoreError},
};

/// Client-side reasons the cart cannot be checked out.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The cart has no lines.
    #[error("the cart is empty")]
    EmptyCart,

    /// No booking date or time.
    #[error("select a date and time for the booking")]
    MissingBookingSlot,

    /// No delivery address.
    #[error("select a delivery address")]
    MissingAddress,

    /// VIP payment without a plan.
    #[error("select a VIP plan or change the payment type")]
    MissingVipPlan,

    /// The cart is not on the checkout page.
    #[error("the cart cannot be checked out while {0}")]
    InvalidStatus(String),
}

/// Errors raised by [`CheckoutService`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The cart store refused the event.
    #[error(transparent)]
    Cart(#[from] CartStoreError),

    /// The provider store refused the event.
    #[error(transparent)]
    Providers(#[from] ProviderStoreError),

    /// No provider can take the booking.
    #[error("{0}")]
    Unavailable(String),

    /// The coupon predicate does not hold.
    #[error("coupons cannot be applied to this cart")]
    CouponNotApplicable,

    /// A newer request superseded this one before it finished.
    #[error("the request was superseded")]
    Superseded,
}

impl CheckoutError {
    /// Message suitable for the customer.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Api(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}

/// How the payment sheet ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The gateway captured the payment.
    Succeeded {
        /// Gateway payment id.
        payment_id: String,
        /// Gateway signature over the order and payment ids.
        signature: Option<String>,
    },

    /// The gateway reported an error.
    Failed {
        /// Error text from the gateway.
        reason: String,
    },

    /// The customer closed the sheet.
    Dismissed,
}

/// A checkout waiting for the gateway.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingPayment {
    /// Token of the checkout request.
    pub token: CartToken,
    /// Gateway order to pay.
    pub order: CheckoutOrder,
    /// Amounts quoted when the checkout started.
    pub amounts: Amounts,
}

/// Checks that a snapshot may be checked out.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate(state: &CartState) -> Result<(), ValidationError> {
    if !state.status.accepts_checkout() {
        return Err(ValidationError::InvalidStatus(state.status.to_string()));
    }

    let cart = state
        .cart_data
        .as_ref()
        .filter(|cart| !cart.is_empty())
        .ok_or(ValidationError::EmptyCart)?;

    if !cart.has_booking_slot() {
        return Err(ValidationError::MissingBookingSlot);
    }

    if cart.address.is_none() {
        return Err(ValidationError::MissingAddress);
    }

    if state.payment_type == PaymentType::Vip && !state.has_selected_vip_plan() {
        return Err(ValidationError::MissingVipPlan);
    }

    Ok(())
}

/// Builds the checkout request for a snapshot and its amounts.
pub fn checkout_request(
    state: &CartState,
    amounts: &Amounts,
    provider_id: Option<String>,
) -> CheckoutRequest {
    CheckoutRequest {
        payment_type: state.payment_type,
        vip_plan_id: state
            .selected_vip_plan
            .clone()
            .filter(|_| vip_pricing_active(state)),
        coupon_code: state
            .coupon
            .as_ref()
            .filter(|_| coupon_pricing_active(state))
            .map(|coupon| coupon.code.clone()),
        provider_id,
        tip: amounts.tip_price,
        donation: amounts.donation_price,
        wallet_amount: amounts.wallet_deduction_amount,
        amount: amounts.final_total_amount,
    }
}

/// Orchestrates cart and checkout requests.
#[derive(Clone)]
pub struct CheckoutService {
    api: Arc<dyn CheckoutApi>,
}

impl std::fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutService").finish_non_exhaustive()
    }
}

impl CheckoutService {
    /// Creates a service over the given backend.
    pub fn new(api: Arc<dyn CheckoutApi>) -> Self {
        Self { api }
    }

    /// Refetches the cart into the store.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot start or the backend fails.
    pub async fn refresh_cart(&self, store: &mut CartStore) -> Result<(), CheckoutError> {
        let token = store.begin(CartRequest::Fetch)?;
        let result = self.api.fetch_cart().await;

        settle(store, token, result, |token, data| CartEvent::CartLoaded { token, data })
    }

    /// Removes a cart line and stores the refreshed cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot start or the backend fails.
    pub async fn remove_item(
        &self,
        store: &mut CartStore,
        cart_item_id: String,
    ) -> Result<(), CheckoutError> {
        let token = store.begin(CartRequest::Delete)?;
        let result = self.api.remove_from_cart(cart_item_id).await;

        settle(store, token, result, |token, data| CartEvent::ItemRemoved { token, data })
    }

    /// Adds a service or package and stores the refreshed cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot start or the backend fails.
    pub async fn add_item(
        &self,
        store: &mut CartStore,
        request: AddToCartRequest,
    ) -> Result<(), CheckoutError> {
        let token = store.begin(CartRequest::AddItem)?;
        let result = self.api.add_to_cart(request).await;

        settle(store, token, result, |token, data| CartEvent::CartLoaded { token, data })
    }

    /// Sets the booking date and time slot.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot start or the backend fails.
    pub async fn update_booking_slot(
        &self,
        store: &mut CartStore,
        booking_date: Date,
        booking_time: String,
    ) -> Result<(), CheckoutError> {
        let token = store.begin(CartRequest::UpdateBookingSlot)?;
        let result = self
            .api
            .update_booking_date(UpdateBookingDateRequest {
                booking_date,
                booking_time,
            })
            .await;

        settle(store, token, result, |token, data| CartEvent::CartLoaded { token, data })
    }

    /// Sets the delivery address.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot start or the backend fails.
    pub async fn update_address(
        &self,
        store: &mut CartStore,
        address_id: String,
    ) -> Result<(), CheckoutError> {
        let token = store.begin(CartRequest::UpdateAddress)?;
        let result = self.api.update_address(address_id).await;

        settle(store, token, result, |token, data| CartEvent::CartLoaded { token, data })
    }

    /// Coupons the customer can use on the current cart.
    ///
    /// Empty without asking the backend when the cart does not accept
    /// coupons; otherwise the listing minus coupons whose minimum order the
    /// cart does not reach.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn available_coupons(&self, store: &CartStore) -> Result<Vec<Coupon>, CheckoutError> {
        let state = store.snapshot();

        if !state.coupon_affordance_visible() {
            return Ok(Vec::new());
        }

        let order_total = state
            .cart_data
            .as_ref()
            .map_or(Amount::ZERO, |cart| cart.total_service_amount);

        let mut coupons = self.api.list_coupons().await?;

        coupons.retain(|coupon| coupon.meets_minimum(order_total));

        Ok(coupons)
    }

    /// Frequently added services that are not in the cart yet.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn suggestions(
        &self,
        store: &CartStore,
    ) -> Result<Vec<FrequentlyAddedService>, CheckoutError> {
        let state = store.snapshot();
        let mut services = self.api.frequently_added_services().await?;

        if let Some(cart) = state.cart_data.as_ref() {
            services.retain(|service| {
                cart.categories
                    .iter()
                    .flat_map(|category| &category.items)
                    .all(|item| item.service_id != service.id)
            });
        }

        Ok(services)
    }

    /// Loads VIP plans and donation options.
    ///
    /// # Errors
    ///
    /// Returns the first backend failure.
    pub async fn load_offers(&self, store: &mut CartStore) -> Result<(), CheckoutError> {
        let token = store.begin(CartRequest::VipPlans)?;
        let plans = self.api.vip_plans().await;

        settle(store, token, plans, |token, plans| CartEvent::VipPlansLoaded { token, plans })?;

        let token = store.begin(CartRequest::Donations)?;
        let donations = self.api.donation_data().await.map(|data| {
            data.map(|data| data.options.into_iter().collect::<AmountOptions>())
                .unwrap_or_default()
        });

        settle(store, token, donations, |token, options| {
            CartEvent::DonationOptionsLoaded { token, options }
        })
    }

    /// Validates and applies a coupon code.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::CouponNotApplicable`] when the cart
    /// configuration does not allow coupons, or the backend's rejection.
    pub async fn apply_coupon(
        &self,
        store: &mut CartStore,
        code: String,
    ) -> Result<(), CheckoutError> {
        if !store.snapshot().coupon_affordance_visible() {
            return Err(CheckoutError::CouponNotApplicable);
        }

        let token = store.begin(CartRequest::ApplyCoupon)?;
        let result = self.api.apply_coupon(code).await;

        settle(store, token, result, |token, coupon| CartEvent::CouponApplied { token, coupon })
    }

    /// Removes the applied coupon on the backend, then locally.
    ///
    /// # Errors
    ///
    /// Returns the backend failure; the coupon stays applied in that case.
    pub async fn remove_coupon(&self, store: &mut CartStore) -> Result<(), CheckoutError> {
        if !store.snapshot().is_coupon_applied() {
            return Ok(());
        }

        self.api.remove_coupon().await?;

        store.dispatch(CartEvent::CouponRemoved)?;

        Ok(())
    }

    /// Loads the providers able to serve the cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot start or the backend fails.
    pub async fn load_providers(&self, store: &mut ProviderStore) -> Result<(), CheckoutError> {
        let token = store.begin(ProviderRequest::Fetch)?;

        match self.api.service_providers().await {
            Ok(providers) => {
                store.dispatch(ProviderEvent::Loaded { token, providers })?;

                Ok(())
            }
            Err(error) => {
                store.dispatch(ProviderEvent::Failed {
                    token,
                    message: error.user_message(),
                })?;

                Err(error.into())
            }
        }
    }

    /// Assigns a provider to the booking.
    ///
    /// # Errors
    ///
    /// Returns an error when the provider is not listed or the backend fails.
    pub async fn select_provider(
        &self,
        store: &mut ProviderStore,
        provider_id: String,
    ) -> Result<(), CheckoutError> {
        if store.snapshot().providers.iter().all(|p| p.id != provider_id) {
            return Err(ProviderStoreError::UnknownProvider(provider_id).into());
        }

        let token = store.begin(ProviderRequest::Select)?;

        match self.api.select_service_provider(provider_id.clone()).await {
            Ok(()) => {
                store.dispatch(ProviderEvent::Selected { token, provider_id })?;

                Ok(())
            }
            Err(error) => {
                store.dispatch(ProviderEvent::Failed {
                    token,
                    message: error.user_message(),
                })?;

                Err(error.into())
            }
        }
    }

    /// Validates the cart, confirms availability and creates the checkout.
    ///
    /// An `initiated` payment record is written before the order is handed
    /// back for the gateway.
    ///
    /// # Errors
    ///
    /// Returns validation failures, an [`CheckoutError::Unavailable`] when no
    /// provider can take the slot, or backend failures.
    pub async fn start_checkout(
        &self,
        store: &mut CartStore,
        provider_id: Option<String>,
    ) -> Result<PendingPayment, CheckoutError> {
        validate(&store.snapshot())?;

        let token = store.begin(CartRequest::CheckAvailability)?;
        let availability = match self.api.check_availability().await {
            Ok(availability) => availability,
            Err(error) => return Err(fail(store, token, error)),
        };

        store.dispatch(CartEvent::AvailabilityChecked {
            token,
            available: availability.available,
            message: availability.message.clone(),
        })?;

        if !availability.available {
            return Err(CheckoutError::Unavailable(
                availability
                    .message
                    .unwrap_or_else(|| "No service provider is available for this slot".to_string()),
            ));
        }

        let state = store.snapshot();
        let amounts = calculate(&state);
        let request = checkout_request(&state, &amounts, provider_id);

        let token = store.begin(CartRequest::Checkout)?;
        let order = match self.api.checkout(request).await {
            Ok(order) => order,
            Err(error) => return Err(fail(store, token, error)),
        };

        info!(
            checkout_id = %order.checkout_id,
            amount = %amounts.final_total_amount,
            "checkout created"
        );

        if let Err(error) = self
            .api
            .record_payment(record(&order, PaymentStatus::Initiated, None, None))
            .await
        {
            let abandoned = PaymentRecord {
                failure_reason: Some(format!("payment could not be initiated: {error}")),
                ..record(&order, PaymentStatus::Failed, None, None)
            };

            if let Err(record_error) = self.api.record_payment(abandoned).await {
                warn!(
                    checkout_id = %order.checkout_id,
                    %record_error,
                    "could not record abandoned checkout"
                );
            }

            return Err(fail(store, token, error));
        }

        Ok(PendingPayment {
            token,
            order,
            amounts,
        })
    }

    /// Records how the payment sheet ended and moves the cart accordingly.
    ///
    /// Failed and dismissed payments are persisted as `failed` records so the
    /// backend keeps an audit trail even when nothing was captured. The
    /// outcome is applied to the cart even when the record cannot be written.
    ///
    /// # Errors
    ///
    /// Returns an error when the outcome cannot be recorded or applied.
    pub async fn finish_payment(
        &self,
        store: &mut CartStore,
        pending: PendingPayment,
        outcome: PaymentOutcome,
    ) -> Result<(), CheckoutError> {
        let PendingPayment { token, order, .. } = pending;

        let (payment_record, event) = match outcome {
            PaymentOutcome::Succeeded {
                payment_id,
                signature,
            } => (
                record(&order, PaymentStatus::Success, Some(payment_id), signature),
                CartEvent::PaymentSucceeded { token },
            ),
            PaymentOutcome::Failed { reason } => {
                warn!(checkout_id = %order.checkout_id, %reason, "payment failed");

                (
                    PaymentRecord {
                        failure_reason: Some(reason.clone()),
                        ..record(&order, PaymentStatus::Failed, None, None)
                    },
                    CartEvent::PaymentFailed { token, reason },
                )
            }
            PaymentOutcome::Dismissed => (
                PaymentRecord {
                    failure_reason: Some("payment cancelled by customer".to_string()),
                    ..record(&order, PaymentStatus::Failed, None, None)
                },
                CartEvent::PaymentDismissed { token },
            ),
        };

        let recorded = self.api.record_payment(payment_record).await;

        store.dispatch(event)?;

        recorded.map_err(|error| {
            warn!(checkout_id = %order.checkout_id, %error, "payment outcome not recorded");

            CheckoutError::from(error)
        })
    }
}

/// Dispatches the result of a request, turning failures into `RequestFailed`.
fn settle<T>(
    store: &mut CartStore,
    token: CartToken,
    result: Result<T, ApiError>,
    event: impl FnOnce(CartToken, T) -> CartEvent,
) -> Result<(), CheckoutError> {
    match result {
        Ok(value) => match store.dispatch(event(token, value))? {
            Dispatch::Applied => Ok(()),
            Dispatch::Stale => Err(CheckoutError::Superseded),
        },
        Err(error) => Err(fail(store, token, error)),
    }
}

fn fail(store: &mut CartStore, token: CartToken, error: ApiError) -> CheckoutError {
    if let Err(dispatch_error) = store.dispatch(CartEvent::RequestFailed {
        token,
        message: error.user_message(),
    }) {
        warn!(%dispatch_error, "could not record failed request");
    }

    error.into()
}

fn record(
    order: &CheckoutOrder,
    status: PaymentStatus,
    payment_id: Option<String>,
    signature: Option<String>,
) -> PaymentRecord {
    PaymentRecord {
        checkout_id: order.checkout_id.clone(),
        order_id: order.order_id.clone(),
        status,
        amount: order.amount,
        razorpay_payment_id: payment_id,
        razorpay_signature: signature,
        failure_reason: None,
        recorded_at: Timestamp::now(),
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;
    use crate::cart::{
        models::{Address, CartCategory, CartData, CartItem},
        status::CartStatus,
    };

    fn ready_state() -> CartState {
        CartState {
            status: CartStatus::Success,
            cart_data: Some(CartData {
                total_service_amount: Amount::from_major(500),
                booking_date: Some(date(2026, 10, 20)),
                booking_time: Some("10:00 AM".to_string()),
                address: Some(Address {
                    id: "home".to_string(),
                    label: "Home".to_string(),
                    line1: "12 MG Road".to_string(),
                    line2: None,
                    city: "Pune".to_string(),
                    state: "MH".to_string(),
                    pincode: "411001".to_string(),
                }),
                categories: vec![CartCategory {
                    category_id: "cleaning".to_string(),
                    name: "Cleaning".to_string(),
                    items: vec![CartItem {
                        id: "line-1".to_string(),
                        service_id: "sofa".to_string(),
                        name: "Sofa cleaning".to_string(),
                        quantity: 1,
                        amount: Amount::from_major(500),
                    }],
                    packages: Vec::new(),
                }],
                ..CartData::default()
            }),
            ..CartState::default()
        }
    }

    #[test]
    fn ready_cart_validates() {
        assert_eq!(validate(&ready_state()), Ok(()));
    }

    #[test]
    fn missing_slot_is_reported() {
        let mut state = ready_state();

        if let Some(cart) = state.cart_data.as_mut() {
            cart.booking_time = None;
        }

        assert_eq!(validate(&state), Err(ValidationError::MissingBookingSlot));
    }

    #[test]
    fn missing_address_is_reported() {
        let mut state = ready_state();

        if let Some(cart) = state.cart_data.as_mut() {
            cart.address = None;
        }

        assert_eq!(validate(&state), Err(ValidationError::MissingAddress));
    }

    #[test]
    fn loading_cart_cannot_check_out() {
        let state = CartState {
            status: CartStatus::CartLoading,
            ..ready_state()
        };

        assert_eq!(
            validate(&state),
            Err(ValidationError::InvalidStatus("cartLoading".to_string()))
        );
    }

    #[test]
    fn vip_without_plan_is_reported() {
        let state = CartState {
            payment_type: PaymentType::Vip,
            ..ready_state()
        };

        assert_eq!(validate(&state), Err(ValidationError::MissingVipPlan));
    }

    #[test]
    fn request_carries_wallet_and_amount() {
        let state = CartState {
            selected_tip: Amount::from_major(50),
            is_wallet_enabled: true,
            cart_data: ready_state().cart_data.map(|cart| CartData {
                user_wallet_amount: Amount::from_major(100),
                ..cart
            }),
            ..ready_state()
        };

        let amounts = calculate(&state);
        let request = checkout_request(&state, &amounts, Some("ravi".to_string()));

        assert_eq!(request.wallet_amount, Amount::from_major(100));
        assert_eq!(request.amount, Amount::from_major(450));
        assert_eq!(request.provider_id.as_deref(), Some("ravi"));
        assert!(request.coupon_code.is_none());
    }
}
