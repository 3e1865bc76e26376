//! Backend API
//!
//! One method per backend endpoint the checkout flow depends on.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    cart::models::{Address, AppliedCoupon, CartData, VipPlan},
    coupons::Coupon,
    providers::ServiceProvider,
};

pub mod client;
pub mod envelope;
pub mod errors;
pub mod models;

pub use client::HttpCheckoutApi;
pub use envelope::ApiResponse;
pub use errors::{ApiError, FALLBACK_MESSAGE};

use models::{
    AddToCartRequest, Availability, CheckoutOrder, CheckoutRequest, DonationData,
    FrequentlyAddedService, Notification, PaymentRecord, Settings, UpdateBookingDateRequest,
    WalletTransaction,
};

/// Backend endpoints used by checkout, one method per call.
#[automock]
#[async_trait]
pub trait CheckoutApi: Send + Sync {
    /// Fetch the current cart. `None` when the customer has no cart.
    async fn fetch_cart(&self) -> Result<Option<CartData>, ApiError>;

    /// Add a service or package; returns the refreshed cart.
    async fn add_to_cart(&self, request: AddToCartRequest) -> Result<Option<CartData>, ApiError>;

    /// Remove a cart line; returns the refreshed cart.
    async fn remove_from_cart(&self, cart_item_id: String) -> Result<Option<CartData>, ApiError>;

    /// Set the booking slot.
    async fn update_booking_date(
        &self,
        request: UpdateBookingDateRequest,
    ) -> Result<Option<CartData>, ApiError>;

    /// Set the delivery address.
    async fn update_address(&self, address_id: String) -> Result<Option<CartData>, ApiError>;

    /// Validate a coupon against the cart.
    async fn apply_coupon(&self, code: String) -> Result<AppliedCoupon, ApiError>;

    /// Drop the applied coupon from the cart.
    async fn remove_coupon(&self) -> Result<(), ApiError>;

    /// Coupons offered to the customer.
    async fn list_coupons(&self) -> Result<Vec<Coupon>, ApiError>;

    /// Check that providers can take the booking slot.
    async fn check_availability(&self) -> Result<Availability, ApiError>;

    /// Create a checkout and its gateway order.
    async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutOrder, ApiError>;

    /// Persist the outcome of a payment attempt.
    async fn record_payment(&self, record: PaymentRecord) -> Result<(), ApiError>;

    /// VIP plans on offer.
    async fn vip_plans(&self) -> Result<Vec<VipPlan>, ApiError>;

    /// Donation campaign and amounts.
    async fn donation_data(&self) -> Result<Option<DonationData>, ApiError>;

    /// Services often added alongside the cart.
    async fn frequently_added_services(&self) -> Result<Vec<FrequentlyAddedService>, ApiError>;

    /// Saved addresses.
    async fn addresses(&self) -> Result<Vec<Address>, ApiError>;

    /// Providers able to serve the cart.
    async fn service_providers(&self) -> Result<Vec<ServiceProvider>, ApiError>;

    /// Assign a provider to the booking.
    async fn select_service_provider(&self, provider_id: String) -> Result<(), ApiError>;

    /// Customer settings.
    async fn settings(&self) -> Result<Settings, ApiError>;

    /// Inbox notifications.
    async fn notifications(&self) -> Result<Vec<Notification>, ApiError>;

    /// Wallet ledger.
    async fn wallet_history(&self) -> Result<Vec<WalletTransaction>, ApiError>;
}
