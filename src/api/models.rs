//! API request and response bodies.

use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};

use crate::{
    amounts::Amount,
    cart::models::{PaymentType, VipPlanId},
};

/// Adds a service or package to the cart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AddToCartRequest {
    /// Service to add.
    pub service_id: String,
    /// Number of units.
    pub quantity: u32,

    /// Package to add instead of a single service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
}

/// Removes a cart line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RemoveFromCartRequest {
    /// Cart line to remove.
    pub cart_item_id: String,
}

/// Sets the booking slot on the cart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpdateBookingDateRequest {
    /// Day of the visit.
    pub booking_date: Date,
    /// Time slot label, as offered by the backend.
    pub booking_time: String,
}

/// Sets the delivery address on the cart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpdateAddressRequest {
    /// Saved address to deliver to.
    pub address_id: String,
}

/// Asks the backend to validate a coupon code.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApplyCouponRequest {
    /// Code typed by the customer.
    pub code: String,
}

/// Result of the provider availability check.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Availability {
    /// Whether a provider can take the booking.
    #[serde(alias = "isAvailable")]
    pub available: bool,

    /// Reason shown when nobody is available.
    #[serde(default)]
    pub message: Option<String>,
}

/// Creates a checkout for the current cart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckoutRequest {
    /// Selected payment mode.
    pub payment_type: PaymentType,

    /// Plan bought with a VIP payment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip_plan_id: Option<VipPlanId>,

    /// Applied coupon code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,

    /// Chosen service provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    /// Tip for the professional.
    pub tip: Amount,
    /// Donation added to the order.
    pub donation: Amount,
    /// Wallet credit spent on the order.
    pub wallet_amount: Amount,

    /// Amount the gateway will charge.
    pub amount: Amount,
}

/// Gateway order created by the backend for a checkout.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CheckoutOrder {
    /// Backend checkout id.
    #[serde(alias = "checkoutId")]
    pub checkout_id: String,

    /// Razorpay order id. Absent when wallet credit covers the whole order.
    #[serde(default, alias = "orderId", alias = "razorpay_order_id")]
    pub order_id: Option<String>,

    /// Amount to charge.
    #[serde(default)]
    pub amount: Amount,

    /// ISO currency code.
    #[serde(default = "inr")]
    pub currency: String,

    /// Publishable gateway key for the payment sheet.
    #[serde(default)]
    pub key: Option<String>,
}

fn inr() -> String {
    "INR".to_string()
}

/// State of a payment attempt as recorded on the backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Handed to the gateway.
    Initiated,
    /// The gateway reported a failure or the customer abandoned it.
    Failed,
    /// Captured.
    Success,
}

/// Audit record of a payment attempt.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaymentRecord {
    /// Checkout the attempt belongs to.
    pub checkout_id: String,

    /// Gateway order id, if one was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    /// Outcome of the attempt.
    pub status: PaymentStatus,
    /// Amount charged or attempted.
    pub amount: Amount,

    /// Gateway payment id on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razorpay_payment_id: Option<String>,

    /// Gateway signature on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razorpay_signature: Option<String>,

    /// Why the attempt failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// When the record was written.
    pub recorded_at: Timestamp,
}

/// Donation campaign shown under the tip selector.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DonationData {
    /// Campaign title.
    #[serde(default)]
    pub title: String,

    /// Campaign description.
    #[serde(default)]
    pub description: String,

    /// Donation amounts on offer.
    #[serde(default, alias = "amounts")]
    pub options: Vec<Amount>,
}

/// Service suggested alongside the cart.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FrequentlyAddedService {
    /// Service id.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Starting price.
    #[serde(default)]
    pub amount: Amount,

    /// Category the service belongs to.
    #[serde(default, alias = "categoryId")]
    pub category_id: Option<String>,
}

/// Customer settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Settings {
    /// Push notifications on.
    #[serde(default, alias = "notificationsEnabled")]
    pub notifications_enabled: bool,

    /// Order updates over WhatsApp.
    #[serde(default, alias = "whatsappUpdates")]
    pub whatsapp_updates: bool,

    /// Preferred language code.
    #[serde(default)]
    pub language: Option<String>,
}

/// Notification shown in the inbox.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Notification {
    /// Notification id.
    pub id: String,

    /// Headline.
    #[serde(default)]
    pub title: String,

    /// Message text.
    #[serde(default)]
    pub body: String,

    /// Whether the customer has opened it.
    #[serde(default, alias = "isRead")]
    pub read: bool,

    /// When it was sent.
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<Timestamp>,
}

/// Direction of a wallet movement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletEntryKind {
    /// Money added to the wallet.
    Credit,
    /// Money spent from the wallet.
    Debit,
}

/// A wallet (EassyCash) ledger entry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WalletTransaction {
    /// Ledger entry id.
    pub id: String,

    /// Credit or debit.
    #[serde(alias = "type")]
    pub kind: WalletEntryKind,

    /// Amount moved.
    #[serde(default)]
    pub amount: Amount,

    /// What the movement was for.
    #[serde(default)]
    pub description: String,

    /// When it happened.
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<Timestamp>,
}
