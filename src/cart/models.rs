//! Cart Models
//!
//! Typed shapes of the backend cart payload. Field names follow the backend;
//! the camel-case spellings it sometimes emits are accepted as aliases.

use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::amounts::Amount;

/// How the customer chooses to pay for the order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    /// Pay the whole order now.
    #[default]
    FullAmount,

    /// Pay a booking deposit now and the remainder before the service.
    Partial,

    /// Pay the VIP-priced amount, buying a VIP plan alongside the order.
    Vip,
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentType::FullAmount => "fullamount",
            PaymentType::Partial => "partial",
            PaymentType::Vip => "vip",
        })
    }
}

/// Identifier of a VIP plan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VipPlanId(String);

impl VipPlanId {
    /// Creates a plan identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Whether the identifier is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VipPlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A prepaid VIP subscription tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VipPlan {
    /// Plan id.
    pub id: VipPlanId,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Price of the plan itself.
    #[serde(default, alias = "price")]
    pub amount: Amount,

    /// Days the plan stays active.
    #[serde(default)]
    pub validity_days: Option<u32>,

    /// Benefits listed on the plan card.
    #[serde(default)]
    pub benefits: Vec<String>,
}

/// A coupon accepted by the backend for the current cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    /// Coupon code.
    pub code: String,

    /// Amount payable for the service items once the coupon is applied.
    #[serde(default, alias = "couponItemDiscountAmount")]
    pub coupon_item_discount_amount: Amount,

    /// Discount granted by the coupon.
    #[serde(default, alias = "couponValue")]
    pub coupon_value: Amount,
}

/// A delivery address saved against the customer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Address id.
    pub id: String,

    /// Label such as Home or Work.
    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub line1: String,

    #[serde(default)]
    pub line2: Option<String>,

    /// City.
    #[serde(default)]
    pub city: String,

    /// State.
    #[serde(default)]
    pub state: String,

    /// Postal code.
    #[serde(default)]
    pub pincode: String,
}

/// A single service line in the cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Cart line id.
    pub id: String,

    /// Service the line is for.
    #[serde(default, alias = "serviceId")]
    pub service_id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Number of units.
    #[serde(default = "one")]
    pub quantity: u32,

    /// Line total.
    #[serde(default)]
    pub amount: Amount,
}

/// A bundled package line in the cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartPackage {
    /// Package line id.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Package price.
    #[serde(default)]
    pub amount: Amount,

    /// Services included in the package.
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// Cart lines grouped under their service category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartCategory {
    /// Category id.
    #[serde(alias = "categoryId")]
    pub category_id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Single service lines.
    #[serde(default)]
    pub items: Vec<CartItem>,

    /// Package lines.
    #[serde(default)]
    pub packages: Vec<CartPackage>,
}

/// Server-computed cart aggregate.
///
/// Only ever replaced wholesale after a round trip, never patched locally.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartData {
    /// Payable for the service items, taxes and charges included.
    #[serde(default, alias = "totalServiceAmount")]
    pub total_service_amount: Amount,

    /// Sum of the item prices before taxes.
    #[serde(default, alias = "itemTotalAmount")]
    pub item_total_amount: Amount,

    /// Tax on the items.
    #[serde(default, alias = "taxAmount")]
    pub tax_amount: Amount,

    /// Convenience fee.
    #[serde(default, alias = "convenienceFee")]
    pub convenience_fee: Amount,

    /// Taxes and other charges together.
    #[serde(default, alias = "taxAndOtherServiceAmount")]
    pub tax_and_other_service_amount: Amount,

    /// Wallet credit the customer holds.
    #[serde(default, alias = "userWalletAmount")]
    pub user_wallet_amount: Amount,

    /// Deposit charged now for a partial payment.
    #[serde(default, alias = "partialPayment")]
    pub partial_payment: Amount,

    /// Balance paid after the service for a partial payment.
    #[serde(default, alias = "leftBalance")]
    pub left_balance: Amount,

    /// Service items price under a VIP plan.
    #[serde(default, alias = "vipFullAmount")]
    pub vip_full_amount: Amount,

    /// VIP discount on the service items.
    #[serde(default, alias = "vipLifeDiscount")]
    pub viplifediscount: Amount,

    /// Delivery address.
    #[serde(default)]
    pub address: Option<Address>,

    /// Booked day.
    #[serde(default, alias = "bookingDate")]
    pub booking_date: Option<Date>,

    /// Booked time slot.
    #[serde(default, alias = "bookingTime")]
    pub booking_time: Option<String>,

    /// Cart lines by category.
    #[serde(default)]
    pub categories: Vec<CartCategory>,
}

impl CartData {
    /// Number of package lines across all categories.
    pub fn package_item_count(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.packages.len())
            .sum()
    }

    /// Number of individual service lines across all categories.
    pub fn service_item_count(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.items.len())
            .sum()
    }

    /// Whether the cart holds no lines at all.
    pub fn is_empty(&self) -> bool {
        self.service_item_count() == 0 && self.package_item_count() == 0
    }

    /// Whether a booking date and time slot have both been chosen.
    pub fn has_booking_slot(&self) -> bool {
        self.booking_date.is_some()
            && self
                .booking_time
                .as_deref()
                .is_some_and(|slot| !slot.trim().is_empty())
    }
}

fn one() -> u32 {
    1
}
