//! Coupons
//!
//! Whether discount codes may be entered for the current cart configuration.
//! Every place that needs the answer goes through [`is_applicable`].

use serde::{Deserialize, Serialize};

use crate::{
    amounts::Amount,
    cart::models::{PaymentType, VipPlanId},
};

/// Whether the "Apply Coupon" affordance is available.
///
/// True only when the wallet is off, the order is paid in full, no VIP plan is
/// selected and the cart holds no packages.
pub fn is_applicable(
    wallet_enabled: bool,
    payment_type: PaymentType,
    selected_vip_plan: Option<&VipPlanId>,
    package_item_count: usize,
) -> bool {
    !wallet_enabled
        && payment_type == PaymentType::FullAmount
        && selected_vip_plan.is_none()
        && package_item_count == 0
}

/// The four inputs of the coupon predicate, captured from a cart snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CouponGate<'a> {
    /// Whether wallet credit is requested.
    pub wallet_enabled: bool,
    /// Selected payment mode.
    pub payment_type: PaymentType,
    /// Selected VIP plan, if any.
    pub selected_vip_plan: Option<&'a VipPlanId>,
    /// Package lines in the cart.
    pub package_item_count: usize,
}

impl CouponGate<'_> {
    /// Evaluates the predicate for the captured inputs.
    pub fn is_applicable(&self) -> bool {
        is_applicable(
            self.wallet_enabled,
            self.payment_type,
            self.selected_vip_plan,
            self.package_item_count,
        )
    }
}

/// How a listed coupon discounts the order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    /// Fixed rupee amount off.
    Flat,

    /// Percentage off, optionally capped.
    Percent,
}

/// A coupon offered on the coupons page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    /// Code to apply.
    pub code: String,

    /// Headline.
    #[serde(default)]
    pub title: String,

    /// Terms shown under the headline.
    #[serde(default)]
    pub description: String,

    /// Flat or percentage.
    #[serde(alias = "type")]
    pub kind: CouponKind,

    /// Rupees for flat coupons, whole percent for percentage coupons.
    #[serde(default)]
    pub value: Amount,

    /// Smallest order total the coupon accepts.
    #[serde(default, alias = "minOrderAmount")]
    pub min_order_amount: Amount,

    /// Cap on a percentage discount.
    #[serde(default, alias = "maxDiscount")]
    pub max_discount: Option<Amount>,
}

impl Coupon {
    /// Whether the order total meets the coupon's minimum.
    pub fn meets_minimum(&self, order_total: Amount) -> bool {
        order_total >= self.min_order_amount
    }
}
