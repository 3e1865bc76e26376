//! Cart State
//!
//! The snapshot every calculation and every screen reads from.

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::{
    amounts::Amount,
    cart::{
        models::{AppliedCoupon, CartData, PaymentType, VipPlan, VipPlanId},
        status::CartStatus,
    },
    coupons::CouponGate,
};

/// Choices offered for tips and donations.
pub type AmountOptions = SmallVec<[Amount; 4]>;

/// Tip amounts offered when the backend does not supply its own list.
pub fn default_tip_options() -> AmountOptions {
    smallvec![
        Amount::from_major(20),
        Amount::from_major(30),
        Amount::from_major(50),
    ]
}

/// Immutable snapshot of the cart page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartState {
    /// Last cart returned by the backend.
    pub cart_data: Option<CartData>,

    /// Selected payment mode. Exactly one is active.
    pub payment_type: PaymentType,

    /// VIP plans on offer.
    pub vip_plans: Vec<VipPlan>,

    /// Selected VIP plan, if any.
    pub selected_vip_plan: Option<VipPlanId>,

    /// Tip amounts on offer.
    pub tip_options: AmountOptions,

    /// Selected tip, zero for none.
    pub selected_tip: Amount,

    /// Donation amounts on offer.
    pub donation_options: AmountOptions,

    /// Selected donation, zero for none.
    pub selected_donation_tip: Amount,

    /// Whether the customer asked to spend wallet credit.
    pub is_wallet_enabled: bool,

    /// Coupon accepted by the backend.
    pub coupon: Option<AppliedCoupon>,

    /// Which page the cart shows.
    pub status: CartStatus,

    /// Message of the last failed request.
    pub last_error: Option<String>,
}

impl Default for CartState {
    fn default() -> Self {
        Self {
            cart_data: None,
            payment_type: PaymentType::FullAmount,
            vip_plans: Vec::new(),
            selected_vip_plan: None,
            tip_options: default_tip_options(),
            selected_tip: Amount::ZERO,
            donation_options: AmountOptions::new(),
            selected_donation_tip: Amount::ZERO,
            is_wallet_enabled: false,
            coupon: None,
            status: CartStatus::Initial,
            last_error: None,
        }
    }
}

impl CartState {
    /// Looks up the selected VIP plan among the plans on offer.
    pub fn selected_plan(&self) -> Option<&VipPlan> {
        let id = self.selected_vip_plan.as_ref()?;

        self.vip_plans.iter().find(|plan| &plan.id == id)
    }

    /// Whether a VIP plan with a usable id is selected.
    pub fn has_selected_vip_plan(&self) -> bool {
        self.selected_vip_plan
            .as_ref()
            .is_some_and(|id| !id.is_blank())
    }

    /// Whether a coupon is currently applied.
    pub fn is_coupon_applied(&self) -> bool {
        self.coupon.is_some()
    }

    /// Number of package lines in the cart, zero when nothing is loaded.
    pub fn package_item_count(&self) -> usize {
        self.cart_data
            .as_ref()
            .map_or(0, CartData::package_item_count)
    }

    /// Inputs of the coupon predicate for this snapshot.
    pub fn coupon_gate(&self) -> CouponGate<'_> {
        CouponGate {
            wallet_enabled: self.is_wallet_enabled,
            payment_type: self.payment_type,
            selected_vip_plan: self.selected_vip_plan.as_ref(),
            package_item_count: self.package_item_count(),
        }
    }

    /// Whether the "Apply Coupon" affordance should render.
    pub fn coupon_affordance_visible(&self) -> bool {
        self.coupon_gate().is_applicable()
    }
}
