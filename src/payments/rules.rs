//! Payment rules
//!
//! Business rules shared by the calculator, the cart store and checkout.

use crate::cart::{models::PaymentType, state::CartState};

/// Wallet credit never applies to VIP payments.
///
/// The exclusion follows the payment type, not the plan selection: choosing
/// `vip` turns the wallet off even before a plan is picked.
pub fn wallet_applies(payment_type: PaymentType, wallet_enabled: bool) -> bool {
    wallet_enabled && payment_type != PaymentType::Vip
}

/// Whether the snapshot is priced with the VIP branch.
pub fn vip_pricing_active(state: &CartState) -> bool {
    state.payment_type == PaymentType::Vip && state.has_selected_vip_plan()
}

/// Whether the snapshot is priced with the partial-payment branch.
pub fn partial_pricing_active(state: &CartState) -> bool {
    state.payment_type == PaymentType::Partial
}

/// Whether an applied coupon takes part in pricing.
pub fn coupon_pricing_active(state: &CartState) -> bool {
    !vip_pricing_active(state) && !partial_pricing_active(state) && state.is_coupon_applied()
}
