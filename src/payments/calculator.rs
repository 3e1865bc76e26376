//! Payment amount calculator

use serde::Serialize;

use crate::{
    amounts::Amount,
    cart::state::CartState,
    payments::rules::{coupon_pricing_active, partial_pricing_active, vip_pricing_active, wallet_applies},
};

/// Everything the checkout screen shows about what is owed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Amounts {
    /// Selected donation.
    pub donation_price: Amount,

    /// Selected tip.
    pub tip_price: Amount,

    /// Service items plus tip and donation, before any discount.
    pub total_price: Amount,

    /// `total_price` less the discount, never negative.
    pub total_remaining_price: Amount,

    /// Wallet balance reported by the backend.
    pub available_wallet_amount: Amount,

    /// Payable amount of the service items at full price.
    pub service_items_total_amount: Amount,

    /// VIP saving, when VIP pricing is active.
    pub vip_plan_discount_amount: Amount,

    /// Price of the selected VIP plan.
    pub vip_plan_amount: Amount,

    /// Taxes and other charges as aggregated by the backend.
    pub tax_and_other_service_amount: Amount,

    /// Taxes, fees, tip and donation as one line.
    pub tax_and_other_service_custom_amount: Amount,

    /// Amount charged now, after wallet credit.
    pub final_total_amount: Amount,

    /// Discount granted by VIP pricing or the coupon.
    pub final_total_discount_amount: Amount,

    /// Balance left to pay later on a partial payment.
    pub final_remaining_amounts: Amount,

    /// Wallet credit spent on this payment.
    pub wallet_deduction_amount: Amount,
}

/// Computes what the customer pays now for the given snapshot.
///
/// Missing cart data yields zeroed amounts.
pub fn calculate(state: &CartState) -> Amounts {
    let Some(cart) = state.cart_data.as_ref() else {
        return Amounts::default();
    };

    let tip = state.selected_tip;
    let donation = state.selected_donation_tip;
    let extras = tip.saturating_add(donation);

    let service_items_total_amount = cart.total_service_amount;
    let total_price = service_items_total_amount.saturating_add(extras);

    let mut amounts = Amounts {
        donation_price: donation,
        tip_price: tip,
        total_price,
        available_wallet_amount: cart.user_wallet_amount,
        service_items_total_amount,
        vip_plan_amount: state.selected_plan().map_or(Amount::ZERO, |plan| plan.amount),
        tax_and_other_service_amount: cart.tax_and_other_service_amount,
        tax_and_other_service_custom_amount: cart
            .tax_amount
            .saturating_add(cart.convenience_fee)
            .saturating_add(extras),
        ..Amounts::default()
    };

    if vip_pricing_active(state) {
        amounts.final_total_amount = cart.vip_full_amount.saturating_add(extras);
        amounts.final_total_discount_amount = cart.viplifediscount;
        amounts.vip_plan_discount_amount = cart.viplifediscount;
    } else if partial_pricing_active(state) {
        amounts.final_total_amount = cart.partial_payment.saturating_add(extras);
        amounts.final_remaining_amounts = cart.left_balance;
    } else if let Some(coupon) = state.coupon.as_ref().filter(|_| coupon_pricing_active(state)) {
        amounts.final_total_amount = coupon.coupon_item_discount_amount.saturating_add(extras);
        amounts.final_total_discount_amount = coupon.coupon_value;
    } else {
        amounts.final_total_amount = total_price;
    }

    amounts.total_remaining_price = total_price.clamped_sub(amounts.final_total_discount_amount);

    if wallet_applies(state.payment_type, state.is_wallet_enabled)
        && amounts.available_wallet_amount.is_positive()
    {
        let deduction = amounts
            .available_wallet_amount
            .min(amounts.final_total_amount)
            .max(Amount::ZERO);

        amounts.wallet_deduction_amount = deduction;
        amounts.final_total_amount = amounts.final_total_amount.clamped_sub(deduction);
    }

    amounts
}

#[cfg(test)]
mod tests {
    use crate::cart::models::{AppliedCoupon, CartData, PaymentType, VipPlan, VipPlanId};

    use super::*;

    fn cart(total: i64) -> CartData {
        CartData {
            total_service_amount: Amount::from_major(total),
            ..CartData::default()
        }
    }

    fn state(cart_data: CartData) -> CartState {
        CartState {
            cart_data: Some(cart_data),
            ..CartState::default()
        }
    }

    #[test]
    fn missing_cart_is_zeroed() {
        assert_eq!(calculate(&CartState::default()), Amounts::default());
    }

    #[test]
    fn full_amount_with_tip() {
        let state = CartState {
            selected_tip: Amount::from_major(50),
            ..state(cart(500))
        };

        let amounts = calculate(&state);

        assert_eq!(amounts.final_total_amount, Amount::from_major(550));
        assert_eq!(amounts.total_price, Amount::from_major(550));
        assert_eq!(amounts.final_total_discount_amount, Amount::ZERO);
        assert_eq!(amounts.wallet_deduction_amount, Amount::ZERO);
    }

    #[test]
    fn wallet_covers_whole_order() {
        let state = CartState {
            selected_tip: Amount::from_major(50),
            is_wallet_enabled: true,
            ..state(CartData {
                user_wallet_amount: Amount::from_major(600),
                ..cart(500)
            })
        };

        let amounts = calculate(&state);

        assert_eq!(amounts.wallet_deduction_amount, Amount::from_major(550));
        assert_eq!(amounts.final_total_amount, Amount::ZERO);
    }

    #[test]
    fn wallet_partially_covers_order() {
        let state = CartState {
            is_wallet_enabled: true,
            ..state(CartData {
                user_wallet_amount: Amount::from_major(120),
                ..cart(500)
            })
        };

        let amounts = calculate(&state);

        assert_eq!(amounts.wallet_deduction_amount, Amount::from_major(120));
        assert_eq!(amounts.final_total_amount, Amount::from_major(380));
    }

    #[test]
    fn partial_payment_defers_balance() {
        let state = CartState {
            payment_type: PaymentType::Partial,
            ..state(CartData {
                partial_payment: Amount::from_major(99),
                left_balance: Amount::from_major(400),
                ..cart(499)
            })
        };

        let amounts = calculate(&state);

        assert_eq!(amounts.final_total_amount, Amount::from_major(99));
        assert_eq!(amounts.final_remaining_amounts, Amount::from_major(400));
    }

    #[test]
    fn coupon_replaces_item_total() {
        let state = CartState {
            selected_donation_tip: Amount::from_major(10),
            coupon: Some(AppliedCoupon {
                code: "FIRST50".to_string(),
                coupon_item_discount_amount: Amount::from_major(450),
                coupon_value: Amount::from_major(50),
            }),
            ..state(cart(500))
        };

        let amounts = calculate(&state);

        assert_eq!(amounts.final_total_amount, Amount::from_major(460));
        assert_eq!(amounts.final_total_discount_amount, Amount::from_major(50));
        assert_eq!(amounts.total_remaining_price, Amount::from_major(460));
    }

    #[test]
    fn vip_ignores_wallet() {
        let state = CartState {
            payment_type: PaymentType::Vip,
            selected_vip_plan: Some(VipPlanId::new("gold")),
            vip_plans: vec![VipPlan {
                id: VipPlanId::new("gold"),
                name: "Gold".to_string(),
                amount: Amount::from_major(199),
                validity_days: Some(365),
                benefits: Vec::new(),
            }],
            is_wallet_enabled: true,
            ..state(CartData {
                vip_full_amount: Amount::from_major(600),
                viplifediscount: Amount::from_major(99),
                user_wallet_amount: Amount::from_major(1_000),
                ..cart(500)
            })
        };

        let amounts = calculate(&state);

        assert_eq!(amounts.final_total_amount, Amount::from_major(600));
        assert_eq!(amounts.final_total_discount_amount, Amount::from_major(99));
        assert_eq!(amounts.vip_plan_discount_amount, Amount::from_major(99));
        assert_eq!(amounts.vip_plan_amount, Amount::from_major(199));
        assert_eq!(amounts.wallet_deduction_amount, Amount::ZERO);
    }

    #[test]
    fn vip_without_plan_prices_as_full_amount() {
        let state = CartState {
            payment_type: PaymentType::Vip,
            ..state(CartData {
                vip_full_amount: Amount::from_major(600),
                ..cart(500)
            })
        };

        assert_eq!(calculate(&state).final_total_amount, Amount::from_major(500));
    }

    #[test]
    fn custom_tax_line_includes_extras() {
        let state = CartState {
            selected_tip: Amount::from_major(20),
            selected_donation_tip: Amount::from_major(5),
            ..state(CartData {
                tax_amount: Amount::from_major(36),
                convenience_fee: Amount::from_major(49),
                tax_and_other_service_amount: Amount::from_major(85),
                ..cart(500)
            })
        };

        let amounts = calculate(&state);

        assert_eq!(amounts.tax_and_other_service_amount, Amount::from_major(85));
        assert_eq!(
            amounts.tax_and_other_service_custom_amount,
            Amount::from_major(110)
        );
    }
}
