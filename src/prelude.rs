//! Eassy Checkout prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    amounts::{Amount, AmountError},
    api::{ApiError, ApiResponse, CheckoutApi, HttpCheckoutApi},
    cart::{
        models::{AppliedCoupon, CartData, PaymentType, VipPlan, VipPlanId},
        state::CartState,
        status::{CartStatus, StatusError},
        store::{CartEvent, CartRequest, CartStore, CartStoreError, Dispatch},
    },
    checkout::{CheckoutError, CheckoutService, PaymentOutcome, PendingPayment},
    config::FeatureFlags,
    coupons::is_applicable,
    payments::{
        calculator::{Amounts, calculate},
        rules::wallet_applies,
    },
    providers::{ProviderEvent, ProviderRequest, ProviderStatus, ProviderStore},
};
