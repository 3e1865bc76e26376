//! Eassy Checkout
//!
//! Checkout core of a home-services storefront: cart snapshots, payment
//! amounts, coupon gating, status machines and the backend API they run on.

pub mod account;
pub mod amounts;
pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod coupons;
pub mod fixtures;
pub mod logging;
pub mod payments;
pub mod prelude;
pub mod providers;
pub mod receipt;
pub mod sequencing;
