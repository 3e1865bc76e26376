//! Payments
//!
//! What the customer owes for a cart snapshot, and the rules that decide it.

pub mod calculator;
pub mod rules;
pub mod savings;
