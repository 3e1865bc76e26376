//! Savings percentages shown next to VIP and coupon offers.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{amounts::Amount, payments::calculator::Amounts};

/// Share of `original` saved when paying `discounted` instead.
///
/// Returns `None` when there is nothing to compare against or no saving.
pub fn savings_percentage(original: Amount, discounted: Amount) -> Option<Percentage> {
    if !original.is_positive() || discounted >= original {
        return None;
    }

    let saved = original.saturating_sub(discounted.max(Amount::ZERO));
    let ratio = saved.to_decimal().checked_div(original.to_decimal())?;

    Percentage::try_from(ratio.to_string().as_str()).ok()
}

/// Rounds a percentage to whole percent for display.
pub fn whole_percent(percent: Percentage) -> Decimal {
    (percent * Decimal::ONE_HUNDRED).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

impl Amounts {
    /// Saving against the undiscounted total, if any.
    pub fn savings_percentage(&self) -> Option<Percentage> {
        savings_percentage(self.total_price, self.total_remaining_price)
    }
}
