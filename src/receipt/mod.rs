//! Receipt
//!
//! Payment breakdown table printed by the command line tool.

use std::io;

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};

use crate::{
    amounts::Amount,
    cart::{models::PaymentType, state::CartState},
    payments::{
        calculator::Amounts,
        rules::vip_pricing_active,
        savings::whole_percent,
    },
};

/// Shown under the breakdown when the cancellation policy is enabled.
pub const CANCELLATION_POLICY: &str =
    "Free cancellation up to 3 hours before the slot. Later cancellations may be charged.";

/// Rows of the breakdown, label then value.
pub fn breakdown_rows(state: &CartState, amounts: &Amounts) -> Vec<[String; 2]> {
    let mut rows = vec![row("Service items", amounts.service_items_total_amount)];

    // Already part of the service items total.
    if amounts.tax_and_other_service_amount.is_positive() {
        rows.push(row(
            "  incl. taxes & other charges",
            amounts.tax_and_other_service_amount,
        ));
    }

    if amounts.tip_price.is_positive() {
        rows.push(row("Tip", amounts.tip_price));
    }

    if amounts.donation_price.is_positive() {
        rows.push(row("Donation", amounts.donation_price));
    }

    if vip_pricing_active(state) {
        rows.push(row("VIP plan", amounts.vip_plan_amount));
        rows.push(negative("VIP savings", amounts.vip_plan_discount_amount));
    } else if amounts.final_total_discount_amount.is_positive() {
        let label = state
            .coupon
            .as_ref()
            .map_or_else(|| "Discount".to_string(), |coupon| format!("Coupon {}", coupon.code));

        rows.push(negative(&label, amounts.final_total_discount_amount));
    }

    if amounts.wallet_deduction_amount.is_positive() {
        rows.push(negative("EassyCash", amounts.wallet_deduction_amount));
    }

    rows.push(row("Pay now", amounts.final_total_amount));

    if state.payment_type == PaymentType::Partial {
        rows.push(row("Pay before service", amounts.final_remaining_amounts));
    }

    if let Some(percent) = amounts.savings_percentage() {
        rows.push(["You save".to_string(), format!("{}%", whole_percent(percent))]);
    }

    rows
}

/// Writes the breakdown as a table.
///
/// # Errors
///
/// Returns an error when writing to `out` fails.
pub fn write_breakdown(
    out: &mut impl io::Write,
    state: &CartState,
    amounts: &Amounts,
) -> io::Result<()> {
    let mut builder = Builder::default();

    builder.push_record(["", "Amount"]);

    for record in breakdown_rows(state, amounts) {
        builder.push_record(record);
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..2), Alignment::right());

    writeln!(out, "{table}")
}

fn row(label: &str, amount: Amount) -> [String; 2] {
    [label.to_string(), amount.to_string()]
}

fn negative(label: &str, amount: Amount) -> [String; 2] {
    [label.to_string(), format!("-{amount}")]
}
