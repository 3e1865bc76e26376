//! Cart Status

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by status transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    /// The requested transition is not in the transition table.
    #[error("illegal status transition from {from} to {to}")]
    IllegalTransition {
        /// Status before the transition.
        from: String,
        /// Status that was requested.
        to: String,
    },
}

impl StatusError {
    pub(crate) fn illegal(from: impl fmt::Display, to: impl fmt::Display) -> Self {
        Self::IllegalTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Which cart UI is shown while requests are in flight.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CartStatus {
    /// Nothing requested yet.
    #[default]
    Initial,

    /// Cart fetch in flight.
    CartLoading,

    /// Cart loaded with at least one line.
    Success,

    /// Cart loaded but empty.
    NoDataFound,

    /// A request failed; the page navigates away or resets.
    Failure,

    /// Line removal in flight.
    DeleteLoading,

    /// Payment handed to the gateway.
    PaymentProcessing,

    /// Availability confirmed, checkout may proceed.
    AllowCheckout,

    /// Payment captured.
    PaymentSuccessed,
}

impl CartStatus {
    /// Whether `next` is reachable from this status in one step.
    pub fn can_transition_to(self, next: CartStatus) -> bool {
        use CartStatus::{
            AllowCheckout, CartLoading, DeleteLoading, Failure, Initial, NoDataFound,
            PaymentProcessing, PaymentSuccessed, Success,
        };

        match self {
            Initial => matches!(next, CartLoading),
            CartLoading => matches!(
                next,
                Success
                    | NoDataFound
                    | Failure
                    | DeleteLoading
                    | PaymentProcessing
                    | AllowCheckout
                    | PaymentSuccessed
            ),
            Success => matches!(
                next,
                CartLoading | DeleteLoading | AllowCheckout | PaymentProcessing | Success
            ),
            NoDataFound => matches!(next, CartLoading),
            DeleteLoading => matches!(next, CartLoading | Success | NoDataFound | Failure),
            AllowCheckout => matches!(
                next,
                CartLoading | DeleteLoading | PaymentProcessing | AllowCheckout
            ),
            PaymentProcessing => matches!(next, PaymentSuccessed | Failure | AllowCheckout),
            Failure | PaymentSuccessed => false,
        }
    }

    /// Moves to `next` if the transition table allows it.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::IllegalTransition`] for transitions not in the table.
    pub fn transition(self, next: CartStatus) -> Result<CartStatus, StatusError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(StatusError::illegal(self, next))
        }
    }

    /// Statuses only left by navigating away.
    pub fn is_terminal(self) -> bool {
        matches!(self, CartStatus::Failure | CartStatus::PaymentSuccessed)
    }

    /// Statuses with a request in flight.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            CartStatus::CartLoading | CartStatus::DeleteLoading | CartStatus::PaymentProcessing
        )
    }

    /// Statuses from which checkout may start.
    pub fn accepts_checkout(self) -> bool {
        matches!(self, CartStatus::Success | CartStatus::AllowCheckout)
    }
}

impl fmt::Display for CartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CartStatus::Initial => "initial",
            CartStatus::CartLoading => "cartLoading",
            CartStatus::Success => "success",
            CartStatus::NoDataFound => "noDataFound",
            CartStatus::Failure => "failure",
            CartStatus::DeleteLoading => "deleteLoading",
            CartStatus::PaymentProcessing => "paymentProcessing",
            CartStatus::AllowCheckout => "allowCheckout",
            CartStatus::PaymentSuccessed => "paymentSuccessed",
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const ALL: [CartStatus; 9] = [
        CartStatus::Initial,
        CartStatus::CartLoading,
        CartStatus::Success,
        CartStatus::NoDataFound,
        CartStatus::Failure,
        CartStatus::DeleteLoading,
        CartStatus::PaymentProcessing,
        CartStatus::AllowCheckout,
        CartStatus::PaymentSuccessed,
    ];

    #[test]
    fn initial_only_moves_to_loading() {
        for next in ALL {
            assert_eq!(
                CartStatus::Initial.can_transition_to(next),
                next == CartStatus::CartLoading,
                "initial -> {next}"
            );
        }
    }

    #[test]
    fn loading_reaches_every_outcome() {
        for next in ALL {
            let expected = !matches!(next, CartStatus::Initial | CartStatus::CartLoading);

            assert_eq!(
                CartStatus::CartLoading.can_transition_to(next),
                expected,
                "cartLoading -> {next}"
            );
        }
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        for terminal in [CartStatus::Failure, CartStatus::PaymentSuccessed] {
            assert!(terminal.is_terminal());

            for next in ALL {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn payment_flow_is_allowed() -> TestResult {
        let status = CartStatus::Initial
            .transition(CartStatus::CartLoading)?
            .transition(CartStatus::Success)?
            .transition(CartStatus::AllowCheckout)?
            .transition(CartStatus::PaymentProcessing)?
            .transition(CartStatus::PaymentSuccessed)?;

        assert_eq!(status, CartStatus::PaymentSuccessed);

        Ok(())
    }

    #[test]
    fn illegal_transition_reports_both_ends() {
        let result = CartStatus::NoDataFound.transition(CartStatus::PaymentProcessing);

        assert_eq!(
            result,
            Err(StatusError::IllegalTransition {
                from: "noDataFound".to_string(),
                to: "paymentProcessing".to_string(),
            })
        );
    }

    #[test]
    fn serializes_in_camel_case() -> TestResult {
        assert_eq!(
            serde_json::to_string(&CartStatus::PaymentSuccessed)?,
            r#""paymentSuccessed""#
        );

        Ok(())
    }
}
