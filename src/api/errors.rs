//! API errors

use thiserror::Error;

/// Message shown when the backend gives no usable explanation.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success flag.
    #[error("{0}")]
    Rejected(String),

    /// The backend answered with a non-2xx status.
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server message or body text.
        message: String,
    },

    /// A successful response carried no `data`.
    #[error("response for {0} carried no data")]
    MissingData(&'static str),
}

impl ApiError {
    /// Builds a rejection from an optional server message.
    pub fn rejected(message: Option<String>) -> Self {
        Self::Rejected(non_blank(message).unwrap_or_else(|| FALLBACK_MESSAGE.to_string()))
    }

    /// Message suitable for the customer: the server's own words when it
    /// sent any, otherwise the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected(message) | ApiError::Status { message, .. } => {
                non_blank(Some(message.clone())).unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
            }
            ApiError::Http(_) | ApiError::MissingData(_) => FALLBACK_MESSAGE.to_string(),
        }
    }
}

fn non_blank(message: Option<String>) -> Option<String> {
    message.filter(|message| !message.trim().is_empty())
}
