//! Response envelope
//!
//! The backend wraps every payload as `{ status | success, message, data }`,
//! spelling the flag either way and as a bool, number or word. Responses are
//! normalised into [`ApiResponse`] before anything else looks at them.

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Success flag in any of the spellings the backend uses.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    /// Boolean flag.
    Bool(bool),
    /// Numeric flag, success for 1 and 2xx codes.
    Number(i64),
    /// Word such as `success` or `ok`.
    Text(String),
}

impl Flag {
    /// Whether the flag means success.
    pub fn is_truthy(&self) -> bool {
        match self {
            Flag::Bool(value) => *value,
            Flag::Number(value) => *value == 1 || (200..300).contains(value),
            Flag::Text(value) => matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "success" | "true" | "ok" | "1"
            ),
        }
    }
}

/// Envelope as it arrives on the wire.
#[derive(Debug, Deserialize)]
pub struct RawEnvelope<T> {
    #[serde(default)]
    status: Option<Flag>,

    #[serde(default)]
    success: Option<Flag>,

    #[serde(default)]
    message: Option<String>,

    #[serde(default = "none")]
    data: Option<T>,
}

fn none<T>() -> Option<T> {
    None
}

/// Normalised envelope.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the backend reported success.
    pub success: bool,
    /// Backend message, or the fallback when blank.
    pub message: String,
    /// Payload, when present.
    pub data: Option<T>,
}

impl<T> From<RawEnvelope<T>> for ApiResponse<T> {
    fn from(raw: RawEnvelope<T>) -> Self {
        let success = raw
            .success
            .as_ref()
            .or(raw.status.as_ref())
            .is_some_and(Flag::is_truthy);

        Self {
            success,
            message: raw.message.unwrap_or_default(),
            data: raw.data,
        }
    }
}

impl<T> ApiResponse<T> {
    /// Turns a non-success response into an error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] carrying the server message, or the
    /// fallback message when there is none.
    pub fn into_result(self) -> Result<Self, ApiError> {
        if self.success {
            Ok(self)
        } else {
            Err(ApiError::rejected(Some(self.message)))
        }
    }

    /// Returns the payload of a successful response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] for non-success responses and
    /// [`ApiError::MissingData`] when `data` is absent.
    pub fn into_data(self, what: &'static str) -> Result<T, ApiError> {
        self.into_result()?.data.ok_or(ApiError::MissingData(what))
    }

    /// Returns the optional payload of a successful response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] for non-success responses.
    pub fn into_optional_data(self) -> Result<Option<T>, ApiError> {
        Ok(self.into_result()?.data)
    }
}
