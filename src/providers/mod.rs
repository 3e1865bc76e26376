//! Service Providers
//!
//! Listing and selection of the professional who will carry out the booking.

use std::{fmt, sync::Arc};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    amounts::Amount,
    cart::status::StatusError,
    sequencing::{RequestToken, Sequencer},
};

/// A professional offered for the booking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceProvider {
    /// Provider id.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Average rating out of five.
    #[serde(default)]
    pub rating: Option<Decimal>,

    /// Completed bookings.
    #[serde(default, alias = "jobsCompleted")]
    pub jobs_completed: u32,

    /// Visiting charge quoted by the provider.
    #[serde(default)]
    pub price: Amount,

    /// Whether the provider can take this booking.
    #[serde(default = "available")]
    pub available: bool,
}

fn available() -> bool {
    true
}

/// Which provider UI is shown while requests are in flight.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProviderStatus {
    /// Nothing requested yet.
    #[default]
    Initial,
    /// Listing in flight.
    Loading,
    /// Providers listed.
    Success,
    /// Nobody serves this booking.
    NoDataFound,
    /// The listing or selection failed.
    Failure,
    /// Selection in flight.
    Selecting,
    /// A provider is chosen.
    Selected,
}

impl ProviderStatus {
    /// Whether `next` is reachable from this status in one step.
    pub fn can_transition_to(self, next: ProviderStatus) -> bool {
        use ProviderStatus::{Failure, Initial, Loading, NoDataFound, Selected, Selecting, Success};

        match self {
            Initial | NoDataFound | Failure => matches!(next, Loading),
            Loading => matches!(next, Success | NoDataFound | Failure),
            Success => matches!(next, Loading | Selecting),
            Selecting => matches!(next, Selected | Failure | Success),
            Selected => matches!(next, Loading | Selecting),
        }
    }

    /// Moves to `next` if the transition table allows it.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::IllegalTransition`] for transitions not in the table.
    pub fn transition(self, next: ProviderStatus) -> Result<ProviderStatus, StatusError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(StatusError::illegal(self, next))
        }
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProviderStatus::Initial => "initial",
            ProviderStatus::Loading => "loading",
            ProviderStatus::Success => "success",
            ProviderStatus::NoDataFound => "noDataFound",
            ProviderStatus::Failure => "failure",
            ProviderStatus::Selecting => "selecting",
            ProviderStatus::Selected => "selected",
        })
    }
}

/// Provider page snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderState {
    /// Which provider UI is shown.
    pub status: ProviderStatus,
    /// Listed providers.
    pub providers: Vec<ServiceProvider>,
    /// Chosen provider id.
    pub selected: Option<String>,
    /// Message of the last failed request.
    pub last_error: Option<String>,
}

impl ProviderState {
    /// The chosen provider, if it is still listed.
    pub fn selected_provider(&self) -> Option<&ServiceProvider> {
        let id = self.selected.as_deref()?;

        self.providers.iter().find(|provider| provider.id == id)
    }
}

/// Requests made from the provider page.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProviderRequest {
    /// List providers.
    Fetch,
    /// Choose a provider.
    Select,
}

/// Token issued for a provider request.
pub type ProviderToken = RequestToken<ProviderRequest>;

/// Named events that change the provider snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderEvent {
    /// Providers arrived.
    Loaded {
        /// Token of the fetch.
        token: ProviderToken,
        /// Providers returned by the backend.
        providers: Vec<ServiceProvider>,
    },
    /// The backend accepted a provider.
    Selected {
        /// Token of the selection.
        token: ProviderToken,
        /// Chosen provider.
        provider_id: String,
    },
    /// A request failed.
    Failed {
        /// Token of the failed request.
        token: ProviderToken,
        /// Message for the customer.
        message: String,
    },
    /// Back to the initial page.
    Reset,
}

/// Events the provider store refuses to apply.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProviderStoreError {
    /// The provider status cannot make the transition.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// The provider is not in the listing.
    #[error("provider {0} is not listed")]
    UnknownProvider(String),

    /// The provider cannot take this booking.
    #[error("provider {0} is not available")]
    Unavailable(String),
}

/// Reducer-style holder of the provider snapshot.
#[derive(Debug, Clone, Default)]
pub struct ProviderStore {
    state: Arc<ProviderState>,
    sequencer: Sequencer<ProviderRequest>,
}

impl ProviderStore {
    /// Creates a store with an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<ProviderState> {
        Arc::clone(&self.state)
    }

    /// Starts a request.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderStoreError::Status`] when the request cannot start
    /// from the current status.
    pub fn begin(&mut self, request: ProviderRequest) -> Result<ProviderToken, ProviderStoreError> {
        let pending = match request {
            ProviderRequest::Fetch => ProviderStatus::Loading,
            ProviderRequest::Select => ProviderStatus::Selecting,
        };

        if self.state.status != pending {
            let status = self.state.status.transition(pending)?;

            self.state = Arc::new(ProviderState {
                status,
                last_error: None,
                ..(*self.state).clone()
            });
        }

        Ok(self.sequencer.issue(request))
    }

    /// Applies an event. Returns `false` when it answered a superseded request.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderStoreError`] when the event cannot be applied; the
    /// snapshot is left untouched.
    pub fn dispatch(&mut self, event: ProviderEvent) -> Result<bool, ProviderStoreError> {
        let token = match &event {
            ProviderEvent::Loaded { token, .. }
            | ProviderEvent::Selected { token, .. }
            | ProviderEvent::Failed { token, .. } => Some(*token),
            ProviderEvent::Reset => None,
        };

        if let Some(token) = token
            && !self.sequencer.is_current(&token)
        {
            debug!(seq = token.seq(), "dropping provider response for superseded request");

            return Ok(false);
        }

        let current = &*self.state;
        let mut next = current.clone();

        match event {
            ProviderEvent::Loaded { providers, .. } => {
                let status = if providers.is_empty() {
                    ProviderStatus::NoDataFound
                } else {
                    ProviderStatus::Success
                };

                next.status = current.status.transition(status)?;

                if !next
                    .selected
                    .as_deref()
                    .is_some_and(|id| providers.iter().any(|provider| provider.id == id))
                {
                    next.selected = None;
                }

                next.providers = providers;
            }
            ProviderEvent::Selected { provider_id, .. } => {
                let provider = current
                    .providers
                    .iter()
                    .find(|provider| provider.id == provider_id)
                    .ok_or_else(|| ProviderStoreError::UnknownProvider(provider_id.clone()))?;

                if !provider.available {
                    return Err(ProviderStoreError::Unavailable(provider_id));
                }

                next.status = current.status.transition(ProviderStatus::Selected)?;
                next.selected = Some(provider_id);
            }
            ProviderEvent::Failed { message, .. } => {
                warn!(%message, "provider request failed");

                next.status = current.status.transition(ProviderStatus::Failure)?;
                next.last_error = Some(message);
            }
            ProviderEvent::Reset => {
                self.sequencer.invalidate_all();
                next = ProviderState::default();
            }
        }

        self.state = Arc::new(next);

        Ok(true)
    }
}
