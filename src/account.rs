//! Account
//!
//! Customer data shown around the checkout: saved addresses, settings, the
//! notification inbox and the wallet ledger.

use std::{cmp::Reverse, sync::Arc};

use crate::{
    amounts::Amount,
    api::{
        ApiError, CheckoutApi,
        models::{Notification, Settings, WalletEntryKind, WalletTransaction},
    },
    cart::models::Address,
};

/// Wallet ledger with running totals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WalletStatement {
    /// Ledger entries, newest first.
    pub entries: Vec<WalletTransaction>,

    /// Sum of all credits.
    pub credited: Amount,

    /// Sum of all debits.
    pub debited: Amount,
}

impl WalletStatement {
    /// Builds a statement from ledger entries in any order.
    pub fn new(mut entries: Vec<WalletTransaction>) -> Self {
        entries.sort_by_key(|entry| Reverse(entry.created_at));

        let total = |kind: WalletEntryKind| {
            entries
                .iter()
                .filter(|entry| entry.kind == kind)
                .map(|entry| entry.amount)
                .sum::<Amount>()
        };

        let credited = total(WalletEntryKind::Credit);
        let debited = total(WalletEntryKind::Debit);

        Self {
            entries,
            credited,
            debited,
        }
    }

    /// Credits minus debits.
    pub fn net(&self) -> Amount {
        self.credited.saturating_sub(self.debited)
    }
}

/// Reads customer account data from the backend.
#[derive(Clone)]
pub struct AccountService {
    api: Arc<dyn CheckoutApi>,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish_non_exhaustive()
    }
}

impl AccountService {
    /// Creates a service over the given backend.
    pub fn new(api: Arc<dyn CheckoutApi>) -> Self {
        Self { api }
    }

    /// Saved delivery addresses.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn saved_addresses(&self) -> Result<Vec<Address>, ApiError> {
        self.api.addresses().await
    }

    /// Customer settings.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn settings(&self) -> Result<Settings, ApiError> {
        self.api.settings().await
    }

    /// Notifications not read yet.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn unread_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        let mut notifications = self.api.notifications().await?;

        notifications.retain(|notification| !notification.read);

        Ok(notifications)
    }

    /// The wallet ledger with totals.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    pub async fn wallet_statement(&self) -> Result<WalletStatement, ApiError> {
        Ok(WalletStatement::new(self.api.wallet_history().await?))
    }
}
