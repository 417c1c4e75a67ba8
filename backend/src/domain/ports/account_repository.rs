//! Port abstraction for account persistence adapters and their errors.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Account, AccountId, NewAccountRecord, UniqueField};

use super::AvatarStoreError;
use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// A unique constraint rejected the insert; `field` is `None` when the
        /// constraint could not be identified.
        Conflict { field: Option<UniqueField> } => "account uniqueness conflict on {field:?}",
        /// The attachment written inside the unit of work failed.
        Attachment { message: String } => "account attachment failed: {message}",
    }
}

impl From<AvatarStoreError> for AccountRepositoryError {
    fn from(error: AvatarStoreError) -> Self {
        Self::attachment(error.to_string())
    }
}

/// Side effect executed inside the account insert's unit of work.
///
/// Runs after the row insert and before commit. An error aborts the unit of
/// work so the row is never visible.
#[async_trait]
pub trait PendingAttachment: Send + Sync {
    async fn persist(&self) -> Result<(), AvatarStoreError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Whether a committed account already uses `pseudo`.
    async fn pseudo_exists(&self, pseudo: &str) -> Result<bool, AccountRepositoryError>;

    /// Insert `record` and run `attachment` in one all-or-nothing unit.
    ///
    /// Unique constraints on pseudo, email and phone are enforced by the
    /// store and surface as [`AccountRepositoryError::Conflict`].
    async fn insert(
        &self,
        record: &NewAccountRecord,
        attachment: Option<Arc<dyn PendingAttachment>>,
    ) -> Result<Account, AccountRepositoryError>;

    /// Remove a committed account. Deleting an unknown id succeeds.
    async fn delete(&self, id: &AccountId) -> Result<(), AccountRepositoryError>;
}
