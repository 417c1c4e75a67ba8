//! Port for avatar byte storage keyed by [`AvatarKey`].

use async_trait::async_trait;

use crate::domain::registration::AvatarKey;

use super::define_port_error;

define_port_error! {
    /// Errors raised by avatar storage adapters.
    pub enum AvatarStoreError {
        /// The key does not name a file under the storage root.
        InvalidKey { key: String } => "avatar key is not storable: {key}",
        /// Reading or writing the backing store failed.
        Io { message: String } => "avatar storage failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Write `bytes` under `key`, replacing any previous content.
    ///
    /// Readers never observe a partially written file.
    async fn put(&self, key: &AvatarKey, bytes: &[u8]) -> Result<(), AvatarStoreError>;

    /// Move the file at `from` to `to`, replacing whatever `to` held.
    async fn promote(&self, from: &AvatarKey, to: &AvatarKey) -> Result<(), AvatarStoreError>;

    /// Bytes stored at `key`, or `None` when nothing is stored there.
    async fn get(&self, key: &AvatarKey) -> Result<Option<Vec<u8>>, AvatarStoreError>;

    /// Delete the file at `key`. Removing a missing key succeeds.
    async fn remove(&self, key: &AvatarKey) -> Result<(), AvatarStoreError>;

    /// Whether a file is stored at `key`.
    async fn exists(&self, key: &AvatarKey) -> Result<bool, AvatarStoreError>;

    /// Resolvable public URL for `key`.
    fn public_url(&self, key: &AvatarKey) -> String;
}
