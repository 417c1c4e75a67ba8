//! Avatar store keeping files in a map, paired with the in-memory repository.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use url::Url;

use crate::domain::ports::{AvatarStore, AvatarStoreError};
use crate::domain::registration::AvatarKey;
use crate::outbound::storage::PUBLIC_PREFIX;

#[derive(Debug)]
pub struct InMemoryAvatarStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    public_base: String,
}

impl InMemoryAvatarStore {
    pub fn new(public_base_url: &Url) -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            public_base: public_base_url.as_str().trim_end_matches('/').to_owned(),
        }
    }

    fn files(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keys currently holding a file, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.files().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.files().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files().is_empty()
    }
}

#[async_trait]
impl AvatarStore for InMemoryAvatarStore {
    async fn put(&self, key: &AvatarKey, bytes: &[u8]) -> Result<(), AvatarStoreError> {
        self.files().insert(key.as_str().to_owned(), bytes.to_vec());
        Ok(())
    }

    async fn promote(&self, from: &AvatarKey, to: &AvatarKey) -> Result<(), AvatarStoreError> {
        let mut files = self.files();
        let bytes = files
            .remove(from.as_str())
            .ok_or_else(|| AvatarStoreError::io(format!("nothing stored at {from}")))?;
        files.insert(to.as_str().to_owned(), bytes);
        Ok(())
    }

    async fn get(&self, key: &AvatarKey) -> Result<Option<Vec<u8>>, AvatarStoreError> {
        Ok(self.files().get(key.as_str()).cloned())
    }

    async fn remove(&self, key: &AvatarKey) -> Result<(), AvatarStoreError> {
        self.files().remove(key.as_str());
        Ok(())
    }

    async fn exists(&self, key: &AvatarKey) -> Result<bool, AvatarStoreError> {
        Ok(self.files().contains_key(key.as_str()))
    }

    fn public_url(&self, key: &AvatarKey) -> String {
        format!("{}/{PUBLIC_PREFIX}/{}", self.public_base, key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::AvatarFormat;
    use rstest::rstest;

    fn store() -> InMemoryAvatarStore {
        InMemoryAvatarStore::new(&Url::parse("https://cdn.example.org").expect("url"))
    }

    #[rstest]
    #[tokio::test]
    async fn put_get_remove() {
        let store = store();
        let key = AvatarKey::for_pseudo("ada_l", AvatarFormat::Jpeg);

        store.put(&key, b"jpeg").await.expect("put");
        assert_eq!(store.get(&key).await.expect("get"), Some(b"jpeg".to_vec()));
        assert!(store.exists(&key).await.expect("exists"));
        assert_eq!(
            store.public_url(&key),
            "https://cdn.example.org/storage/avatars/avatar-ada_l.jpg"
        );

        store.remove(&key).await.expect("remove");
        assert!(store.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn promote_renames_and_requires_a_source() {
        let store = store();
        let staged = AvatarKey::from_stored("avatars/.staging/one.jpg");
        let key = AvatarKey::for_pseudo("ada_l", AvatarFormat::Jpeg);

        store.put(&staged, b"jpeg").await.expect("stage");
        store.promote(&staged, &key).await.expect("promote");
        assert_eq!(store.keys(), vec![key.as_str().to_owned()]);

        let err = store.promote(&staged, &key).await.expect_err("already moved");
        assert!(matches!(err, AvatarStoreError::Io { .. }));
    }
}
