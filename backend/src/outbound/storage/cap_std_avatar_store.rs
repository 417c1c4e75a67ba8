//! Filesystem avatar store confined to one directory through `cap_std`.
//!
//! Writes are staged under a temporary name next to the target and renamed
//! into place, so a reader sees either the previous file or the complete new
//! one. Promotion is a single rename. Keys are relative paths; anything that
//! would escape the root is refused before the filesystem is touched.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::domain::ports::{AvatarStore, AvatarStoreError};
use crate::domain::registration::AvatarKey;

/// Path segment under which stored files are served.
pub const PUBLIC_PREFIX: &str = "storage";

/// Avatar store rooted at a directory on local disk.
#[derive(Clone)]
pub struct CapStdAvatarStore {
    root: Arc<Dir>,
    public_base: String,
}

impl std::fmt::Debug for CapStdAvatarStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapStdAvatarStore")
            .field("public_base", &self.public_base)
            .finish_non_exhaustive()
    }
}

impl CapStdAvatarStore {
    /// Open (creating if needed) `root` and serve files below `public_base_url`.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created or opened.
    pub fn open(root: &Path, public_base_url: &Url) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
            public_base: public_base_url.as_str().trim_end_matches('/').to_owned(),
        })
    }

    async fn blocking<T, F>(&self, operation: F) -> Result<T, AvatarStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, AvatarStoreError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || operation(&root))
            .await
            .map_err(|error| AvatarStoreError::io(error.to_string()))?
    }
}

/// Validate `key` as a relative path made only of normal components.
fn relative_path(key: &AvatarKey) -> Result<PathBuf, AvatarStoreError> {
    let path = Path::new(key.as_str());
    let mut components = path.components().peekable();
    if components.peek().is_none() {
        return Err(AvatarStoreError::invalid_key(key.as_str()));
    }
    if components.all(|component| matches!(component, Component::Normal(_))) {
        Ok(path.to_path_buf())
    } else {
        Err(AvatarStoreError::invalid_key(key.as_str()))
    }
}

fn io_error(path: &Path, error: io::Error) -> AvatarStoreError {
    AvatarStoreError::io(format!("{}: {error}", path.display()))
}

fn ensure_parent<'a>(dir: &Dir, path: &'a Path) -> Result<Option<&'a Path>, AvatarStoreError> {
    let parent = path.parent().filter(|parent| !parent.as_os_str().is_empty());
    if let Some(parent) = parent {
        dir.create_dir_all(parent)
            .map_err(|error| io_error(parent, error))?;
    }
    Ok(parent)
}

fn write_replacing(dir: &Dir, path: &Path, bytes: &[u8]) -> Result<(), AvatarStoreError> {
    let parent = ensure_parent(dir, path)?;
    let staged_name = format!(".tmp-avatar-{}", Uuid::new_v4().simple());
    let staged = parent.map_or_else(|| PathBuf::from(&staged_name), |p| p.join(&staged_name));

    dir.write(&staged, bytes)
        .map_err(|error| io_error(&staged, error))?;
    if let Err(error) = dir.rename(&staged, dir, path) {
        let _cleanup_result = dir.remove_file(&staged);
        return Err(io_error(path, error));
    }
    Ok(())
}

#[async_trait]
impl AvatarStore for CapStdAvatarStore {
    async fn put(&self, key: &AvatarKey, bytes: &[u8]) -> Result<(), AvatarStoreError> {
        let path = relative_path(key)?;
        let bytes = bytes.to_vec();
        debug!(key = %key, size = bytes.len(), "writing avatar");
        self.blocking(move |dir| write_replacing(dir, &path, &bytes))
            .await
    }

    async fn promote(&self, from: &AvatarKey, to: &AvatarKey) -> Result<(), AvatarStoreError> {
        let source = relative_path(from)?;
        let target = relative_path(to)?;
        debug!(from = %from, to = %to, "promoting avatar");
        self.blocking(move |dir| {
            ensure_parent(dir, &target)?;
            dir.rename(&source, dir, &target)
                .map_err(|error| io_error(&source, error))
        })
        .await
    }

    async fn get(&self, key: &AvatarKey) -> Result<Option<Vec<u8>>, AvatarStoreError> {
        let path = relative_path(key)?;
        self.blocking(move |dir| match dir.read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error(&path, error)),
        })
        .await
    }

    async fn remove(&self, key: &AvatarKey) -> Result<(), AvatarStoreError> {
        let path = relative_path(key)?;
        self.blocking(move |dir| match dir.remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error(&path, error)),
        })
        .await
    }

    async fn exists(&self, key: &AvatarKey) -> Result<bool, AvatarStoreError> {
        let path = relative_path(key)?;
        self.blocking(move |dir| match dir.metadata(&path) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(io_error(&path, error)),
        })
        .await
    }

    fn public_url(&self, key: &AvatarKey) -> String {
        format!("{}/{PUBLIC_PREFIX}/{}", self.public_base, key.as_str())
    }
}
