//! Avatar encodings and storage keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::AccountId;

/// Largest accepted avatar, in bytes (10 MiB).
pub const MAX_AVATAR_BYTES: usize = 10 * 1024 * 1024;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Raster encodings accepted for avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarFormat {
    Jpeg,
    Png,
}

impl AvatarFormat {
    /// Identify the encoding from the leading magic bytes.
    ///
    /// Declared content types and file names are ignored; only the bytes
    /// decide.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&PNG_SIGNATURE) {
            Some(Self::Png)
        } else if bytes.starts_with(&JPEG_SIGNATURE) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    /// File extension used in storage keys.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// IANA media type.
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Opaque storage key for an avatar.
///
/// New keys are derived from the pseudo (`avatars/avatar-{pseudo}.{ext}`) so
/// two accounts can only collide on a key when they collide on pseudo, which
/// the account store already forbids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvatarKey(String);

impl AvatarKey {
    /// Derive the key for a pseudo and encoding.
    ///
    /// # Examples
    /// ```
    /// use signup::domain::registration::{AvatarFormat, AvatarKey};
    ///
    /// let key = AvatarKey::for_pseudo("john99", AvatarFormat::Png);
    /// assert_eq!(key.as_str(), "avatars/avatar-john99.png");
    /// ```
    pub fn for_pseudo(pseudo: &str, format: AvatarFormat) -> Self {
        Self(format!("avatars/avatar-{pseudo}.{}", format.extension()))
    }

    /// Per-registration key the upload is written to before the account
    /// commits.
    ///
    /// Staged keys live under a dot-prefixed directory and are never served.
    pub fn staged_for(account: &AccountId, format: AvatarFormat) -> Self {
        Self(format!("avatars/.staging/{account}.{}", format.extension()))
    }

    /// Rehydrate a key previously recorded on an account.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the key.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether any segment of the key is dot-prefixed (staged or temporary).
    pub fn is_hidden(&self) -> bool {
        self.0.split('/').any(|segment| segment.starts_with('.'))
    }
}

impl AsRef<str> for AvatarKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AvatarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AvatarKey> for String {
    fn from(value: AvatarKey) -> Self {
        value.0
    }
}
