//! Unvalidated registration input.

use std::fmt;

use zeroize::Zeroizing;

/// Country used when a candidate does not name one.
pub const DEFAULT_COUNTRY: &str = "FR";

/// Raw avatar bytes submitted alongside a registration.
#[derive(Clone, PartialEq, Eq)]
pub struct AvatarUpload {
    bytes: Vec<u8>,
}

impl AvatarUpload {
    /// Wrap uploaded bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Borrow the uploaded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the upload in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the upload carries no data.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for AvatarUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarUpload")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Transient registration attempt exactly as the user submitted it.
///
/// Nothing here has been validated. The password is wiped from memory when
/// the candidate is dropped and never appears in `Debug` output.
#[derive(Clone)]
pub struct RegistrationCandidate {
    pub last_name: String,
    pub first_name: String,
    pub pseudo: String,
    pub email: String,
    pub password: Zeroizing<String>,
    pub phone: String,
    pub country: String,
    /// Calendar date as `YYYY-MM-DD`.
    pub birthday: String,
    pub avatar: Option<AvatarUpload>,
}

impl RegistrationCandidate {
    /// Start a candidate with every text field empty and the default country.
    pub fn empty() -> Self {
        Self {
            last_name: String::new(),
            first_name: String::new(),
            pseudo: String::new(),
            email: String::new(),
            password: Zeroizing::new(String::new()),
            phone: String::new(),
            country: DEFAULT_COUNTRY.to_owned(),
            birthday: String::new(),
            avatar: None,
        }
    }

    /// Borrow the plaintext password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl Default for RegistrationCandidate {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for RegistrationCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationCandidate")
            .field("last_name", &self.last_name)
            .field("first_name", &self.first_name)
            .field("pseudo", &self.pseudo)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone", &self.phone)
            .field("country", &self.country)
            .field("birthday", &self.birthday)
            .field("avatar", &self.avatar)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn debug_output_redacts_password() {
        let candidate = RegistrationCandidate {
            password: Zeroizing::new("Secret123!".to_owned()),
            ..RegistrationCandidate::empty()
        };
        let rendered = format!("{candidate:?}");
        assert!(!rendered.contains("Secret123!"));
        assert!(rendered.contains("<redacted>"));
    }

    #[rstest]
    fn avatar_debug_reports_length_only() {
        let avatar = AvatarUpload::new(vec![0_u8; 4]);
        assert_eq!(format!("{avatar:?}"), "AvatarUpload { len: 4 }");
    }
}
