//! Argon2id credential derivation.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

use crate::domain::DerivedCredential;
use crate::domain::ports::{CredentialHashError, CredentialHasher};

/// Derives Argon2id PHC strings with a fresh random salt per call.
#[derive(Default, Clone)]
pub struct Argon2CredentialHasher {
    argon2: Argon2<'static>,
}

impl Argon2CredentialHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `password` against a stored credential.
    pub fn verify(&self, password: &str, credential: &DerivedCredential) -> bool {
        PasswordHash::new(credential.as_str())
            .map(|parsed| {
                self.argon2
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn derive(&self, password: &str) -> Result<DerivedCredential, CredentialHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|error| CredentialHashError::derivation(error.to_string()))?;
        Ok(DerivedCredential::new(hash.to_string()))
    }
}
