//! Port deriving one-way credentials from plaintext passwords.

use crate::domain::DerivedCredential;

use super::define_port_error;

define_port_error! {
    /// Errors raised while deriving a credential.
    pub enum CredentialHashError {
        Derivation { message: String } => "credential derivation failed: {message}",
    }
}

/// Derives credentials; implementations are CPU-bound and synchronous.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Derive a salted, non-reversible credential from `password`.
    fn derive(&self, password: &str) -> Result<DerivedCredential, CredentialHashError>;
}
