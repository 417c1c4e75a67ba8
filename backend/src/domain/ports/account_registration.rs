//! Driving port for the registration use-case.
//!
//! Inbound adapters submit a raw candidate and receive either the created
//! account or a domain [`Error`]. Validation failures carry per-field reasons
//! via [`Error::field_errors`].

use async_trait::async_trait;

use crate::domain::registration::RegistrationCandidate;
use crate::domain::{Account, Error};

/// Account created by a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAccount {
    pub account: Account,
    /// Public URL of the stored avatar, if one was uploaded.
    pub avatar_url: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRegistration: Send + Sync {
    /// Validate and atomically persist `candidate`.
    async fn register(&self, candidate: RegistrationCandidate) -> Result<RegisteredAccount, Error>;
}
