//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod account_registration;
mod account_repository;
mod avatar_store;
mod credential_hasher;
mod pseudo_availability;

#[cfg(test)]
pub use account_registration::MockAccountRegistration;
pub use account_registration::{AccountRegistration, RegisteredAccount};
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError, PendingAttachment};
#[cfg(test)]
pub use avatar_store::MockAvatarStore;
pub use avatar_store::{AvatarStore, AvatarStoreError};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHashError, CredentialHasher};
#[cfg(test)]
pub use pseudo_availability::MockPseudoAvailability;
pub use pseudo_availability::{Availability, PseudoAvailability};
