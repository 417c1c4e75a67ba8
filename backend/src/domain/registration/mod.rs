//! Registration rules and use-cases.
//!
//! `rules` holds the authoritative predicates; `service` runs them and
//! persists the account together with its avatar. The [`Field`] and
//! [`ReasonCode`] vocabulary is shared with the advisory client rules.

mod availability;
mod avatar;
mod candidate;
mod phone;
mod reason;
pub mod rules;
mod service;

pub use availability::PseudoAvailabilityService;
pub use avatar::{AvatarFormat, AvatarKey, MAX_AVATAR_BYTES};
pub use candidate::{AvatarUpload, DEFAULT_COUNTRY, RegistrationCandidate};
pub use phone::{PhoneMatch, match_phone, supported_countries};
pub use reason::{Field, FieldErrors, ReasonCode};
pub use rules::{ValidRegistration, validate_candidate};
pub use service::RegistrationService;
