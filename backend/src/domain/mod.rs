//! Domain primitives, ports and services.
//!
//! Purpose: define strongly typed registration entities and the use-cases
//! that operate on them, independent of HTTP or persistence details.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - Account, NewAccountRecord, DerivedCredential: persisted account model.
//! - registration: rules, reason vocabulary and services.

pub mod account;
pub mod error;
pub mod ports;
pub mod registration;
pub mod trace_id;

pub use self::account::{Account, AccountId, DerivedCredential, NewAccountRecord, UniqueField};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::registration::{PseudoAvailabilityService, RegistrationService};
pub use self::trace_id::TraceId;
