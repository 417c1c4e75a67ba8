//! Account self-registration backend.
//!
//! `domain` holds the rules and the registration use-case, `inbound` the
//! HTTP adapter, `outbound` the persistence, storage and credential
//! adapters, and `client` the form-side validation state machine.

pub mod client;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
