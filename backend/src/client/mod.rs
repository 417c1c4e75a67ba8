//! Client-side registration engine.
//!
//! Purpose: give a UI an advisory, incremental view of the registration form
//! without any I/O. The embedding UI feeds [`FormEvent`]s into a
//! [`FormState`], performs the returned [`FormEffect`]s (availability lookups,
//! the final submission) and reports their results back as events.

pub mod form;
pub mod outcome;
pub mod rules;

pub use form::{
    Banner, DEFAULT_DEBOUNCE, FieldStatus, FormEffect, FormEvent, FormState, Origin,
    PseudoAvailability, SubmissionPayload,
};
pub use outcome::SubmitOutcome;
pub use rules::{AvatarSelection, FormValues, PasswordStrength, age_hint, check_field};
