//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and depend only on ports, so they
//! can be tested against mocks without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountRegistration, AvatarStore, PseudoAvailability};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn AccountRegistration>,
    pub availability: Arc<dyn PseudoAvailability>,
    /// Store the registration service writes avatars to; read-only here.
    pub avatars: Arc<dyn AvatarStore>,
}

impl HttpState {
    pub fn new(
        registration: Arc<dyn AccountRegistration>,
        availability: Arc<dyn PseudoAvailability>,
        avatars: Arc<dyn AvatarStore>,
    ) -> Self {
        Self {
            registration,
            availability,
            avatars,
        }
    }
}
