//! Driving port answering whether a pseudo can still be registered.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;

/// Advisory availability answer; the insert's unique constraint stays the
/// final arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Availability {
    pub available: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PseudoAvailability: Send + Sync {
    /// Read-only lookup; repeated calls without intervening registrations
    /// return the same answer.
    async fn check(&self, pseudo: &str) -> Result<Availability, Error>;
}
