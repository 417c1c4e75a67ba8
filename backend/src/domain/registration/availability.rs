//! Pseudo availability lookup.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use super::rules::pseudo_reasons;
use crate::domain::Error;
use crate::domain::ports::{AccountRepository, AccountRepositoryError, Availability, PseudoAvailability};

/// Domain service implementing [`PseudoAvailability`].
///
/// A pseudo that fails the local pseudo rules is reported unavailable
/// without consulting the store.
#[derive(Clone)]
pub struct PseudoAvailabilityService<R> {
    accounts: Arc<R>,
}

impl<R> PseudoAvailabilityService<R> {
    /// Create a new availability service.
    pub fn new(accounts: Arc<R>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl<R> PseudoAvailability for PseudoAvailabilityService<R>
where
    R: AccountRepository,
{
    async fn check(&self, pseudo: &str) -> Result<Availability, Error> {
        if !pseudo_reasons(pseudo).is_empty() {
            return Ok(Availability { available: false });
        }
        let taken = self
            .accounts
            .pseudo_exists(pseudo.trim())
            .await
            .map_err(map_lookup_error)?;
        Ok(Availability { available: !taken })
    }
}

fn map_lookup_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            warn!(%message, "account store unreachable during availability check");
            Error::service_unavailable("Availability check is temporarily unavailable")
        }
        other => {
            error!(error = %other, "availability lookup failed");
            Error::internal("availability lookup failed")
        }
    }
}
