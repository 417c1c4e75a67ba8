//! Wiring of adapters into the HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use signup::domain::ports::{AccountRepository, AvatarStore};
use signup::domain::{PseudoAvailabilityService, RegistrationService};
use signup::inbound::http::state::HttpState;
use signup::outbound::credentials::Argon2CredentialHasher;
use signup::outbound::memory::{InMemoryAccountRepository, InMemoryAvatarStore};
use signup::outbound::persistence::DieselAccountRepository;
use signup::outbound::storage::CapStdAvatarStore;

use super::ServerConfig;

fn registration_state<R, A>(accounts: Arc<R>, avatars: Arc<A>) -> HttpState
where
    R: AccountRepository + 'static,
    A: AvatarStore + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let registration = RegistrationService::new(
        Arc::clone(&accounts),
        Arc::clone(&avatars),
        Arc::new(Argon2CredentialHasher::new()),
        clock,
    );
    let availability = PseudoAvailabilityService::new(accounts);
    HttpState::new(Arc::new(registration), Arc::new(availability), avatars)
}

/// Build handler state from the configured backing stores.
///
/// With a database pool, accounts go to PostgreSQL and avatars to the
/// configured directory; otherwise both stay in process memory.
///
/// # Errors
/// Returns [`std::io::Error`] when the avatar directory cannot be opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    match &config.db_pool {
        Some(pool) => {
            let avatars = CapStdAvatarStore::open(&config.avatar_dir, &config.public_base_url)?;
            info!(avatar_dir = %config.avatar_dir.display(), "using PostgreSQL account store");
            Ok(registration_state(
                Arc::new(DieselAccountRepository::new(pool.clone())),
                Arc::new(avatars),
            ))
        }
        None => {
            info!("no database configured; accounts are kept in memory");
            Ok(registration_state(
                Arc::new(InMemoryAccountRepository::new()),
                Arc::new(InMemoryAvatarStore::new(&config.public_base_url)),
            ))
        }
    }
}
