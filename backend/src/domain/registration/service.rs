//! Registration use-case: authoritative validation plus atomic persistence.
//!
//! The account row and the optional avatar file are created as one unit. The
//! upload is written under a per-registration staging key inside the
//! repository's unit of work and promoted to its public key only after the
//! row commits. A failed commit removes the staged file, which no other
//! registration can own. A failed promotion deletes the committed row again.
//!
//! The unit of work runs on its own task so a caller that stops waiting
//! cannot cut it short between the write and the cleanup.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, error, info, warn};

use super::avatar::AvatarKey;
use super::candidate::{AvatarUpload, RegistrationCandidate};
use super::reason::{FieldErrors, ReasonCode};
use super::rules::validate_candidate;
use crate::domain::ports::{
    AccountRegistration, AccountRepository, AccountRepositoryError, AvatarStore, AvatarStoreError,
    CredentialHasher, PendingAttachment, RegisteredAccount,
};
use crate::domain::{Account, AccountId, DerivedCredential, Error, NewAccountRecord, TraceId};

const UNAVAILABLE_MESSAGE: &str = "Registration is temporarily unavailable, please retry";
const CONFLICT_MESSAGE: &str = "An account with these details already exists";
const FAILED_MESSAGE: &str = "registration failed";

/// Avatar written to a staging key while the account row is uncommitted.
struct StagedAvatar<A> {
    store: Arc<A>,
    staged: AvatarKey,
    key: AvatarKey,
    upload: AvatarUpload,
    written: AtomicBool,
}

impl<A> StagedAvatar<A> {
    fn was_written(&self) -> bool {
        self.written.load(Ordering::Acquire)
    }
}

#[async_trait]
impl<A> PendingAttachment for StagedAvatar<A>
where
    A: AvatarStore,
{
    async fn persist(&self) -> Result<(), AvatarStoreError> {
        self.store.put(&self.staged, self.upload.bytes()).await?;
        self.written.store(true, Ordering::Release);
        Ok(())
    }
}

/// Domain service implementing [`AccountRegistration`].
#[derive(Clone)]
pub struct RegistrationService<R, A> {
    accounts: Arc<R>,
    avatars: Arc<A>,
    hasher: Arc<dyn CredentialHasher>,
    clock: Arc<dyn Clock>,
}

impl<R, A> RegistrationService<R, A> {
    /// Create a new registration service.
    pub fn new(
        accounts: Arc<R>,
        avatars: Arc<A>,
        hasher: Arc<dyn CredentialHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            avatars,
            hasher,
            clock,
        }
    }
}

impl<R, A> RegistrationService<R, A>
where
    R: AccountRepository + 'static,
    A: AvatarStore + 'static,
{
    async fn derive_credential(
        &self,
        candidate: &RegistrationCandidate,
    ) -> Result<DerivedCredential, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = candidate.password.clone();
        let derived = tokio::task::spawn_blocking(move || hasher.derive(password.as_str()))
            .await
            .map_err(|join_error| {
                error!(error = %join_error, "credential derivation task did not complete");
                Error::internal("credential derivation task failed")
            })?;
        derived.map_err(|hash_error| {
            error!(error = %hash_error, "credential derivation failed");
            Error::internal("credential derivation failed")
        })
    }

    /// Run [`store_account`] to completion on its own task.
    async fn store_detached(
        &self,
        record: NewAccountRecord,
        avatar: Option<Arc<StagedAvatar<A>>>,
    ) -> Result<Account, Error> {
        let unit = store_account(
            Arc::clone(&self.accounts),
            Arc::clone(&self.avatars),
            record,
            avatar,
        );
        TraceId::spawn(unit).await.map_err(|join_error| {
            error!(error = %join_error, "registration task did not complete");
            Error::internal(FAILED_MESSAGE)
        })?
    }
}

/// Insert the row with its staged avatar, then publish the avatar.
async fn store_account<R, A>(
    accounts: Arc<R>,
    avatars: Arc<A>,
    record: NewAccountRecord,
    avatar: Option<Arc<StagedAvatar<A>>>,
) -> Result<Account, Error>
where
    R: AccountRepository,
    A: AvatarStore + 'static,
{
    let attachment = avatar
        .clone()
        .map(|staged| staged as Arc<dyn PendingAttachment>);
    let account = match accounts.insert(&record, attachment).await {
        Ok(account) => account,
        Err(insert_error) => {
            if let Some(staged) = avatar.filter(|staged| staged.was_written()) {
                discard_avatar(&*avatars, &staged.staged).await;
            }
            return Err(map_repository_error(insert_error));
        }
    };

    if let Some(staged) = avatar {
        if let Err(promote_error) = avatars.promote(&staged.staged, &staged.key).await {
            error!(
                account_id = %account.id,
                error = %promote_error,
                "failed to publish avatar, withdrawing account"
            );
            discard_avatar(&*avatars, &staged.staged).await;
            withdraw_account(&*accounts, &account.id).await;
            return Err(Error::internal(FAILED_MESSAGE));
        }
    }
    Ok(account)
}

async fn discard_avatar<A: AvatarStore>(avatars: &A, key: &AvatarKey) {
    match avatars.remove(key).await {
        Ok(()) => debug!(%key, "removed avatar of uncommitted registration"),
        Err(remove_error) => {
            error!(%key, error = %remove_error, "failed to remove avatar of uncommitted registration");
        }
    }
}

async fn withdraw_account<R: AccountRepository>(accounts: &R, id: &AccountId) {
    if let Err(delete_error) = accounts.delete(id).await {
        error!(account_id = %id, error = %delete_error, "failed to withdraw account without avatar");
    }
}

#[async_trait]
impl<R, A> AccountRegistration for RegistrationService<R, A>
where
    R: AccountRepository + 'static,
    A: AvatarStore + 'static,
{
    async fn register(&self, candidate: RegistrationCandidate) -> Result<RegisteredAccount, Error> {
        let today = self.clock.utc().date_naive();
        let valid = validate_candidate(&candidate, today).map_err(|errors| {
            debug!(fields = ?errors.fields().collect::<Vec<_>>(), "registration rejected by rules");
            Error::validation_failed(errors)
        })?;

        let credential = self.derive_credential(&candidate).await?;
        drop(candidate);

        let id = AccountId::random();
        let avatar = valid.avatar.map(|(format, upload)| {
            Arc::new(StagedAvatar {
                store: Arc::clone(&self.avatars),
                staged: AvatarKey::staged_for(&id, format),
                key: AvatarKey::for_pseudo(&valid.pseudo, format),
                upload,
                written: AtomicBool::new(false),
            })
        });

        let record = NewAccountRecord {
            id,
            last_name: valid.last_name,
            first_name: valid.first_name,
            pseudo: valid.pseudo,
            email: valid.email,
            credential,
            phone: valid.phone,
            birthday: valid.birthday,
            avatar: avatar.as_ref().map(|staged| staged.key.clone()),
            created_at: self.clock.utc(),
        };

        let account = self.store_detached(record, avatar).await?;
        info!(account_id = %account.id, pseudo = %account.pseudo, "account registered");
        let avatar_url = account
            .avatar
            .as_ref()
            .map(|key| self.avatars.public_url(key));
        Ok(RegisteredAccount {
            account,
            avatar_url,
        })
    }
}

fn map_repository_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Conflict { field: Some(field) } => {
            debug!(field = %field.field(), "registration lost a uniqueness race");
            Error::validation_failed(FieldErrors::single(
                field.field(),
                ReasonCode::AlreadyTaken,
            ))
        }
        AccountRepositoryError::Conflict { field: None } => {
            warn!("registration hit an unidentified uniqueness constraint");
            Error::conflict(CONFLICT_MESSAGE)
        }
        AccountRepositoryError::Connection { message } => {
            warn!(%message, "account store unreachable during registration");
            Error::service_unavailable(UNAVAILABLE_MESSAGE)
        }
        AccountRepositoryError::Query { message } | AccountRepositoryError::Attachment { message } => {
            error!(%message, "registration unit of work failed");
            Error::internal(FAILED_MESSAGE)
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
