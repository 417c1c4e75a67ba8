//! Process-local account store used when no database is configured.
//!
//! Uniqueness is arbitrated under one lock: an insert first reserves its
//! pseudo, email and phone, then runs the attachment without holding the
//! lock, then either commits the reservation or releases it. A reserved
//! value conflicts like a committed one, so two concurrent registrations for
//! the same pseudo can never both succeed. Reservations are invisible to
//! [`AccountRepository::pseudo_exists`].
//!
//! A reservation is released on drop unless committed, so an insert future
//! dropped mid-attachment frees its values.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{AccountRepository, AccountRepositoryError, PendingAttachment};
use crate::domain::{Account, AccountId, DerivedCredential, NewAccountRecord, UniqueField};

const UNIQUE_FIELDS: [UniqueField; 3] = [UniqueField::Pseudo, UniqueField::Email, UniqueField::Phone];

#[derive(Debug, Default)]
struct Ledger {
    committed: HashMap<AccountId, NewAccountRecord>,
    reserved: HashMap<AccountId, NewAccountRecord>,
}

impl Ledger {
    fn first_conflict(&self, record: &NewAccountRecord) -> Option<UniqueField> {
        UNIQUE_FIELDS.into_iter().find(|field| {
            let wanted = record.unique_value(*field);
            self.committed
                .values()
                .chain(self.reserved.values())
                .any(|existing| existing.unique_value(*field) == wanted)
        })
    }
}

/// Uncommitted claim on a record's unique values.
struct Reservation<'a> {
    ledger: &'a Mutex<Ledger>,
    id: AccountId,
    committed: bool,
}

impl<'a> Reservation<'a> {
    fn claim(
        ledger: &'a Mutex<Ledger>,
        record: &NewAccountRecord,
    ) -> Result<Self, AccountRepositoryError> {
        let mut guard = lock(ledger);
        if let Some(field) = guard.first_conflict(record) {
            debug!(?field, "in-memory insert rejected by uniqueness");
            return Err(AccountRepositoryError::conflict(field));
        }
        guard.reserved.insert(record.id, record.clone());
        Ok(Self {
            ledger,
            id: record.id,
            committed: false,
        })
    }

    fn commit(mut self) {
        let mut guard = lock(self.ledger);
        if let Some(record) = guard.reserved.remove(&self.id) {
            guard.committed.insert(self.id, record);
        }
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            debug!(account_id = %self.id, "releasing uncommitted reservation");
            lock(self.ledger).reserved.remove(&self.id);
        }
    }
}

fn lock(ledger: &Mutex<Ledger>) -> MutexGuard<'_, Ledger> {
    ledger.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Account repository holding rows in memory.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    ledger: Mutex<Ledger>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        lock(&self.ledger)
    }

    /// Committed accounts, oldest first.
    pub fn accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .ledger()
            .committed
            .values()
            .cloned()
            .map(NewAccountRecord::into_account)
            .collect();
        accounts.sort_by_key(|account| account.created_at);
        accounts
    }

    /// Stored credential of the committed account using `pseudo`.
    pub fn credential_of(&self, pseudo: &str) -> Option<DerivedCredential> {
        self.ledger()
            .committed
            .values()
            .find(|record| record.pseudo == pseudo)
            .map(|record| record.credential.clone())
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn pseudo_exists(&self, pseudo: &str) -> Result<bool, AccountRepositoryError> {
        Ok(self
            .ledger()
            .committed
            .values()
            .any(|record| record.pseudo == pseudo))
    }

    async fn insert(
        &self,
        record: &NewAccountRecord,
        attachment: Option<Arc<dyn PendingAttachment>>,
    ) -> Result<Account, AccountRepositoryError> {
        let reservation = Reservation::claim(&self.ledger, record)?;
        if let Some(attachment) = attachment {
            attachment.persist().await?;
        }
        reservation.commit();
        Ok(record.clone().into_account())
    }

    async fn delete(&self, id: &AccountId) -> Result<(), AccountRepositoryError> {
        self.ledger().committed.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::AvatarStoreError;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rstest::rstest;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn record(pseudo: &str, email: &str, phone: &str) -> NewAccountRecord {
        NewAccountRecord {
            id: AccountId::random(),
            last_name: "Lovelace".into(),
            first_name: "Ada".into(),
            pseudo: pseudo.into(),
            email: email.into(),
            credential: DerivedCredential::new("$argon2id$v=19$stub"),
            phone: phone.into(),
            birthday: NaiveDate::from_ymd_opt(1990, 12, 10).expect("valid date"),
            avatar: None,
            created_at: Utc
                .with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    struct Scripted {
        fail: bool,
        ran: AtomicBool,
    }

    #[async_trait]
    impl PendingAttachment for Scripted {
        async fn persist(&self) -> Result<(), AvatarStoreError> {
            self.ran.store(true, Ordering::SeqCst);
            if self.fail {
                Err(AvatarStoreError::io("disk full"))
            } else {
                Ok(())
            }
        }
    }

    /// Attachment that never completes.
    struct Stalls;

    #[async_trait]
    impl PendingAttachment for Stalls {
        async fn persist(&self) -> Result<(), AvatarStoreError> {
            std::future::pending().await
        }
    }

    #[rstest]
    #[tokio::test]
    async fn insert_commits_and_exposes_pseudo() {
        let repo = InMemoryAccountRepository::new();
        let account = repo
            .insert(&record("ada_l", "ada@example.org", "0612345678"), None)
            .await
            .expect("insert");

        assert_eq!(account.pseudo, "ada_l");
        assert!(repo.pseudo_exists("ada_l").await.expect("lookup"));
        assert!(!repo.pseudo_exists("ADA_L").await.expect("lookup"));
        assert_eq!(repo.accounts().len(), 1);
    }

    #[rstest]
    #[case(record("ada_l", "other@example.org", "0700000000"), UniqueField::Pseudo)]
    #[case(record("other", "ada@example.org", "0700000000"), UniqueField::Email)]
    #[case(record("other", "other@example.org", "0612345678"), UniqueField::Phone)]
    #[tokio::test]
    async fn duplicates_report_their_column(
        #[case] duplicate: NewAccountRecord,
        #[case] expected: UniqueField,
    ) {
        let repo = InMemoryAccountRepository::new();
        repo.insert(&record("ada_l", "ada@example.org", "0612345678"), None)
            .await
            .expect("first insert");

        let err = repo.insert(&duplicate, None).await.expect_err("conflict");
        assert_eq!(err, AccountRepositoryError::conflict(expected));
        assert_eq!(repo.accounts().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_attachment_leaves_nothing_behind() {
        let repo = InMemoryAccountRepository::new();
        let attachment = Arc::new(Scripted {
            fail: true,
            ran: AtomicBool::new(false),
        });
        let err = repo
            .insert(
                &record("ada_l", "ada@example.org", "0612345678"),
                Some(attachment.clone()),
            )
            .await
            .expect_err("attachment failure");

        assert!(matches!(err, AccountRepositoryError::Attachment { .. }));
        assert!(attachment.ran.load(Ordering::SeqCst));
        assert!(repo.accounts().is_empty());
        repo.insert(&record("ada_l", "ada@example.org", "0612345678"), None)
            .await
            .expect("values are free again");
    }

    #[rstest]
    #[tokio::test]
    async fn successful_attachment_commits() {
        let repo = InMemoryAccountRepository::new();
        let attachment = Arc::new(Scripted {
            fail: false,
            ran: AtomicBool::new(false),
        });
        repo.insert(
            &record("ada_l", "ada@example.org", "0612345678"),
            Some(attachment.clone()),
        )
        .await
        .expect("insert");

        assert!(attachment.ran.load(Ordering::SeqCst));
        assert!(repo.credential_of("ada_l").is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn abandoned_insert_releases_its_values() {
        let repo = InMemoryAccountRepository::new();
        let abandoned = record("ada_l", "ada@example.org", "0612345678");

        let outcome = tokio::time::timeout(
            Duration::from_millis(20),
            repo.insert(&abandoned, Some(Arc::new(Stalls))),
        )
        .await;
        assert!(outcome.is_err(), "stalled insert should time out");

        let retry = record("ada_l", "ada@example.org", "0612345678");
        repo.insert(&retry, None)
            .await
            .expect("values are free after cancellation");
        assert_eq!(repo.accounts().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_frees_the_values_of_a_committed_account() {
        let repo = InMemoryAccountRepository::new();
        let first = record("ada_l", "ada@example.org", "0612345678");
        repo.insert(&first, None).await.expect("insert");

        repo.delete(&first.id).await.expect("delete");
        repo.delete(&first.id).await.expect("deleting twice succeeds");

        assert!(!repo.pseudo_exists("ada_l").await.expect("lookup"));
        repo.insert(&record("ada_l", "ada@example.org", "0612345678"), None)
            .await
            .expect("values are free again");
    }
}
