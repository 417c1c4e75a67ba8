//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.
//!
//! The insert and its attachment share one database transaction: the row is
//! written first, the attachment runs next, and the commit only happens once
//! both succeeded. Unique constraint violations are mapped back to the
//! column that caused them through the constraint name.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use tracing::{debug, warn};

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, AvatarStoreError, PendingAttachment,
};
use crate::domain::{Account, AccountId, NewAccountRecord, UniqueField};

use super::models::{AccountRow, NewAccountRow};
use super::pool::{DbPool, PoolError};
use super::schema::accounts;

const PSEUDO_CONSTRAINT: &str = "accounts_pseudo_key";
const EMAIL_CONSTRAINT: &str = "accounts_email_key";
const PHONE_CONSTRAINT: &str = "accounts_phone_key";

/// Diesel-backed account store.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside the insert transaction, before it is mapped to a port error.
#[derive(Debug)]
enum InsertFailure {
    Database(DieselError),
    Attachment(AvatarStoreError),
}

impl From<DieselError> for InsertFailure {
    fn from(error: DieselError) -> Self {
        Self::Database(error)
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    AccountRepositoryError::connection(error.into_message())
}

/// Column guarded by the named unique constraint.
fn unique_field_for(constraint: &str) -> Option<UniqueField> {
    match constraint {
        PSEUDO_CONSTRAINT => Some(UniqueField::Pseudo),
        EMAIL_CONSTRAINT => Some(UniqueField::Email),
        PHONE_CONSTRAINT => Some(UniqueField::Phone),
        _ => None,
    }
}

fn map_diesel_error(error: DieselError) -> AccountRepositoryError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let field = info.constraint_name().and_then(unique_field_for);
            if field.is_none() {
                warn!(
                    constraint = ?info.constraint_name(),
                    "unique violation on an unmapped constraint"
                );
            }
            AccountRepositoryError::Conflict { field }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            AccountRepositoryError::connection(info.message().to_owned())
        }
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "account query failed");
            AccountRepositoryError::query(info.message().to_owned())
        }
        other => {
            debug!(error = %other, "account query failed");
            AccountRepositoryError::query(other.to_string())
        }
    }
}

fn map_insert_failure(failure: InsertFailure) -> AccountRepositoryError {
    match failure {
        InsertFailure::Database(error) => map_diesel_error(error),
        InsertFailure::Attachment(error) => error.into(),
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn pseudo_exists(&self, pseudo: &str) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            accounts::table.filter(accounts::pseudo.eq(pseudo)),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn insert(
        &self,
        record: &NewAccountRecord,
        attachment: Option<Arc<dyn PendingAttachment>>,
    ) -> Result<Account, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewAccountRow::from(record);

        let stored = conn
            .transaction::<AccountRow, InsertFailure, _>(move |conn| {
                async move {
                    let stored = diesel::insert_into(accounts::table)
                        .values(&row)
                        .returning(AccountRow::as_returning())
                        .get_result(conn)
                        .await?;
                    if let Some(attachment) = attachment {
                        attachment
                            .persist()
                            .await
                            .map_err(InsertFailure::Attachment)?;
                    }
                    Ok(stored)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_insert_failure)?;

        Ok(stored.into())
    }

    async fn delete(&self, id: &AccountId) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(accounts::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        debug!(account_id = %id, removed, "account deleted");
        Ok(())
    }
}
