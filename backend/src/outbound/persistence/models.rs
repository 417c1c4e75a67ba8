//! Internal Diesel row structs. Never exposed to the domain.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::registration::AvatarKey;
use crate::domain::{Account, AccountId, NewAccountRecord};

use super::schema::accounts;

/// Row read back after insert. The credential column is never selected.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub last_name: String,
    pub first_name: String,
    pub pseudo: String,
    pub email: String,
    pub phone: String,
    pub birthday: NaiveDate,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: AccountId::from_uuid(row.id),
            last_name: row.last_name,
            first_name: row.first_name,
            pseudo: row.pseudo,
            email: row.email,
            phone: row.phone,
            birthday: row.birthday,
            avatar: row.avatar.map(AvatarKey::from_stored),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub last_name: &'a str,
    pub first_name: &'a str,
    pub pseudo: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub phone: &'a str,
    pub birthday: NaiveDate,
    pub avatar: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a NewAccountRecord> for NewAccountRow<'a> {
    fn from(record: &'a NewAccountRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            last_name: &record.last_name,
            first_name: &record.first_name,
            pseudo: &record.pseudo,
            email: &record.email,
            password_hash: record.credential.as_str(),
            phone: &record.phone,
            birthday: record.birthday,
            avatar: record.avatar.as_ref().map(AvatarKey::as_str),
            created_at: record.created_at,
        }
    }
}
