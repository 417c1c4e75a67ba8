//! Persisted account model.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::registration::{AvatarKey, Field};

/// Stable account identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One-way derived credential in PHC string form.
///
/// The encoded hash is wiped on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedCredential(Zeroizing<String>);

impl DerivedCredential {
    /// Wrap an encoded PHC string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(Zeroizing::new(encoded.into()))
    }

    /// Borrow the encoded PHC string for storage.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for DerivedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedCredential(<redacted>)")
    }
}

/// Columns carrying a uniqueness guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    Pseudo,
    Email,
    Phone,
}

impl UniqueField {
    /// Form field reported when this constraint is violated.
    pub const fn field(self) -> Field {
        match self {
            Self::Pseudo => Field::Pseudo,
            Self::Email => Field::Email,
            Self::Phone => Field::Phone,
        }
    }
}

/// Row about to be inserted by the registration transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccountRecord {
    pub id: AccountId,
    pub last_name: String,
    pub first_name: String,
    pub pseudo: String,
    pub email: String,
    pub credential: DerivedCredential,
    pub phone: String,
    pub birthday: NaiveDate,
    pub avatar: Option<AvatarKey>,
    pub created_at: DateTime<Utc>,
}

impl NewAccountRecord {
    /// Value of the given unique column.
    pub fn unique_value(&self, field: UniqueField) -> &str {
        match field {
            UniqueField::Pseudo => &self.pseudo,
            UniqueField::Email => &self.email,
            UniqueField::Phone => &self.phone,
        }
    }

    /// Project the stored account, dropping the credential.
    pub fn into_account(self) -> Account {
        Account {
            id: self.id,
            last_name: self.last_name,
            first_name: self.first_name,
            pseudo: self.pseudo,
            email: self.email,
            phone: self.phone,
            birthday: self.birthday,
            avatar: self.avatar,
            created_at: self.created_at,
        }
    }
}

/// Created account as seen outside the persistence layer.
///
/// Carries every persisted column except the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub last_name: String,
    pub first_name: String,
    pub pseudo: String,
    pub email: String,
    pub phone: String,
    pub birthday: NaiveDate,
    pub avatar: Option<AvatarKey>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn credential_debug_is_redacted() {
        let credential = DerivedCredential::new("$argon2id$v=19$secret");
        assert!(!format!("{credential:?}").contains("secret"));
    }

    #[rstest]
    #[case(UniqueField::Pseudo, Field::Pseudo)]
    #[case(UniqueField::Email, Field::Email)]
    #[case(UniqueField::Phone, Field::Phone)]
    fn unique_fields_map_to_form_fields(#[case] unique: UniqueField, #[case] field: Field) {
        assert_eq!(unique.field(), field);
    }
}
