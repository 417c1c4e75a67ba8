//! Registration field names and rule reason codes.
//!
//! These types are the shared vocabulary between the authoritative server
//! rules, the advisory client rules, and the HTTP contract. They carry no
//! rule logic; each side evaluates predicates on its own.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Registration form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    LastName,
    FirstName,
    Pseudo,
    Email,
    Password,
    Phone,
    Birthday,
    Avatar,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Self; 8] = [
        Self::LastName,
        Self::FirstName,
        Self::Pseudo,
        Self::Email,
        Self::Password,
        Self::Phone,
        Self::Birthday,
        Self::Avatar,
    ];

    /// Fields that must be filled in before a submission can succeed.
    pub const REQUIRED: [Self; 7] = [
        Self::LastName,
        Self::FirstName,
        Self::Pseudo,
        Self::Email,
        Self::Password,
        Self::Phone,
        Self::Birthday,
    ];

    /// Wire name used in form bodies and error maps.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastName => "last_name",
            Self::FirstName => "first_name",
            Self::Pseudo => "pseudo",
            Self::Email => "email",
            Self::Password => "password",
            Self::Phone => "phone",
            Self::Birthday => "birthday",
            Self::Avatar => "avatar",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable, language-neutral reason a field was rejected.
///
/// Callers map codes to user-facing text; the codes themselves never change
/// meaning once published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    Required,
    TooShort,
    TooLong,
    InvalidCharacters,
    InvalidFormat,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSpecial,
    ContainsPersonalInfo,
    UnsupportedCountry,
    InvalidDate,
    NotInPast,
    UnsupportedFormat,
    TooLarge,
    AlreadyTaken,
}

impl ReasonCode {
    /// Wire representation of the code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::InvalidCharacters => "invalid_characters",
            Self::InvalidFormat => "invalid_format",
            Self::MissingUppercase => "missing_uppercase",
            Self::MissingLowercase => "missing_lowercase",
            Self::MissingDigit => "missing_digit",
            Self::MissingSpecial => "missing_special",
            Self::ContainsPersonalInfo => "contains_personal_info",
            Self::UnsupportedCountry => "unsupported_country",
            Self::InvalidDate => "invalid_date",
            Self::NotInPast => "not_in_past",
            Self::UnsupportedFormat => "unsupported_format",
            Self::TooLarge => "too_large",
            Self::AlreadyTaken => "already_taken",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered reasons per failing field; the first reason of a field is its
/// primary reason.
///
/// Serialises as `{ "pseudo": ["too_short"], ... }` with fields in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, Vec<ReasonCode>>);

impl FieldErrors {
    /// Create an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an error set holding a single reason.
    pub fn single(field: Field, reason: ReasonCode) -> Self {
        let mut errors = Self::new();
        errors.push(field, reason);
        errors
    }

    /// Append a reason to a field, ignoring exact duplicates.
    pub fn push(&mut self, field: Field, reason: ReasonCode) {
        let reasons = self.0.entry(field).or_default();
        if !reasons.contains(&reason) {
            reasons.push(reason);
        }
    }

    /// Append several reasons to a field in order.
    pub fn extend(&mut self, field: Field, reasons: impl IntoIterator<Item = ReasonCode>) {
        for reason in reasons {
            self.push(field, reason);
        }
    }

    /// Whether no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reasons recorded for a field, primary first.
    pub fn reasons(&self, field: Field) -> &[ReasonCode] {
        self.0.get(&field).map_or(&[], Vec::as_slice)
    }

    /// Primary reason for a field, if it failed.
    pub fn primary(&self, field: Field) -> Option<ReasonCode> {
        self.reasons(field).first().copied()
    }

    /// Failing fields in form order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    /// Iterate over `(field, reasons)` pairs in form order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &[ReasonCode])> + '_ {
        self.0
            .iter()
            .map(|(field, reasons)| (*field, reasons.as_slice()))
    }
}
