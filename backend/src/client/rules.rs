//! Advisory copy of the registration rules, evaluated while the user types.
//!
//! This is a separate implementation built from character predicates; it
//! shares only the [`Field`] and [`ReasonCode`] vocabulary with the server.
//! Shared vectors in `tests/rule_vectors.rs` keep both copies in agreement.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::registration::{Field, ReasonCode};

const NAME_LIMIT: usize = 255;
const EMAIL_LIMIT: usize = 255;
const PSEUDO_RANGE: (usize, usize) = (3, 15);
const PASSWORD_RANGE: (usize, usize) = (8, 128);
const AVATAR_LIMIT: usize = 10 * 1024 * 1024;
const FALLBACK_COUNTRY: &str = "FR";

/// Avatar file chosen in the form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarSelection {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for AvatarSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarSelection")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Current raw values of every form input.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues {
    pub last_name: String,
    pub first_name: String,
    pub pseudo: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub country: String,
    pub birthday: String,
    pub avatar: Option<AvatarSelection>,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            last_name: String::new(),
            first_name: String::new(),
            pseudo: String::new(),
            email: String::new(),
            password: String::new(),
            phone: String::new(),
            country: FALLBACK_COUNTRY.to_owned(),
            birthday: String::new(),
            avatar: None,
        }
    }
}

impl std::fmt::Debug for FormValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormValues")
            .field("last_name", &self.last_name)
            .field("first_name", &self.first_name)
            .field("pseudo", &self.pseudo)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone", &self.phone)
            .field("country", &self.country)
            .field("birthday", &self.birthday)
            .field("avatar", &self.avatar)
            .finish()
    }
}

impl FormValues {
    /// Raw text of a field; the avatar has no text value.
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::LastName => &self.last_name,
            Field::FirstName => &self.first_name,
            Field::Pseudo => &self.pseudo,
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::Phone => &self.phone,
            Field::Birthday => &self.birthday,
            Field::Avatar => "",
        }
    }

    pub(crate) fn set_text(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::LastName => &mut self.last_name,
            Field::FirstName => &mut self.first_name,
            Field::Pseudo => &mut self.pseudo,
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
            Field::Phone => &mut self.phone,
            Field::Birthday => &mut self.birthday,
            Field::Avatar => return,
        };
        *slot = value;
    }
}

/// Evaluate the local rules of one field.
pub fn check_field(field: Field, values: &FormValues, today: NaiveDate) -> Vec<ReasonCode> {
    match field {
        Field::LastName | Field::FirstName => check_name(values.text(field)),
        Field::Pseudo => check_pseudo(&values.pseudo),
        Field::Email => check_email(&values.email),
        Field::Password => check_password(&values.password, &personal_tokens(values)),
        Field::Phone => check_phone(&values.country, &values.phone),
        Field::Birthday => match read_date(&values.birthday) {
            DateInput::Blank => vec![ReasonCode::Required],
            DateInput::Malformed => vec![ReasonCode::InvalidDate],
            DateInput::Date(date) if date >= today => vec![ReasonCode::NotInPast],
            DateInput::Date(_) => Vec::new(),
        },
        Field::Avatar => values.avatar.as_ref().map_or_else(Vec::new, check_avatar),
    }
}

fn check_name(raw: &str) -> Vec<ReasonCode> {
    let value = raw.trim();
    if value.is_empty() {
        vec![ReasonCode::Required]
    } else if value.chars().count() > NAME_LIMIT {
        vec![ReasonCode::TooLong]
    } else {
        Vec::new()
    }
}

fn is_pseudo_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Local pseudo rules; a pseudo passing these may be checked for availability.
pub fn check_pseudo(raw: &str) -> Vec<ReasonCode> {
    let value = raw.trim();
    if value.is_empty() {
        return vec![ReasonCode::Required];
    }
    let (min, max) = PSEUDO_RANGE;
    let count = value.chars().count();
    let mut reasons = Vec::new();
    if count < min {
        reasons.push(ReasonCode::TooShort);
    }
    if count > max {
        reasons.push(ReasonCode::TooLong);
    }
    if !value.chars().all(is_pseudo_char) {
        reasons.push(ReasonCode::InvalidCharacters);
    }
    reasons
}

fn email_shape_ok(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && domain
            .char_indices()
            .any(|(at, c)| c == '.' && at > 0 && at + 1 < domain.len())
}

fn check_email(raw: &str) -> Vec<ReasonCode> {
    let value = raw.trim();
    if value.is_empty() {
        return vec![ReasonCode::Required];
    }
    let mut reasons = Vec::new();
    if value.chars().count() > EMAIL_LIMIT {
        reasons.push(ReasonCode::TooLong);
    }
    if !email_shape_ok(value) {
        reasons.push(ReasonCode::InvalidFormat);
    }
    reasons
}

fn personal_tokens(values: &FormValues) -> Vec<String> {
    let mut tokens = vec![
        values.last_name.trim().to_lowercase(),
        values.first_name.trim().to_lowercase(),
        values.pseudo.trim().to_lowercase(),
    ];
    if let DateInput::Date(date) = read_date(&values.birthday) {
        let yyyy = format!("{:04}", date.year());
        let ddmm = format!("{:02}{:02}", date.day(), date.month());
        tokens.push(format!("{ddmm}{yyyy}"));
        tokens.push(ddmm);
        tokens.push(yyyy);
    }
    tokens.retain(|token| token.chars().count() > 1);
    tokens
}

/// Composition checks in display order: length, uppercase, lowercase,
/// digit, special.
fn composition(password: &str) -> [(bool, ReasonCode); 4] {
    [
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            ReasonCode::MissingUppercase,
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            ReasonCode::MissingLowercase,
        ),
        (
            password.chars().any(|c| c.is_ascii_digit()),
            ReasonCode::MissingDigit,
        ),
        (
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
            ReasonCode::MissingSpecial,
        ),
    ]
}

fn check_password(password: &str, tokens: &[String]) -> Vec<ReasonCode> {
    if password.is_empty() {
        return vec![ReasonCode::Required];
    }
    let (min, max) = PASSWORD_RANGE;
    let count = password.chars().count();
    let mut reasons = Vec::new();
    if count < min {
        reasons.push(ReasonCode::TooShort);
    }
    if count > max {
        reasons.push(ReasonCode::TooLong);
    }
    reasons.extend(
        composition(password)
            .into_iter()
            .filter_map(|(ok, reason)| (!ok).then_some(reason)),
    );
    let lowered = password.to_lowercase();
    if tokens.iter().any(|token| lowered.contains(token.as_str())) {
        reasons.push(ReasonCode::ContainsPersonalInfo);
    }
    reasons
}

fn all_ascii_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

fn check_phone(country: &str, raw: &str) -> Vec<ReasonCode> {
    let value = raw.trim();
    if value.is_empty() {
        return vec![ReasonCode::Required];
    }
    let country = match country.trim() {
        "" => FALLBACK_COUNTRY.to_owned(),
        code => code.to_ascii_uppercase(),
    };
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10 && all_ascii_digits(value);
    let accepted = match country.as_str() {
        "FR" => shaped && bytes[0] == b'0' && matches!(bytes[1], b'6' | b'7'),
        "BE" => shaped && bytes.starts_with(b"04"),
        "CH" => shaped && bytes.starts_with(b"07") && (b'5'..=b'9').contains(&bytes[2]),
        _ => return vec![ReasonCode::UnsupportedCountry],
    };
    if accepted {
        Vec::new()
    } else {
        vec![ReasonCode::InvalidFormat]
    }
}

enum DateInput {
    Blank,
    Malformed,
    Date(NaiveDate),
}

fn read_date(raw: &str) -> DateInput {
    let value = raw.trim();
    if value.is_empty() {
        return DateInput::Blank;
    }
    let mut parts = value.split('-');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return DateInput::Malformed;
    };
    let widths_ok = y.len() == 4 && m.len() == 2 && d.len() == 2;
    if !widths_ok || ![y, m, d].iter().all(|part| all_ascii_digits(part)) {
        return DateInput::Malformed;
    }
    let parsed = match (y.parse::<i32>(), m.parse::<u32>(), d.parse::<u32>()) {
        (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
        _ => None,
    };
    parsed.map_or(DateInput::Malformed, DateInput::Date)
}

fn check_avatar(selection: &AvatarSelection) -> Vec<ReasonCode> {
    let bytes = selection.bytes.as_slice();
    let is_png = bytes.starts_with(b"\x89PNG\r\n\x1a\n");
    let is_jpeg = bytes.starts_with(&[0xFF, 0xD8, 0xFF]);
    let mut reasons = Vec::new();
    if !(is_png || is_jpeg) {
        reasons.push(ReasonCode::UnsupportedFormat);
    }
    if bytes.len() > AVATAR_LIMIT {
        reasons.push(ReasonCode::TooLarge);
    }
    reasons
}

/// Password strength shown next to the password input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordStrength {
    Weak,
    Fair,
    Good,
    Strong,
    VeryStrong,
}

impl PasswordStrength {
    /// Grade by how many of the five composition checks pass.
    pub fn of(password: &str) -> Self {
        let long_enough = password.chars().count() >= PASSWORD_RANGE.0;
        let satisfied = composition(password)
            .iter()
            .filter(|(ok, _)| *ok)
            .count()
            + usize::from(long_enough);
        match satisfied {
            0 | 1 => Self::Weak,
            2 => Self::Fair,
            3 => Self::Good,
            4 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }
}

/// Whole years between `birthday` and `today`.
///
/// `None` for blank, malformed or future dates.
pub fn age_hint(birthday: &str, today: NaiveDate) -> Option<u32> {
    let DateInput::Date(date) = read_date(birthday) else {
        return None;
    };
    today.years_since(date)
}
