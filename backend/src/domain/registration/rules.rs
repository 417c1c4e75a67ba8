//! Authoritative registration rules.
//!
//! Every field is evaluated on every pass; a failure in one field never hides
//! failures in another. Text fields are trimmed before evaluation, except the
//! password which is taken verbatim.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use super::avatar::{AvatarFormat, MAX_AVATAR_BYTES};
use super::candidate::{AvatarUpload, DEFAULT_COUNTRY, RegistrationCandidate};
use super::phone::{PhoneMatch, match_phone};
use super::reason::{Field, FieldErrors, ReasonCode};

pub const NAME_MAX_CHARS: usize = 255;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const PSEUDO_MIN_CHARS: usize = 3;
pub const PSEUDO_MAX_CHARS: usize = 15;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 128;
/// Shortest name, pseudo or date token considered personal information.
pub const PERSONAL_TOKEN_MIN_CHARS: usize = 2;

static PSEUDO_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static DATE_SHAPE_RE: OnceLock<Regex> = OnceLock::new();
static UPPER_RE: OnceLock<Regex> = OnceLock::new();
static LOWER_RE: OnceLock<Regex> = OnceLock::new();
static DIGIT_RE: OnceLock<Regex> = OnceLock::new();
static SPECIAL_RE: OnceLock<Regex> = OnceLock::new();

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("rule pattern {pattern:?} failed to compile: {error}"))
    })
}

fn pseudo_re() -> &'static Regex {
    cached(&PSEUDO_RE, r"^[A-Za-z0-9_-]+$")
}

fn email_re() -> &'static Regex {
    cached(&EMAIL_RE, r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
}

fn date_shape_re() -> &'static Regex {
    cached(&DATE_SHAPE_RE, r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$")
}

/// Candidate that passed every rule, normalised for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub last_name: String,
    pub first_name: String,
    pub pseudo: String,
    pub email: String,
    pub phone: String,
    pub birthday: NaiveDate,
    pub avatar: Option<(AvatarFormat, AvatarUpload)>,
}

/// Run every rule against `candidate`.
///
/// `today` anchors the birthday rule so callers decide which clock applies.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use signup::domain::registration::{validate_candidate, Field, RegistrationCandidate, ReasonCode};
///
/// let today = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
/// let errors = validate_candidate(&RegistrationCandidate::empty(), today)
///     .expect_err("empty candidate is rejected");
/// assert_eq!(errors.primary(Field::Pseudo), Some(ReasonCode::Required));
/// ```
pub fn validate_candidate(
    candidate: &RegistrationCandidate,
    today: NaiveDate,
) -> Result<ValidRegistration, FieldErrors> {
    let mut errors = FieldErrors::new();

    errors.extend(Field::LastName, name_reasons(&candidate.last_name));
    errors.extend(Field::FirstName, name_reasons(&candidate.first_name));
    errors.extend(Field::Pseudo, pseudo_reasons(&candidate.pseudo));
    errors.extend(Field::Email, email_reasons(&candidate.email));
    errors.extend(Field::Phone, phone_reasons(&candidate.country, &candidate.phone));

    let birthday = match parse_birthday(&candidate.birthday, today) {
        Ok(date) => Some(date),
        Err(reason) => {
            errors.push(Field::Birthday, reason);
            None
        }
    };

    let personal = PersonalInfo::from_candidate(candidate);
    errors.extend(
        Field::Password,
        password_reasons(candidate.password(), &personal),
    );

    let avatar = match candidate.avatar.as_ref() {
        None => None,
        Some(upload) => match avatar_format(upload) {
            Ok(format) => Some((format, upload.clone())),
            Err(reasons) => {
                errors.extend(Field::Avatar, reasons);
                None
            }
        },
    };

    match (errors.is_empty(), birthday) {
        (true, Some(birthday)) => Ok(ValidRegistration {
            last_name: candidate.last_name.trim().to_owned(),
            first_name: candidate.first_name.trim().to_owned(),
            pseudo: candidate.pseudo.trim().to_owned(),
            email: candidate.email.trim().to_owned(),
            phone: candidate.phone.trim().to_owned(),
            birthday,
            avatar,
        }),
        _ => Err(errors),
    }
}

/// Reasons a last or first name is rejected.
pub fn name_reasons(raw: &str) -> Vec<ReasonCode> {
    let value = raw.trim();
    if value.is_empty() {
        return vec![ReasonCode::Required];
    }
    if value.chars().count() > NAME_MAX_CHARS {
        return vec![ReasonCode::TooLong];
    }
    Vec::new()
}

/// Reasons a pseudo fails the local rules. Uniqueness is not checked here.
pub fn pseudo_reasons(raw: &str) -> Vec<ReasonCode> {
    let value = raw.trim();
    if value.is_empty() {
        return vec![ReasonCode::Required];
    }
    let mut reasons = Vec::new();
    let len = value.chars().count();
    if len < PSEUDO_MIN_CHARS {
        reasons.push(ReasonCode::TooShort);
    } else if len > PSEUDO_MAX_CHARS {
        reasons.push(ReasonCode::TooLong);
    }
    if !pseudo_re().is_match(value) {
        reasons.push(ReasonCode::InvalidCharacters);
    }
    reasons
}

/// Reasons an email address is rejected.
pub fn email_reasons(raw: &str) -> Vec<ReasonCode> {
    let value = raw.trim();
    if value.is_empty() {
        return vec![ReasonCode::Required];
    }
    let mut reasons = Vec::new();
    if value.chars().count() > EMAIL_MAX_CHARS {
        reasons.push(ReasonCode::TooLong);
    }
    if !email_re().is_match(value) {
        reasons.push(ReasonCode::InvalidFormat);
    }
    reasons
}

/// Reasons a phone number is rejected for `country`.
///
/// A blank country falls back to the reference country.
pub fn phone_reasons(country: &str, raw: &str) -> Vec<ReasonCode> {
    let value = raw.trim();
    if value.is_empty() {
        return vec![ReasonCode::Required];
    }
    let country = match country.trim() {
        "" => DEFAULT_COUNTRY,
        code => code,
    };
    match match_phone(country, value) {
        PhoneMatch::Valid => Vec::new(),
        PhoneMatch::Mismatch => vec![ReasonCode::InvalidFormat],
        PhoneMatch::UnknownCountry => vec![ReasonCode::UnsupportedCountry],
    }
}

/// Parse a `YYYY-MM-DD` birthday that must fall strictly before `today`.
pub fn parse_birthday(raw: &str, today: NaiveDate) -> Result<NaiveDate, ReasonCode> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ReasonCode::Required);
    }
    if !date_shape_re().is_match(value) {
        return Err(ReasonCode::InvalidDate);
    }
    let date =
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ReasonCode::InvalidDate)?;
    if date >= today {
        return Err(ReasonCode::NotInPast);
    }
    Ok(date)
}

/// Lower-cased tokens a password must not embed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalInfo {
    tokens: Vec<String>,
}

impl PersonalInfo {
    /// Collect tokens from the names, pseudo and (when it parses) birthday.
    ///
    /// The birthday contributes `YYYY`, `DDMMYYYY` and `DDMM` regardless of
    /// whether it lies in the past.
    pub fn from_candidate(candidate: &RegistrationCandidate) -> Self {
        let mut tokens: Vec<String> = [
            candidate.last_name.as_str(),
            candidate.first_name.as_str(),
            candidate.pseudo.as_str(),
        ]
        .iter()
        .map(|value| value.trim().to_lowercase())
        .collect();

        let birthday = candidate.birthday.trim();
        let parsed = date_shape_re()
            .is_match(birthday)
            .then(|| NaiveDate::parse_from_str(birthday, "%Y-%m-%d").ok())
            .flatten();
        if let Some(date) = parsed {
            let year = format!("{:04}", date.year());
            let day_month = format!("{:02}{:02}", date.day(), date.month());
            tokens.push(format!("{day_month}{year}"));
            tokens.push(year);
            tokens.push(day_month);
        }

        tokens.retain(|token| token.chars().count() >= PERSONAL_TOKEN_MIN_CHARS);
        Self { tokens }
    }

    /// Whether the password embeds any token, ignoring case.
    pub fn is_leaked_by(&self, password: &str) -> bool {
        let lowered = password.to_lowercase();
        self.tokens.iter().any(|token| lowered.contains(token.as_str()))
    }
}

/// Reasons a password is rejected, in reporting order.
pub fn password_reasons(password: &str, personal: &PersonalInfo) -> Vec<ReasonCode> {
    if password.is_empty() {
        return vec![ReasonCode::Required];
    }
    let mut reasons = Vec::new();
    let len = password.chars().count();
    if len < PASSWORD_MIN_CHARS {
        reasons.push(ReasonCode::TooShort);
    } else if len > PASSWORD_MAX_CHARS {
        reasons.push(ReasonCode::TooLong);
    }
    let composition = [
        (cached(&UPPER_RE, "[A-Z]"), ReasonCode::MissingUppercase),
        (cached(&LOWER_RE, "[a-z]"), ReasonCode::MissingLowercase),
        (cached(&DIGIT_RE, "[0-9]"), ReasonCode::MissingDigit),
        (cached(&SPECIAL_RE, "[^a-zA-Z0-9]"), ReasonCode::MissingSpecial),
    ];
    for (regex, reason) in composition {
        if !regex.is_match(password) {
            reasons.push(reason);
        }
    }
    if personal.is_leaked_by(password) {
        reasons.push(ReasonCode::ContainsPersonalInfo);
    }
    reasons
}

/// Identify an upload's encoding, or the reasons it is refused.
pub fn avatar_format(upload: &AvatarUpload) -> Result<AvatarFormat, Vec<ReasonCode>> {
    let format = AvatarFormat::sniff(upload.bytes());
    let mut reasons = Vec::new();
    if format.is_none() {
        reasons.push(ReasonCode::UnsupportedFormat);
    }
    if upload.len() > MAX_AVATAR_BYTES {
        reasons.push(ReasonCode::TooLarge);
    }
    match format {
        Some(format) if reasons.is_empty() => Ok(format),
        _ => Err(reasons),
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
