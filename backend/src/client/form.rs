//! Registration form state machine.
//!
//! [`FormState`] is a plain serialisable value mutated only through
//! [`FormState::apply`]. Side effects are returned as [`FormEffect`] values
//! for the embedding UI to perform; their results come back as events.
//! Time is expressed as offsets from when the form was opened, so the state
//! machine never reads a clock.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::outcome::SubmitOutcome;
use super::rules::{AvatarSelection, FormValues, PasswordStrength, age_hint, check_field, check_pseudo};
use crate::domain::registration::{Field, FieldErrors, ReasonCode};

/// Quiet period after the last pseudo keystroke before availability is
/// checked.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Fields whose value feeds the password's personal-information rule.
const PERSONAL_FIELDS: [Field; 4] = [
    Field::LastName,
    Field::FirstName,
    Field::Pseudo,
    Field::Birthday,
];

/// Which rule copy produced a field's reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Client,
    Server,
}

/// Display status of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldStatus {
    Untouched,
    Invalid {
        reasons: Vec<ReasonCode>,
        origin: Origin,
    },
    Valid,
    Pending,
}

impl FieldStatus {
    fn from_reasons(reasons: Vec<ReasonCode>) -> Self {
        if reasons.is_empty() {
            Self::Valid
        } else {
            Self::Invalid {
                reasons,
                origin: Origin::Client,
            }
        }
    }

    fn is_server_rejection(&self) -> bool {
        matches!(
            self,
            Self::Invalid {
                origin: Origin::Server,
                ..
            }
        )
    }
}

/// What the form knows about the current pseudo's availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PseudoAvailability {
    Unknown,
    Checking { seq: u64 },
    Available,
    Taken,
}

/// Form-level message shown above the fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Banner {
    Success(String),
    Failure(String),
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FormEvent {
    Input {
        field: Field,
        value: String,
        at: Duration,
    },
    CountrySelected {
        country: String,
    },
    AvatarSelected {
        selection: Option<AvatarSelection>,
    },
    Tick {
        at: Duration,
    },
    AvailabilityResolved {
        seq: u64,
        pseudo: String,
        available: bool,
    },
    /// The check could not be answered; `at` is when the failure arrived.
    AvailabilityFailed {
        seq: u64,
        at: Duration,
    },
    SubmitRequested,
    SubmitResolved {
        outcome: SubmitOutcome,
    },
}

/// Full payload handed to the transport on submit.
pub type SubmissionPayload = FormValues;

/// Work the embedding UI must perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum FormEffect {
    CheckAvailability { seq: u64, pseudo: String },
    Submit { payload: SubmissionPayload },
}

/// Serialisable registration form state.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use chrono::NaiveDate;
/// use signup::client::{FormEffect, FormEvent, FormState};
/// use signup::domain::registration::Field;
///
/// let today = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
/// let mut form = FormState::new(today);
/// form.apply(FormEvent::Input {
///     field: Field::Pseudo,
///     value: "john99".into(),
///     at: Duration::ZERO,
/// });
/// let effects = form.apply(FormEvent::Tick { at: Duration::from_millis(500) });
/// assert!(matches!(effects.as_slice(), [FormEffect::CheckAvailability { seq: 1, .. }]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    today: NaiveDate,
    debounce: Duration,
    values: FormValues,
    statuses: BTreeMap<Field, FieldStatus>,
    availability: PseudoAvailability,
    check_due_at: Option<Duration>,
    last_seq: u64,
    submitting: bool,
    banner: Option<Banner>,
}

impl FormState {
    /// Open an empty form; `today` anchors the birthday rule.
    pub fn new(today: NaiveDate) -> Self {
        Self::with_debounce(today, DEFAULT_DEBOUNCE)
    }

    /// Open an empty form with a custom availability debounce.
    pub fn with_debounce(today: NaiveDate, debounce: Duration) -> Self {
        Self {
            today,
            debounce,
            values: FormValues::default(),
            statuses: Field::ALL
                .iter()
                .map(|field| (*field, FieldStatus::Untouched))
                .collect(),
            availability: PseudoAvailability::Unknown,
            check_due_at: None,
            last_seq: 0,
            submitting: false,
            banner: None,
        }
    }

    /// Current status of `field`.
    pub fn status(&self, field: Field) -> &FieldStatus {
        self.statuses.get(&field).unwrap_or(&FieldStatus::Untouched)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn availability(&self) -> PseudoAvailability {
        self.availability
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Strength indicator for the current password.
    pub fn password_strength(&self) -> PasswordStrength {
        PasswordStrength::of(&self.values.password)
    }

    /// Age derived from the current birthday input.
    pub fn age(&self) -> Option<u32> {
        age_hint(&self.values.birthday, self.today)
    }

    /// Characters typed into the pseudo input, for the length counter.
    pub fn pseudo_length(&self) -> usize {
        self.values.pseudo.trim().chars().count()
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.submitting
            && self.availability == PseudoAvailability::Available
            && Field::REQUIRED
                .iter()
                .all(|field| *self.status(*field) == FieldStatus::Valid)
            && !matches!(self.status(Field::Avatar), FieldStatus::Invalid { .. })
    }

    /// Advance the state machine by one event.
    pub fn apply(&mut self, event: FormEvent) -> Vec<FormEffect> {
        match event {
            FormEvent::Input { field, value, at } => {
                self.on_input(field, value, at);
                Vec::new()
            }
            FormEvent::CountrySelected { country } => {
                self.values.country = country;
                self.refresh_if_touched(Field::Phone);
                Vec::new()
            }
            FormEvent::AvatarSelected { selection } => {
                self.values.avatar = selection;
                let status = if self.values.avatar.is_some() {
                    self.evaluate(Field::Avatar)
                } else {
                    FieldStatus::Untouched
                };
                self.statuses.insert(Field::Avatar, status);
                Vec::new()
            }
            FormEvent::Tick { at } => self.on_tick(at),
            FormEvent::AvailabilityResolved {
                seq,
                pseudo,
                available,
            } => {
                self.on_availability(seq, &pseudo, available);
                Vec::new()
            }
            FormEvent::AvailabilityFailed { seq, at } => {
                if self.availability == (PseudoAvailability::Checking { seq }) {
                    self.availability = PseudoAvailability::Unknown;
                    self.statuses.insert(Field::Pseudo, FieldStatus::Valid);
                    self.check_due_at = Some(at + self.debounce);
                }
                Vec::new()
            }
            FormEvent::SubmitRequested => self.on_submit(),
            FormEvent::SubmitResolved { outcome } => {
                self.on_resolved(outcome);
                Vec::new()
            }
        }
    }

    fn evaluate(&self, field: Field) -> FieldStatus {
        FieldStatus::from_reasons(check_field(field, &self.values, self.today))
    }

    fn refresh_if_touched(&mut self, field: Field) {
        if *self.status(field) != FieldStatus::Untouched {
            let status = self.evaluate(field);
            self.statuses.insert(field, status);
        }
    }

    fn on_input(&mut self, field: Field, value: String, at: Duration) {
        if field == Field::Avatar {
            return;
        }
        self.values.set_text(field, value);
        let status = self.evaluate(field);
        self.statuses.insert(field, status);

        if PERSONAL_FIELDS.contains(&field) {
            self.refresh_if_touched(Field::Password);
        }
        if field == Field::Pseudo {
            self.availability = PseudoAvailability::Unknown;
            self.check_due_at = check_pseudo(&self.values.pseudo)
                .is_empty()
                .then(|| at + self.debounce);
        }
    }

    fn on_tick(&mut self, at: Duration) -> Vec<FormEffect> {
        match self.check_due_at {
            Some(due) if at >= due => {}
            _ => return Vec::new(),
        }
        self.check_due_at = None;
        if !check_pseudo(&self.values.pseudo).is_empty() {
            return Vec::new();
        }
        self.last_seq += 1;
        let seq = self.last_seq;
        self.availability = PseudoAvailability::Checking { seq };
        self.statuses.insert(Field::Pseudo, FieldStatus::Pending);
        vec![FormEffect::CheckAvailability {
            seq,
            pseudo: self.values.pseudo.trim().to_owned(),
        }]
    }

    fn on_availability(&mut self, seq: u64, pseudo: &str, available: bool) {
        let current = self.availability == (PseudoAvailability::Checking { seq })
            && seq == self.last_seq
            && pseudo == self.values.pseudo.trim();
        if !current {
            return;
        }
        if available {
            self.availability = PseudoAvailability::Available;
            self.statuses.insert(Field::Pseudo, FieldStatus::Valid);
        } else {
            self.availability = PseudoAvailability::Taken;
            self.statuses.insert(
                Field::Pseudo,
                FieldStatus::Invalid {
                    reasons: vec![ReasonCode::AlreadyTaken],
                    origin: Origin::Server,
                },
            );
        }
    }

    fn on_submit(&mut self) -> Vec<FormEffect> {
        if self.submitting {
            return Vec::new();
        }
        let mut blocked = false;
        for field in Field::ALL {
            let current = self.status(field).clone();
            let status = match self.evaluate(field) {
                FieldStatus::Valid if current.is_server_rejection() => current,
                FieldStatus::Valid if field == Field::Avatar && self.values.avatar.is_none() => {
                    FieldStatus::Untouched
                }
                FieldStatus::Valid
                    if field == Field::Pseudo && current == FieldStatus::Pending =>
                {
                    FieldStatus::Pending
                }
                status => status,
            };
            blocked |= matches!(status, FieldStatus::Invalid { .. });
            self.statuses.insert(field, status);
        }
        if blocked || self.availability == PseudoAvailability::Taken {
            return Vec::new();
        }
        self.submitting = true;
        self.banner = None;
        vec![FormEffect::Submit {
            payload: self.values.clone(),
        }]
    }

    fn on_resolved(&mut self, outcome: SubmitOutcome) {
        self.submitting = false;
        match outcome {
            SubmitOutcome::Created { message } => {
                let today = self.today;
                let debounce = self.debounce;
                let last_seq = self.last_seq;
                *self = Self::with_debounce(today, debounce);
                self.last_seq = last_seq;
                self.banner = Some(Banner::Success(message));
            }
            SubmitOutcome::Rejected { errors } => self.overlay_server_errors(&errors),
            SubmitOutcome::Failed { message } => {
                self.banner = Some(Banner::Failure(message));
            }
        }
    }

    fn overlay_server_errors(&mut self, errors: &FieldErrors) {
        for (field, reasons) in errors.iter() {
            if field == Field::Pseudo && reasons.contains(&ReasonCode::AlreadyTaken) {
                self.availability = PseudoAvailability::Taken;
                self.check_due_at = None;
            }
            self.statuses.insert(
                field,
                FieldStatus::Invalid {
                    reasons: reasons.to_vec(),
                    origin: Origin::Server,
                },
            );
        }
    }
}

#[cfg(test)]
#[path = "form_tests.rs"]
mod tests;
