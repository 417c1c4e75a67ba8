//! Tests for the authoritative registration rules.

use super::*;
use rstest::{fixture, rstest};
use zeroize::Zeroizing;

const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[fixture]
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

#[fixture]
fn valid_candidate() -> RegistrationCandidate {
    RegistrationCandidate {
        last_name: "Lovelace".into(),
        first_name: "Ada".into(),
        pseudo: "ada_l".into(),
        email: "ada@example.org".into(),
        password: Zeroizing::new("Password1!".into()),
        phone: "0612345678".into(),
        country: "FR".into(),
        birthday: "1990-12-10".into(),
        avatar: None,
    }
}

#[rstest]
fn accepts_fully_valid_candidate(valid_candidate: RegistrationCandidate, today: NaiveDate) {
    let valid = validate_candidate(&valid_candidate, today).expect("candidate is valid");
    assert_eq!(valid.pseudo, "ada_l");
    assert_eq!(
        valid.birthday,
        NaiveDate::from_ymd_opt(1990, 12, 10).expect("valid date")
    );
    assert!(valid.avatar.is_none());
}

#[rstest]
fn trims_text_fields_but_not_password(
    mut valid_candidate: RegistrationCandidate,
    today: NaiveDate,
) {
    valid_candidate.last_name = "  Lovelace ".into();
    valid_candidate.email = " ada@example.org\t".into();
    let valid = validate_candidate(&valid_candidate, today).expect("candidate is valid");
    assert_eq!(valid.last_name, "Lovelace");
    assert_eq!(valid.email, "ada@example.org");
}

#[rstest]
fn empty_candidate_reports_every_required_field(today: NaiveDate) {
    let errors = validate_candidate(&RegistrationCandidate::empty(), today)
        .expect_err("empty candidate is rejected");
    for field in Field::REQUIRED {
        assert_eq!(errors.primary(field), Some(ReasonCode::Required), "{field}");
    }
    assert_eq!(errors.primary(Field::Avatar), None);
}

#[rstest]
fn reports_all_failing_fields_together(
    mut valid_candidate: RegistrationCandidate,
    today: NaiveDate,
) {
    valid_candidate.pseudo = "ab".into();
    valid_candidate.email = "not-an-email".into();
    valid_candidate.phone = "0812345678".into();
    let errors = validate_candidate(&valid_candidate, today).expect_err("rejected");
    assert_eq!(
        errors.fields().collect::<Vec<_>>(),
        vec![Field::Pseudo, Field::Email, Field::Phone]
    );
}

#[rstest]
#[case("ab", vec![ReasonCode::TooShort])]
#[case("abc", vec![])]
#[case("abcdefghijklmno", vec![])]
#[case("abcdefghijklmnop", vec![ReasonCode::TooLong])]
#[case("john doe", vec![ReasonCode::InvalidCharacters])]
#[case("a!", vec![ReasonCode::TooShort, ReasonCode::InvalidCharacters])]
#[case("jean-luc_99", vec![])]
#[case("   ", vec![ReasonCode::Required])]
fn pseudo_rules(#[case] pseudo: &str, #[case] expected: Vec<ReasonCode>) {
    assert_eq!(pseudo_reasons(pseudo), expected);
}

#[rstest]
#[case("ada@example.org", vec![])]
#[case("ada@example", vec![ReasonCode::InvalidFormat])]
#[case("ada example@x.org", vec![ReasonCode::InvalidFormat])]
#[case("@example.org", vec![ReasonCode::InvalidFormat])]
#[case("", vec![ReasonCode::Required])]
fn email_rules(#[case] email: &str, #[case] expected: Vec<ReasonCode>) {
    assert_eq!(email_reasons(email), expected);
}

#[rstest]
fn email_longer_than_column_is_too_long() {
    let email = format!("{}@example.org", "a".repeat(250));
    assert_eq!(email_reasons(&email), vec![ReasonCode::TooLong]);
}

#[rstest]
fn name_longer_than_limit_is_too_long() {
    assert_eq!(name_reasons(&"x".repeat(256)), vec![ReasonCode::TooLong]);
    assert!(name_reasons(&"x".repeat(255)).is_empty());
}

#[rstest]
#[case("Password1!", vec![])]
#[case(
    "password",
    vec![ReasonCode::MissingUppercase, ReasonCode::MissingDigit, ReasonCode::MissingSpecial]
)]
#[case("Pa1!", vec![ReasonCode::TooShort])]
#[case("PASSWORD1!", vec![ReasonCode::MissingLowercase])]
fn password_composition(#[case] password: &str, #[case] expected: Vec<ReasonCode>) {
    assert_eq!(password_reasons(password, &PersonalInfo::default()), expected);
}

#[rstest]
fn password_longer_than_limit_is_too_long() {
    let password = format!("Aa1!{}", "x".repeat(PASSWORD_MAX_CHARS));
    assert_eq!(
        password_reasons(&password, &PersonalInfo::default()),
        vec![ReasonCode::TooLong]
    );
}

#[rstest]
fn password_embedding_pseudo_is_rejected(
    mut valid_candidate: RegistrationCandidate,
    today: NaiveDate,
) {
    valid_candidate.pseudo = "john99".into();
    valid_candidate.password = Zeroizing::new("MyJohn99Pass!".into());
    let errors = validate_candidate(&valid_candidate, today).expect_err("rejected");
    assert_eq!(
        errors.reasons(Field::Password),
        &[ReasonCode::ContainsPersonalInfo]
    );
}

#[rstest]
#[case("Lovelace#2024x")]
#[case("xADA#2024aaa")]
#[case("Secure1990!x")]
#[case("Secure10121990!")]
#[case("Secure1012!x")]
fn password_embedding_personal_tokens_is_rejected(
    mut valid_candidate: RegistrationCandidate,
    today: NaiveDate,
    #[case] password: &str,
) {
    valid_candidate.password = Zeroizing::new(password.into());
    let errors = validate_candidate(&valid_candidate, today).expect_err("rejected");
    assert!(
        errors
            .reasons(Field::Password)
            .contains(&ReasonCode::ContainsPersonalInfo),
        "{password}"
    );
}

#[rstest]
fn single_character_names_do_not_count_as_personal_info(
    mut valid_candidate: RegistrationCandidate,
    today: NaiveDate,
) {
    valid_candidate.first_name = "a".into();
    assert!(validate_candidate(&valid_candidate, today).is_ok());
}

#[rstest]
#[case("", Err(ReasonCode::Required))]
#[case("1990-02-30", Err(ReasonCode::InvalidDate))]
#[case("1990-2-3", Err(ReasonCode::InvalidDate))]
#[case("10/12/1990", Err(ReasonCode::InvalidDate))]
#[case("2025-06-01", Err(ReasonCode::NotInPast))]
#[case("2030-01-01", Err(ReasonCode::NotInPast))]
#[case("2025-05-31", Ok(NaiveDate::from_ymd_opt(2025, 5, 31).expect("valid date")))]
fn birthday_rules(
    today: NaiveDate,
    #[case] raw: &str,
    #[case] expected: Result<NaiveDate, ReasonCode>,
) {
    assert_eq!(parse_birthday(raw, today), expected);
}

#[rstest]
#[case("FR", "0612345678", vec![])]
#[case("", "0712345678", vec![])]
#[case("FR", "0512345678", vec![ReasonCode::InvalidFormat])]
#[case("ZZ", "0612345678", vec![ReasonCode::UnsupportedCountry])]
#[case("FR", "  ", vec![ReasonCode::Required])]
fn phone_rules(#[case] country: &str, #[case] phone: &str, #[case] expected: Vec<ReasonCode>) {
    assert_eq!(phone_reasons(country, phone), expected);
}

#[rstest]
fn accepts_png_avatar(mut valid_candidate: RegistrationCandidate, today: NaiveDate) {
    valid_candidate.avatar = Some(AvatarUpload::new(PNG_HEADER.to_vec()));
    let valid = validate_candidate(&valid_candidate, today).expect("valid");
    assert_eq!(valid.avatar.map(|(format, _)| format), Some(AvatarFormat::Png));
}

#[rstest]
fn rejects_unknown_avatar_format(mut valid_candidate: RegistrationCandidate, today: NaiveDate) {
    valid_candidate.avatar = Some(AvatarUpload::new(b"GIF89a....".to_vec()));
    let errors = validate_candidate(&valid_candidate, today).expect_err("rejected");
    assert_eq!(errors.reasons(Field::Avatar), &[ReasonCode::UnsupportedFormat]);
}

#[rstest]
fn rejects_oversized_avatar() {
    let mut bytes = PNG_HEADER.to_vec();
    bytes.resize(MAX_AVATAR_BYTES + 1, 0);
    assert_eq!(
        avatar_format(&AvatarUpload::new(bytes)),
        Err(vec![ReasonCode::TooLarge])
    );
}

#[rstest]
fn avatar_at_limit_is_accepted() {
    let mut bytes = PNG_HEADER.to_vec();
    bytes.resize(MAX_AVATAR_BYTES, 0);
    assert_eq!(
        avatar_format(&AvatarUpload::new(bytes)),
        Ok(AvatarFormat::Png)
    );
}

#[rstest]
fn rejection_is_idempotent(mut valid_candidate: RegistrationCandidate, today: NaiveDate) {
    valid_candidate.password = Zeroizing::new("short".into());
    valid_candidate.birthday = "2099-01-01".into();
    let first = validate_candidate(&valid_candidate, today).expect_err("rejected");
    let second = validate_candidate(&valid_candidate, today).expect_err("rejected");
    assert_eq!(first, second);
}
