//! Tests for registration API handlers.

use super::*;
use crate::Trace;
use crate::domain::ports::{MockAccountRegistration, MockAvatarStore, MockPseudoAvailability};
use crate::domain::registration::{AvatarKey, Field, FieldErrors, ReasonCode};
use crate::domain::{Account, AccountId, TRACE_ID_HEADER};
use crate::inbound::http::registration_form::{json_config, multipart_config};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::TimeZone;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;

const BOUNDARY: &str = "signup-test-boundary";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

fn registered(candidate: &RegistrationCandidate) -> RegisteredAccount {
    let avatar = candidate
        .avatar
        .as_ref()
        .map(|_| AvatarKey::from_stored(format!("avatars/avatar-{}.png", candidate.pseudo)));
    RegisteredAccount {
        avatar_url: avatar
            .as_ref()
            .map(|key| format!("http://localhost:8080/storage/{key}")),
        account: Account {
            id: AccountId::random(),
            last_name: candidate.last_name.clone(),
            first_name: candidate.first_name.clone(),
            pseudo: candidate.pseudo.clone(),
            email: candidate.email.clone(),
            phone: candidate.phone.clone(),
            birthday: NaiveDate::from_ymd_opt(1990, 12, 10).expect("valid date"),
            avatar,
            created_at: Utc
                .with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
        },
    }
}

fn test_app(
    registration: MockAccountRegistration,
    availability: MockPseudoAvailability,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(
        Arc::new(registration),
        Arc::new(availability),
        Arc::new(MockAvatarStore::new()),
    );
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(multipart_config())
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .service(register_multipart)
                .service(register_json)
                .service(check_pseudo),
        )
}

fn text_part(name: &str, value: &str) -> Vec<u8> {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
    )
    .into_bytes()
}

fn multipart_body(fields: &[(&str, &str)], avatar: Option<&[u8]>) -> Vec<u8> {
    let mut body: Vec<u8> = fields
        .iter()
        .flat_map(|(name, value)| text_part(name, value))
        .collect();
    if let Some(bytes) = avatar {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

const VALID_FIELDS: [(&str, &str); 8] = [
    ("last_name", "Lovelace"),
    ("first_name", "Ada"),
    ("pseudo", "ada_l"),
    ("email", "ada@example.org"),
    ("password", "Password1!"),
    ("phone", "0612345678"),
    ("country", "FR"),
    ("birthday", "1990-12-10"),
];

#[rstest]
#[actix_web::test]
async fn multipart_registration_returns_created_view() {
    let mut registration = MockAccountRegistration::new();
    registration
        .expect_register()
        .withf(|candidate| {
            candidate.pseudo == "ada_l"
                && candidate.password() == "Password1!"
                && candidate.avatar.as_ref().map(|a| a.bytes()) == Some(PNG)
        })
        .times(1)
        .returning(|candidate| Ok(registered(&candidate)));
    let app = actix_test::init_service(test_app(registration, MockPseudoAvailability::new())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body(&VALID_FIELDS, Some(PNG)))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], json!(REGISTRATION_SUCCESS));
    assert_eq!(body["user"]["pseudo"], json!("ada_l"));
    assert_eq!(
        body["user"]["avatar"],
        json!("http://localhost:8080/storage/avatars/avatar-ada_l.png")
    );
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[rstest]
#[actix_web::test]
async fn empty_file_part_means_no_avatar() {
    let mut registration = MockAccountRegistration::new();
    registration
        .expect_register()
        .withf(|candidate| candidate.avatar.is_none())
        .times(1)
        .returning(|candidate| Ok(registered(&candidate)));
    let app = actix_test::init_service(test_app(registration, MockPseudoAvailability::new())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body(&VALID_FIELDS, Some(b"")))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["user"]["avatar"], Value::Null);
}

#[rstest]
#[actix_web::test]
async fn json_registration_is_accepted() {
    let mut registration = MockAccountRegistration::new();
    registration
        .expect_register()
        .withf(|candidate| candidate.email == "ada@example.org" && candidate.country == "FR")
        .times(1)
        .returning(|candidate| Ok(registered(&candidate)));
    let app = actix_test::init_service(test_app(registration, MockPseudoAvailability::new())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({
            "last_name": "Lovelace",
            "first_name": "Ada",
            "pseudo": "ada_l",
            "email": "ada@example.org",
            "password": "Password1!",
            "phone": "0612345678",
            "birthday": "1990-12-10"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[rstest]
#[actix_web::test]
async fn validation_failure_lists_field_reasons_with_trace_id() {
    let mut registration = MockAccountRegistration::new();
    registration.expect_register().returning(|_| {
        let mut errors = FieldErrors::new();
        errors.push(Field::Password, ReasonCode::MissingDigit);
        errors.push(Field::Password, ReasonCode::MissingSpecial);
        errors.push(Field::Phone, ReasonCode::InvalidFormat);
        Err(Error::validation_failed(errors))
    });
    let app = actix_test::init_service(test_app(registration, MockPseudoAvailability::new())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({ "pseudo": "ada_l" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], json!("validation_failed"));
    assert_eq!(body["traceId"], json!(header));
    assert_eq!(
        body["errors"],
        json!({
            "password": ["missing_digit", "missing_special"],
            "phone": ["invalid_format"]
        })
    );
}

#[rstest]
#[case(Error::service_unavailable("Registration is temporarily unavailable, please retry"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::conflict("An account with these details already exists"), StatusCode::CONFLICT)]
#[case(Error::internal("registration failed"), StatusCode::INTERNAL_SERVER_ERROR)]
#[actix_web::test]
async fn infrastructure_failures_carry_no_field_detail(
    #[case] failure: Error,
    #[case] status: StatusCode,
) {
    let mut registration = MockAccountRegistration::new();
    registration
        .expect_register()
        .returning(move |_| Err(failure.clone()));
    let app = actix_test::init_service(test_app(registration, MockPseudoAvailability::new())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), status);
    let body: Value = actix_test::read_body_json(response).await;
    assert!(body.get("errors").is_none());
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let mut registration = MockAccountRegistration::new();
    registration.expect_register().never();
    let app = actix_test::init_service(test_app(registration, MockPseudoAvailability::new())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], json!("invalid_request"));
}

#[rstest]
#[case(true)]
#[case(false)]
#[actix_web::test]
async fn check_pseudo_reports_availability(#[case] available: bool) {
    let mut availability = MockPseudoAvailability::new();
    availability
        .expect_check()
        .withf(|pseudo| pseudo == "ada_l")
        .times(1)
        .returning(move |_| Ok(Availability { available }));
    let app = actix_test::init_service(test_app(MockAccountRegistration::new(), availability)).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users/check-pseudo/ada_l")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body, json!({ "available": available }));
}

#[rstest]
#[actix_web::test]
async fn check_pseudo_surfaces_store_outage() {
    let mut availability = MockPseudoAvailability::new();
    availability
        .expect_check()
        .returning(|_| Err(Error::service_unavailable("retry")));
    let app = actix_test::init_service(test_app(MockAccountRegistration::new(), availability)).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/users/check-pseudo/ada_l")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
