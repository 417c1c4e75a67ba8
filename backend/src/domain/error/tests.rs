//! Tests for the error payload formatting and propagation.

use super::*;
use crate::domain::registration::{Field, ReasonCode};
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn base_error() -> Error {
    Error::invalid_request("bad")
}

#[rstest]
fn invalid_request_constructor_sets_code(base_error: Error) {
    assert_eq!(base_error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn with_trace_id_replaces_captured_id(base_error: Error) {
    let error = base_error.with_trace_id(TRACE_ID);
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid UUID");
    let error = TraceId::scope(trace_id, async { Error::conflict("taken") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn validation_failure_serialises_errors_at_top_level() {
    let errors = FieldErrors::single(Field::Pseudo, ReasonCode::AlreadyTaken);
    let error = Error::validation_failed(errors).with_trace_id(TRACE_ID);

    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(value["code"], json!("validation_failed"));
    assert_eq!(value["traceId"], json!(TRACE_ID));
    assert_eq!(value["errors"], json!({ "pseudo": ["already_taken"] }));
}

#[rstest]
fn deserialising_rejects_blank_message() {
    let payload = json!({ "code": "internal_error", "message": " " });
    let result = serde_json::from_value::<Error>(payload);
    assert!(result.is_err());
}

#[rstest]
fn deserialising_restores_field_errors() {
    let payload = json!({
        "code": "validation_failed",
        "message": "invalid",
        "errors": { "email": ["already_taken"] }
    });
    let error: Error = serde_json::from_value(payload).expect("valid payload");
    assert!(error.trace_id().is_none());
    let errors = error.field_errors().expect("field errors present");
    assert_eq!(errors.primary(Field::Email), Some(ReasonCode::AlreadyTaken));
}
