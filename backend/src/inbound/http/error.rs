//! Actix rendering of domain errors.
//!
//! Status codes are chosen here. Internal failures are answered with a fixed
//! body so messages and field errors raised inside adapters never
//! reach clients; the trace id is kept for correlation with the logs.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Wire body of a redacted internal failure.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InternalBody<'a> {
    code: ErrorCode,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<&'a str>,
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        match self.code() {
            ErrorCode::InternalError => response.json(InternalBody {
                code: ErrorCode::InternalError,
                message: INTERNAL_MESSAGE,
                trace_id: self.trace_id(),
            }),
            _ => response.json(self),
        }
    }
}
