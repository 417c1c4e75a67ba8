//! Registration API handlers.
//!
//! ```text
//! POST /api/v1/users                       multipart/form-data or JSON
//! GET  /api/v1/users/check-pseudo/{pseudo}
//! ```
//!
//! The multipart handler is guarded on the request content type and must be
//! registered before the JSON handler, which accepts everything else.

use actix_multipart::form::MultipartForm;
use actix_web::guard::GuardContext;
use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{Availability, RegisteredAccount};
use crate::domain::registration::RegistrationCandidate;
use crate::inbound::http::ApiResult;
use crate::inbound::http::registration_form::{RegistrationForm, RegistrationRequest};
use crate::inbound::http::state::HttpState;

pub const REGISTRATION_SUCCESS: &str = "Registration successful";

/// Created account as returned to clients. Never carries the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccountView {
    pub id: Uuid,
    pub last_name: String,
    pub first_name: String,
    pub pseudo: String,
    pub email: String,
    pub phone: String,
    pub birthday: NaiveDate,
    /// Public URL of the avatar, or `null`.
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RegisteredAccount> for AccountView {
    fn from(registered: RegisteredAccount) -> Self {
        let RegisteredAccount {
            account,
            avatar_url,
        } = registered;
        Self {
            id: *account.id.as_uuid(),
            last_name: account.last_name,
            first_name: account.first_name,
            pseudo: account.pseudo,
            email: account.email,
            phone: account.phone,
            birthday: account.birthday,
            avatar: avatar_url,
            created_at: account.created_at,
        }
    }
}

/// Body of a 201 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    pub message: String,
    pub user: AccountView,
}

fn is_multipart(ctx: &GuardContext<'_>) -> bool {
    ctx.header::<header::ContentType>()
        .is_some_and(|content_type| content_type.0.essence_str() == "multipart/form-data")
}

async fn register(state: &HttpState, candidate: RegistrationCandidate) -> ApiResult<HttpResponse> {
    let registered = state.registration.register(candidate).await?;
    Ok(HttpResponse::Created().json(RegistrationResponse {
        message: REGISTRATION_SUCCESS.to_owned(),
        user: registered.into(),
    }))
}

/// Register a new account.
///
/// Every field is validated; a 422 lists every failing field with its
/// reasons. The account and its optional avatar are stored together or not
/// at all.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body(content(
        (crate::inbound::http::registration_form::RegistrationUpload = "multipart/form-data"),
        (RegistrationRequest = "application/json")
    )),
    responses(
        (status = 201, description = "Account created", body = RegistrationResponse),
        (status = 400, description = "Malformed request body", body = Error),
        (status = 409, description = "Conflicting account", body = Error),
        (status = 422, description = "Field validation failed", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Store unavailable, safe to retry", body = Error)
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/users", guard = "is_multipart")]
pub async fn register_multipart(
    state: web::Data<HttpState>,
    form: MultipartForm<RegistrationForm>,
) -> ApiResult<HttpResponse> {
    register(&state, form.into_inner().into()).await
}

/// JSON variant of [`register_multipart`], without avatar.
#[post("/users")]
pub async fn register_json(
    state: web::Data<HttpState>,
    payload: web::Json<RegistrationRequest>,
) -> ApiResult<HttpResponse> {
    register(&state, payload.into_inner().into()).await
}

/// Advisory pseudo availability. A locally invalid pseudo is reported as
/// unavailable; registration still enforces uniqueness on insert.
#[utoipa::path(
    get,
    path = "/api/v1/users/check-pseudo/{pseudo}",
    params(("pseudo" = String, Path, description = "Pseudo to check")),
    responses(
        (status = 200, description = "Availability", body = Availability),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Store unavailable, safe to retry", body = Error)
    ),
    tags = ["users"],
    operation_id = "checkPseudo"
)]
#[get("/users/check-pseudo/{pseudo}")]
pub async fn check_pseudo(
    state: web::Data<HttpState>,
    pseudo: web::Path<String>,
) -> ApiResult<web::Json<Availability>> {
    let availability = state.availability.check(&pseudo).await?;
    Ok(web::Json(availability))
}

#[cfg(test)]
mod tests;
