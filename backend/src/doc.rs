//! OpenAPI documentation for the registration API.
//!
//! Served by Swagger UI at `/docs` in debug builds.

use utoipa::OpenApi;

use crate::domain::ports::Availability;
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::registration_form::{RegistrationRequest, RegistrationUpload};
use crate::inbound::http::users::{AccountView, RegistrationResponse};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Signup API",
        description = "Account self-registration, pseudo availability, avatar files and health checks."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::register_multipart,
        crate::inbound::http::users::check_pseudo,
        crate::inbound::http::avatars::serve_avatar,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        AccountView,
        Availability,
        Error,
        ErrorCode,
        RegistrationRequest,
        RegistrationResponse,
        RegistrationUpload,
    )),
    tags(
        (name = "users", description = "Account registration"),
        (name = "avatars", description = "Published avatar files"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
