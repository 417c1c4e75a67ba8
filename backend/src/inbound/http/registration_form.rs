//! Request bodies accepted by `POST /api/v1/users` and their conversion into
//! a [`RegistrationCandidate`].
//!
//! Missing fields become empty strings so the rule set reports them as
//! `required` instead of the extractor rejecting the whole request.

use actix_multipart::MultipartError;
use actix_multipart::form::bytes::Bytes as FilePart;
use actix_multipart::form::text::Text;
use actix_multipart::form::{MultipartForm, MultipartFormConfig};
use actix_web::HttpRequest;
use actix_web::error::JsonPayloadError;
use actix_web::web::JsonConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::Error;
use crate::domain::registration::{AvatarUpload, DEFAULT_COUNTRY, RegistrationCandidate};

/// Upper bound on a whole multipart body. Larger avatars than the rule set
/// allows still fit, so they are reported as `too_large` on the field.
pub const MULTIPART_LIMIT_BYTES: usize = 20 * 1024 * 1024;

/// JSON registration body. Carries no avatar.
#[derive(Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct RegistrationRequest {
    pub last_name: String,
    pub first_name: String,
    pub pseudo: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    /// ISO 3166-1 alpha-2; defaults to `FR`.
    pub country: Option<String>,
    /// `YYYY-MM-DD`.
    pub birthday: String,
}

impl From<RegistrationRequest> for RegistrationCandidate {
    fn from(request: RegistrationRequest) -> Self {
        Self {
            last_name: request.last_name,
            first_name: request.first_name,
            pseudo: request.pseudo,
            email: request.email,
            password: Zeroizing::new(request.password),
            phone: request.phone,
            country: country_or_default(request.country),
            birthday: request.birthday,
            avatar: None,
        }
    }
}

/// Multipart registration form as submitted by browsers.
#[derive(MultipartForm)]
pub struct RegistrationForm {
    pub last_name: Option<Text<String>>,
    pub first_name: Option<Text<String>>,
    pub pseudo: Option<Text<String>>,
    pub email: Option<Text<String>>,
    pub password: Option<Text<String>>,
    pub phone: Option<Text<String>>,
    pub country: Option<Text<String>>,
    pub birthday: Option<Text<String>>,
    #[multipart(limit = "20MiB")]
    pub avatar: Option<FilePart>,
}

/// OpenAPI view of [`RegistrationForm`].
#[derive(ToSchema)]
pub struct RegistrationUpload {
    pub last_name: String,
    pub first_name: String,
    pub pseudo: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub country: Option<String>,
    pub birthday: String,
    /// JPEG or PNG, at most 10 MiB.
    #[schema(value_type = Option<String>, format = Binary)]
    pub avatar: Option<Vec<u8>>,
}

fn text(field: Option<Text<String>>) -> String {
    field.map(|value| value.0).unwrap_or_default()
}

fn country_or_default(country: Option<String>) -> String {
    country
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COUNTRY.to_owned())
}

impl From<RegistrationForm> for RegistrationCandidate {
    fn from(form: RegistrationForm) -> Self {
        // Browsers send an empty file part when no file was chosen.
        let avatar = form
            .avatar
            .filter(|part| !part.data.is_empty())
            .map(|part| AvatarUpload::new(part.data.to_vec()));
        Self {
            last_name: text(form.last_name),
            first_name: text(form.first_name),
            pseudo: text(form.pseudo),
            email: text(form.email),
            password: Zeroizing::new(text(form.password)),
            phone: text(form.phone),
            country: country_or_default(form.country.map(|value| value.0)),
            birthday: text(form.birthday),
            avatar,
        }
    }
}

fn multipart_error(error: MultipartError, _req: &HttpRequest) -> actix_web::Error {
    debug!(%error, "rejected multipart registration body");
    Error::invalid_request("Malformed multipart form").into()
}

fn json_error(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(%error, "rejected JSON registration body");
    Error::invalid_request("Malformed JSON body").into()
}

/// Extractor limits for the multipart form, answering with the JSON error shape.
pub fn multipart_config() -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(MULTIPART_LIMIT_BYTES)
        .memory_limit(MULTIPART_LIMIT_BYTES)
        .error_handler(multipart_error)
}

/// JSON extractor configuration answering with the JSON error shape.
pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(json_error)
}
