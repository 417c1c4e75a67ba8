//! Read-only access to published avatars.
//!
//! ```text
//! GET /storage/{key}
//! ```
//!
//! Only keys of committed avatars resolve. Staged and temporary files live
//! under dot-prefixed segments and answer 404 like missing ones.

use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{HttpResponse, get, web};
use tracing::{debug, error};

use crate::domain::Error;
use crate::domain::ports::AvatarStoreError;
use crate::domain::registration::{AvatarFormat, AvatarKey};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Serve the avatar stored at `key`.
#[utoipa::path(
    get,
    path = "/storage/{key}",
    params(("key" = String, Path, description = "Avatar storage key, e.g. avatars/avatar-john99.png")),
    responses(
        (status = 200, description = "Avatar bytes", content_type = "image/png"),
        (status = 404, description = "No avatar at this key"),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["avatars"],
    operation_id = "getAvatar"
)]
#[get("/storage/{key:.*}")]
pub async fn serve_avatar(
    state: web::Data<HttpState>,
    key: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let key = AvatarKey::from_stored(key.into_inner());
    if key.is_hidden() {
        return Ok(HttpResponse::NotFound().finish());
    }

    match state.avatars.get(&key).await {
        Ok(Some(bytes)) => {
            let media_type =
                AvatarFormat::sniff(&bytes).map_or(FALLBACK_MEDIA_TYPE, AvatarFormat::media_type);
            Ok(HttpResponse::Ok()
                .content_type(media_type)
                .insert_header(CacheControl(vec![CacheDirective::NoCache]))
                .body(bytes))
        }
        Ok(None) => Ok(HttpResponse::NotFound().finish()),
        Err(AvatarStoreError::InvalidKey { key }) => {
            debug!(%key, "refused avatar key");
            Ok(HttpResponse::NotFound().finish())
        }
        Err(read_error) => {
            error!(%key, error = %read_error, "failed to read avatar");
            Err(Error::internal("avatar could not be read"))
        }
    }
}
