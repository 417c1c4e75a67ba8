//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerSettings;

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use url::Url;

use signup::Trace;
#[cfg(debug_assertions)]
use signup::doc::ApiDoc;
use signup::inbound::http::avatars::serve_avatar;
use signup::inbound::http::health::{HealthState, live, ready};
use signup::inbound::http::registration_form::{json_config, multipart_config};
use signup::inbound::http::state::HttpState;
use signup::inbound::http::users::{check_pseudo, register_json, register_multipart};
use signup::outbound::persistence::DbPool;
use state_builders::build_http_state;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Resolved configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) avatar_dir: PathBuf,
    pub(crate) public_base_url: Url,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, avatar_dir: PathBuf, public_base_url: Url) -> Self {
        Self {
            bind_addr,
            avatar_dir,
            public_base_url,
            db_pool: None,
        }
    }

    /// Back accounts with PostgreSQL instead of process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    // Multipart first: the JSON handler shares the path without a guard.
    let api = web::scope("/api/v1")
        .app_data(json_config())
        .app_data(multipart_config())
        .service(register_multipart)
        .service(register_json)
        .service(check_pseudo);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(serve_avatar)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the Actix server and mark it ready once bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when the avatar directory cannot be opened
/// or the socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config)?);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .bind(config.bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}
