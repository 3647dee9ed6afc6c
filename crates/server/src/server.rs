use axum::{
    Router,
    http::{HeaderValue, Method, header, header::InvalidHeaderValue},
    routing::{get, post},
};
use axum_extra::extract::cookie::SameSite;
use minijinja::Environment;
use thiserror::Error;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use std::{path::PathBuf, sync::Arc};

use crate::{api, views};
use accounts::Accounts;

/// Files the bundler drops at the root of the public folder, served as-is.
pub const STATIC_FILES: [&str; 5] = [
    "robots.txt",
    "favicon.ico",
    "logo192.png",
    "logo512.png",
    "manifest.json",
];

/// Attributes of the session cookie.
///
/// A SPA on another origin only gets the cookie back with
/// `SameSite=None`, which browsers accept only together with `Secure`.
#[derive(Clone, Debug)]
pub struct CookieSettings {
    pub name: String,
    pub same_site: SameSite,
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: "sessionid".to_string(),
            same_site: SameSite::Lax,
            secure: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Directory holding `index.html`.
    pub templates: PathBuf,
    /// Bundler output, `static/` lives below it.
    pub static_dir: PathBuf,
    /// Origins allowed to make credentialed requests.
    pub allowed_origins: Vec<String>,
    pub cookie: CookieSettings,
}

#[derive(Clone)]
pub struct ServerState {
    pub accounts: Arc<Accounts>,
    pub templates: Arc<Environment<'static>>,
    pub cookie: CookieSettings,
}

impl ServerState {
    pub fn new(accounts: Accounts, config: &ServerConfig) -> Self {
        let mut templates = Environment::new();
        templates.set_loader(minijinja::path_loader(config.templates.clone()));

        Self {
            accounts: Arc::new(accounts),
            templates: Arc::new(templates),
            cookie: config.cookie.clone(),
        }
    }
}

/// Invalid router configuration.
#[derive(Error, Debug)]
pub enum RouterError {
    #[error("invalid allowed origin: {0}")]
    InvalidOrigin(#[from] InvalidHeaderValue),
    /// Credentialed CORS can not be combined with a wildcard origin.
    #[error("wildcard origin \"*\" is not allowed, list the SPA origins explicitly")]
    WildcardOrigin,
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, RouterError> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            if origin.trim() == "*" {
                return Err(RouterError::WildcardOrigin);
            }
            Ok(HeaderValue::from_str(origin)?)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

pub fn router(state: ServerState, config: &ServerConfig) -> Result<Router, RouterError> {
    let mut router = Router::new()
        .route("/", get(views::index))
        .route("/authenticated/", get(views::authenticated))
        .route("/api/session/", get(api::status))
        .route("/api/login/", post(api::login))
        .route("/api/logout/", post(api::logout));

    for name in STATIC_FILES {
        router = router.route_service(
            &format!("/{name}"),
            ServeFile::new(config.static_dir.join(name)),
        );
    }

    Ok(router
        .nest_service("/static", ServeDir::new(config.static_dir.join("static")))
        .layer(cors_layer(&config.allowed_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Serve an already built router until the listener fails.
pub async fn serve(app: Router, listener: tokio::net::TcpListener) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;

    tracing::info!("Server listening on {}", addr);
    axum::serve(listener, app).await
}
