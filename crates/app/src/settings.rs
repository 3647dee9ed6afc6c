//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` in the working directory, then overridden by
//! `SPA_SESSIONS__*` environment variables (`SPA_SESSIONS__SERVER__PORT=9000`).
//!
//! See `settings.toml` for the configuration.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    #[serde(default = "default_templates")]
    pub templates: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_templates() -> String {
    "templates".to_string()
}

fn default_static_dir() -> String {
    "public".to_string()
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl From<SameSite> for server::SameSite {
    fn from(value: SameSite) -> Self {
        match value {
            SameSite::Strict => server::SameSite::Strict,
            SameSite::Lax => server::SameSite::Lax,
            SameSite::None => server::SameSite::None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Session {
    pub cookie_name: String,
    pub ttl_secs: i64,
    pub same_site: SameSite,
    pub secure: bool,
    /// `0` disables the sweeper.
    pub sweep_interval_secs: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            cookie_name: "sessionid".to_string(),
            ttl_secs: accounts::DEFAULT_SESSION_TTL_SECS,
            same_site: SameSite::Lax,
            secure: false,
            sweep_interval_secs: 60 * 60,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub session: Session,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("SPA_SESSIONS")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
