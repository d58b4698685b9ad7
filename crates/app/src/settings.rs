//! Handles settings for the application.
//!
//! Values come from an optional `settings.toml` in the working directory,
//! then from `PROCUREMENT__<SECTION>__<KEY>` environment variables.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub database: Database,
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub jwt_secret: String,
    pub token_ttl_hours: u64,
}

#[derive(Debug, Deserialize)]
pub struct Webhook {
    /// Default endpoint; requests may override it with `X-Webhook-URL`.
    pub url: Option<String>,
    pub timeout_secs: u64,
    pub queue_capacity: usize,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub auth: Auth,
    pub webhook: Webhook,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.port", 3000)?
            .set_default("auth.token_ttl_hours", 24)?
            .set_default("webhook.timeout_secs", 10)?
            .set_default("webhook.queue_capacity", 256)?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("PROCUREMENT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}
