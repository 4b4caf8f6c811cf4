use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;

/// Runtime configuration.
///
/// Layered from an optional TOML file, then environment variables with the
/// same names upper-cased (`MONGODB_URI`, `SMTP_HOST`, ...). Environment wins.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_mongodb_database")]
    pub mongodb_database: String,

    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
    #[serde(default)]
    pub cookie_secure: bool,
    /// Admin account created at startup when both are set.
    pub admin_bootstrap_email: Option<String>,
    pub admin_bootstrap_password: Option<String>,

    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    /// Recipient of quote notifications.
    pub admin_email: Option<String>,
    /// Sender address for notifications.
    pub from_email: Option<String>,

    pub asset_upload_url: Option<String>,
    pub asset_api_key: Option<String>,
    pub asset_api_secret: Option<String>,
    pub asset_folder: Option<String>,
    #[serde(default = "default_asset_timeout_secs")]
    pub asset_timeout_secs: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Storefront origin allowed by CORS (credentials included).
    pub client_base_url: Option<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_mongodb_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_mongodb_database() -> String {
    "gourmet".to_string()
}

fn default_jwt_secret() -> String {
    "dev-secret".to_string()
}

fn default_token_ttl_minutes() -> i64 {
    60
}

fn default_smtp_port() -> u16 {
    587
}

fn default_asset_timeout_secs() -> u64 {
    30
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl AppConfig {
    /// Load from `file` (if given and present) overlaid with the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, AppError> {
        Self::build(file, config::Environment::default())
    }

    /// Env values stay strings; each field converts its own.
    fn build(file: Option<&Path>, env: config::Environment) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder
            .add_source(env)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// SMTP is enabled when a host, a sender and an admin recipient are all configured.
    pub fn mail_enabled(&self) -> bool {
        self.smtp_host.is_some() && self.from_email.is_some() && self.admin_email.is_some()
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == default_jwt_secret()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            mongodb_uri: default_mongodb_uri(),
            mongodb_database: default_mongodb_database(),
            jwt_secret: default_jwt_secret(),
            token_ttl_minutes: default_token_ttl_minutes(),
            cookie_secure: false,
            admin_bootstrap_email: None,
            admin_bootstrap_password: None,
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_user: None,
            smtp_pass: None,
            admin_email: None,
            from_email: None,
            asset_upload_url: None,
            asset_api_key: None,
            asset_api_secret: None,
            asset_folder: None,
            asset_timeout_secs: default_asset_timeout_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            client_base_url: None,
        }
    }
}
