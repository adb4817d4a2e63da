use crate::error::{Error, Result};
use crate::policy::visibility::VisibilityMode;
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub uploads_dir: String,
    pub max_upload_mb: usize,
    pub notify_webhook_url: Option<String>,
    pub webhook_secret: String,
    pub crew_visibility: VisibilityMode,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_ttl_hours: get_env_parse_or("JWT_TTL_HOURS", 24)?,
            uploads_dir: get_env_or("UPLOADS_DIR", "./uploads"),
            max_upload_mb: get_env_parse_or("MAX_UPLOAD_MB", 50)?,
            notify_webhook_url: get_optional_env("NOTIFY_WEBHOOK_URL"),
            webhook_secret: get_env_or("WEBHOOK_SECRET", ""),
            crew_visibility: get_env_parse_or("CREW_VISIBILITY", VisibilityMode::Assigned)?,
            bootstrap_admin_email: get_optional_env("BOOTSTRAP_ADMIN_EMAIL"),
            bootstrap_admin_password: get_optional_env("BOOTSTRAP_ADMIN_PASSWORD"),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_optional_env(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}
