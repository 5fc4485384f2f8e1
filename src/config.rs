use crate::error::{Error, Result};
use chrono::Duration;
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub session_ttl_days: i64,
    pub cookie_secure: bool,
    pub ghosting_window_days: i64,
    pub ghosting_sweep_cron: Option<String>,
    pub auth_rps: u32,
    pub uploads_dir: String,
    pub public_base_url: String,
    pub cors_origin: Option<String>,
    pub db_max_connections: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            session_ttl_days: get_env_parse_or("SESSION_TTL_DAYS", 7)?,
            cookie_secure: get_env_parse_or("COOKIE_SECURE", false)?,
            ghosting_window_days: get_env_parse_or("GHOSTING_WINDOW_DAYS", 14)?,
            ghosting_sweep_cron: get_env_opt("GHOSTING_SWEEP_CRON"),
            auth_rps: get_env_parse_or("AUTH_RPS", 10)?,
            uploads_dir: get_env_opt("UPLOADS_DIR").unwrap_or_else(|| "./uploads".to_string()),
            public_base_url: get_env_opt("PUBLIC_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            cors_origin: get_env_opt("CORS_ORIGIN"),
            db_max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 20)?,
        })
    }

    /// Settings suitable for tests and local tooling; only the database URL
    /// and signing secret are meaningful.
    pub fn for_tests(database_url: &str, jwt_secret: &str) -> Self {
        Self {
            server_address: "127.0.0.1:0".to_string(),
            database_url: database_url.to_string(),
            jwt_secret: jwt_secret.to_string(),
            session_ttl_days: 7,
            cookie_secure: false,
            ghosting_window_days: 14,
            ghosting_sweep_cron: None,
            auth_rps: 1000,
            uploads_dir: env::temp_dir()
                .join("job-tracker-uploads")
                .to_string_lossy()
                .into_owned(),
            public_base_url: String::new(),
            cors_origin: None,
            db_max_connections: 5,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::days(self.session_ttl_days)
    }

    pub fn ghosting_window(&self) -> Duration {
        Duration::days(self.ghosting_window_days)
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
