use std::env;
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub timezone: Tz, // Form input and display timezone
    pub session_ttl_hours: i64,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://eventhub.db".to_string()),
            port: parse_var("PORT", "3000")?,
            timezone: parse_var("APP_TIMEZONE", "America/Argentina/Buenos_Aires")?,
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", "336")?,
            secure_cookies: parse_var("SECURE_COOKIES", "true")?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|_| ConfigError::Invalid { name, value })
}
