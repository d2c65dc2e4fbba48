use std::{env, fmt::Display, str::FromStr};

use escapade_admin::{random_string, DEFAULT_MAX_PAGE_SIZE};
use escapade_server::{ServerConfig, DEFAULT_PORT};
use log::{info, warn};

use crate::CliError;

/// Length of the session key generated when none is configured
const GENERATED_SECRET_LENGTH: usize = 64;

/// Settings read from the environment
pub struct Config {
    pub port: u16,
    pub production: bool,
    pub session_secret: String,
    /// Postgres connection string, the in-memory store is used without one
    pub database_url: Option<String>,
    pub max_page_size: i64,
}

impl Config {
    pub fn load() -> Result<Self, CliError> {
        let session_secret = var("ESCAPADE_SESSION_SECRET").unwrap_or_else(|| {
            warn!("ESCAPADE_SESSION_SECRET is not set, sessions will not survive a restart");
            random_string(GENERATED_SECRET_LENGTH)
        });

        let database_url = var("DATABASE_URL");
        if database_url.is_none() {
            warn!("DATABASE_URL is not set, data is kept in memory only");
        }

        Ok(Self {
            port: try_load("ESCAPADE_PORT", DEFAULT_PORT)?,
            production: var("ESCAPADE_ENV").is_some_and(|v| v == "production"),
            max_page_size: try_load("ESCAPADE_MAX_PAGE_SIZE", DEFAULT_MAX_PAGE_SIZE)?,
            session_secret,
            database_url,
        })
    }

    pub fn server(&self) -> ServerConfig {
        ServerConfig {
            port: self.port,
            secure_cookies: self.production,
        }
    }
}

/// A non-empty environment variable
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T>(key: &'static str, default: T) -> Result<T, CliError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| CliError::Config {
            key,
            reason: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
