// src/config.rs
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

pub const DEFAULT_SECRET_KEY: &str = "insecure-development-key-change-me";

const DEFAULT_ALLOWED_HOSTS: &[&str] = &[
    ".elasticbeanstalk.com",
    "127.0.0.1",
    "localhost",
    "*",
    ".amazonaws.com",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub debug: bool,
    pub allowed_hosts: Vec<String>,
    pub database_url: String,
    pub database_max_connections: u32,
    pub static_root: PathBuf,
    pub static_url: String,
    pub url_prefix: String,
    pub bind_address: SocketAddr,
    pub seed_fixture: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            debug: false,
            allowed_hosts: DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
            database_url: "sqlite://db.sqlite3?mode=rwc".to_string(),
            database_max_connections: 5,
            static_root: PathBuf::from("static"),
            static_url: "/static".to_string(),
            url_prefix: "/polls".to_string(),
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3030)),
            seed_fixture: None,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment. Call
    /// `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to the
    /// defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let debug = lookup("DEBUG")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.debug);

        let allowed_hosts = match lookup("ALLOWED_HOSTS") {
            Some(hosts) => parse_host_list(&hosts),
            None => defaults.allowed_hosts,
        };

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.trim().parse().map_err(|_| {
                AppError::ConfigError(format!("DATABASE_MAX_CONNECTIONS must be a number, got {:?}", v))
            })?,
            None => defaults.database_max_connections,
        };
        if database_max_connections == 0 {
            return Err(AppError::ConfigError(
                "DATABASE_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        let ip: IpAddr = match lookup("BIND_ADDRESS") {
            Some(v) => v.trim().parse().map_err(|_| {
                AppError::ConfigError(format!("BIND_ADDRESS must be an IP address, got {:?}", v))
            })?,
            None => defaults.bind_address.ip(),
        };
        let port: u16 = match lookup("PORT") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| AppError::ConfigError(format!("PORT must be a valid number, got {:?}", v)))?,
            None => defaults.bind_address.port(),
        };

        Ok(Self {
            secret_key: lookup("SECRET_KEY").unwrap_or(defaults.secret_key),
            debug,
            allowed_hosts,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            database_max_connections,
            static_root: lookup("STATIC_ROOT").map(PathBuf::from).unwrap_or(defaults.static_root),
            static_url: lookup("STATIC_URL")
                .map(|v| normalize_prefix(&v))
                .unwrap_or(defaults.static_url),
            url_prefix: lookup("URL_PREFIX")
                .map(|v| normalize_prefix(&v))
                .unwrap_or(defaults.url_prefix),
            bind_address: SocketAddr::new(ip, port),
            seed_fixture: lookup("SEED_FIXTURE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn uses_default_secret_key(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

fn parse_host_list(hosts: &str) -> Vec<String> {
    hosts
        .split(',')
        .map(|h| h.trim().to_ascii_lowercase())
        .filter(|h| !h.is_empty())
        .collect()
}

/// `"polls/"` and `"/polls"` both become `"/polls"`; `"/"` becomes `""`.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
