use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::{info, warn};

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
pub const DEFAULT_AUTH_USER_HEADER: &str = "x-user-id";

#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Enables HSTS.
    pub production: bool,
    /// Header in which the upstream auth layer forwards the user id.
    pub auth_user_header: String,
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string());

        Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                lookup("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            ),
            port: parse_or("PORT", lookup("PORT"), DEFAULT_PORT),
            cors_allowed_origins: origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            production: lookup("RUST_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            auth_user_header: lookup("AUTH_USER_HEADER")
                .unwrap_or_else(|| DEFAULT_AUTH_USER_HEADER.to_string())
                .to_lowercase(),
            seed_demo_data: parse_or("SEED_DEMO_DATA", lookup("SEED_DEMO_DATA"), false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = raw else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert!(config.database_url.is_none());
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database_max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
        assert!(!config.production);
        assert_eq!(config.auth_user_header, DEFAULT_AUTH_USER_HEADER);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/meetup"),
            ("PORT", "8080"),
            ("RUST_ENV", "Production"),
            ("AUTH_USER_HEADER", "X-Session-User"),
            ("SEED_DEMO_DATA", "true"),
            ("CORS_ALLOWED_ORIGINS", " https://meetup.example , ,"),
        ]));

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/meetup"));
        assert_eq!(config.port, 8080);
        assert!(config.production);
        assert_eq!(config.auth_user_header, "x-session-user");
        assert!(config.seed_demo_data);
        assert_eq!(config.cors_allowed_origins, vec!["https://meetup.example"]);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = Config::from_lookup(lookup(&[("PORT", "eighty"), ("DATABASE_URL", " ")]));

        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.database_url.is_none());
    }
}
