use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

/// Credentials of the owner account created on first start.
#[derive(Clone, Debug)]
pub struct BootstrapOwner {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Raw `AMANAH_JWT_SECRET`; a random key is used when absent.
    pub jwt_secret: Option<String>,
    pub token_ttl: Duration,
    pub scheduler_enabled: bool,
    pub scheduler_interval: Duration,
    pub bootstrap_owner: Option<BootstrapOwner>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_number(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("AMANAH_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid AMANAH_LISTEN_ADDR")?;
        let db_path = env_or("AMANAH_DB_PATH", "./db/app.db");
        let cors_allow = env_or("AMANAH_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms = env_number("AMANAH_REQUEST_TIMEOUT_MS", 30_000);
        let ttl_minutes = env_number("AMANAH_AUTH_TOKEN_TTL_MINUTES", 60);
        let scheduler_secs = env_number("AMANAH_SCHEDULER_INTERVAL_SECS", 3_600).max(1);
        let scheduler_enabled = !matches!(
            env_or("AMANAH_SCHEDULER_ENABLED", "true")
                .trim()
                .to_ascii_lowercase()
                .as_str(),
            "false" | "0" | "no" | "off"
        );

        let bootstrap_owner = match (
            non_empty("AMANAH_BOOTSTRAP_OWNER_EMAIL"),
            non_empty("AMANAH_BOOTSTRAP_OWNER_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapOwner {
                email,
                password,
                name: env_or("AMANAH_BOOTSTRAP_OWNER_NAME", "Owner"),
            }),
            _ => None,
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            jwt_secret: non_empty("AMANAH_JWT_SECRET"),
            token_ttl: Duration::from_secs(ttl_minutes * 60),
            scheduler_enabled,
            scheduler_interval: Duration::from_secs(scheduler_secs),
            bootstrap_owner,
        })
    }

    /// Defaults for a database at `db_path`, used by tools and tests.
    pub fn for_database(db_path: impl Into<String>) -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            db_path: db_path.into(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            jwt_secret: None,
            token_ttl: Duration::from_secs(60 * 60),
            scheduler_enabled: false,
            scheduler_interval: Duration::from_secs(3_600),
            bootstrap_owner: None,
        }
    }
}
