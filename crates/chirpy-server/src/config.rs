use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Duration;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub polka_api_key: String,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
    pub addr: SocketAddr,
    pub access_token_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("JWT_SECRET is unset or still a placeholder; set it in .env");
        }

        let polka_api_key = lookup("POLKA_API_KEY").unwrap_or_default();
        if polka_api_key.is_empty() {
            bail!("POLKA_API_KEY is unset; set it in .env");
        }

        let host = get("CHIRPY_HOST", "0.0.0.0");
        let port: u16 = get("CHIRPY_PORT", "8080")
            .parse()
            .context("CHIRPY_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let ttl_secs: i64 = get("CHIRPY_ACCESS_TOKEN_TTL_SECS", "3600")
            .parse()
            .context("CHIRPY_ACCESS_TOKEN_TTL_SECS must be a number of seconds")?;
        if ttl_secs <= 0 {
            bail!("CHIRPY_ACCESS_TOKEN_TTL_SECS must be positive");
        }

        Ok(Self {
            jwt_secret,
            polka_api_key,
            db_path: get("CHIRPY_DB_PATH", "database.json").into(),
            static_dir: get("CHIRPY_STATIC_DIR", ".").into(),
            addr,
            access_token_ttl: Duration::seconds(ttl_secs),
        })
    }
}
