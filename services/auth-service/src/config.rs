use af_crypto::Eip712Domain;
use anyhow::{Context, bail};
use std::env;
use std::time::Duration;

/// Deployment configuration, read from the environment. `REDIS_URL` and
/// `DATABASE_URL` are optional: without them the service runs on in-memory
/// backends, which is enough for local development but loses all state on
/// restart.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) port: u16,
    pub(crate) redis_url: Option<String>,
    pub(crate) database_url: Option<String>,
    pub(crate) jwt_secret: String,
    pub(crate) session_lifetime: Duration,
    pub(crate) nonce_ttl: Duration,
    pub(crate) rate_limit_window: Duration,
    pub(crate) rate_limit_max_attempts: i64,
    pub(crate) eip712_domain: Eip712Domain,
    pub(crate) seed_admin_wallet: Option<String>,
    pub(crate) seed_admin_role: String,
    pub(crate) migrations_dir: String,
}

fn env_or(key: &str, fallback: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        let port: u16 = env_or("APP_PORT", "8080")
            .parse()
            .context("env: APP_PORT must be an integer")?;

        let jwt_secret = env_opt("JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() {
            bail!("env: JWT_SECRET must be set");
        }

        let session_hours: u64 = env_or("JWT_EXPIRATION_HOURS", "24")
            .parse()
            .context("env: JWT_EXPIRATION_HOURS must be an integer")?;
        let nonce_ttl_minutes: u64 = env_or("NONCE_TTL_MINUTES", "5")
            .parse()
            .context("env: NONCE_TTL_MINUTES must be an integer")?;
        let window_minutes: u64 = env_or("RATE_LIMIT_WINDOW_MINUTES", "15")
            .parse()
            .context("env: RATE_LIMIT_WINDOW_MINUTES must be an integer")?;
        let max_attempts: i64 = env_or("RATE_LIMIT_MAX_ATTEMPTS", "5")
            .parse()
            .context("env: RATE_LIMIT_MAX_ATTEMPTS must be an integer")?;
        let chain_id: u64 = env_or("EIP712_CHAIN_ID", "5000")
            .parse()
            .context("env: EIP712_CHAIN_ID must be an integer")?;

        Ok(Self {
            port,
            redis_url: env_opt("REDIS_URL"),
            database_url: env_opt("DATABASE_URL"),
            jwt_secret,
            session_lifetime: Duration::from_secs(session_hours * 3600),
            nonce_ttl: Duration::from_secs(nonce_ttl_minutes * 60),
            rate_limit_window: Duration::from_secs(window_minutes * 60),
            rate_limit_max_attempts: max_attempts,
            eip712_domain: Eip712Domain {
                name: env_or("EIP712_NAME", "AgriFund"),
                version: env_or("EIP712_VERSION", "1"),
                chain_id,
            },
            seed_admin_wallet: env_opt("SEED_ADMIN_WALLET"),
            seed_admin_role: env_or("SEED_ADMIN_ROLE", "super_admin"),
            migrations_dir: env_or("MIGRATIONS_DIR", "migrations/postgres"),
        })
    }
}
