use anyhow::{Context, Result};

use crate::store::schema::BootstrapAdmin;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub bootstrap_admin: BootstrapAdmin,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: env_or("DATABASE_URL", "sqlite://resume_data.db"),
            max_connections: env_or("DB_MAX_CONNECTIONS", "5")
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            bootstrap_admin: BootstrapAdmin {
                email: env_or("ADMIN_BOOTSTRAP_EMAIL", "admin@localhost"),
                password: require_env("ADMIN_BOOTSTRAP_PASSWORD")?,
            },
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
