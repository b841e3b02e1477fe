use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub seed_lockers: u32,
    pub secure_cookies: bool,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Locker rental booking service")]
pub struct Args {
    /// Host to bind to (overrides LOCKER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides LOCKER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides LOCKER_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Number of lockers to create when the store is empty (overrides LOCKER_SEED_LOCKERS)
    #[arg(long)]
    pub seed_lockers: Option<u32>,

    /// Mark session cookies `Secure` (overrides LOCKER_COOKIE_SECURE)
    #[arg(long)]
    pub secure_cookies: Option<bool>,

    /// Create the schema, seed lockers and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("LOCKER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = env_parse("LOCKER_PORT", 3000u16)?;
        let env_db = env::var("LOCKER_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/lockers.db".into());
        let env_seed = env_parse("LOCKER_SEED_LOCKERS", 5u32)?;
        let env_secure = env_bool("LOCKER_COOKIE_SECURE").unwrap_or(false);

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            seed_lockers: args.seed_lockers.unwrap_or(env_seed),
            secure_cookies: args.secure_cookies.unwrap_or(env_secure),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}

fn env_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|v| {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    })
}
