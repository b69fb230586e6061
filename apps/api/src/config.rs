use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub admin_password: String,
    pub port: u16,
    pub rust_log: String,
    pub dataset_path: PathBuf,
    pub translation_enabled: bool,
    pub translate_base_url: String,
    pub translate_timeout: Duration,
    /// Full VADER lexicon file. The embedded lexicon is used when unset.
    pub vader_lexicon_path: Option<PathBuf>,
    pub seed_on_startup: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            admin_password: require_env("ADMIN_PASSWORD")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            dataset_path: std::env::var("DATASET_PATH")
                .unwrap_or_else(|_| "data/comments.csv".to_string())
                .into(),
            translation_enabled: bool_env("TRANSLATION_ENABLED", true)?,
            translate_base_url: std::env::var("TRANSLATE_BASE_URL")
                .unwrap_or_else(|_| "https://translate.googleapis.com".to_string()),
            translate_timeout: Duration::from_secs(
                std::env::var("TRANSLATE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse::<u64>()
                    .context("TRANSLATE_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            vader_lexicon_path: std::env::var("VADER_LEXICON_PATH").ok().map(PathBuf::from),
            seed_on_startup: bool_env("SEED_ON_STARTUP", true)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn bool_env(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(raw) => parse_bool(&raw).with_context(|| format!("{key} must be true or false, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("not a boolean"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool(" on ").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(!parse_bool("no").unwrap());
    }

    #[test]
    fn test_parse_bool_rejects_garbage() {
        assert!(parse_bool("maybe").is_err());
    }
}
