use anyhow::{Context, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;

use crate::domains::providers::DirectorySettings;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub directory: DirectorySettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = DirectorySettings::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            directory: DirectorySettings {
                include_not_onboarded: match env::var("DIRECTORY_INCLUDE_UNONBOARDED") {
                    Ok(value) => parse_flag(&value)
                        .context("DIRECTORY_INCLUDE_UNONBOARDED must be true or false")?,
                    Err(_) => defaults.include_not_onboarded,
                },
                default_hourly_rate: match env::var("DIRECTORY_DEFAULT_HOURLY_RATE") {
                    Ok(value) => value
                        .trim()
                        .parse::<Decimal>()
                        .context("DIRECTORY_DEFAULT_HOURLY_RATE must be a decimal")?,
                    Err(_) => defaults.default_hourly_rate,
                },
            },
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("not a boolean: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_spellings() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(!parse_flag(" off ").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}
