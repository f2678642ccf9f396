use anyhow::{Context, Result};
use importer::CompetitionCode;
use importer::sources::football_data::DEFAULT_BASE_URL;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_keys: String,
    pub football_data_token: Option<String>,
    pub football_data_base_url: String,
    pub competition: CompetitionCode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("PORT must be a number")?
                .parse()?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            football_data_token: std::env::var("FOOTBALL_DATA_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            football_data_base_url: std::env::var("FOOTBALL_DATA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            competition: std::env::var("COMPETITION")
                .unwrap_or_else(|_| "PL".to_string())
                .parse()
                .context("COMPETITION must be a supported competition code")?,
        })
    }
}
