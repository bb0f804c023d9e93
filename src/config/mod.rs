mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be overridden by the TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub external_api_url: Option<String>,
    pub external_api_timeout_sec: u64,
    pub enrichment_file: PathBuf,
    pub mock_api_port: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    /// Base URL of the song info service. `None` leaves unknown songs unresolvable.
    pub external_api_url: Option<String>,
    pub external_api_timeout_sec: u64,
    pub enrichment_file: PathBuf,
    pub mock_api_port: Option<u16>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let external_api_url = file
            .external_api_url
            .or_else(|| cli.external_api_url.clone())
            .filter(|url| !url.trim().is_empty());
        let external_api_timeout_sec = file
            .external_api_timeout_sec
            .unwrap_or(cli.external_api_timeout_sec);
        if external_api_timeout_sec == 0 {
            bail!("external_api_timeout_sec must be greater than zero");
        }

        let enrichment_file = file
            .enrichment_file
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.enrichment_file.clone());
        let mock_api_port = file.mock_api_port.or(cli.mock_api_port);

        Ok(Self {
            db_dir,
            port,
            logging_level,
            external_api_url,
            external_api_timeout_sec,
            enrichment_file,
            mock_api_port,
        })
    }

    pub fn songs_db_path(&self) -> PathBuf {
        self.db_dir.join("songs.db")
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
