use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// TOML config file. Every present value overrides the matching CLI flag.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub external_api_url: Option<String>,
    pub external_api_timeout_sec: Option<u64>,
    pub enrichment_file: Option<String>,
    pub mock_api_port: Option<u16>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
