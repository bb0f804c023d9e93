//! Local enrichment file, consulted on every `/info` request.
//!
//! The file holds a single entry object or an array of them. It is optional:
//! a missing or broken file simply means there is nothing to override.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use super::models::{EnrichmentEntry, EnrichmentResult};

#[derive(Deserialize)]
#[serde(untagged)]
enum EnrichmentFile {
    Many(Vec<EnrichmentEntry>),
    One(EnrichmentEntry),
}

#[derive(Debug, Clone)]
pub struct EnrichmentOverrides {
    path: PathBuf,
}

impl EnrichmentOverrides {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole file.
    pub async fn load(&self) -> Result<Vec<EnrichmentEntry>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read enrichment file {:?}", self.path))?;
        let parsed: EnrichmentFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse enrichment file {:?}", self.path))?;
        Ok(match parsed {
            EnrichmentFile::Many(entries) => entries,
            EnrichmentFile::One(entry) => vec![entry],
        })
    }

    /// First entry matching `(group, song)` exactly, if any.
    pub async fn find(&self, group: &str, song: &str) -> Result<Option<EnrichmentEntry>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|entry| entry.matches(group, song)))
    }

    /// Like [`find`](Self::find), with file problems treated as no match.
    pub async fn lookup(&self, group: &str, song: &str) -> Option<EnrichmentResult> {
        match self.find(group, song).await {
            Ok(entry) => entry.map(|e| e.details),
            Err(e) => {
                debug!("No enrichment override: {:#}", e);
                None
            }
        }
    }
}
