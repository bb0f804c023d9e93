use serde::{Deserialize, Serialize};

use crate::song_store::{SongRecord, RELEASE_DATE_FORMAT};

/// Song metadata as returned by `/info` and by the external API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub release_date: String,
    pub text: String,
    pub link: String,
}

impl From<&SongRecord> for EnrichmentResult {
    fn from(record: &SongRecord) -> Self {
        Self {
            release_date: record
                .release_date
                .map(|d| d.format(RELEASE_DATE_FORMAT).to_string())
                .unwrap_or_default(),
            text: record.text.clone(),
            link: record.link.clone(),
        }
    }
}

/// One entry of the enrichment file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentEntry {
    pub group: String,
    pub song: String,
    #[serde(flatten)]
    pub details: EnrichmentResult,
}

impl EnrichmentEntry {
    pub fn matches(&self, group: &str, song: &str) -> bool {
        self.group == group && self.song == song
    }
}
