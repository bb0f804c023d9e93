//! Resolves song metadata: stored record first, external API otherwise,
//! with the local enrichment file patching the response.

use std::sync::Arc;

use tracing::{debug, info};

use super::api_client::EnrichmentApi;
use super::models::EnrichmentResult;
use super::override_file::EnrichmentOverrides;
use crate::error::{CatalogError, CatalogResult};
use crate::song_store::{parse_release_date, NewSong, SongRecord, SongStore};

#[derive(Clone)]
pub struct EnrichmentResolver {
    store: Arc<dyn SongStore>,
    api: Arc<dyn EnrichmentApi>,
    overrides: EnrichmentOverrides,
}

impl EnrichmentResolver {
    pub fn new(
        store: Arc<dyn SongStore>,
        api: Arc<dyn EnrichmentApi>,
        overrides: EnrichmentOverrides,
    ) -> Self {
        Self {
            store,
            api,
            overrides,
        }
    }

    /// Returns metadata for `(group, song)`, fetching and storing it first if
    /// the pair is unknown.
    ///
    /// A matching enrichment file entry replaces the returned fields but is
    /// never written to the store, so the response can differ from the
    /// stored record.
    pub async fn resolve(&self, group: &str, song: &str) -> CatalogResult<EnrichmentResult> {
        if group.is_empty() || song.is_empty() {
            return Err(CatalogError::InvalidRequest(
                "group and song are required".to_string(),
            ));
        }

        let record = match self.store.find_song(group, song)? {
            Some(record) => {
                debug!("Song {} - {} found as {}", group, song, record.id);
                record
            }
            None => self.fetch_and_store(group, song).await?,
        };

        let mut result = EnrichmentResult::from(&record);
        if let Some(override_result) = self.overrides.lookup(group, song).await {
            debug!("Applying enrichment file override for {} - {}", group, song);
            result = override_result;
        }
        Ok(result)
    }

    async fn fetch_and_store(&self, group: &str, song: &str) -> CatalogResult<SongRecord> {
        let fetched = self.api.fetch(group, song).await?;
        let release_date = parse_release_date(&fetched.release_date)?;

        let (record, created) = self.store.insert_song(&NewSong {
            group: group.to_string(),
            song: song.to_string(),
            release_date: Some(release_date),
            text: fetched.text,
            link: fetched.link,
        })?;
        if created {
            info!("Enriched and stored {} - {} as {}", group, song, record.id);
        }
        Ok(record)
    }
}
