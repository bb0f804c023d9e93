//! SongStore trait definition.

use super::models::{NewSong, SongFilter, SongPatch, SongRecord, SongUpdate, WriteOutcome};
use crate::pagination::Pagination;
use anyhow::Result;

/// Trait for song storage backends.
pub trait SongStore: Send + Sync {
    /// Get a song by its store-assigned ID.
    fn get_song(&self, id: i64) -> Result<Option<SongRecord>>;

    /// Get a song by exact (group, title) match.
    fn find_song(&self, group: &str, song: &str) -> Result<Option<SongRecord>>;

    /// Insert a song unless its (group, title) pair is already stored.
    ///
    /// Returns the stored record and whether this call created it. Concurrent
    /// inserts of the same pair all observe the single surviving row.
    fn insert_song(&self, song: &NewSong) -> Result<(SongRecord, bool)>;

    /// Apply field assignments to an existing song.
    fn patch_song(&self, id: i64, patch: &SongPatch) -> Result<WriteOutcome>;

    /// Replace every mutable field of an existing song.
    fn update_song(&self, id: i64, update: &SongUpdate) -> Result<WriteOutcome> {
        self.patch_song(id, &update.clone().into_patch())
    }

    /// Hard-delete a song. Returns false if there was nothing to delete.
    fn delete_song(&self, id: i64) -> Result<bool>;

    /// List songs matching every non-empty predicate, ordered by ID.
    ///
    /// Text predicates are case-insensitive substring matches; `release_date`
    /// is an exact match. A page past the end yields an empty vector.
    fn filter_songs(&self, filter: &SongFilter, pagination: Pagination)
        -> Result<Vec<SongRecord>>;

    /// Number of stored songs.
    fn count_songs(&self) -> Result<usize>;
}
