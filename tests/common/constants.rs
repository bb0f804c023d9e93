//! Shared constants for end-to-end tests
//!
//! When seeded songs or upstream data change, update only this file.

// ============================================================================
// Timeouts
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Songs stored before each test
// ============================================================================

pub const SEEDED_GROUP: &str = "Muse";
pub const SEEDED_SONG: &str = "Supermassive Black Hole";
pub const SEEDED_RELEASE_DATE: &str = "2006-07-16";
pub const SEEDED_TEXT: &str = "Ooh baby, don't you know I suffer?\nOoh baby, can you hear me moan?\n\nYou caught me under false pretenses\nHow long before you let me go?\n\nOoh\nYou set my soul alight";
pub const SEEDED_LINK: &str = "https://www.youtube.com/watch?v=Xsp3_a-PMTw";
pub const SEEDED_VERSES_COUNT: usize = 3;

pub const QUEEN_GROUP: &str = "Queen";
pub const QUEEN_SONG: &str = "Bohemian Rhapsody";
pub const QUEEN_RELEASE_DATE: &str = "1975-10-31";

pub const QOTSA_GROUP: &str = "Queens of the Stone Age";
pub const QOTSA_SONG: &str = "No One Knows";
pub const QOTSA_RELEASE_DATE: &str = "2002-11-26";

pub const SEEDED_SONGS_COUNT: usize = 3;

// ============================================================================
// Songs known only to the upstream song info API
// ============================================================================

pub const UPSTREAM_GROUP: &str = "Queen";
pub const UPSTREAM_SONG: &str = "Innuendo";
pub const UPSTREAM_RELEASE_DATE: &str = "1991-02-04";
pub const UPSTREAM_TEXT: &str = "While the sun hangs in the sky\n\nWe'll keep on trying";
pub const UPSTREAM_LINK: &str = "https://www.youtube.com/watch?v=Rg4KYsXEXNA";

/// Needs percent-encoding on the way upstream.
pub const UPSTREAM_ESCAPED_GROUP: &str = "Guns N' Roses";
pub const UPSTREAM_ESCAPED_SONG: &str = "Sweet Child O' Mine & More?";
pub const UPSTREAM_ESCAPED_RELEASE_DATE: &str = "1987-08-17";

/// Upstream answers with a date that is not `YYYY-MM-DD`.
pub const UPSTREAM_BAD_DATE_GROUP: &str = "Broken Band";
pub const UPSTREAM_BAD_DATE_SONG: &str = "Bad Date";

/// Unknown to both the store and upstream.
pub const UNKNOWN_GROUP: &str = "Nobody";
pub const UNKNOWN_SONG: &str = "Nothing";

// ============================================================================
// Enrichment file override
// ============================================================================

pub const OVERRIDE_RELEASE_DATE: &str = "1999-09-09";
pub const OVERRIDE_TEXT: &str = "Overridden lyrics";
pub const OVERRIDE_LINK: &str = "https://example.com/override";
