//! Song Library Server Library
//!
//! Song catalog with metadata enrichment, verse pagination and filtered
//! listing, exposed over HTTP.

pub mod config;
pub mod enrichment;
pub mod error;
pub mod pagination;
pub mod server;
pub mod song_store;
pub mod sqlite_persistence;
pub mod verses;

pub use enrichment::{EnrichmentResolver, HttpEnrichmentClient};
pub use error::{CatalogError, CatalogResult};
pub use server::{run_server, RequestsLoggingLevel};
pub use song_store::{SongStore, SqliteSongStore};
