mod models;
mod schema;
mod store;
mod trait_def;

pub use models::*;
pub use schema::SONGS_VERSIONED_SCHEMAS;
pub use store::SqliteSongStore;
pub use trait_def::SongStore;
