mod api_client;
mod models;
mod override_file;
mod resolver;

pub use api_client::{EnrichmentApi, HttpEnrichmentClient};
pub use models::{EnrichmentEntry, EnrichmentResult};
pub use override_file::EnrichmentOverrides;
pub use resolver::EnrichmentResolver;
