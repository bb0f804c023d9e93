use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::path::PathBuf;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use song_library_server::config::{AppConfig, CliConfig, FileConfig};
use song_library_server::enrichment::{
    EnrichmentOverrides, EnrichmentResolver, HttpEnrichmentClient,
};
use song_library_server::server::mock_enrichment::run_mock_enrichment_server;
use song_library_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use song_library_server::song_store::{SongStore, SqliteSongStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the songs database.
    #[clap(long, env = "DB_DIR", value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, env = "SERVER_PORT", default_value_t = 5050)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the external song info service.
    #[clap(long, env = "EXTERNAL_API_URL")]
    pub external_api_url: Option<String>,

    /// Timeout in seconds for external song info requests.
    #[clap(long, default_value_t = 10)]
    pub external_api_timeout_sec: u64,

    /// JSON file whose entries override the metadata returned by /info.
    #[clap(long, env = "ENRICHMENT_FILE", default_value = "song_enrichment.json")]
    pub enrichment_file: PathBuf,

    /// Also serve a stand-in song info API on this port, backed by the enrichment file.
    #[clap(long, env = "MOCK_API_PORT")]
    pub mock_api_port: Option<u16>,

    /// Optional TOML config file. Its values override the flags above.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            external_api_url: self.external_api_url.clone(),
            external_api_timeout_sec: self.external_api_timeout_sec,
            enrichment_file: self.enrichment_file.clone(),
            mock_api_port: self.mock_api_port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let songs_db_path = config.songs_db_path();
    info!("Opening songs database at {:?}...", songs_db_path);
    let song_store: Arc<dyn SongStore> = Arc::new(SqliteSongStore::new(&songs_db_path)?);

    match &config.external_api_url {
        Some(url) => info!("Song info API at {}", url),
        None => info!("No song info API configured, only stored songs can be resolved"),
    }
    let api = Arc::new(HttpEnrichmentClient::new(
        config.external_api_url.clone(),
        config.external_api_timeout_sec,
    )?);
    let overrides = EnrichmentOverrides::new(config.enrichment_file.clone());
    let resolver = Arc::new(EnrichmentResolver::new(
        song_store.clone(),
        api,
        overrides.clone(),
    ));

    if let Some(mock_port) = config.mock_api_port {
        tokio::spawn(async move {
            if let Err(e) = run_mock_enrichment_server(overrides, mock_port).await {
                error!("Mock enrichment API stopped: {:#}", e);
            }
        });
    }

    info!("Starting server on port {}...", config.port);
    run_server(
        ServerConfig {
            requests_logging_level: config.logging_level,
            port: config.port,
        },
        song_store,
        resolver,
    )
    .await
}
