//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own database, enrichment file
//! and stand-in upstream song info API.

use super::constants::*;
use super::fixtures::{override_entry, seed_songs, write_upstream_data};
use song_library_server::enrichment::{
    EnrichmentOverrides, EnrichmentResolver, HttpEnrichmentClient,
};
use song_library_server::server::mock_enrichment::make_mock_enrichment_app;
use song_library_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use song_library_server::song_store::{SongStore, SqliteSongStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Test server instance.
///
/// When dropped, both listeners shut down and the temp directory is removed.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Base URL of the stand-in upstream API, if one is running
    pub upstream_url: Option<String>,

    /// Direct store access for assertions
    pub song_store: Arc<dyn SongStore>,

    /// Where the server looks for its enrichment override file
    pub enrichment_file: PathBuf,

    _temp_dir: TempDir,
    _shutdown_txs: Vec<oneshot::Sender<()>>,
}

async fn bind_random_port() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let port = listener
        .local_addr()
        .expect("Failed to get local address")
        .port();
    (listener, format!("http://127.0.0.1:{}", port))
}

fn serve_in_background(listener: TcpListener, app: axum::Router) -> oneshot::Sender<()> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
    });
    shutdown_tx
}

impl TestServer {
    /// Spawns a server with seeded songs, talking to a stand-in upstream API.
    pub async fn spawn() -> Self {
        Self::spawn_with_upstream(true).await
    }

    /// Spawns a server whose upstream API URL points at a closed port.
    pub async fn spawn_with_unreachable_upstream() -> Self {
        Self::spawn_with_upstream(false).await
    }

    async fn spawn_with_upstream(upstream_running: bool) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut shutdown_txs = Vec::new();

        let song_store: Arc<dyn SongStore> = Arc::new(
            SqliteSongStore::new(temp_dir.path().join("songs.db"))
                .expect("Failed to open song store"),
        );
        seed_songs(song_store.as_ref());

        // Unreachable upstream: the port was just free, nothing listens on it.
        let (upstream_listener, api_url) = bind_random_port().await;
        let upstream_url = if upstream_running {
            let upstream_data = EnrichmentOverrides::new(write_upstream_data(temp_dir.path()));
            shutdown_txs.push(serve_in_background(
                upstream_listener,
                make_mock_enrichment_app(upstream_data),
            ));
            Some(api_url.clone())
        } else {
            drop(upstream_listener);
            None
        };

        let api = Arc::new(
            HttpEnrichmentClient::new(Some(api_url), REQUEST_TIMEOUT_SECS)
                .expect("Failed to build enrichment client"),
        );
        let enrichment_file = temp_dir.path().join("song_enrichment.json");
        let resolver = Arc::new(EnrichmentResolver::new(
            song_store.clone(),
            api,
            EnrichmentOverrides::new(enrichment_file.clone()),
        ));

        let (listener, base_url) = bind_random_port().await;
        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port: 0,
        };
        shutdown_txs.push(serve_in_background(
            listener,
            make_app(config, song_store.clone(), resolver),
        ));

        let server = Self {
            base_url,
            upstream_url,
            song_store,
            enrichment_file,
            _temp_dir: temp_dir,
            _shutdown_txs: shutdown_txs,
        };

        server.wait_for_ready().await;

        server
    }

    /// Makes the enrichment file override `(group, song)`.
    pub fn write_override(&self, group: &str, song: &str) {
        std::fs::write(&self.enrichment_file, override_entry(group, song))
            .expect("Failed to write enrichment file");
    }

    pub fn write_enrichment_file(&self, content: &str) {
        std::fs::write(&self.enrichment_file, content).expect("Failed to write enrichment file");
    }

    pub fn remove_enrichment_file(&self) {
        std::fs::remove_file(&self.enrichment_file).expect("Failed to remove enrichment file");
    }

    /// Waits for the server to become ready by polling `/`
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        for tx in self._shutdown_txs.drain(..) {
            let _ = tx.send(());
        }
    }
}
