//! Stand-in for the external song info service, answering `/info` from the
//! local enrichment file. Handy for development setups with no real upstream.

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::enrichment::EnrichmentOverrides;

#[derive(Deserialize, Debug)]
struct InfoParams {
    group: Option<String>,
    song: Option<String>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn mock_info(
    State(overrides): State<EnrichmentOverrides>,
    Query(params): Query<InfoParams>,
) -> Response {
    let (group, song) = match (params.group, params.song) {
        (Some(group), Some(song)) if !group.is_empty() && !song.is_empty() => (group, song),
        _ => return error_response(StatusCode::BAD_REQUEST, "missing parameters"),
    };

    match overrides.find(&group, &song).await {
        Ok(Some(entry)) => Json(entry.details).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "song not found"),
        Err(e) => {
            debug!("Mock enrichment API cannot read its data: {:#}", e);
            error_response(StatusCode::NOT_FOUND, "song not found")
        }
    }
}

pub fn make_mock_enrichment_app(overrides: EnrichmentOverrides) -> Router {
    Router::new()
        .route("/info", get(mock_info))
        .with_state(overrides)
}

pub async fn run_mock_enrichment_server(overrides: EnrichmentOverrides, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind mock enrichment API to port {}", port))?;
    info!(
        "Mock enrichment API serving {:?} on port {}",
        overrides.path(),
        port
    );
    Ok(axum::serve(listener, make_mock_enrichment_app(overrides)).await?)
}
