use anyhow::{Context, Result};
use std::time::Duration;

use tracing::info;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{log_requests, state::*, ServerConfig};
use crate::enrichment::EnrichmentResult;
use crate::error::{CatalogError, CatalogResult};
use crate::pagination::{Pagination, DEFAULT_SONGS_LIMIT, DEFAULT_VERSES_LIMIT};
use crate::song_store::{NewSong, SongFilter, SongPatch, SongRecord, SongUpdate, WriteOutcome};
use crate::verses::{self, VersePage};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub songs_count: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct InfoParams {
    pub group: Option<String>,
    pub song: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ListSongsParams {
    pub group: Option<String>,
    pub song: Option<String>,
    pub release_date: Option<String>,
    pub text: Option<String>,
    pub link: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CreateSongBody {
    pub group: Option<String>,
    pub song: Option<String>,
}

#[derive(Serialize, Debug)]
struct VersesResponse {
    pub song_id: i64,
    #[serde(flatten)]
    pub page: VersePage,
}

fn parse_song_id(raw: &str) -> CatalogResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| CatalogError::InvalidRequest(format!("invalid song id '{}'", raw)))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> CatalogResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| CatalogError::InvalidRequest(rejection.body_text()))
}

fn written_song(outcome: WriteOutcome) -> CatalogResult<Json<SongRecord>> {
    match outcome {
        WriteOutcome::Written(record) => Ok(Json(record)),
        WriteOutcome::NotFound => Err(CatalogError::NotFound("song not found".to_string())),
        WriteOutcome::Conflict => Err(CatalogError::InvalidRequest(
            "another song already has this group and title".to_string(),
        )),
    }
}

async fn home(State(state): State<ServerState>) -> CatalogResult<Json<ServerStats>> {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        songs_count: state.song_store.count_songs()?,
    };
    Ok(Json(stats))
}

async fn get_info(
    State(resolver): State<GuardedResolver>,
    Query(params): Query<InfoParams>,
) -> CatalogResult<Json<EnrichmentResult>> {
    let (Some(group), Some(song)) = (params.group, params.song) else {
        return Err(CatalogError::InvalidRequest(
            "group and song are required".to_string(),
        ));
    };
    Ok(Json(resolver.resolve(&group, &song).await?))
}

async fn list_songs(
    State(song_store): State<GuardedSongStore>,
    Query(params): Query<ListSongsParams>,
) -> CatalogResult<Json<Vec<SongRecord>>> {
    let pagination = Pagination::lenient(
        params.page.as_deref(),
        params.limit.as_deref(),
        DEFAULT_SONGS_LIMIT,
    );
    let filter = SongFilter {
        group: params.group,
        song: params.song,
        release_date: params.release_date,
        text: params.text,
        link: params.link,
    };
    Ok(Json(song_store.filter_songs(&filter, pagination)?))
}

async fn create_song(
    State(song_store): State<GuardedSongStore>,
    body: Result<Json<CreateSongBody>, JsonRejection>,
) -> CatalogResult<Response> {
    let body = json_body(body)?;
    let (group, song) = match (body.group, body.song) {
        (Some(group), Some(song)) if !group.is_empty() && !song.is_empty() => (group, song),
        _ => {
            return Err(CatalogError::InvalidRequest(
                "group and song are required".to_string(),
            ))
        }
    };

    let (record, created) = song_store.insert_song(&NewSong {
        group,
        song,
        ..Default::default()
    })?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(record)).into_response())
}

async fn get_verses(
    State(song_store): State<GuardedSongStore>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> CatalogResult<Json<VersesResponse>> {
    let id = parse_song_id(&id)?;
    let record = song_store
        .get_song(id)?
        .ok_or_else(|| CatalogError::NotFound("not found".to_string()))?;
    let pagination = Pagination::lenient(
        params.page.as_deref(),
        params.limit.as_deref(),
        DEFAULT_VERSES_LIMIT,
    );
    let page = verses::paginate(&record.text, pagination)?;
    Ok(Json(VersesResponse { song_id: id, page }))
}

async fn update_song(
    State(song_store): State<GuardedSongStore>,
    Path(id): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> CatalogResult<Json<SongRecord>> {
    let id = parse_song_id(&id)?;
    let update = SongUpdate::from_json(json_body(body)?)?;
    written_song(song_store.update_song(id, &update)?)
}

async fn patch_song(
    State(song_store): State<GuardedSongStore>,
    Path(id): Path<String>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> CatalogResult<Json<SongRecord>> {
    let id = parse_song_id(&id)?;
    let patch = SongPatch::from_json(json_body(body)?)?;
    written_song(song_store.patch_song(id, &patch)?)
}

async fn delete_song(
    State(song_store): State<GuardedSongStore>,
    Path(id): Path<String>,
) -> CatalogResult<Json<Value>> {
    let id = parse_song_id(&id)?;
    if !song_store.delete_song(id)? {
        return Err(CatalogError::NotFound("song not found".to_string()));
    }
    let mut body = Map::new();
    body.insert(format!("id #{}", id), Value::from("deleted"));
    Ok(Json(Value::Object(body)))
}

pub fn make_app(
    config: ServerConfig,
    song_store: GuardedSongStore,
    resolver: GuardedResolver,
) -> Router {
    let state = ServerState::new(config, song_store, resolver);

    Router::new()
        .route("/", get(home))
        .route("/info", get(get_info))
        .route("/songs", get(list_songs).post(create_song))
        .route(
            "/song/{id}",
            put(update_song).patch(patch_song).delete(delete_song),
        )
        .route("/song/{id}/verses", get(get_verses))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

pub async fn run_server(
    config: ServerConfig,
    song_store: GuardedSongStore,
    resolver: GuardedResolver,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, song_store, resolver);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind to port {}", port))?;
    info!("Listening on port {}", port);

    Ok(axum::serve(listener, app).await?)
}
