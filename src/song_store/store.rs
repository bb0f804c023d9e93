//! SQLite-backed song store implementation.

use super::models::{
    NewSong, SongField, SongFilter, SongPatch, SongRecord, WriteOutcome, RELEASE_DATE_FORMAT,
};
use super::schema::SONGS_VERSIONED_SCHEMAS;
use super::trait_def::SongStore;
use crate::pagination::Pagination;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const SONG_SELECT: &str = "SELECT s.id, g.name, s.title, s.release_date, s.lyrics, s.link,
        s.created_at, s.updated_at
     FROM songs s JOIN groups g ON g.id = s.group_id";

/// SQLite-backed song store.
#[derive(Clone)]
pub struct SqliteSongStore {
    read_conn: Arc<Mutex<Connection>>,
    write_conn: Arc<Mutex<Connection>>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    let latest_version = SONGS_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &SONGS_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if table_count == 0 {
        info!("Creating songs db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let mut current_version = if db_version < BASE_DB_VERSION as i64 {
        0
    } else {
        (db_version - BASE_DB_VERSION as i64) as usize
    };

    if current_version < latest_version {
        let tx = conn.transaction()?;
        for schema in SONGS_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating songs db from version {} to {}",
                    current_version, schema.version
                );
                migration_fn(&tx)?;
                current_version = schema.version;
            }
        }
        tx.pragma_update(None, "user_version", (BASE_DB_VERSION + current_version) as i64)?;
        tx.commit()?;
    }

    latest_schema
        .validate(conn)
        .context("Songs database does not match the expected schema")
}

fn parse_stored_date(raw: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, RELEASE_DATE_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })
    })
    .transpose()
}

fn format_date(date: &Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(RELEASE_DATE_FORMAT).to_string())
}

fn map_song(row: &Row) -> rusqlite::Result<SongRecord> {
    Ok(SongRecord {
        id: row.get(0)?,
        group: row.get(1)?,
        song: row.get(2)?,
        release_date: parse_stored_date(row.get(3)?)?,
        text: row.get(4)?,
        link: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Registers `ulower`, a Unicode-aware `lower()`. The builtin one and `LIKE`
/// only fold ASCII letters.
fn register_unicode_lower(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "ulower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
    )
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
}

fn find_or_create_group(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO groups (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
        params![name],
    )?;
    conn.query_row(
        "SELECT id FROM groups WHERE name = ?1",
        params![name],
        |r| r.get(0),
    )
}

fn select_song_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<SongRecord>> {
    conn.prepare_cached(&format!("{SONG_SELECT} WHERE s.id = ?1"))?
        .query_row(params![id], map_song)
        .optional()
}

fn select_song_by_pair(
    conn: &Connection,
    group: &str,
    song: &str,
) -> rusqlite::Result<Option<SongRecord>> {
    conn.prepare_cached(&format!("{SONG_SELECT} WHERE g.name = ?1 AND s.title = ?2"))?
        .query_row(params![group, song], map_song)
        .optional()
}

impl SqliteSongStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open songs database")?;

        migrate_if_needed(&mut write_conn)?;

        write_conn
            .pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on songs write connection")?;
        write_conn
            .pragma_update(None, "foreign_keys", "ON")
            .context("Failed to enable foreign keys")?;

        let read_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open songs database for reading")?;
        register_unicode_lower(&read_conn)
            .context("Failed to register ulower on songs read connection")?;

        let songs: i64 = read_conn.query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))?;
        let groups: i64 = read_conn.query_row("SELECT COUNT(*) FROM groups", [], |r| r.get(0))?;
        info!(
            "Song store ready at {:?}: {} songs by {} groups",
            db_path_ref, songs, groups
        );

        Ok(Self {
            read_conn: Arc::new(Mutex::new(read_conn)),
            write_conn: Arc::new(Mutex::new(write_conn)),
        })
    }
}

impl SongStore for SqliteSongStore {
    fn get_song(&self, id: i64) -> Result<Option<SongRecord>> {
        let conn = self.read_conn.lock().unwrap();
        Ok(select_song_by_id(&conn, id)?)
    }

    fn find_song(&self, group: &str, song: &str) -> Result<Option<SongRecord>> {
        let conn = self.read_conn.lock().unwrap();
        Ok(select_song_by_pair(&conn, group, song)?)
    }

    fn insert_song(&self, song: &NewSong) -> Result<(SongRecord, bool)> {
        let conn = self.write_conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;

        let group_id = find_or_create_group(&tx, &song.group)
            .with_context(|| format!("Failed to resolve group {:?}", song.group))?;
        let inserted = tx.execute(
            "INSERT INTO songs (group_id, title, release_date, lyrics, link)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(group_id, title) DO NOTHING",
            params![
                group_id,
                song.song,
                format_date(&song.release_date),
                song.text,
                song.link,
            ],
        )?;
        let record = select_song_by_pair(&tx, &song.group, &song.song)?
            .context("Song missing right after insert")?;
        tx.commit()?;

        if inserted == 1 {
            info!("Created song {} ({} - {})", record.id, record.group, record.song);
        } else {
            debug!(
                "Song {} - {} already stored as {}",
                record.group, record.song, record.id
            );
        }
        Ok((record, inserted == 1))
    }

    fn patch_song(&self, id: i64, patch: &SongPatch) -> Result<WriteOutcome> {
        let conn = self.write_conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;

        if select_song_by_id(&tx, id)?.is_none() {
            return Ok(WriteOutcome::NotFound);
        }

        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();
        let mut assignments: Vec<String> = Vec::new();
        for field in &patch.0 {
            let column = match field {
                SongField::Group(name) => {
                    param_values.push(Box::new(find_or_create_group(&tx, name)?));
                    "group_id"
                }
                SongField::Song(title) => {
                    param_values.push(Box::new(title.clone()));
                    "title"
                }
                SongField::ReleaseDate(date) => {
                    param_values.push(Box::new(format_date(date)));
                    "release_date"
                }
                SongField::Text(text) => {
                    param_values.push(Box::new(text.clone()));
                    "lyrics"
                }
                SongField::Link(link) => {
                    param_values.push(Box::new(link.clone()));
                    "link"
                }
            };
            assignments.push(format!("{} = ?{}", column, param_values.len()));
        }

        if !assignments.is_empty() {
            param_values.push(Box::new(id));
            let sql = format!(
                "UPDATE songs SET {}, updated_at = cast(strftime('%s','now') as int) WHERE id = ?{}",
                assignments.join(", "),
                param_values.len()
            );
            match tx.execute(&sql, params_from_iter(param_values)) {
                Ok(_) => {}
                Err(e) if is_constraint_violation(&e) => return Ok(WriteOutcome::Conflict),
                Err(e) => return Err(e).with_context(|| format!("Failed to update song {}", id)),
            }
        }

        let record = select_song_by_id(&tx, id)?.context("Song vanished during update")?;
        tx.commit()?;
        info!("Updated song {} ({} fields)", id, patch.0.len());
        Ok(WriteOutcome::Written(record))
    }

    fn delete_song(&self, id: i64) -> Result<bool> {
        let conn = self.write_conn.lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM songs WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete song {}", id))?;
        if deleted > 0 {
            info!("Deleted song {}", id);
        }
        Ok(deleted > 0)
    }

    fn filter_songs(
        &self,
        filter: &SongFilter,
        pagination: Pagination,
    ) -> Result<Vec<SongRecord>> {
        let limit = i64::try_from(pagination.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(pagination.offset()).unwrap_or(i64::MAX);

        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();
        param_values.push(Box::new(limit)); // ?1
        param_values.push(Box::new(offset)); // ?2

        let mut conditions = String::new();
        let substring_predicates = [
            ("g.name", &filter.group),
            ("s.title", &filter.song),
            ("s.lyrics", &filter.text),
            ("s.link", &filter.link),
        ];
        for (column, value) in substring_predicates {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                param_values.push(Box::new(format!("%{}%", escape_like(&v.to_lowercase()))));
                conditions.push_str(&format!(
                    " AND ulower({}) LIKE ?{} ESCAPE '\\'",
                    column,
                    param_values.len()
                ));
            }
        }
        if let Some(date) = filter.release_date.as_deref().filter(|v| !v.is_empty()) {
            param_values.push(Box::new(date.to_string()));
            conditions.push_str(&format!(" AND s.release_date = ?{}", param_values.len()));
        }

        let sql = format!("{SONG_SELECT} WHERE 1 = 1{conditions} ORDER BY s.id LIMIT ?1 OFFSET ?2");
        let conn = self.read_conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let songs = stmt
            .query_map(params_from_iter(param_values), map_song)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list songs")?;
        Ok(songs)
    }

    fn count_songs(&self) -> Result<usize> {
        let conn = self.read_conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}
