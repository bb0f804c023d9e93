//! Song catalog data models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CatalogError, CatalogResult};

pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A stored song. `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    pub id: i64,
    pub group: String,
    pub song: String,
    pub release_date: Option<NaiveDate>,
    pub text: String,
    pub link: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewSong {
    pub group: String,
    pub song: String,
    pub release_date: Option<NaiveDate>,
    pub text: String,
    pub link: String,
}

/// Full replacement of a song's mutable fields (`PUT`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongUpdate {
    pub group: String,
    pub song: String,
    pub release_date: Option<NaiveDate>,
    pub text: String,
    pub link: String,
}

impl SongUpdate {
    /// `PUT` replaces the whole record: `group` and `song` are required, and
    /// absent `text`, `link` or `release_date` are cleared, not kept.
    pub fn from_json(map: Map<String, Value>) -> CatalogResult<Self> {
        let mut group = None;
        let mut song = None;
        let mut update = SongUpdate {
            group: String::new(),
            song: String::new(),
            release_date: None,
            text: String::new(),
            link: String::new(),
        };
        for field in SongPatch::from_json(map)?.0 {
            match field {
                SongField::Group(v) => group = Some(v),
                SongField::Song(v) => song = Some(v),
                SongField::ReleaseDate(v) => update.release_date = v,
                SongField::Text(v) => update.text = v,
                SongField::Link(v) => update.link = v,
            }
        }
        match (group, song) {
            (Some(group), Some(song)) => {
                update.group = group;
                update.song = song;
                Ok(update)
            }
            _ => Err(CatalogError::InvalidRequest(
                "group and song are required".to_string(),
            )),
        }
    }

    pub fn into_patch(self) -> SongPatch {
        SongPatch(vec![
            SongField::Group(self.group),
            SongField::Song(self.song),
            SongField::ReleaseDate(self.release_date),
            SongField::Text(self.text),
            SongField::Link(self.link),
        ])
    }
}

/// One field assignment of a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongField {
    Group(String),
    Song(String),
    ReleaseDate(Option<NaiveDate>),
    Text(String),
    Link(String),
}

/// Partial update (`PATCH`), validated against the known field set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SongPatch(pub Vec<SongField>);

fn expect_string(key: &str, value: Value) -> CatalogResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(CatalogError::InvalidRequest(format!(
            "field '{}' must be a string, got {}",
            key, other
        ))),
    }
}

fn expect_non_empty(key: &str, value: Value) -> CatalogResult<String> {
    let s = expect_string(key, value)?;
    if s.is_empty() {
        return Err(CatalogError::InvalidRequest(format!(
            "field '{}' must not be empty",
            key
        )));
    }
    Ok(s)
}

impl SongPatch {
    pub fn from_json(map: Map<String, Value>) -> CatalogResult<Self> {
        let mut fields = Vec::with_capacity(map.len());
        for (key, value) in map {
            let field = match key.as_str() {
                "group" => SongField::Group(expect_non_empty(&key, value)?),
                "song" => SongField::Song(expect_non_empty(&key, value)?),
                "release_date" => match value {
                    Value::Null => SongField::ReleaseDate(None),
                    other => {
                        let raw = expect_string(&key, other)?;
                        SongField::ReleaseDate(Some(parse_release_date(&raw)?))
                    }
                },
                "text" => SongField::Text(expect_string(&key, value)?),
                "link" => SongField::Link(expect_string(&key, value)?),
                unknown => {
                    return Err(CatalogError::InvalidRequest(format!(
                        "unknown field '{}'",
                        unknown
                    )))
                }
            };
            fields.push(field);
        }
        Ok(SongPatch(fields))
    }
}

/// Optional predicates for listing songs. Empty strings count as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SongFilter {
    pub group: Option<String>,
    pub song: Option<String>,
    pub release_date: Option<String>,
    pub text: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(SongRecord),
    NotFound,
    /// The new (group, song) pair already belongs to another record.
    Conflict,
}

/// Accepts exactly `YYYY-MM-DD`.
pub fn parse_release_date(raw: &str) -> CatalogResult<NaiveDate> {
    let bytes = raw.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(CatalogError::InvalidDateFormat(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, RELEASE_DATE_FORMAT)
        .map_err(|_| CatalogError::InvalidDateFormat(raw.to_string()))
}
