//! Test data: seeded songs and the upstream API's data file.

use super::constants::*;
use chrono::NaiveDate;
use serde_json::json;
use song_library_server::song_store::{NewSong, SongStore, RELEASE_DATE_FORMAT};
use std::path::{Path, PathBuf};

fn date(raw: &str) -> Option<NaiveDate> {
    Some(NaiveDate::parse_from_str(raw, RELEASE_DATE_FORMAT).expect("Bad fixture date"))
}

/// Stores the seeded songs, in the order their ids are expected to follow.
pub fn seed_songs(store: &dyn SongStore) {
    let songs = [
        NewSong {
            group: SEEDED_GROUP.to_string(),
            song: SEEDED_SONG.to_string(),
            release_date: date(SEEDED_RELEASE_DATE),
            text: SEEDED_TEXT.to_string(),
            link: SEEDED_LINK.to_string(),
        },
        NewSong {
            group: QUEEN_GROUP.to_string(),
            song: QUEEN_SONG.to_string(),
            release_date: date(QUEEN_RELEASE_DATE),
            text: "Is this the real life?\n\nMama, just killed a man\n\nNothing really matters"
                .to_string(),
            link: "https://www.youtube.com/watch?v=fJ9rUzIMcZQ".to_string(),
        },
        NewSong {
            group: QOTSA_GROUP.to_string(),
            song: QOTSA_SONG.to_string(),
            release_date: date(QOTSA_RELEASE_DATE),
            text: "We get some rules to follow\n\nThat and this".to_string(),
            link: "https://www.youtube.com/watch?v=s88r_q7oufE".to_string(),
        },
    ];
    for song in &songs {
        store.insert_song(song).expect("Failed to seed song");
    }
}

/// Writes the data file the stand-in upstream API answers from.
pub fn write_upstream_data(dir: &Path) -> PathBuf {
    let path = dir.join("upstream.json");
    let entries = json!([
        {
            "group": UPSTREAM_GROUP,
            "song": UPSTREAM_SONG,
            "release_date": UPSTREAM_RELEASE_DATE,
            "text": UPSTREAM_TEXT,
            "link": UPSTREAM_LINK,
        },
        {
            "group": UPSTREAM_ESCAPED_GROUP,
            "song": UPSTREAM_ESCAPED_SONG,
            "release_date": UPSTREAM_ESCAPED_RELEASE_DATE,
            "text": "She's got a smile",
            "link": "https://www.youtube.com/watch?v=1w7OgIMMRc4",
        },
        {
            "group": UPSTREAM_BAD_DATE_GROUP,
            "song": UPSTREAM_BAD_DATE_SONG,
            "release_date": "17.08.1987",
            "text": "",
            "link": "",
        },
    ]);
    std::fs::write(&path, entries.to_string()).expect("Failed to write upstream data");
    path
}

/// Enrichment file entry for `(group, song)` with the override constants.
pub fn override_entry(group: &str, song: &str) -> String {
    json!({
        "group": group,
        "song": song,
        "release_date": OVERRIDE_RELEASE_DATE,
        "text": OVERRIDE_TEXT,
        "link": OVERRIDE_LINK,
    })
    .to_string()
}
