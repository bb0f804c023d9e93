//! Splits lyrics into verses and serves them a page at a time.

use serde::Serialize;

use crate::error::{CatalogError, CatalogResult};
use crate::pagination::Pagination;

/// Blank line between two lyric paragraphs.
pub const VERSE_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersePage {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub verses: Vec<String>,
    pub total_pages: usize,
}

/// Empty segments are verses too, so `"a\n\n\n\nb"` has three of them.
pub fn split_verses(full_text: &str) -> Vec<&str> {
    full_text.split(VERSE_SEPARATOR).collect()
}

pub fn paginate(full_text: &str, pagination: Pagination) -> CatalogResult<VersePage> {
    let verses = split_verses(full_text);
    let total = verses.len();
    if total == 0 {
        return Err(CatalogError::NotFound("song has no verses".to_string()));
    }

    let Pagination { page, limit } = pagination;
    let start = pagination.offset();
    if start >= total {
        return Err(CatalogError::NotFound(
            "no verses found for the requested page".to_string(),
        ));
    }
    let end = start.saturating_add(limit).min(total);

    Ok(VersePage {
        page,
        limit,
        total,
        verses: verses[start..end].iter().map(|v| v.to_string()).collect(),
        total_pages: total.div_ceil(limit),
    })
}
