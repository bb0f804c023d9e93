//! Page/limit handling shared by the verse paginator and the song listing.
//!
//! Both endpoints are lenient: anything that is not a positive integer falls
//! back to the default instead of being rejected.

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_SONGS_LIMIT: usize = 10;
pub const DEFAULT_VERSES_LIMIT: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

fn parse_positive(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.parse::<usize>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

#[cfg(test)]
impl Pagination {
    /// Zero values are replaced by the song listing defaults.
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit == 0 { DEFAULT_SONGS_LIMIT } else { limit },
        }
    }
}

impl Pagination {
    pub fn lenient(page: Option<&str>, limit: Option<&str>, default_limit: usize) -> Self {
        Self {
            page: parse_positive(page, DEFAULT_PAGE),
            limit: parse_positive(limit, default_limit),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}
