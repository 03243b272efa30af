// Page filters taken from URL path segments
//
// A page cannot be addressed by an empty path segment, so the site root travels
// as the sentinel `_root`.

use chrono::NaiveDate;

use crate::date_range::DateRange;
use crate::error::{Error, Result};

/// Path segment standing in for the site root `/`
pub const ROOT_SENTINEL: &str = "_root";

/// Window used when a page filter carries no dates
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Map a path segment to a page path: `_root` → `/`, `pricing` → `/pricing`
pub fn resolve_page_segment(segment: &str) -> String {
    if segment == ROOT_SENTINEL {
        return "/".to_string();
    }
    format!("/{}", segment.trim_start_matches('/'))
}

/// Inverse of [`resolve_page_segment`], for building links
pub fn page_segment(page_path: &str) -> String {
    match page_path.trim_start_matches('/') {
        "" => ROOT_SENTINEL.to_string(),
        rest => rest.to_string(),
    }
}

/// A page plus the date window to analyse it over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFilter {
    pub page_path: String,
    pub range: DateRange,
}

impl PageFilter {
    /// Interpret `[page]` or `[page, startDate, endDate]`.
    ///
    /// A single segment covers the last 30 days ending `today`. Two segments are
    /// ambiguous and rejected.
    pub fn from_segments<S: AsRef<str>>(segments: &[S], today: NaiveDate) -> Result<Self> {
        match segments {
            [] => Err(Error::invalid_page_filter("Please provide a page path.")),
            [page] => Ok(Self {
                page_path: resolve_page_segment(page.as_ref()),
                range: DateRange::last_days(DEFAULT_WINDOW_DAYS, today),
            }),
            [page, start, end] => Ok(Self {
                page_path: resolve_page_segment(page.as_ref()),
                range: DateRange::parse(start.as_ref(), end.as_ref())?,
            }),
            [_, _] => Err(Error::invalid_page_filter(
                "You provided 2 parameters which is ambiguous.",
            )),
            _ => Err(Error::invalid_page_filter(
                "Expected /<page-path> or /<page-path>/<start-date>/<end-date>.",
            )),
        }
    }

    /// Split a wildcard route capture such as `pricing/2025-01-01/2025-01-31`
    pub fn from_path(path: &str, today: NaiveDate) -> Result<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        Self::from_segments(&segments, today)
    }
}
