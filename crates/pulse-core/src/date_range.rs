// Calendar date ranges and their timestamp bounds
//
// Event timestamps are stored as ISO-8601 strings and compared lexicographically.
// A range [start, end] over calendar dates maps to the half-open timestamp window
// [start 00:00:00.000Z, (end + 1 day) 00:00:00.000Z) so that every record stamped
// anywhere on the end date is included.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Format of calendar dates on the wire and in flow records
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", try_from = "RawDateRange")]
pub struct DateRange {
    /// First day of the range (inclusive).
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2025-01-01"))]
    start_date: NaiveDate,
    /// Last day of the range (inclusive).
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2025-01-31"))]
    end_date: NaiveDate,
}

/// Wire shape of a range before the ordering check
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDateRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = Error;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        Self::new(raw.start_date, raw.end_date)
    }
}

impl DateRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        if start_date > end_date {
            return Err(Error::InvalidRange {
                start: start_date.format(DATE_FORMAT).to_string(),
                end: end_date.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Parse a range from two `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// Parse an optional range: both bounds or neither.
    pub fn parse_optional(start: Option<&str>, end: Option<&str>) -> Result<Option<Self>> {
        match (start, end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => Self::parse(start, end).map(Some),
            _ => Err(Error::IncompleteRange),
        }
    }

    /// The `days`-day window ending on `today`
    pub fn last_days(days: u32, today: NaiveDate) -> Self {
        let start_date = today - Duration::days(i64::from(days));
        Self {
            start_date,
            end_date: today,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Inclusive lower timestamp bound
    pub fn start_bound(&self) -> String {
        midnight(self.start_date)
    }

    /// Exclusive upper timestamp bound (midnight after the end date)
    pub fn end_bound_exclusive(&self) -> String {
        match self.end_date.succ_opt() {
            Some(next) => midnight(next),
            None => format!("{}T23:59:59.999Z", self.end_date.format(DATE_FORMAT)),
        }
    }

    /// Whether an ISO-8601 event timestamp falls inside the range
    pub fn contains_timestamp(&self, timestamp: &str) -> bool {
        timestamp >= self.start_bound().as_str() && timestamp < self.end_bound_exclusive().as_str()
    }

    /// Whether a `YYYY-MM-DD` flow date falls inside the range (both ends inclusive)
    pub fn contains_date(&self, date: &str) -> bool {
        date >= self.start_date_string().as_str() && date <= self.end_date_string().as_str()
    }

    pub fn start_date_string(&self) -> String {
        self.start_date.format(DATE_FORMAT).to_string()
    }

    pub fn end_date_string(&self) -> String {
        self.end_date.format(DATE_FORMAT).to_string()
    }

    /// Number of calendar days covered, counting both ends
    pub fn num_days(&self) -> u32 {
        ((self.end_date - self.start_date).num_days() + 1) as u32
    }

    /// Iterate every day in the range
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |day| *day <= self.end_date)
    }
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| Error::invalid_date(value))
}

fn midnight(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format(DATE_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(value: &str) -> NaiveDate {
        parse_date(value).unwrap()
    }

    #[test]
    fn test_bounds_cover_whole_end_day() {
        let range = DateRange::parse("2025-03-01", "2025-03-01").unwrap();
        assert_eq!(range.start_bound(), "2025-03-01T00:00:00.000Z");
        assert_eq!(range.end_bound_exclusive(), "2025-03-02T00:00:00.000Z");

        assert!(range.contains_timestamp("2025-03-01T00:00:00Z"));
        assert!(range.contains_timestamp("2025-03-01T23:59:00Z"));
        assert!(range.contains_timestamp("2025-03-01T23:59:59.999Z"));
        assert!(!range.contains_timestamp("2025-03-02T00:00:00.000Z"));
        assert!(!range.contains_timestamp("2025-03-02T00:00:01Z"));
        assert!(!range.contains_timestamp("2025-02-28T23:59:59.999Z"));
    }

    #[test]
    fn test_end_bound_crosses_month_and_year() {
        let range = DateRange::parse("2024-12-01", "2024-12-31").unwrap();
        assert_eq!(range.end_bound_exclusive(), "2025-01-01T00:00:00.000Z");

        let leap = DateRange::parse("2024-02-28", "2024-02-29").unwrap();
        assert_eq!(leap.end_bound_exclusive(), "2024-03-01T00:00:00.000Z");
    }

    #[test]
    fn test_contains_date_is_inclusive() {
        let range = DateRange::parse("2025-01-01", "2025-01-02").unwrap();
        assert!(range.contains_date("2025-01-01"));
        assert!(range.contains_date("2025-01-02"));
        assert!(!range.contains_date("2024-12-31"));
        assert!(!range.contains_date("2025-01-03"));
    }

    #[test]
    fn test_rejects_reversed_range() {
        let err = DateRange::parse("2025-02-01", "2025-01-01").unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }

    #[test]
    fn test_rejects_malformed_dates() {
        assert_eq!(
            DateRange::parse("yesterday", "2025-01-01").unwrap_err(),
            Error::InvalidDate("yesterday".into())
        );
        assert!(DateRange::parse("2025-01-01", "2025-02-30").is_err());
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(DateRange::parse_optional(None, None).unwrap(), None);
        assert!(DateRange::parse_optional(Some("2025-01-01"), Some("2025-01-05"))
            .unwrap()
            .is_some());
        assert_eq!(
            DateRange::parse_optional(Some("2025-01-01"), None).unwrap_err(),
            Error::IncompleteRange
        );
        assert_eq!(
            DateRange::parse_optional(None, Some("2025-01-01")).unwrap_err(),
            Error::IncompleteRange
        );
    }

    #[test]
    fn test_days_and_num_days() {
        let range = DateRange::parse("2025-01-30", "2025-02-02").unwrap();
        assert_eq!(range.num_days(), 4);
        let days: Vec<String> = range
            .days()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect();
        assert_eq!(
            days,
            vec!["2025-01-30", "2025-01-31", "2025-02-01", "2025-02-02"]
        );
    }

    #[test]
    fn test_last_days() {
        let range = DateRange::last_days(30, day("2025-03-31"));
        assert_eq!(range.start_date_string(), "2025-03-01");
        assert_eq!(range.end_date_string(), "2025-03-31");
    }

    #[test]
    fn test_serializes_as_camel_case_dates() {
        let range = DateRange::parse("2025-01-01", "2025-01-31").unwrap();
        let json = serde_json::to_value(range).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"startDate": "2025-01-01", "endDate": "2025-01-31"})
        );
    }

    #[test]
    fn test_deserialize_checks_ordering() {
        let range: DateRange =
            serde_json::from_str(r#"{"startDate": "2025-01-01", "endDate": "2025-01-31"}"#).unwrap();
        assert_eq!(range, DateRange::parse("2025-01-01", "2025-01-31").unwrap());

        let err = serde_json::from_str::<DateRange>(
            r#"{"startDate": "2025-02-01", "endDate": "2025-01-01"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("2025-02-01"), "{err}");
    }
}
