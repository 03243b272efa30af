// Query descriptors and database rows (internal, may differ from public DTOs)

use pulse_core::{DateRange, EventCategory, EventRecord, FlowCount, RawFlowRecord};
use serde_json::Value;
use sqlx::FromRow;

/// Default number of events returned when the caller does not ask for a limit
pub const DEFAULT_EVENT_LIMIT: usize = 100;

// ============================================
// Event queries
// ============================================

/// One query shape for every event category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub category: EventCategory,
    /// Inclusive calendar window on `timestamp`.
    pub range: Option<DateRange>,
    /// Exact match on `page_path`.
    pub page_path: Option<String>,
    /// Maximum number of records, newest first. Always at least 1.
    pub limit: usize,
}

impl EventQuery {
    pub fn new(category: EventCategory) -> Self {
        Self {
            category,
            range: None,
            page_path: None,
            limit: DEFAULT_EVENT_LIMIT,
        }
    }

    pub fn with_range(mut self, range: Option<DateRange>) -> Self {
        self.range = range;
        self
    }

    pub fn in_range(self, range: DateRange) -> Self {
        self.with_range(Some(range))
    }

    pub fn on_page(mut self, page_path: impl Into<String>) -> Self {
        self.page_path = Some(page_path.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Limit as a SQL bind value, saturating at `i64::MAX`
    pub fn sql_limit(&self) -> i64 {
        i64::try_from(self.limit).unwrap_or(i64::MAX)
    }

    /// Range and page predicate, shared by backends that filter in process
    pub fn matches(&self, record: &EventRecord) -> bool {
        let in_range = self
            .range
            .map_or(true, |range| range.contains_timestamp(&record.timestamp));
        let on_page = self
            .page_path
            .as_deref()
            .map_or(true, |path| record.page_path.as_deref() == Some(path));
        in_range && on_page
    }
}

// ============================================
// Rows
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: i64,
    pub document: sqlx::types::Json<Value>,
}

impl EventRow {
    /// Decode the stored document; older writers omit `event_type`, so the
    /// collection's category fills it in.
    pub fn into_record(self, category: EventCategory) -> Result<EventRecord, serde_json::Error> {
        let mut document = self.document.0;
        if let Value::Object(map) = &mut document {
            map.entry("event_type")
                .or_insert_with(|| Value::String(category.as_str().to_string()));
        }
        serde_json::from_value(document)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct FlowRow {
    pub flow_date: String,
    pub flow_key: String,
    pub count: Option<i64>,
}

impl From<FlowRow> for RawFlowRecord {
    fn from(row: FlowRow) -> Self {
        RawFlowRecord {
            flow_date: row.flow_date,
            flow_key: row.flow_key,
            count: row.count.map(FlowCount::Int),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(ts: &str, page: &str) -> EventRecord {
        EventRecord::new(EventCategory::Click, ts).with_page_path(page)
    }

    #[test]
    fn test_query_matches_range_and_page() {
        let query = EventQuery::new(EventCategory::Click)
            .in_range(DateRange::parse("2025-03-01", "2025-03-01").unwrap())
            .on_page("/pricing");

        assert!(query.matches(&event("2025-03-01T23:59:00Z", "/pricing")));
        assert!(!query.matches(&event("2025-03-02T00:00:01Z", "/pricing")));
        assert!(!query.matches(&event("2025-03-01T12:00:00Z", "/")));
    }

    #[test]
    fn test_query_without_filters_matches_everything() {
        let query = EventQuery::new(EventCategory::Click);
        assert!(query.matches(&EventRecord::new(EventCategory::Click, "1999-01-01T00:00:00Z")));
    }

    #[test]
    fn test_limit_is_at_least_one() {
        assert_eq!(EventQuery::new(EventCategory::Scroll).with_limit(0).limit, 1);
        assert_eq!(EventQuery::new(EventCategory::Scroll).limit, DEFAULT_EVENT_LIMIT);
    }

    #[test]
    fn test_sql_limit_saturates() {
        let query = EventQuery::new(EventCategory::Scroll).with_limit(usize::MAX);
        assert_eq!(query.sql_limit(), i64::MAX);
        assert_eq!(EventQuery::new(EventCategory::Scroll).with_limit(25).sql_limit(), 25);
    }

    #[test]
    fn test_row_fills_missing_event_type() {
        let row = EventRow {
            id: 1,
            document: sqlx::types::Json(json!({
                "timestamp": "2025-03-01T10:00:00Z",
                "page_path": "/",
                "load_time": 900
            })),
        };
        let record = row.into_record(EventCategory::Performance).unwrap();
        assert_eq!(record.event_type, EventCategory::Performance);
        assert_eq!(record.number("load_time"), Some(900.0));
    }
}
