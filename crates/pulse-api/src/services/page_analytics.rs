// Page analytics service
//
// Loads every event family for one page concurrently and derives the
// dashboard summaries from them.

use pulse_core::{
    click_counts, ClickCount, DateRange, EventCategory, EventRecord, PageFilter,
    PerformanceSummary, ScrollSummary,
};
use pulse_storage::{EventQuery, EventRepository, StoreError};
use serde::Serialize;
use utoipa::ToSchema;

/// Events fetched per family for one page view
pub const PAGE_EVENT_LIMIT: usize = 100;

/// Everything the page dashboard renders for one page and window
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalytics {
    pub page_path: String,
    pub page_title: String,
    pub date_range: DateRange,
    pub total_page_visitors: u64,
    /// Every page viewed in the window, for navigation.
    pub page_paths: Vec<String>,
    pub scroll_data: Vec<EventRecord>,
    pub click_data: Vec<EventRecord>,
    pub performance_data: Vec<EventRecord>,
    pub scroll_summary: ScrollSummary,
    pub click_summary: Vec<ClickCount>,
    pub performance_summary: PerformanceSummary,
}

pub struct PageAnalyticsService {
    events: EventRepository,
}

impl PageAnalyticsService {
    pub fn new(events: EventRepository) -> Self {
        Self { events }
    }

    pub async fn page_analytics(&self, filter: &PageFilter) -> Result<PageAnalytics, StoreError> {
        let PageFilter { page_path, range } = filter;
        let query = |category| {
            EventQuery::new(category)
                .in_range(*range)
                .on_page(page_path.clone())
                .with_limit(PAGE_EVENT_LIMIT)
        };
        let scroll_query = query(EventCategory::Scroll);
        let click_query = query(EventCategory::Click);
        let performance_query = query(EventCategory::Performance);

        let (scroll_data, click_data, performance_data, total_page_visitors, page_paths) = tokio::try_join!(
            self.events.query_events(&scroll_query),
            self.events.query_events(&click_query),
            self.events.query_events(&performance_query),
            self.events.count_unique_visitors(range, Some(page_path)),
            self.events.list_page_paths(range),
        )?;

        let page_title = page_title(&scroll_data, page_path);
        tracing::debug!(
            page_path = %page_path,
            scroll = scroll_data.len(),
            clicks = click_data.len(),
            performance = performance_data.len(),
            visitors = total_page_visitors,
            "Loaded page analytics"
        );

        Ok(PageAnalytics {
            page_path: page_path.clone(),
            page_title,
            date_range: *range,
            total_page_visitors,
            page_paths,
            scroll_summary: ScrollSummary::from_events(&scroll_data),
            click_summary: click_counts(&click_data, total_page_visitors),
            performance_summary: PerformanceSummary::from_events(&performance_data),
            scroll_data,
            click_data,
            performance_data,
        })
    }
}

/// Title recorded on the most recent scroll event, else a generated one
fn page_title(scroll_data: &[EventRecord], page_path: &str) -> String {
    scroll_data
        .first()
        .and_then(|event| event.page_title.as_deref())
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Analytics: {page_path}"))
}
