// Event repository
//
// Read side of the event collections. Every call goes through the store
// handle's timeout and degrades to an empty value on recoverable failures.

use std::sync::Arc;

use pulse_core::{DateRange, EventCategory, EventRecord};

use crate::error::{recover, StoreError};
use crate::handle::StoreHandle;
use crate::models::EventQuery;

/// Category whose sessions are counted as visitors
pub const VISITOR_CATEGORY: EventCategory = EventCategory::PageExit;

/// Category whose page paths enumerate viewed pages (one per page view)
pub const PAGE_VIEW_CATEGORY: EventCategory = EventCategory::Performance;

#[derive(Clone)]
pub struct EventRepository {
    store: Arc<StoreHandle>,
}

impl EventRepository {
    pub fn new(store: Arc<StoreHandle>) -> Self {
        Self { store }
    }

    /// Matching events, newest first, at most `query.limit`
    pub async fn query_events(&self, query: &EventQuery) -> Result<Vec<EventRecord>, StoreError> {
        let result = self
            .store
            .run(|backend| async move { backend.find_events(query).await })
            .await;

        let events = recover(result, "query_events", Vec::new)?;
        tracing::debug!(
            category = %query.category,
            count = events.len(),
            "Fetched events"
        );
        Ok(events)
    }

    /// Distinct sessions that left a page (or any page) inside the window
    pub async fn count_unique_visitors(
        &self,
        range: &DateRange,
        page_path: Option<&str>,
    ) -> Result<u64, StoreError> {
        let result = self
            .store
            .run(|backend| async move {
                backend
                    .count_distinct_sessions(VISITOR_CATEGORY, range, page_path)
                    .await
            })
            .await;

        recover(result, "count_unique_visitors", || 0)
    }

    /// Pages viewed inside the window, sorted ascending
    pub async fn list_page_paths(&self, range: &DateRange) -> Result<Vec<String>, StoreError> {
        let result = self
            .store
            .run(|backend| async move {
                backend.distinct_page_paths(PAGE_VIEW_CATEGORY, range).await
            })
            .await;

        recover(result, "list_page_paths", Vec::new)
    }
}
