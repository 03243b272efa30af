// Event HTTP routes
//
// Raw event listings plus the visitor and page-path lookups the dashboard
// uses for navigation.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use pulse_core::{EventCategory, EventRecord};
use pulse_storage::{EventQuery, EventRepository};

use crate::common::{internal_error, ApiError, CountResponse, ErrorResponse, ListResponse};
use crate::validation::{parse_category, parse_limit, EventParams, RangeParams, ValidationError};

/// App state for event routes
#[derive(Clone)]
pub struct AppState {
    pub events: EventRepository,
    pub default_limit: usize,
}

impl AppState {
    pub fn new(events: EventRepository, default_limit: usize) -> Self {
        Self {
            events,
            default_limit,
        }
    }

    fn event_query(
        &self,
        category: EventCategory,
        params: &EventParams,
    ) -> Result<EventQuery, ValidationError> {
        let mut query = EventQuery::new(category)
            .with_range(params.range().optional()?)
            .with_limit(parse_limit(params.limit.as_deref(), self.default_limit)?);
        if let Some(page_path) = params.page_path() {
            query = query.on_page(page_path);
        }
        Ok(query)
    }
}

/// Create event routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/scroll-data", get(get_scroll_data))
        .route("/api/events/:category", get(list_events))
        .route("/api/visitors", get(count_visitors))
        .route("/api/page-paths", get(list_page_paths))
        .with_state(state)
}

/// GET /api/scroll-data - Most recent scroll events
#[utoipa::path(
    get,
    path = "/api/scroll-data",
    params(EventParams),
    responses(
        (status = 200, description = "Scroll events, newest first", body = Vec<EventRecord>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Store unusable", body = ErrorResponse),
    ),
    tag = "events"
)]
pub async fn get_scroll_data(
    State(state): State<AppState>,
    Query(params): Query<EventParams>,
) -> Result<Json<Vec<EventRecord>>, ApiError> {
    let query = state.event_query(EventCategory::Scroll, &params)?;

    let events = state
        .events
        .query_events(&query)
        .await
        .map_err(|e| internal_error("Failed to fetch scroll event data", e))?;

    Ok(Json(events))
}

/// GET /api/events/{category} - Most recent events of one category
#[utoipa::path(
    get,
    path = "/api/events/{category}",
    params(
        ("category" = String, Path, description = "scroll, click, performance, page_exit, error or activity"),
        EventParams
    ),
    responses(
        (status = 200, description = "Events, newest first", body = Vec<EventRecord>),
        (status = 400, description = "Unknown category or invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Store unusable", body = ErrorResponse),
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<EventParams>,
) -> Result<Json<Vec<EventRecord>>, ApiError> {
    let category = parse_category(&category)?;
    let query = state.event_query(category, &params)?;

    let events = state
        .events
        .query_events(&query)
        .await
        .map_err(|e| internal_error("Failed to fetch event data", e))?;

    Ok(Json(events))
}

/// GET /api/visitors - Unique visitors in a window, optionally for one page
#[utoipa::path(
    get,
    path = "/api/visitors",
    params(EventParams),
    responses(
        (status = 200, description = "Distinct sessions", body = CountResponse),
        (status = 400, description = "Missing or invalid date range", body = ErrorResponse),
        (status = 500, description = "Store unusable", body = ErrorResponse),
    ),
    tag = "events"
)]
pub async fn count_visitors(
    State(state): State<AppState>,
    Query(params): Query<EventParams>,
) -> Result<Json<CountResponse>, ApiError> {
    let range = params.range().required()?;

    let count = state
        .events
        .count_unique_visitors(&range, params.page_path())
        .await
        .map_err(|e| internal_error("Failed to count visitors", e))?;

    Ok(Json(CountResponse { count }))
}

/// GET /api/page-paths - Pages viewed in a window
#[utoipa::path(
    get,
    path = "/api/page-paths",
    params(RangeParams),
    responses(
        (status = 200, description = "Distinct page paths, ascending", body = ListResponse<String>),
        (status = 400, description = "Missing or invalid date range", body = ErrorResponse),
        (status = 500, description = "Store unusable", body = ErrorResponse),
    ),
    tag = "events"
)]
pub async fn list_page_paths(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<ListResponse<String>>, ApiError> {
    let range = params.required()?;

    let paths = state
        .events
        .list_page_paths(&range)
        .await
        .map_err(|e| internal_error("Failed to fetch page paths", e))?;

    Ok(Json(ListResponse::new(paths)))
}
