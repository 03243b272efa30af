// Page analytics HTTP routes
//
// The page and optional window are path segments:
//   /api/page-analytics/pricing
//   /api/page-analytics/pricing/2025-01-01/2025-01-31
//   /api/page-analytics/_root            (the site root "/")

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use pulse_core::PageFilter;

use crate::common::{internal_error, ApiError, ErrorResponse};
use crate::services::{PageAnalytics, PageAnalyticsService};
use crate::validation::ValidationError;

/// App state for page analytics routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PageAnalyticsService>,
}

impl AppState {
    pub fn new(service: PageAnalyticsService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Create page analytics routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/page-analytics/*pagefilter", get(get_page_analytics))
        .with_state(state)
}

/// GET /api/page-analytics/{pagefilter} - Dashboard bundle for one page
#[utoipa::path(
    get,
    path = "/api/page-analytics/{pagefilter}",
    params(
        ("pagefilter" = String, Path, description = "`<page>` or `<page>/<startDate>/<endDate>`; `_root` is the site root")
    ),
    responses(
        (status = 200, description = "Page analytics", body = PageAnalytics),
        (status = 400, description = "Ambiguous or invalid page filter", body = ErrorResponse),
        (status = 500, description = "Store unusable", body = ErrorResponse),
    ),
    tag = "pages"
)]
pub async fn get_page_analytics(
    State(state): State<AppState>,
    Path(pagefilter): Path<String>,
) -> Result<Json<PageAnalytics>, ApiError> {
    let today = Utc::now().date_naive();
    let filter = PageFilter::from_path(&pagefilter, today).map_err(ValidationError::from)?;

    let analytics = state
        .service
        .page_analytics(&filter)
        .await
        .map_err(|e| internal_error("Failed to fetch page analytics", e))?;

    Ok(Json(analytics))
}
