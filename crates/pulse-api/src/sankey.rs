// Sankey flow HTTP routes

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use pulse_core::SankeyGraph;
use pulse_storage::FlowAggregator;

use crate::common::{internal_error, ApiError, ErrorResponse};
use crate::validation::RangeParams;

/// App state for sankey routes
#[derive(Clone)]
pub struct AppState {
    pub flows: FlowAggregator,
}

impl AppState {
    pub fn new(flows: FlowAggregator) -> Self {
        Self { flows }
    }
}

/// Create sankey routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/sankey-data", get(get_sankey_data))
        .with_state(state)
}

/// GET /api/sankey-data - Page-to-page flows aggregated over a date window
#[utoipa::path(
    get,
    path = "/api/sankey-data",
    params(RangeParams),
    responses(
        (status = 200, description = "Aggregated flow graph", body = SankeyGraph),
        (status = 400, description = "Missing or invalid date range", body = ErrorResponse),
        (status = 500, description = "Store unusable", body = ErrorResponse),
    ),
    tag = "flows"
)]
pub async fn get_sankey_data(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<SankeyGraph>, ApiError> {
    let range = params.required()?;

    let graph = state
        .flows
        .flow_graph(&range)
        .await
        .map_err(|e| internal_error("Failed to fetch data", e))?;

    Ok(Json(graph))
}
