// Pulse analytics API
// Decision: Store handle is opened once in main and injected into every route state
// Decision: An unreachable store at startup is logged, not fatal; requests reconnect lazily
// Decision: Store failures degrade to empty payloads; only an unusable store returns 500

pub mod common;
pub mod config;
pub mod events;
pub mod pages;
pub mod sankey;
pub mod services;
pub mod validation;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::{extract::State, routing::get, Json, Router};
use pulse_core::{
    ClickCount, DateRange, EventCategory, EventRecord, PerformanceSummary, SankeyGraph,
    SankeyLink, SankeyNode, ScrollSummary,
};
use pulse_storage::{EventRepository, FlowAggregator, StoreError, StoreHandle};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::common::{CountResponse, ErrorResponse, ListResponse};
use crate::config::ApiConfig;
use crate::services::{PageAnalytics, PageAnalyticsService};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` when the store answers its liveness probe, `degraded` otherwise.
    pub status: String,
    pub version: String,
    /// Configured backend: `postgres` or `memory`.
    pub storage: String,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    store: Arc<StoreHandle>,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    let probe = state
        .store
        .run(|backend| async move { backend.ping().await })
        .await;

    let status = match probe {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check found store unavailable");
            "degraded"
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.store.kind().to_string(),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        sankey::get_sankey_data,
        events::get_scroll_data,
        events::list_events,
        events::count_visitors,
        events::list_page_paths,
        pages::get_page_analytics,
    ),
    components(
        schemas(
            SankeyGraph, SankeyNode, SankeyLink,
            EventRecord, EventCategory, DateRange,
            ScrollSummary, ClickCount, PerformanceSummary,
            PageAnalytics,
            CountResponse, ErrorResponse,
            ListResponse<String>,
            HealthResponse,
        )
    ),
    tags(
        (name = "flows", description = "Page-to-page flow aggregation"),
        (name = "events", description = "Raw interaction events"),
        (name = "pages", description = "Per-page analytics")
    ),
    info(
        title = "Pulse Analytics API",
        version = "0.1.0",
        description = "Read API for web analytics dashboards: flows, events and page summaries",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

/// Build the complete application router around an opened store
pub fn build_app(store: Arc<StoreHandle>, config: &ApiConfig) -> Router {
    let event_repository = EventRepository::new(store.clone());
    let flow_aggregator = FlowAggregator::new(store.clone());

    let sankey_state = sankey::AppState::new(flow_aggregator);
    let events_state = events::AppState::new(event_repository.clone(), config.default_event_limit);
    let pages_state = pages::AppState::new(PageAnalyticsService::new(event_repository));
    let health_state = HealthState { store };

    let api_routes = Router::new()
        .merge(sankey::routes(sankey_state))
        .merge(events::routes(events_state))
        .merge(pages::routes(pages_state));

    // Health and docs are never prefixed
    let app = Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(build_router_with_prefix(api_routes, &config.api_prefix))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !config.cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.cors_origins.clone()))
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    header::ORIGIN,
                    header::CACHE_CONTROL,
                ]),
        )
    } else {
        app
    };

    app.layer(TraceLayer::new_for_http())
}

/// Nest API routes under `api_prefix`; `/health` and docs stay at the root
pub fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

/// Connect eagerly at startup without making an unreachable store fatal.
///
/// Only misconfiguration and failed migrations are returned. Anything else is
/// logged and left to the first request, which reconnects through `acquire`.
pub async fn open_store(store: &StoreHandle) -> Result<(), StoreError> {
    match store.open().await {
        Ok(()) => Ok(()),
        Err(e) if e.is_recoverable() => {
            tracing::warn!(
                backend = store.kind(),
                error = %e,
                "Analytics store unreachable at startup, will retry on first request"
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}
