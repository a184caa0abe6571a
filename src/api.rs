// HTTP front end over the engine (feature "server")
// Routes: health, lookup, autocomplete, representatives by level. The engine is the only state.

use crate::config::EngineConfig;
use crate::engine::{CivicEngine, LookupResult};
use crate::error::QueryError;
use crate::model::Tier;
use crate::store::StoreStats;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: CivicEngine,
    pub config: Arc<EngineConfig>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn fail(error: impl ToString) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

fn respond<T: Serialize>(status: StatusCode, body: ApiResponse<T>) -> Response {
    (status, Json(body)).into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    data: StoreStats,
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    q: Option<String>,
    comune: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteParams {
    q: Option<String>,
    limit: Option<usize>,
}

#[derive(Serialize)]
struct AutocompleteResponse<T> {
    query: String,
    count: usize,
    results: T,
}

#[derive(Serialize)]
struct LevelResponse<T> {
    level: &'static str,
    institution: &'static str,
    count: usize,
    representatives: T,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check(State(state): State<AppState>) -> Response {
    respond(
        StatusCode::OK,
        ApiResponse::ok(HealthResponse {
            status: "healthy",
            service: "civic-bridge-api",
            version: crate::VERSION,
            data: state.engine.stats().clone(),
        }),
    )
}

/// GET /api/lookup?q=Milano (or ?comune=Milano)
async fn lookup(State(state): State<AppState>, Query(params): Query<LookupParams>) -> Response {
    let query = params.q.or(params.comune).filter(|q| !q.trim().is_empty());

    let Some(query) = query else {
        return respond::<()>(
            StatusCode::BAD_REQUEST,
            ApiResponse::fail("Missing query parameter. Use ?q=comune or ?comune=nome"),
        );
    };

    info!(query = %query, "lookup request");

    match state.engine.lookup(&query) {
        result @ LookupResult::Success { .. } => respond(StatusCode::OK, ApiResponse::ok(result)),
        LookupResult::NotFound { original_query } => respond::<()>(
            StatusCode::OK,
            ApiResponse::fail(QueryError::NotFound {
                query: original_query,
            }),
        ),
    }
}

/// GET /api/autocomplete?q=rom&limit=10
async fn autocomplete(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> Response {
    let query = params.q.unwrap_or_default();
    let limit = state.config.effective_limit(params.limit);

    match state.engine.suggest(&query, limit) {
        Ok(results) => respond(
            StatusCode::OK,
            ApiResponse::ok(AutocompleteResponse {
                query: query.trim().to_string(),
                count: results.len(),
                results,
            }),
        ),
        Err(e) => respond::<()>(StatusCode::BAD_REQUEST, ApiResponse::fail(e)),
    }
}

/// GET /api/representatives/:level - camera | senato | eu
async fn representatives(State(state): State<AppState>, Path(level): Path<String>) -> Response {
    let tier: Tier = match level.parse() {
        Ok(tier) => tier,
        Err(e) => return respond::<()>(StatusCode::BAD_REQUEST, ApiResponse::fail(e)),
    };

    let listing = state.engine.representatives(tier);
    respond(
        StatusCode::OK,
        ApiResponse::ok(LevelResponse {
            level: tier.code(),
            institution: tier.institution(),
            count: listing.len(),
            representatives: listing,
        }),
    )
}

/// Build the router over a loaded engine
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/lookup", get(lookup))
        .route("/autocomplete", get(autocomplete))
        .route("/representatives/:level", get(representatives))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::sample_store;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState {
            engine: CivicEngine::new(Arc::new(sample_store())),
            config: Arc::new(EngineConfig {
                suggest_limit: 2,
                suggest_max_limit: 3,
                ..EngineConfig::default()
            }),
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["data"]["municipalities"], 10);
    }

    #[tokio::test]
    async fn test_lookup_success() {
        let (status, body) = get_json("/api/lookup?q=Roma").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["municipality"]["istat_comune"], "058091");
        assert_eq!(body["data"]["matched_by"], "exact");
        assert_eq!(body["data"]["counts"]["total"], 6);

        let (_, body) = get_json("/api/lookup?comune=milano").await;
        assert_eq!(body["data"]["municipality"]["comune"], "Milano");
    }

    #[tokio::test]
    async fn test_lookup_not_found_and_missing_param() {
        let (status, body) = get_json("/api/lookup?q=Gotham").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("Gotham"));

        let (status, body) = get_json("/api/lookup").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_autocomplete_limits() {
        let (status, body) = get_json("/api/autocomplete?q=castello").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["count"], 2);

        let (_, body) = get_json("/api/autocomplete?q=castello&limit=40").await;
        assert_eq!(body["data"]["count"], 3);
        assert!(body["data"]["results"][0].get("score").is_none());
    }

    #[tokio::test]
    async fn test_autocomplete_too_short() {
        let (status, body) = get_json("/api/autocomplete?q=r").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_representatives_by_level() {
        let (status, body) = get_json("/api/representatives/senato").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["level"], "senato");
        assert_eq!(body["data"]["count"], 3);
        assert_eq!(body["data"]["institution"], "Senato della Repubblica");

        let (_, body) = get_json("/api/representatives/EU").await;
        assert_eq!(body["data"]["level"], "eu");

        let (status, _) = get_json("/api/representatives/regione").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
