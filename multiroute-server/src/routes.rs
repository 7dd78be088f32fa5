//! HTTP route handlers.

use std::time::Duration;

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use multiroute_core::{GeoCoordinate, model::GraphStats, multimodal_routing, routing::Route};
use serde_json::{Value, json};
use tower::{ServiceBuilder, limit::GlobalConcurrencyLimitLayer, timeout::TimeoutLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use crate::config::HttpConfig;
use crate::dto::{HealthResponse, RouteQuery};
use crate::error::ApiError;
use crate::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState, http: &HttpConfig) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/route", get(route))
        .route("/route/geojson", get(route_geojson))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    http.request_timeout_secs,
                )))
                .layer(GlobalConcurrencyLimitLayer::new(http.max_concurrent_requests)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(format!("Unhandled middleware error: {err}"))
    }
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "message": "Multimodal routing API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "stats": "/stats",
            "route": "/route?start_lat=52.370&start_lon=4.880&end_lat=52.380&end_lon=4.890",
            "route_geojson": "/route/geojson?start_lat=52.370&start_lon=4.880&end_lat=52.380&end_lon=4.890",
        }
    }))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.graph() {
        Some(graph) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                graph_loaded: true,
                nodes: graph.node_count(),
                edges: graph.edge_count(),
            }),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "initializing",
                graph_loaded: false,
                nodes: 0,
                edges: 0,
            }),
        ),
    }
}

async fn stats(State(state): State<AppState>) -> Result<Json<GraphStats>, ApiError> {
    let graph = state.graph().ok_or(ApiError::NotReady)?;
    Ok(Json(graph.stats()))
}

async fn route(
    State(state): State<AppState>,
    query: Result<Query<RouteQuery>, QueryRejection>,
) -> Result<Json<Route>, ApiError> {
    let route = compute_route(state, query).await?;
    Ok(Json(route))
}

async fn route_geojson(
    State(state): State<AppState>,
    query: Result<Query<RouteQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let route = compute_route(state, query).await?;
    let body = route
        .to_geojson_string()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "application/geo+json")], body).into_response())
}

/// Validates the query, then runs the search on the blocking pool so a
/// long search does not stall the async workers. The search permit moves
/// into the blocking task: a request that timed out keeps its slot until
/// the search actually ends.
async fn compute_route(
    state: AppState,
    query: Result<Query<RouteQuery>, QueryRejection>,
) -> Result<Route, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let (start, end) = query.endpoints()?;

    if !state.is_ready() {
        return Err(ApiError::NotReady);
    }

    info!(
        "Calculating route from ({}, {}) to ({}, {})",
        start.lat(),
        start.lon(),
        end.lat(),
        end.lon()
    );
    let permit = state
        .searches
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| ApiError::Internal(format!("Search slots closed: {e}")))?;
    let route = tokio::task::spawn_blocking(move || {
        let route = run_routing(&state, &start, &end);
        drop(permit);
        route
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Routing task failed: {e}")))??;

    debug!(
        "Route calculated: {} minutes, cost {}",
        route.total_time, route.total_cost
    );
    Ok(route)
}

fn run_routing(
    state: &AppState,
    start: &GeoCoordinate,
    end: &GeoCoordinate,
) -> Result<Route, ApiError> {
    let graph = state.graph().ok_or(ApiError::NotReady)?;
    Ok(multimodal_routing(graph, start, end, &state.cost)?)
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use hashbrown::HashMap;
    use multiroute_core::{
        Layer, MultimodalGraph,
        loading::{RawEdge, RawEdgeList, TransferConfig, build_multimodal_graph},
        routing::CostModel,
    };
    use tower::ServiceExt;

    use super::*;

    /// Walk 1 -> 2, drive 2 -> 3, plus an isolated bike street
    fn commuter_graph() -> MultimodalGraph {
        let mut source = HashMap::new();
        source.insert(
            Layer::Walk,
            RawEdgeList::new(vec![RawEdge {
                source: 1,
                target: 2,
                length: Some(500.0),
            }])
            .with_position(1, 52.0, 4.0)
            .with_position(2, 52.0045, 4.0),
        );
        source.insert(
            Layer::Bike,
            RawEdgeList::new(vec![RawEdge {
                source: 7,
                target: 8,
                length: Some(300.0),
            }])
            .with_position(7, 53.0, 5.0)
            .with_position(8, 53.002, 5.0),
        );
        source.insert(
            Layer::Car,
            RawEdgeList::new(vec![RawEdge {
                source: 2,
                target: 3,
                length: Some(2000.0),
            }])
            .with_position(2, 52.0045, 4.0)
            .with_position(3, 52.02, 4.0),
        );
        let speeds: Vec<_> = Layer::ALL
            .iter()
            .map(|&layer| (layer, layer.default_speed_kmh()))
            .collect();
        build_multimodal_graph(&source, &speeds, &TransferConfig::default()).unwrap()
    }

    fn app(state: AppState) -> Router {
        create_router(state, &HttpConfig::default())
    }

    async fn send(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    const SEARCHES: usize = 4;

    const COMMUTE: &str = "/route?start_lat=52.0&start_lon=4.0&end_lat=52.02&end_lon=4.0";

    #[tokio::test]
    async fn not_ready_before_graph_is_built() {
        let state = AppState::new(CostModel::default(), SEARCHES);

        let (status, body) = send(app(state.clone()), "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");
        assert_eq!(body["graph_loaded"], false);

        let (status, body) = send(app(state.clone()), COMMUTE).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], "not_ready");

        let (status, _) = send(app(state), "/stats").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn healthy_once_graph_is_set() {
        let state = AppState::new(CostModel::default(), SEARCHES);
        assert!(state.set_graph(commuter_graph()));
        assert!(!state.set_graph(commuter_graph()));

        let (status, body) = send(app(state.clone()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["nodes"], 6);

        let (status, body) = send(app(state), "/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["edges_by_mode"]["transfer"], 1);
        assert_eq!(body["is_multigraph"], true);
    }

    #[tokio::test]
    async fn route_returns_itinerary() {
        let state = AppState::with_graph(commuter_graph(), CostModel::default(), SEARCHES);
        let (status, body) = send(app(state), COMMUTE).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_time"], 9.5);
        assert_eq!(body["total_cost"], 20);
        let modes: Vec<_> = body["segments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["mode"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(modes, ["walk", "transfer", "car"]);
    }

    #[tokio::test]
    async fn route_geojson_has_one_feature_per_segment() {
        let state = AppState::with_graph(commuter_graph(), CostModel::default(), SEARCHES);
        let (status, body) = send(
            app(state),
            "/route/geojson?start_lat=52.0&start_lon=4.0&end_lat=52.02&end_lon=4.0",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unreachable_destination_is_not_found() {
        let state = AppState::with_graph(commuter_graph(), CostModel::default(), SEARCHES);
        let (status, body) = send(
            app(state),
            "/route?start_lat=52.0&start_lon=4.0&end_lat=53.002&end_lon=5.0",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "no_route");
    }

    #[tokio::test]
    async fn invalid_coordinates_are_rejected() {
        let state = AppState::with_graph(commuter_graph(), CostModel::default(), SEARCHES);

        let (status, body) = send(
            app(state.clone()),
            "/route?start_lat=95.0&start_lon=4.0&end_lat=52.02&end_lon=4.0",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_request");

        let (status, _) = send(app(state), "/route?start_lat=52.0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_slots_outlive_timed_out_requests() {
        let state = AppState::with_graph(commuter_graph(), CostModel::default(), 1);
        let http = HttpConfig {
            request_timeout_secs: 1,
            ..HttpConfig::default()
        };

        // A search still running after its request was answered
        let running = state.searches.clone().try_acquire_owned().unwrap();
        let (status, body) = send(create_router(state.clone(), &http), COMMUTE).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["kind"], "timeout");

        drop(running);
        let (status, _) = send(create_router(state.clone(), &http), COMMUTE).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.searches.available_permits(), 1);
    }
}
