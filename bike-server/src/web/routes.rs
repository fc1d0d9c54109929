//! HTTP route handlers.
//!
//! One endpoint per bot command. Everything except `/health` and
//! `/graph` works on the graph built by the last `POST /graph`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{error, info, warn};

use crate::domain::Inventory;
use crate::gbfs::{FeedError, InventoryFeed};
use crate::graph::{self, GraphError, GraphPlot};
use crate::planner::{self, AvailabilityRouter, PlanError};
use crate::rebalance::{self, RebalanceError};

use super::dto::*;
use super::state::{AppState, Session};

const NO_GRAPH: &str = "You must first construct a geometric graph!";
const NOT_A_NUMBER: &str = "You should introduce a number!";
const NOT_POSITIVE: &str = "You should introduce a positive number!";
const NOT_TWO_NUMBERS: &str = "You should introduce two numbers!";
const NEGATIVE_NUMBERS: &str = "You should introduce two non negative numbers!";
const APOLOGY: &str = "Unexpected error. Please, report this error to the authors.";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/graph", post(build_graph))
        .route("/nodes", get(nodes))
        .route("/edges", get(edges))
        .route("/components", get(components))
        .route("/plotgraph", get(plot_graph))
        .route("/route", get(route))
        .route("/valid_route", get(valid_route))
        .route("/distribute", get(distribute))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn require_session(state: &AppState) -> Result<Arc<Session>, AppError> {
    state.session().await.ok_or(AppError::NoGraph)
}

/// Fetch a fresh snapshot and build the geometric graph over it.
async fn build_graph(
    State(state): State<AppState>,
    body: Option<Json<GraphRequest>>,
) -> Result<Json<GraphResponse>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let distance = match request.distance() {
        DistanceArg::Missing => state.graph_config.max_distance,
        DistanceArg::Number(d) => d,
        DistanceArg::NotANumber => return Err(AppError::bad_request(NOT_A_NUMBER)),
    };
    if !distance.is_finite() || distance <= 0.0 {
        return Err(AppError::bad_request(NOT_POSITIVE));
    }

    let stations = state.feed.fetch().await?;

    // Pairwise distances over every station; keep it off the runtime.
    let session = tokio::task::spawn_blocking(move || {
        let (graph, positions) = graph::build(&stations, distance)?;
        let inventory = Inventory::from_stations(&stations);
        Ok::<_, GraphError>(Session {
            graph,
            positions,
            stations,
            inventory,
            max_distance: distance,
        })
    })
    .await??;

    let session = state.replace_session(session).await;
    let response = GraphResponse {
        message: "Graph constructed successfully!".to_string(),
        distance: session.max_distance,
        nodes: session.graph.node_count(),
        edges: session.graph.edge_count(),
        components: session.graph.component_count(),
    };
    info!(
        distance,
        nodes = response.nodes,
        edges = response.edges,
        components = response.components,
        "Built station graph"
    );
    Ok(Json(response))
}

async fn nodes(State(state): State<AppState>) -> Result<Json<CountResponse>, AppError> {
    let count = require_session(&state).await?.graph.node_count();
    Ok(Json(CountResponse {
        count,
        message: format!("Number of nodes: {count}"),
    }))
}

async fn edges(State(state): State<AppState>) -> Result<Json<CountResponse>, AppError> {
    let count = require_session(&state).await?.graph.edge_count();
    Ok(Json(CountResponse {
        count,
        message: format!("Number of edges: {count}"),
    }))
}

async fn components(State(state): State<AppState>) -> Result<Json<CountResponse>, AppError> {
    let count = require_session(&state).await?.graph.component_count();
    Ok(Json(CountResponse {
        count,
        message: format!("Number of connected components: {count}"),
    }))
}

/// Node and edge coordinates for drawing the graph on a map.
async fn plot_graph(State(state): State<AppState>) -> Result<Json<GraphPlot>, AppError> {
    let session = require_session(&state).await?;
    Ok(Json(GraphPlot::new(&session.graph, &session.positions)))
}

async fn route(
    State(state): State<AppState>,
    Query(req): Query<RouteRequest>,
) -> Result<Json<RouteResponse>, AppError> {
    let session = require_session(&state).await?;
    let router = planner::Router::new(state.geocoder.as_ref(), state.config.as_ref());

    let outcome = router
        .plan_route(&req.origin, &req.destination, &session.graph, &session.positions)
        .await?;
    Ok(Json(RouteResponse::from_outcome(&outcome)))
}

async fn valid_route(
    State(state): State<AppState>,
    Query(req): Query<RouteRequest>,
) -> Result<Json<RouteResponse>, AppError> {
    let session = require_session(&state).await?;
    let router = AvailabilityRouter::new(planner::Router::new(
        state.geocoder.as_ref(),
        state.config.as_ref(),
    ));

    let outcome = router
        .plan_valid_route(
            &req.origin,
            &req.destination,
            &session.graph,
            &session.positions,
            &session.inventory,
        )
        .await?;
    Ok(Json(RouteResponse::from_outcome(&outcome)))
}

async fn distribute(
    State(state): State<AppState>,
    Query(req): Query<DistributeRequest>,
) -> Result<Json<DistributeResponse>, AppError> {
    let session = require_session(&state).await?;

    let parse = |value: Option<&str>| value.and_then(|v| v.trim().parse::<i64>().ok());
    let (Some(min_bikes), Some(min_docks)) = (
        parse(req.min_bikes.as_deref()),
        parse(req.min_docks.as_deref()),
    ) else {
        return Err(AppError::bad_request(NOT_TWO_NUMBERS));
    };
    if min_bikes < 0 || min_docks < 0 {
        return Err(AppError::bad_request(NEGATIVE_NUMBERS));
    }

    let report = tokio::task::spawn_blocking(move || {
        rebalance::plan_rebalance(
            min_bikes,
            min_docks,
            &session.graph,
            &session.stations,
            &session.inventory,
        )
    })
    .await??;

    Ok(Json(DistributeResponse::from_report(&report)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NoGraph,
    Internal { message: String },
}

impl AppError {
    fn bad_request(message: &str) -> Self {
        AppError::BadRequest {
            message: message.to_string(),
        }
    }
}

impl From<FeedError> for AppError {
    fn from(e: FeedError) -> Self {
        AppError::Internal {
            message: format!("inventory feed: {e}"),
        }
    }
}

impl From<GraphError> for AppError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::InvalidParameter(_) => AppError::bad_request(NOT_POSITIVE),
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::InvalidParameter(msg) => AppError::BadRequest { message: msg },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<RebalanceError> for AppError {
    fn from(e: RebalanceError) -> Self {
        match e {
            RebalanceError::InvalidParameter(_) => AppError::bad_request(NEGATIVE_NUMBERS),
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal {
            message: format!("worker task failed: {e}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => {
                warn!(%message, "Rejected request");
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::NoGraph => (StatusCode::CONFLICT, NO_GRAPH.to_string()),
            AppError::Internal { message } => {
                error!(%message, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, APOLOGY.to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;
    use crate::gbfs::{FeedSource, SnapshotFeed};
    use crate::geocode::{GeocoderSource, StaticGeocoder};
    use crate::graph::{DEFAULT_MAX_DISTANCE_M, GraphConfig};
    use crate::planner::RouteConfig;
    use serde_json::json;

    const INFORMATION: &str = r#"{"data": {"stations": [
        {"station_id": 1, "address": "Carrer A", "lat": 41.3980, "lon": 2.1800, "capacity": 10},
        {"station_id": 2, "address": "Carrer B", "lat": 41.3980, "lon": 2.1850, "capacity": 10},
        {"station_id": 3, "address": "Carrer C", "lat": 41.4100, "lon": 2.2200, "capacity": 10}
    ]}}"#;

    const STATUS: &str = r#"{"data": {"stations": [
        {"station_id": 1, "num_bikes_available": 0, "num_docks_available": 10},
        {"station_id": 2, "num_bikes_available": 10, "num_docks_available": 0},
        {"station_id": 3, "num_bikes_available": 5, "num_docks_available": 5}
    ]}}"#;

    /// State over a three-station snapshot: 1 and 2 about 420 m apart,
    /// 3 several kilometres away.
    fn test_state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("station_information.json"), INFORMATION).unwrap();
        std::fs::write(dir.path().join("station_status.json"), STATUS).unwrap();

        let geocoder = StaticGeocoder::new()
            .with("Home", Coordinate::new(41.3981, 2.1801))
            .with("Work", Coordinate::new(41.3979, 2.1849))
            .with("Beach", Coordinate::new(41.4101, 2.2201));

        let state = AppState::new(
            FeedSource::Snapshot(SnapshotFeed::new(dir.path())),
            GeocoderSource::Static(geocoder),
            GraphConfig::default(),
            RouteConfig::default(),
        );
        (dir, state)
    }

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    fn graph_body(distance: serde_json::Value) -> Option<Json<GraphRequest>> {
        Some(Json(GraphRequest {
            distance: Some(distance),
        }))
    }

    fn trip(origin: &str, destination: &str) -> Query<RouteRequest> {
        Query(RouteRequest {
            origin: origin.to_string(),
            destination: destination.to_string(),
        })
    }

    fn minimums(bikes: &str, docks: &str) -> Query<DistributeRequest> {
        Query(DistributeRequest {
            min_bikes: Some(bikes.to_string()),
            min_docks: Some(docks.to_string()),
        })
    }

    #[tokio::test]
    async fn commands_need_a_graph() {
        let (_dir, state) = test_state();

        let err = nodes(State(state.clone())).await.unwrap_err();
        assert!(matches!(err, AppError::NoGraph));
        assert_eq!(status_of(err), StatusCode::CONFLICT);

        assert!(route(State(state.clone()), trip("Home", "Work")).await.is_err());
        assert!(distribute(State(state), minimums("1", "1")).await.is_err());
    }

    #[tokio::test]
    async fn graph_distance_is_validated() {
        let (_dir, state) = test_state();

        let err = build_graph(State(state.clone()), graph_body(json!("far")))
            .await
            .unwrap_err();
        assert!(matches!(&err, AppError::BadRequest { message } if message == NOT_A_NUMBER));

        let err = build_graph(State(state.clone()), graph_body(json!(-5)))
            .await
            .unwrap_err();
        assert!(matches!(&err, AppError::BadRequest { message } if message == NOT_POSITIVE));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);

        assert!(state.session().await.is_none());
    }

    #[tokio::test]
    async fn builds_graph_and_reports_counts() {
        let (_dir, state) = test_state();

        let Json(built) = build_graph(State(state.clone()), None).await.unwrap();
        assert_eq!(built.distance, DEFAULT_MAX_DISTANCE_M);
        assert_eq!((built.nodes, built.edges, built.components), (3, 1, 2));

        let Json(count) = components(State(state.clone())).await.unwrap();
        assert_eq!(count.message, "Number of connected components: 2");

        let Json(plot) = plot_graph(State(state.clone())).await.unwrap();
        assert_eq!(plot.nodes.len(), 3);
        assert_eq!(plot.edges.len(), 1);

        // A smaller threshold replaces the session.
        let Json(built) = build_graph(State(state.clone()), graph_body(json!(100)))
            .await
            .unwrap();
        assert_eq!(built.edges, 0);
        let Json(count) = edges(State(state)).await.unwrap();
        assert_eq!(count.count, 0);
    }

    #[tokio::test]
    async fn routes_between_addresses() {
        let (_dir, state) = test_state();
        let Json(built) = build_graph(State(state.clone()), None).await.unwrap();
        assert_eq!(built.edges, 1);

        let Json(found) = route(State(state.clone()), trip("Home", "Work")).await.unwrap();
        assert!(found.minutes >= 0);
        assert_eq!(found.stations.len(), 2);
        assert!(found.message.starts_with("This route will take you"));

        let Json(apart) = route(State(state.clone()), trip("Home", "Beach")).await.unwrap();
        assert_eq!(apart.minutes, -1);

        let Json(unknown) = route(State(state), trip("Atlantis", "Work")).await.unwrap();
        assert_eq!(unknown.minutes, -1);
        assert!(unknown.message.contains("Atlantis"));
    }

    #[tokio::test]
    async fn valid_route_respects_availability() {
        let (_dir, state) = test_state();
        let Json(built) = build_graph(State(state.clone()), None).await.unwrap();
        assert_eq!(built.edges, 1);

        // Station 1 is empty and station 2 is full: Home -> Work picks up
        // at 2 and has nowhere to return the bike but 1.
        let Json(response) = valid_route(State(state), trip("Home", "Work")).await.unwrap();
        assert!(response.minutes >= 0);
        assert_eq!(response.stations.first().map(|s| s.as_str()), Some("2"));
        assert_eq!(response.stations.last().map(|s| s.as_str()), Some("1"));
    }

    #[tokio::test]
    async fn distribute_validates_and_balances() {
        let (_dir, state) = test_state();
        let Json(built) = build_graph(State(state.clone()), None).await.unwrap();
        assert_eq!(built.edges, 1);

        let err = distribute(State(state.clone()), minimums("two", "1"))
            .await
            .unwrap_err();
        assert!(matches!(&err, AppError::BadRequest { message } if message == NOT_TWO_NUMBERS));

        let err = distribute(State(state.clone()), minimums("-1", "1"))
            .await
            .unwrap_err();
        assert!(matches!(&err, AppError::BadRequest { message } if message == NEGATIVE_NUMBERS));

        let Json(zero) = distribute(State(state.clone()), minimums("0", "0")).await.unwrap();
        assert_eq!(zero.total_cost, 0.0);
        assert!(zero.max_transfer.is_none());

        let Json(balanced) = distribute(State(state), minimums("2", "2")).await.unwrap();
        assert!(balanced.feasible);
        let moved = balanced.max_transfer.unwrap();
        assert_eq!((moved.from.as_str(), moved.to.as_str(), moved.bikes), ("2", "1", 2));
        assert!(balanced.total_cost > 0.0);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::Internal {
            message: "connection refused".into(),
        };
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
