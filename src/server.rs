use axum::{
    extract::{Path, Query},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use chrono::Utc;
use hyper::Server;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::app::TrackingError;
use crate::constants::{BERTH_COUNT, CRANE_COUNT};
use crate::domain::{ContainerDraft, ContainerStatus};
use crate::wiring::AppContext;

type Ctx = Extension<Arc<AppContext>>;

/// Failure shapes of the HTTP surface. Anything unexpected becomes a generic 500.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl From<TrackingError> for ApiError {
    fn from(e: TrackingError) -> Self {
        match e {
            e if e.is_not_found() => ApiError::NotFound(e.to_string()),
            TrackingError::Storage(inner) => ApiError::Internal(inner.to_string()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

type ApiResult = Result<Json<serde_json::Value>, ApiError>;

fn ok(message: impl Into<String>, extra: serde_json::Value) -> ApiResult {
    let mut body = json!({ "success": true, "message": message.into() });
    if let (Some(map), serde_json::Value::Object(extra)) = (body.as_object_mut(), extra) {
        map.extend(extra);
    }
    Ok(Json(body))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "chancay-tracker",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::render().unwrap_or_default(),
    )
}

async fn status(Extension(ctx): Ctx) -> impl IntoResponse {
    let port = &ctx.config.port;
    Json(json!({
        "port": port.name,
        "country": port.country,
        "annual_capacity": port.annual_capacity,
        "cranes": CRANE_COUNT,
        "berths": BERTH_COUNT,
        "ai_enabled": ctx.config.llm.api_key.is_some(),
        "model": ctx.config.llm.model,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn overview(Extension(ctx): Ctx) -> impl IntoResponse {
    Json(ctx.analytics.port_overview().await)
}

#[derive(Debug, Deserialize)]
struct ContainerQuery {
    status: Option<String>,
}

async fn containers(Extension(ctx): Ctx, Query(query): Query<ContainerQuery>) -> ApiResult {
    let list = match query.status.as_deref() {
        Some(raw) => {
            let status = raw
                .parse::<ContainerStatus>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            ctx.tracking.containers_by_status(status).await
        }
        None => ctx.tracking.all_containers().await,
    };
    Ok(Json(json!(list)))
}

async fn priority_containers(Extension(ctx): Ctx) -> impl IntoResponse {
    Json(ctx.tracking.get_priority_containers().await)
}

async fn ships(Extension(ctx): Ctx) -> impl IntoResponse {
    Json(ctx.tracking.all_ships().await)
}

async fn ai_insights(Extension(ctx): Ctx) -> impl IntoResponse {
    Json(ctx.insights.generate_dashboard_insights().await)
}

async fn trade_corridor(Extension(ctx): Ctx) -> ApiResult {
    let insight = ctx
        .insights
        .analyze_trade_corridor()
        .await
        .ok_or_else(|| ApiError::Internal("trade corridor insight unavailable".to_string()))?;
    Ok(Json(json!(insight)))
}

async fn efficiency(Extension(ctx): Ctx) -> impl IntoResponse {
    Json(ctx.efficiency.calculate_daily_efficiency().await)
}

async fn dock(Extension(ctx): Ctx, Path(id): Path<String>) -> ApiResult {
    ctx.tracking.try_dock_container(&id).await?;
    ok(format!("Container {} docked", id), json!({}))
}

#[derive(Debug, Deserialize)]
struct ProgressBody {
    progress: i32,
}

async fn progress(Extension(ctx): Ctx, Path(id): Path<String>, Json(body): Json<ProgressBody>) -> ApiResult {
    let container = ctx
        .tracking
        .try_update_unloading_progress(&id, body.progress)
        .await?;
    ok(
        format!("Container {} at {}%", id, body.progress),
        json!({ "status": container.status() }),
    )
}

#[derive(Debug, Deserialize)]
struct CraneBody {
    container_id: String,
}

async fn assign_crane(Extension(ctx): Ctx, Json(body): Json<CraneBody>) -> ApiResult {
    let assignment = ctx.tracking.try_assign_crane(&body.container_id).await?;
    ok(
        format!(
            "{} assigned to container {}",
            assignment.crane_id, assignment.container_id
        ),
        json!({
            "crane_id": assignment.crane_id,
            "operation_id": assignment.operation.operation_id,
            "estimated_end_time": assignment.operation.estimated_end_time,
        }),
    )
}

async fn arrival(Extension(ctx): Ctx, Json(draft): Json<ContainerDraft>) -> ApiResult {
    let container = draft
        .build()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let container = ctx.tracking.try_process_arriving_container(container).await?;
    ok(
        format!("Container {} arriving", container.container_id),
        json!({}),
    )
}

pub fn create_server(ctx: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api/status", get(status))
        .route("/api/overview", get(overview))
        .route("/api/containers", get(containers))
        .route("/api/containers/priority", get(priority_containers))
        .route("/api/containers/arrivals", post(arrival))
        .route("/api/containers/:id/dock", post(dock))
        .route("/api/containers/:id/progress", post(progress))
        .route("/api/crane/assign", post(assign_crane))
        .route("/api/ships", get(ships))
        .route("/api/ai-insights", get(ai_insights))
        .route("/api/analytics/trade-corridor", get(trade_corridor))
        .route("/api/efficiency", get(efficiency))
        .layer(Extension(ctx))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the configured host and port
pub async fn start_server(ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", ctx.config.server.host, ctx.config.server.port).parse()?;
    let app = create_server(ctx);

    info!("HTTP server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
