use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use fitplan_core::model::{MealPlanRequest, Plan, WorkoutPlanRequest};
use fitplan_core::render::RenderOptions;
use fitplan_core::{DayRegeneration, GenerationOutcome, PlanError, PlanService};
use fitplan_db::models::{PlanKind, PlanVersion};

type AppState = Arc<PlanService>;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "not_found",
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_input",
            message: msg.into(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(err: PlanError) -> Self {
        let status = match &err {
            PlanError::Input(_) => StatusCode::BAD_REQUEST,
            PlanError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PlanError::Policy { .. } => StatusCode::CONFLICT,
            PlanError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlanError::Generator { .. } => StatusCode::BAD_GATEWAY,
            PlanError::GeneratorUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message, "code": self.code });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct VersionSummary {
    pub version: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&PlanVersion> for VersionSummary {
    fn from(v: &PlanVersion) -> Self {
        Self {
            version: v.version,
            active: v.active,
            created_at: v.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LatestResponse {
    #[serde(flatten)]
    pub version: VersionSummary,
    pub plan: Plan,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(service: AppState) -> Router {
    Router::new()
        .route("/api/users/{user_id}/plans/meal", post(generate_meal))
        .route("/api/users/{user_id}/plans/meal/days/{day}", post(regenerate_day))
        .route("/api/users/{user_id}/plans/workout", post(generate_workout))
        .route("/api/users/{user_id}/plans/{kind}/latest", get(latest))
        .route("/api/users/{user_id}/plans/{kind}/history", get(history))
        .route("/api/users/{user_id}/plans/{kind}/document", get(document))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(service: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(service);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("fitplan serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("fitplan serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn parse_kind(kind: &str) -> Result<PlanKind, AppError> {
    kind.parse()
        .map_err(|e: fitplan_db::models::PlanKindParseError| AppError::bad_request(e.to_string()))
}

/// 201 when the plan was stored, 200 when it is returned unsaved.
fn outcome_response(outcome: GenerationOutcome) -> axum::response::Response {
    let status = if outcome.persisted() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(outcome)).into_response()
}

async fn generate_meal(
    State(service): State<AppState>,
    Path(user_id): Path<i64>,
    body: Result<Json<MealPlanRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(request) = body?;
    let outcome = service.generate_meal_plan(user_id, &request).await?;
    Ok(outcome_response(outcome))
}

async fn regenerate_day(
    State(service): State<AppState>,
    Path((user_id, day)): Path<(i64, u32)>,
    body: Result<Json<MealPlanRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(request) = body?;
    let regen: DayRegeneration = service.regenerate_meal_day(user_id, day, &request).await?;
    let status = if regen.persisted() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(regen)).into_response())
}

async fn generate_workout(
    State(service): State<AppState>,
    Path(user_id): Path<i64>,
    body: Result<Json<WorkoutPlanRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(request) = body?;
    let outcome = service.generate_workout_plan(user_id, &request).await?;
    Ok(outcome_response(outcome))
}

async fn latest(
    State(service): State<AppState>,
    Path((user_id, kind)): Path<(i64, String)>,
) -> Result<axum::response::Response, AppError> {
    let kind = parse_kind(&kind)?;
    let (record, plan) = service
        .latest(user_id, kind)
        .await?
        .ok_or_else(|| AppError::not_found(format!("no {kind} plan for user {user_id}")))?;

    Ok(Json(LatestResponse {
        version: VersionSummary::from(&record),
        plan,
    })
    .into_response())
}

async fn history(
    State(service): State<AppState>,
    Path((user_id, kind)): Path<(i64, String)>,
) -> Result<axum::response::Response, AppError> {
    let kind = parse_kind(&kind)?;
    let versions = service.history(user_id, kind).await?;
    let summaries: Vec<VersionSummary> = versions.iter().map(VersionSummary::from).collect();
    Ok(Json(summaries).into_response())
}

async fn document(
    State(service): State<AppState>,
    Path((user_id, kind)): Path<(i64, String)>,
) -> Result<axum::response::Response, AppError> {
    let kind = parse_kind(&kind)?;
    let doc = service
        .render_latest(user_id, kind, &RenderOptions::default())
        .await?
        .ok_or_else(|| AppError::not_found(format!("no {kind} plan for user {user_id}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
            (
                header::HeaderName::from_static("x-page-count"),
                doc.page_count().to_string(),
            ),
        ],
        doc.to_text(),
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
