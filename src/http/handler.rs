//! HTTP handlers for the session API

use crate::genai::ImageSize;
use crate::playback::StepOutcome;
use crate::scenario::{ScenarioError, ScenarioName};
use crate::session::{Session, SessionError, SessionView, TENANTS};
use crate::studio::StudioError;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::error;

pub type SharedSession = Arc<Mutex<Session>>;

/// Error body returned by every handler
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        let status = match &e {
            SessionError::UnknownTenant(_) => StatusCode::BAD_REQUEST,
            SessionError::Locked => StatusCode::CONFLICT,
            SessionError::Studio(StudioError::EmptyPrompt) => StatusCode::BAD_REQUEST,
            SessionError::Studio(StudioError::Busy) => StatusCode::CONFLICT,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<ScenarioError> for ApiError {
    fn from(e: ScenarioError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: e.to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct TenantRequest {
    pub tenant: String,
}

#[derive(Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Deserialize)]
pub struct StartRequest {
    pub scenario: String,
}

#[derive(Deserialize)]
pub struct ImageRequestBody {
    pub prompt: String,
    #[serde(default)]
    pub size: ImageSize,
}

/// Outcome of a playback operation plus the resulting view
#[derive(Serialize)]
pub struct StepResponse {
    outcome: &'static str,
    position: Option<usize>,
    session: SessionView,
}

impl StepResponse {
    fn new(outcome: StepOutcome, session: SessionView) -> Self {
        let (outcome, position) = match outcome {
            StepOutcome::Applied(p) => ("applied", Some(p)),
            StepOutcome::Completed => ("completed", None),
            StepOutcome::Ignored => ("ignored", None),
        };
        Self {
            outcome,
            position,
            session,
        }
    }
}

pub async fn status_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
    }))
}

pub async fn tenants_handler() -> impl IntoResponse {
    Json(json!({ "tenants": TENANTS }))
}

pub async fn session_handler(State(session): State<SharedSession>) -> Json<SessionView> {
    Json(session.lock().await.view())
}

pub async fn tenant_handler(
    State(session): State<SharedSession>,
    Json(payload): Json<TenantRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let mut guard = session.lock().await;
    guard.select_tenant(&payload.tenant)?;
    Ok(Json(guard.view()))
}

pub async fn query_handler(
    State(session): State<SharedSession>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let mut guard = session.lock().await;
    guard.set_query(&payload.query)?;
    Ok(Json(guard.view()))
}

pub async fn start_handler(
    State(session): State<SharedSession>,
    Json(payload): Json<StartRequest>,
) -> Result<Json<StepResponse>, ApiError> {
    let scenario: ScenarioName = payload.scenario.parse()?;
    let mut guard = session.lock().await;
    let outcome = guard.start(scenario);
    Ok(Json(StepResponse::new(outcome, guard.view())))
}

pub async fn advance_handler(State(session): State<SharedSession>) -> Json<StepResponse> {
    let mut guard = session.lock().await;
    let outcome = guard.advance();
    Json(StepResponse::new(outcome, guard.view()))
}

pub async fn reset_handler(State(session): State<SharedSession>) -> Json<SessionView> {
    let mut guard = session.lock().await;
    guard.reset();
    Json(guard.view())
}

/// Generate an image without holding the session during the provider call.
///
/// The call and its bookkeeping run on a spawned task so the studio is
/// released even if the client goes away mid-request.
pub async fn image_handler(
    State(session): State<SharedSession>,
    Json(payload): Json<ImageRequestBody>,
) -> Result<Response, ApiError> {
    let (request, model) = {
        let mut guard = session.lock().await;
        let request = guard.begin_image(&payload.prompt, payload.size)?;
        (request, guard.model())
    };

    let task_session = session.clone();
    let task = tokio::spawn(async move {
        let outcome = model.generate_image(&request.prompt, request.size).await;
        let failed = outcome.is_err();

        let mut guard = task_session.lock().await;
        guard.finish_image(outcome);
        (failed, guard.studio().image().map(str::to_string))
    });

    let (failed, image) = task.await.map_err(|e| {
        error!("Image task failed: {}", e);
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: crate::studio::IMAGE_ERROR_LINE.to_string(),
        }
    })?;

    if failed {
        return Ok((
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": crate::studio::IMAGE_ERROR_LINE, "image": null })),
        )
            .into_response());
    }
    Ok(Json(json!({ "image": image })).into_response())
}

pub async fn image_get_handler(State(session): State<SharedSession>) -> impl IntoResponse {
    let guard = session.lock().await;
    Json(json!({ "image": guard.studio().image() }))
}
