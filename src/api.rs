//! HTTP surface: predict, flag and health endpoints plus OpenAPI docs.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::error::PredictionError;
use crate::flagging::{FlagLog, FlagOption, FlagRecord};
use crate::highlight::{self, HighlightEntity, HighlightedText};
use crate::ml::{ModelVariant, PredictionClient};
use crate::prediction::Label;

pub struct AppState {
    pub client: PredictionClient,
    pub flags: FlagLog,
}

#[derive(OpenApi)]
#[openapi(
    paths(predict, flag, health),
    components(
        schemas(
            PredictRequest,
            PredictResponse,
            FlagRequest,
            FlagResponse,
            HealthResponse,
            ErrorBody,
            HighlightedText,
            HighlightEntity,
            Label,
            ModelVariant,
            FlagOption
        )
    ),
    tags(
        (name = "review", description = "Review highlighting API")
    )
)]
pub struct ApiDoc;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/predict", post(predict))
        .route("/flag", post(flag))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        let message = msg.into();
        tracing::warn!("Bad request: {}", message);
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        let message = msg.into();
        tracing::error!("Internal error: {}", message);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: "internal error".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        if let PredictionError::ClientBuild(_) = err {
            return Self::internal(err.to_string());
        }
        tracing::error!(error = %err, "prediction failed");
        let code = if err.is_unavailable() {
            "PREDICTION_SERVICE_UNAVAILABLE"
        } else {
            "PREDICTION_CONTRACT_VIOLATION"
        };
        Self {
            status: StatusCode::BAD_GATEWAY,
            code,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PredictRequest {
    pub review_text: String,
    #[serde(default)]
    pub model_variant: Option<ModelVariant>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PredictResponse {
    /// Opaque identifier, echoed back when flagging.
    pub prediction_id: String,
    pub highlighted: HighlightedText,
    pub summary: String,
}

#[utoipa::path(
    post,
    path = "/predict",
    tag = "review",
    request_body = PredictRequest,
    responses(
        (status = 200, description = "Highlighted review", body = PredictResponse),
        (status = 400, description = "Empty or malformed review request", body = ErrorBody),
        (status = 502, description = "Prediction service failed", body = ErrorBody)
    )
)]
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(req) = payload?;
    if req.review_text.trim().is_empty() {
        return Err(ApiError::bad_request("review_text must not be empty"));
    }

    let prediction = state
        .client
        .predict_with_variant(&req.review_text, req.model_variant)
        .await?;

    let highlighted = highlight::render(&req.review_text, &prediction);
    let summary = highlight::summary_text(&prediction);
    let prediction_id = Uuid::new_v4().to_string();

    tracing::info!(%prediction_id, entities = highlighted.entities.len(), "review highlighted");

    Ok(Json(PredictResponse {
        prediction_id,
        highlighted,
        summary,
    }))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlagRequest {
    /// Field values as displayed to the user.
    pub fields: Vec<String>,
    pub option: FlagOption,
    #[serde(default)]
    pub prediction_id: Option<String>,
    /// Position of the flagged sample in the displayed list.
    #[serde(default)]
    pub flag_index: Option<usize>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FlagResponse {
    pub flagged_count: usize,
}

#[utoipa::path(
    post,
    path = "/flag",
    tag = "review",
    request_body = FlagRequest,
    responses(
        (status = 200, description = "Flag recorded", body = FlagResponse),
        (status = 400, description = "Malformed flag request", body = ErrorBody),
        (status = 500, description = "Flag log unavailable", body = ErrorBody)
    )
)]
pub async fn flag(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FlagRequest>, JsonRejection>,
) -> Result<Json<FlagResponse>, ApiError> {
    let Json(req) = payload?;
    let mut record = FlagRecord::new(req.fields, req.option);
    record.prediction_id = req.prediction_id;
    record.flag_index = req.flag_index;
    record.username = req.username;

    let flagged_count = state
        .flags
        .append(&record)
        .await
        .map_err(|e| ApiError::internal(format!("{:#}", e)))?;

    Ok(Json(FlagResponse { flagged_count }))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "review",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
