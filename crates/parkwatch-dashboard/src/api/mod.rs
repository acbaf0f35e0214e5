//! Page-facing HTTP surface.
//!
//! Successful responses are wrapped as `{data, meta}`, failures as
//! `{error: {code, message}, meta}`; `meta` carries the request ID.

mod dashboard;
mod location;
mod park;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::dashboard::{Dashboard, DashboardError};
use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
}

/// Envelope metadata shared by success and error bodies.
#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    fn stamped(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn json(request_id: RequestId, data: T) -> Json<Self> {
        let meta = ResponseMeta::stamped(request_id.0);
        Json(Self { data, meta })
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let error = ErrorBody {
            code: code.into(),
            message: message.into(),
        };
        Self {
            error,
            meta: ResponseMeta::stamped(request_id.into()),
        }
    }

    fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "empty_input" | "out_of_bounds" | "validation_error" => StatusCode::BAD_REQUEST,
            "geo_permission_denied" => StatusCode::FORBIDDEN,
            "geo_unavailable" => StatusCode::UNPROCESSABLE_ENTITY,
            "geo_timeout" => StatusCode::GATEWAY_TIMEOUT,
            // The parking backend, not this service, failed.
            "network_failure" | "bad_response" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    auto_refresh: bool,
}

pub(super) fn map_dashboard_error(request_id: RequestId, error: &DashboardError) -> ApiError {
    let code = error.code();
    tracing::warn!(error = %error, code, "dashboard action failed");
    ApiError::new(request_id.0, code, error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/dashboard", get(dashboard::get_dashboard))
        .route("/api/v1/visibility", post(dashboard::set_visibility))
        .route("/api/v1/location", post(location::search_location))
        .route("/api/v1/location/gps", post(location::locate_gps))
        .route("/api/v1/park", post(park::park_vehicle))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    ApiResponse::json(
        req_id,
        HealthData {
            status: "ok",
            auto_refresh: state.dashboard.orchestrator().is_running(),
        },
    )
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
