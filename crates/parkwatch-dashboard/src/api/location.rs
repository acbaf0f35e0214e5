use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use parkwatch_core::{GeoError, ResolvedLocation};
use serde::Deserialize;

use crate::gps::{GpsFix, StaticGpsProvider};
use crate::location::GpsResolution;
use crate::middleware::RequestId;

use super::{map_dashboard_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct LocationQuery {
    pub query: String,
}

pub(super) async fn search_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<LocationQuery>,
) -> Result<Json<ApiResponse<ResolvedLocation>>, ApiError> {
    match state.dashboard.search_location(&body.query).await {
        Ok(resolved) => Ok(ApiResponse::json(req_id, resolved)),
        Err(e) => Err(map_dashboard_error(req_id, &e)),
    }
}

/// Failure reported by the device instead of a fix.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(super) enum DeviceGpsError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl From<DeviceGpsError> for GeoError {
    fn from(value: DeviceGpsError) -> Self {
        match value {
            DeviceGpsError::PermissionDenied => GeoError::PermissionDenied,
            DeviceGpsError::PositionUnavailable => GeoError::PositionUnavailable,
            DeviceGpsError::Timeout => GeoError::Timeout,
        }
    }
}

/// Either a fix (`latitude`, `longitude`, optional `captured_at`) or an
/// `error` from the device's position API.
#[derive(Debug, Deserialize)]
pub(super) struct GpsRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub captured_at: Option<DateTime<Utc>>,
    pub error: Option<DeviceGpsError>,
}

pub(super) async fn locate_gps(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<GpsRequest>,
) -> Result<Json<ApiResponse<GpsResolution>>, ApiError> {
    let provider = match (body.error, body.latitude, body.longitude) {
        (Some(error), _, _) => StaticGpsProvider::failing(error.into()),
        (None, Some(latitude), Some(longitude)) => StaticGpsProvider::with_fix(GpsFix {
            latitude,
            longitude,
            captured_at: body.captured_at.unwrap_or_else(Utc::now),
        }),
        _ => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "latitude and longitude are required unless error is set",
            ));
        }
    };

    match state.dashboard.locate_gps(&provider).await {
        Ok(resolution) => Ok(ApiResponse::json(req_id, resolution)),
        Err(e) => Err(map_dashboard_error(req_id, &e)),
    }
}
