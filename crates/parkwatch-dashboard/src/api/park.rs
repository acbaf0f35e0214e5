use axum::{extract::State, Extension, Json};
use parkwatch_api::ParkVehicleResult;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_dashboard_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ParkRequest {
    pub destination: String,
}

pub(super) async fn park_vehicle(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ParkRequest>,
) -> Result<Json<ApiResponse<ParkVehicleResult>>, ApiError> {
    match state.dashboard.park_vehicle(&body.destination).await {
        Ok(result) => Ok(ApiResponse::json(req_id, result)),
        Err(e) => Err(map_dashboard_error(req_id, &e)),
    }
}
