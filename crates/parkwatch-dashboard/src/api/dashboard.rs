use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::dashboard::DashboardSnapshot;
use crate::middleware::RequestId;
use crate::orchestrator::{RefreshReport, Visibility};

use super::{ApiResponse, AppState};

pub(super) async fn get_dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<DashboardSnapshot>> {
    ApiResponse::json(req_id, state.dashboard.snapshot())
}

#[derive(Debug, Deserialize)]
pub(super) struct VisibilityRequest {
    pub visible: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct VisibilityData {
    pub auto_refresh: bool,
    /// Present when becoming visible triggered an immediate refresh.
    pub refresh: Option<RefreshReport>,
}

pub(super) async fn set_visibility(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<VisibilityRequest>,
) -> Json<ApiResponse<VisibilityData>> {
    let visibility = if body.visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    let refresh = state.dashboard.on_visibility_change(visibility).await;

    ApiResponse::json(
        req_id,
        VisibilityData {
            auto_refresh: state.dashboard.orchestrator().is_running(),
            refresh,
        },
    )
}
