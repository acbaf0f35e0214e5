//! Rendered dashboard state.
//!
//! Each refresh unit owns one [`Section`]. A successful fetch replaces the
//! section's data; a failed one only sets its error, so the previously
//! rendered data stays visible next to the error.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use parkwatch_api::{JunctionStatus, MapData, ParkingStatus, Predictions, Recommendations, SystemStats};
use parkwatch_core::UserLocation;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    SystemStats,
    ParkingStatus,
    Recommendations,
    Junctions,
    Predictions,
    Map,
}

impl SectionId {
    pub const ALL: [SectionId; 6] = [
        SectionId::SystemStats,
        SectionId::ParkingStatus,
        SectionId::Recommendations,
        SectionId::Junctions,
        SectionId::Predictions,
        SectionId::Map,
    ];

    /// Human-readable label used in notifications.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SectionId::SystemStats => "system stats",
            SectionId::ParkingStatus => "parking status",
            SectionId::Recommendations => "recommendations",
            SectionId::Junctions => "junction status",
            SectionId::Predictions => "predictions",
            SectionId::Map => "map",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Section<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
        }
    }
}

impl<T> Section<T> {
    pub fn render(&mut self, data: T) {
        self.data = Some(data);
        self.error = None;
        self.updated_at = Some(Utc::now());
    }

    pub fn fail(&mut self, message: String) {
        self.error = Some(message);
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Recommendations together with the location they were computed for.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationsView {
    pub location: UserLocation,
    #[serde(flatten)]
    pub items: Recommendations,
}

/// Map markers plus the user's own marker.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub user: UserLocation,
    #[serde(flatten)]
    pub markers: MapData,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardView {
    pub system_stats: Section<SystemStats>,
    pub parking_status: Section<ParkingStatus>,
    pub recommendations: Section<RecommendationsView>,
    pub junctions: Section<JunctionStatus>,
    pub predictions: Section<Predictions>,
    pub map: Section<MapView>,
    /// Completion time of the last refresh cycle in which every unit settled.
    pub last_updated: Option<DateTime<Utc>>,
}

impl DashboardView {
    pub fn mark_failed(&mut self, id: SectionId, message: String) {
        match id {
            SectionId::SystemStats => self.system_stats.fail(message),
            SectionId::ParkingStatus => self.parking_status.fail(message),
            SectionId::Recommendations => self.recommendations.fail(message),
            SectionId::Junctions => self.junctions.fail(message),
            SectionId::Predictions => self.predictions.fail(message),
            SectionId::Map => self.map.fail(message),
        }
    }

    #[must_use]
    pub fn is_failed(&self, id: SectionId) -> bool {
        match id {
            SectionId::SystemStats => self.system_stats.is_error(),
            SectionId::ParkingStatus => self.parking_status.is_error(),
            SectionId::Recommendations => self.recommendations.is_error(),
            SectionId::Junctions => self.junctions.is_error(),
            SectionId::Predictions => self.predictions.is_error(),
            SectionId::Map => self.map.is_error(),
        }
    }
}

/// Shared handle to the rendered view. Locks are never held across an await.
#[derive(Debug, Clone, Default)]
pub struct ViewHandle(Arc<RwLock<DashboardView>>);

impl ViewHandle {
    pub fn update<R>(&self, f: impl FnOnce(&mut DashboardView) -> R) -> R {
        let mut view = self.0.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut view)
    }

    #[must_use]
    pub fn snapshot(&self) -> DashboardView {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
