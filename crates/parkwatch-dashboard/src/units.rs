//! Refresh units: one independent fetch-and-render task per dashboard section.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use parkwatch_api::{ApiError, ParkingApiClient};
use parkwatch_core::UserLocation;
use tokio::sync::watch;

use crate::view::{MapView, RecommendationsView, SectionId, ViewHandle};

/// Everything a unit may touch. Units share nothing mutable with each other
/// apart from their own section of the view; the user location is read-only.
#[derive(Debug, Clone)]
pub struct UnitContext {
    pub api: ParkingApiClient,
    pub view: ViewHandle,
    pub location: watch::Receiver<UserLocation>,
}

impl UnitContext {
    /// Snapshot of the current user location. The borrow is released
    /// immediately so it is never held across an await.
    #[must_use]
    pub fn current_location(&self) -> UserLocation {
        self.location.borrow().clone()
    }
}

pub trait RefreshUnit: Send + Sync {
    fn name(&self) -> &'static str;

    fn section(&self) -> SectionId;

    /// Whether the unit's output depends on the user location.
    fn reads_location(&self) -> bool {
        false
    }

    /// Fetches the unit's data and renders it into its section.
    ///
    /// Failure handling belongs to the caller: an `Err` leaves the section's
    /// previous data in place.
    fn run<'a>(&'a self, ctx: &'a UnitContext) -> BoxFuture<'a, Result<(), ApiError>>;
}

#[derive(Debug, Default)]
pub struct SystemStatsUnit;

impl RefreshUnit for SystemStatsUnit {
    fn name(&self) -> &'static str {
        "system-stats"
    }

    fn section(&self) -> SectionId {
        SectionId::SystemStats
    }

    fn run<'a>(&'a self, ctx: &'a UnitContext) -> BoxFuture<'a, Result<(), ApiError>> {
        async move {
            let stats = ctx.api.system_stats().await?;
            ctx.view.update(|v| v.system_stats.render(stats));
            Ok(())
        }
        .boxed()
    }
}

#[derive(Debug, Default)]
pub struct ParkingStatusUnit;

impl RefreshUnit for ParkingStatusUnit {
    fn name(&self) -> &'static str {
        "parking-status"
    }

    fn section(&self) -> SectionId {
        SectionId::ParkingStatus
    }

    fn run<'a>(&'a self, ctx: &'a UnitContext) -> BoxFuture<'a, Result<(), ApiError>> {
        async move {
            let status = ctx.api.parking_status().await?;
            ctx.view.update(|v| v.parking_status.render(status));
            Ok(())
        }
        .boxed()
    }
}

#[derive(Debug, Default)]
pub struct RecommendationsUnit;

impl RefreshUnit for RecommendationsUnit {
    fn name(&self) -> &'static str {
        "recommendations"
    }

    fn section(&self) -> SectionId {
        SectionId::Recommendations
    }

    fn reads_location(&self) -> bool {
        true
    }

    fn run<'a>(&'a self, ctx: &'a UnitContext) -> BoxFuture<'a, Result<(), ApiError>> {
        async move {
            let location = ctx.current_location();
            let items = ctx.api.recommendations(location.point()).await?;
            ctx.view
                .update(|v| v.recommendations.render(RecommendationsView { location, items }));
            Ok(())
        }
        .boxed()
    }
}

#[derive(Debug, Default)]
pub struct JunctionStatusUnit;

impl RefreshUnit for JunctionStatusUnit {
    fn name(&self) -> &'static str {
        "junction-status"
    }

    fn section(&self) -> SectionId {
        SectionId::Junctions
    }

    fn run<'a>(&'a self, ctx: &'a UnitContext) -> BoxFuture<'a, Result<(), ApiError>> {
        async move {
            let junctions = ctx.api.junction_status().await?;
            ctx.view.update(|v| v.junctions.render(junctions));
            Ok(())
        }
        .boxed()
    }
}

#[derive(Debug, Default)]
pub struct PredictionsUnit;

impl RefreshUnit for PredictionsUnit {
    fn name(&self) -> &'static str {
        "predictions"
    }

    fn section(&self) -> SectionId {
        SectionId::Predictions
    }

    fn run<'a>(&'a self, ctx: &'a UnitContext) -> BoxFuture<'a, Result<(), ApiError>> {
        async move {
            let predictions = ctx.api.predictions().await?;
            ctx.view.update(|v| v.predictions.render(predictions));
            Ok(())
        }
        .boxed()
    }
}

/// Map markers plus the user's own marker at the current location.
#[derive(Debug, Default)]
pub struct MapDataUnit;

impl RefreshUnit for MapDataUnit {
    fn name(&self) -> &'static str {
        "map-data"
    }

    fn section(&self) -> SectionId {
        SectionId::Map
    }

    fn reads_location(&self) -> bool {
        true
    }

    fn run<'a>(&'a self, ctx: &'a UnitContext) -> BoxFuture<'a, Result<(), ApiError>> {
        async move {
            let user = ctx.current_location();
            let markers = ctx.api.map_data().await?;
            ctx.view.update(|v| v.map.render(MapView { user, markers }));
            Ok(())
        }
        .boxed()
    }
}

/// The six dashboard units in display order.
#[must_use]
pub fn default_units() -> Vec<Arc<dyn RefreshUnit>> {
    vec![
        Arc::new(SystemStatsUnit),
        Arc::new(ParkingStatusUnit),
        Arc::new(RecommendationsUnit),
        Arc::new(JunctionStatusUnit),
        Arc::new(PredictionsUnit),
        Arc::new(MapDataUnit),
    ]
}
