//! The dashboard session: view, location state, orchestrator, and the
//! user-triggered actions that tie them together.

use std::sync::Arc;
use std::time::Duration;

use parkwatch_api::{ApiError, HealthStatus, ParkVehicleResult, ParkingApiClient};
use parkwatch_core::{
    AppConfig, ConfigError, Gazetteer, GeoError, LocationError, ResolvedLocation, UserLocation,
};
use serde::Serialize;
use thiserror::Error;

use crate::gps::{GpsOptions, GpsProvider};
use crate::location::{GpsResolution, LocationService};
use crate::notify::{Notification, Notifier};
use crate::orchestrator::{Orchestrator, RefreshReport, Visibility};
use crate::units::{default_units, RefreshUnit, UnitContext};
use crate::view::{DashboardView, SectionId, ViewHandle};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Geo(#[from] GeoError),
}

impl DashboardError {
    /// Stable machine-readable code, used in API error bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            DashboardError::Config(_) => "config_error",
            DashboardError::Api(e) => e.code(),
            DashboardError::Location(LocationError::EmptyInput) => "empty_input",
            DashboardError::Location(LocationError::OutOfBounds { .. }) => "out_of_bounds",
            DashboardError::Geo(e) => e.code(),
        }
    }
}

/// The configured gazetteer override, or the embedded table.
///
/// # Errors
///
/// [`ConfigError`] if the override cannot be read or fails validation.
pub fn load_gazetteer(config: &AppConfig) -> Result<Gazetteer, ConfigError> {
    match &config.gazetteer_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading gazetteer override");
            Gazetteer::load(path)
        }
        None => Gazetteer::embedded(),
    }
}

/// Everything the page shows, in one serializable value.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    #[serde(flatten)]
    pub view: DashboardView,
    pub location: UserLocation,
    pub auto_refresh: bool,
    pub notifications: Vec<Notification>,
}

/// Cheap to clone; clones share one session.
#[derive(Debug, Clone)]
pub struct Dashboard {
    api: ParkingApiClient,
    view: ViewHandle,
    notifier: Notifier,
    location: Arc<LocationService>,
    orchestrator: Orchestrator,
    gps_options: GpsOptions,
}

impl Dashboard {
    /// Builds a session from configuration: backend client, gazetteer
    /// (embedded unless overridden), and the six standard units.
    ///
    /// # Errors
    ///
    /// [`DashboardError::Api`] if the client cannot be built, or
    /// [`DashboardError::Config`] if the gazetteer file fails to load.
    pub fn from_config(config: &AppConfig) -> Result<Self, DashboardError> {
        let api = ParkingApiClient::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?
        .with_retry(config.api_max_retries, config.api_retry_backoff_ms);

        let gazetteer = load_gazetteer(config)?;
        let notifier = Notifier::default();
        let location = LocationService::new(Arc::new(gazetteer), notifier.clone());
        Ok(Self::new(
            api,
            location,
            notifier,
            default_units(),
            config.refresh_interval(),
            GpsOptions::from_config(config),
        ))
    }

    #[must_use]
    pub fn new(
        api: ParkingApiClient,
        location: LocationService,
        notifier: Notifier,
        units: Vec<Arc<dyn RefreshUnit>>,
        refresh_interval: Duration,
        gps_options: GpsOptions,
    ) -> Self {
        let view = ViewHandle::default();
        let ctx = UnitContext {
            api: api.clone(),
            view: view.clone(),
            location: location.subscribe(),
        };
        let orchestrator = Orchestrator::new(units, ctx, notifier.clone(), refresh_interval);
        Self {
            api,
            view,
            notifier,
            location: Arc::new(location),
            orchestrator,
            gps_options,
        }
    }

    #[must_use]
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    #[must_use]
    pub fn location(&self) -> UserLocation {
        self.location.current()
    }

    #[must_use]
    pub fn gps_options(&self) -> GpsOptions {
        self.gps_options
    }

    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            view: self.view.snapshot(),
            location: self.location.current(),
            auto_refresh: self.orchestrator.is_running(),
            notifications: self.notifier.recent(),
        }
    }

    pub async fn on_load(&self) -> RefreshReport {
        self.orchestrator.on_load().await
    }

    pub async fn on_visibility_change(&self, visibility: Visibility) -> Option<RefreshReport> {
        self.orchestrator.on_visibility_change(visibility).await
    }

    pub fn on_unload(&self) {
        self.orchestrator.on_unload();
    }

    /// Resolves search text into the session location, then refreshes the
    /// location-dependent sections.
    ///
    /// # Errors
    ///
    /// [`DashboardError::Location`] for blank input.
    pub async fn search_location(&self, input: &str) -> Result<ResolvedLocation, DashboardError> {
        let resolved = self.location.resolve_text(input)?;
        self.orchestrator.refresh_dependent().await;
        Ok(resolved)
    }

    /// Takes a GPS fix into the session location, then refreshes the
    /// location-dependent sections.
    ///
    /// # Errors
    ///
    /// [`DashboardError::Geo`] if no usable fix is obtained.
    pub async fn locate_gps<P>(&self, provider: &P) -> Result<GpsResolution, DashboardError>
    where
        P: GpsProvider + ?Sized,
    {
        let resolution = self.location.locate_gps(provider, self.gps_options).await?;
        self.orchestrator.refresh_dependent().await;
        Ok(resolution)
    }

    /// Asks the backend to park a vehicle near `destination`, then refreshes
    /// the occupancy sections.
    ///
    /// # Errors
    ///
    /// [`DashboardError::Location`] for a blank destination, or
    /// [`DashboardError::Api`] if the backend rejects the request.
    pub async fn park_vehicle(&self, destination: &str) -> Result<ParkVehicleResult, DashboardError> {
        let destination = destination.trim();
        if destination.is_empty() {
            self.notifier.error("Please enter a destination");
            return Err(LocationError::EmptyInput.into());
        }

        match self.api.park_vehicle(destination).await {
            Ok(result) => {
                tracing::info!(destination, lot_id = ?result.lot_id, "vehicle parked");
                let message = if result.message.is_empty() {
                    format!("Vehicle parked near {destination}")
                } else {
                    result.message.clone()
                };
                self.notifier.success(message);
                self.orchestrator
                    .refresh_sections(&[SectionId::ParkingStatus, SectionId::SystemStats])
                    .await;
                Ok(result)
            }
            Err(e) => {
                tracing::error!(error = %e, destination, "park-vehicle request failed");
                self.notifier.error(format!("Parking failed: {e}"));
                Err(e.into())
            }
        }
    }

    /// Probes the backend's health route.
    ///
    /// # Errors
    ///
    /// [`DashboardError::Api`] if the backend is unreachable or unhealthy.
    pub async fn backend_health(&self) -> Result<HealthStatus, DashboardError> {
        Ok(self.api.health().await?)
    }
}
