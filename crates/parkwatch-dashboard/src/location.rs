//! Session location state.
//!
//! [`LocationService`] is the only writer of the session's [`UserLocation`].
//! Readers hold a `watch::Receiver` and always see a complete location: every
//! successful resolution replaces it wholesale, and a failed one leaves it
//! untouched.

use std::sync::{Arc, Mutex, PoisonError};

use parkwatch_core::{
    nearest, parse_location, to_local_space, Confidence, Gazetteer, GeoError, LocalPoint,
    LocationError, NearestPlace, ResolvedLocation, UserLocation,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::watch;

use crate::gps::{acquire_position, GpsFix, GpsOptions, GpsProvider};
use crate::notify::Notifier;

/// Outcome of a GPS-driven location update.
#[derive(Debug, Clone, Serialize)]
pub struct GpsResolution {
    pub fix: GpsFix,
    /// The fix mapped into the local grid.
    pub local: LocalPoint,
    pub nearest: NearestPlace,
    pub location: UserLocation,
}

pub struct LocationService {
    gazetteer: Arc<Gazetteer>,
    sender: watch::Sender<UserLocation>,
    notifier: Notifier,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for LocationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationService")
            .field("places", &self.gazetteer.len())
            .field("current", &*self.sender.borrow())
            .finish_non_exhaustive()
    }
}

impl LocationService {
    /// Starts at the default city-centre location with an OS-seeded RNG.
    #[must_use]
    pub fn new(gazetteer: Arc<Gazetteer>, notifier: Notifier) -> Self {
        Self::with_rng(gazetteer, notifier, StdRng::from_os_rng())
    }

    /// Same as [`LocationService::new`] with a caller-supplied RNG for the
    /// estimated fallback.
    #[must_use]
    pub fn with_rng(gazetteer: Arc<Gazetteer>, notifier: Notifier, rng: StdRng) -> Self {
        let (sender, _) = watch::channel(UserLocation::default());
        Self {
            gazetteer,
            sender,
            notifier,
            rng: Mutex::new(rng),
        }
    }

    #[must_use]
    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    #[must_use]
    pub fn current(&self) -> UserLocation {
        self.sender.borrow().clone()
    }

    /// Read handle for units that depend on the location.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<UserLocation> {
        self.sender.subscribe()
    }

    /// Resolves free text and makes it the session location.
    ///
    /// # Errors
    ///
    /// [`LocationError::EmptyInput`] for blank input; the current location is
    /// kept.
    pub fn resolve_text(&self, input: &str) -> Result<ResolvedLocation, LocationError> {
        let resolved = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            parse_location(input, &self.gazetteer, &mut *rng)
        };

        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::debug!(error = %e, "location: rejected search input");
                self.notifier.error("Please enter a location");
                return Err(e);
            }
        };

        tracing::info!(
            name = %resolved.name,
            lat = resolved.lat,
            lng = resolved.lng,
            confidence = %resolved.confidence,
            "location: resolved search input"
        );

        let message = resolved.message();
        match resolved.confidence {
            Confidence::Exact | Confidence::Coordinate => self.notifier.success(message),
            Confidence::Partial => self.notifier.info(message),
            Confidence::Estimated => self.notifier.warning(message),
        }

        self.sender.send_replace(resolved.clone().into_user_location());
        Ok(resolved)
    }

    /// Acquires a GPS fix and makes its local image the session location,
    /// named after the closest known place.
    ///
    /// # Errors
    ///
    /// Any [`GeoError`] from acquisition; the current location is kept.
    pub async fn locate_gps<P>(
        &self,
        provider: &P,
        options: GpsOptions,
    ) -> Result<GpsResolution, GeoError>
    where
        P: GpsProvider + ?Sized,
    {
        let fix = match acquire_position(provider, options).await {
            Ok(fix) => fix,
            Err(e) => {
                tracing::warn!(error = %e, code = e.code(), "location: gps acquisition failed");
                self.notifier.error(gps_failure_message(e));
                return Err(e);
            }
        };

        let local = to_local_space(fix.latitude, fix.longitude);
        let place = nearest(&self.gazetteer, local);
        let location = UserLocation {
            lat: local.lat,
            lng: local.lng,
            name: place.name.clone(),
        };

        tracing::info!(
            gps_lat = fix.latitude,
            gps_lng = fix.longitude,
            lat = local.lat,
            lng = local.lng,
            nearest = %place.name,
            "location: gps fix mapped"
        );
        self.notifier
            .success(format!("Location detected near {}", place.name));

        self.sender.send_replace(location.clone());
        Ok(GpsResolution {
            fix,
            local,
            nearest: place,
            location,
        })
    }
}

fn gps_failure_message(error: GeoError) -> &'static str {
    match error {
        GeoError::PermissionDenied => "Location access denied",
        GeoError::PositionUnavailable => "Location information unavailable",
        GeoError::Timeout => "Location request timed out",
    }
}
