//! GPS position acquisition.
//!
//! A [`GpsProvider`] yields raw fixes; [`acquire_position`] enforces the
//! timeout and the maximum fix age on top of it. Failures are reported once
//! and never retried.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use parkwatch_core::{AppConfig, GeoError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: DateTime<Utc>,
}

impl GpsFix {
    /// A fix captured now.
    #[must_use]
    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            captured_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpsOptions {
    pub timeout: Duration,
    /// Oldest cached fix a provider may return.
    pub maximum_age: Duration,
}

impl Default for GpsOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(60),
        }
    }
}

impl GpsOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: config.gps_timeout(),
            maximum_age: config.gps_max_age(),
        }
    }
}

pub trait GpsProvider: Send + Sync {
    fn current_position(&self, options: GpsOptions) -> BoxFuture<'_, Result<GpsFix, GeoError>>;
}

/// Provider that always answers with the same outcome.
///
/// Backs the `locate` CLI command and the page's GPS route, where the device
/// position arrives as input rather than from local hardware.
#[derive(Debug, Clone, Copy)]
pub struct StaticGpsProvider {
    outcome: Result<GpsFix, GeoError>,
}

impl StaticGpsProvider {
    #[must_use]
    pub fn fix(latitude: f64, longitude: f64) -> Self {
        Self {
            outcome: Ok(GpsFix::now(latitude, longitude)),
        }
    }

    #[must_use]
    pub fn with_fix(fix: GpsFix) -> Self {
        Self { outcome: Ok(fix) }
    }

    #[must_use]
    pub fn failing(error: GeoError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

impl GpsProvider for StaticGpsProvider {
    fn current_position(&self, _options: GpsOptions) -> BoxFuture<'_, Result<GpsFix, GeoError>> {
        futures::future::ready(self.outcome).boxed()
    }
}

/// Requests one fix from `provider`.
///
/// # Errors
///
/// - [`GeoError::Timeout`] if no fix arrives within `options.timeout`.
/// - [`GeoError::PositionUnavailable`] if the fix is older than
///   `options.maximum_age` or carries non-finite coordinates.
/// - Any error reported by the provider itself.
pub async fn acquire_position<P>(provider: &P, options: GpsOptions) -> Result<GpsFix, GeoError>
where
    P: GpsProvider + ?Sized,
{
    let fix = tokio::time::timeout(options.timeout, provider.current_position(options))
        .await
        .map_err(|_elapsed| GeoError::Timeout)??;

    if !fix.latitude.is_finite() || !fix.longitude.is_finite() {
        tracing::warn!(
            latitude = fix.latitude,
            longitude = fix.longitude,
            "gps: fix has non-finite coordinates"
        );
        return Err(GeoError::PositionUnavailable);
    }

    // A fix stamped in the future counts as fresh.
    let age = (Utc::now() - fix.captured_at).to_std().unwrap_or_default();
    if age > options.maximum_age {
        tracing::warn!(
            age_secs = age.as_secs(),
            max_age_secs = options.maximum_age.as_secs(),
            "gps: fix is stale"
        );
        return Err(GeoError::PositionUnavailable);
    }

    Ok(fix)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PendingProvider;

    impl GpsProvider for PendingProvider {
        fn current_position(
            &self,
            _options: GpsOptions,
        ) -> BoxFuture<'_, Result<GpsFix, GeoError>> {
            futures::future::pending().boxed()
        }
    }

    #[tokio::test]
    async fn returns_fresh_fix() {
        let provider = StaticGpsProvider::fix(40.01, -73.99);
        let fix = acquire_position(&provider, GpsOptions::default())
            .await
            .expect("fresh fix");
        assert!((fix.latitude - 40.01).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let provider = StaticGpsProvider::failing(GeoError::PermissionDenied);
        let err = acquire_position(&provider, GpsOptions::default())
            .await
            .expect_err("denied");
        assert_eq!(err, GeoError::PermissionDenied);
    }

    #[tokio::test]
    async fn stale_fix_is_unavailable() {
        let fix = GpsFix {
            latitude: 40.0,
            longitude: -74.0,
            captured_at: Utc::now() - chrono::Duration::seconds(120),
        };
        let err = acquire_position(&StaticGpsProvider::with_fix(fix), GpsOptions::default())
            .await
            .expect_err("stale");
        assert_eq!(err, GeoError::PositionUnavailable);
    }

    #[tokio::test]
    async fn non_finite_fix_is_unavailable() {
        let provider = StaticGpsProvider::fix(f64::NAN, -74.0);
        let err = acquire_position(&provider, GpsOptions::default())
            .await
            .expect_err("nan");
        assert_eq!(err, GeoError::PositionUnavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_provider_times_out() {
        let err = acquire_position(&PendingProvider, GpsOptions::default())
            .await
            .expect_err("should time out");
        assert_eq!(err, GeoError::Timeout);
        assert_eq!(err.code(), "geo_timeout");
    }

    #[test]
    fn options_follow_config_defaults() {
        let options = GpsOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::from_secs(60));
    }
}
