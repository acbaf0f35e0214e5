//! Parking operations dashboard: session state, periodic refresh of the
//! backend feeds, location search and GPS handling, and the page-facing
//! HTTP surface.

pub mod api;
pub mod dashboard;
pub mod gps;
pub mod location;
pub mod middleware;
pub mod notify;
pub mod orchestrator;
pub mod units;
pub mod view;

pub use api::{build_app, AppState};
pub use dashboard::{load_gazetteer, Dashboard, DashboardError, DashboardSnapshot};
pub use gps::{acquire_position, GpsFix, GpsOptions, GpsProvider, StaticGpsProvider};
pub use location::{GpsResolution, LocationService};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use orchestrator::{Orchestrator, RefreshReport, Visibility, DEFAULT_REFRESH_INTERVAL};
pub use units::{default_units, RefreshUnit, UnitContext};
pub use view::{DashboardView, Section, SectionId, ViewHandle};
