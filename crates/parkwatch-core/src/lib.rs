pub mod app_config;
pub mod config;
pub mod error;
pub mod gazetteer;
pub mod geo;
pub mod location;
pub mod parser;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, GeoError, LocationError};
pub use gazetteer::{normalize_key, Gazetteer, GazetteerEntry};
pub use geo::{nearest, to_local_space, NearestPlace, CUSTOM_LOCATION_NAME};
pub use location::{Category, Confidence, LocalPoint, ResolvedLocation, UserLocation};
pub use parser::parse_location;
