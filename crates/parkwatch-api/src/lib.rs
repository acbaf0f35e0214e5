pub mod client;
pub mod error;
mod retry;
pub mod types;

pub use client::ParkingApiClient;
pub use error::ApiError;
pub use types::{
    HealthStatus, JunctionStatus, MapData, ParkVehicleResult, ParkingStatus, Predictions,
    Recommendations, SystemStats,
};
