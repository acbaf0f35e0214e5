//! Response shapes of the parking backend.
//!
//! The backend is loose about optional fields, so most fields default when
//! absent rather than failing the whole feed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStats {
    pub total_spots: u32,
    pub available_spots: u32,
    pub occupied_spots: u32,
    pub occupancy_rate: f64,
    pub active_junctions: u32,
    pub vehicles_parked_today: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkingLot {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub capacity: u32,
    pub occupied: u32,
    pub available: u32,
    pub price_per_hour: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkingStatus {
    pub parking_lots: Vec<ParkingLot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recommendation {
    pub lot_id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub distance: f64,
    pub available_spots: u32,
    pub price_per_hour: Option<f64>,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recommendations {
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Junction {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub traffic_level: String,
    pub signal_timing: u32,
    pub wait_time: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JunctionStatus {
    pub junctions: Vec<Junction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prediction {
    pub lot_id: String,
    pub name: String,
    pub hour: u8,
    pub predicted_occupancy: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Predictions {
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapMarker {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapData {
    pub parking_lots: Vec<MapMarker>,
    pub junctions: Vec<MapMarker>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ParkVehicleRequest<'a> {
    pub destination: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkVehicleResult {
    pub success: bool,
    pub message: String,
    pub lot_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let stats: SystemStats =
            serde_json::from_value(serde_json::json!({ "total_spots": 120 })).expect("parse");
        assert_eq!(stats.total_spots, 120);
        assert_eq!(stats.available_spots, 0);
        assert!(stats.occupancy_rate.abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let status: ParkingStatus = serde_json::from_value(serde_json::json!({
            "parking_lots": [{ "id": "A", "name": "Lot A", "capacity": 50, "zone": "north" }],
            "generated_at": "2026-10-16T08:00:00Z"
        }))
        .expect("parse");
        assert_eq!(status.parking_lots.len(), 1);
        assert_eq!(status.parking_lots[0].capacity, 50);
    }

    #[test]
    fn park_request_serializes_destination() {
        let json = serde_json::to_value(ParkVehicleRequest {
            destination: "mall",
        })
        .expect("serialize");
        assert_eq!(json, serde_json::json!({ "destination": "mall" }));
    }
}
