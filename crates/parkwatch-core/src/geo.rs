//! Mapping from real-world GPS degrees into the local grid, and
//! nearest-place snapping.
//!
//! The mapping is a fixed affine approximation centred on a single reference
//! point (40.0° N, 74.0° W → grid centre). It is not a geodesic projection.

use serde::Serialize;

use crate::gazetteer::Gazetteer;
use crate::location::{Category, LocalPoint, UserLocation, MAX_LAT, MAX_LNG, MIN_LAT, MIN_LNG};

pub const CUSTOM_LOCATION_NAME: &str = "Custom Location";

const REFERENCE_GPS_LAT: f64 = 40.0;
const REFERENCE_GPS_LNG: f64 = -74.0;
const LAT_SCALE: f64 = 20.0;
const LNG_SCALE: f64 = 15.0;

/// Converts a GPS fix into grid coordinates, clamped onto the grid.
#[must_use]
pub fn to_local_space(gps_lat: f64, gps_lng: f64) -> LocalPoint {
    let center = LocalPoint::city_center();
    let lat = (gps_lat - REFERENCE_GPS_LAT) * LAT_SCALE + center.lat;
    let lng = (gps_lng - REFERENCE_GPS_LNG) * LNG_SCALE + center.lng;
    LocalPoint::new(lat.clamp(MIN_LAT, MAX_LAT), lng.clamp(MIN_LNG, MAX_LNG))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestPlace {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub category: Category,
    pub distance: f64,
}

impl NearestPlace {
    #[must_use]
    pub fn point(&self) -> LocalPoint {
        LocalPoint::new(self.lat, self.lng)
    }

    #[must_use]
    pub fn into_user_location(self) -> UserLocation {
        UserLocation {
            lat: self.lat,
            lng: self.lng,
            name: self.name,
        }
    }
}

/// Finds the gazetteer entry closest to `point`.
///
/// Linear scan; on equal distances the entry seen first is kept. An empty
/// gazetteer yields a synthetic [`CUSTOM_LOCATION_NAME`] entry at `point`.
#[must_use]
pub fn nearest(gazetteer: &Gazetteer, point: LocalPoint) -> NearestPlace {
    let mut best = None;
    let mut best_distance = f64::INFINITY;

    for entry in gazetteer {
        let distance = point.distance_to(&entry.point());
        if distance < best_distance {
            best_distance = distance;
            best = Some(entry);
        }
    }

    match best {
        Some(entry) => NearestPlace {
            name: entry.key.clone(),
            lat: entry.lat,
            lng: entry.lng,
            category: entry.category,
            distance: best_distance,
        },
        None => NearestPlace {
            name: CUSTOM_LOCATION_NAME.to_string(),
            lat: point.lat,
            lng: point.lng,
            category: Category::Custom,
            distance: 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::GazetteerEntry;

    fn entry(key: &str, lat: f64, lng: f64) -> GazetteerEntry {
        GazetteerEntry {
            key: key.to_string(),
            lat,
            lng,
            category: Category::Mixed,
        }
    }

    #[test]
    fn reference_point_maps_to_grid_center() {
        assert_eq!(to_local_space(40.0, -74.0), LocalPoint::new(10.0, 7.5));
    }

    #[test]
    fn mapping_is_affine_inside_the_grid() {
        let p = to_local_space(40.25, -73.9);
        assert!((p.lat - 15.0).abs() < 1e-9);
        assert!((p.lng - 9.0).abs() < 1e-9);
    }

    #[test]
    fn mapping_clamps_far_fixes() {
        assert_eq!(to_local_space(51.5, -0.12), LocalPoint::new(20.0, 15.0));
        assert_eq!(to_local_space(-33.9, -151.2), LocalPoint::new(0.0, 0.0));
    }

    #[test]
    fn nearest_picks_minimum_distance() {
        let g = Gazetteer::embedded().expect("embedded gazetteer");
        let place = nearest(&g, LocalPoint::new(17.6, 12.8));
        assert_eq!(place.name, "airport");
        assert_eq!(place.category, Category::Transit);
    }

    #[test]
    fn nearest_keeps_first_of_equal_distances() {
        let g = Gazetteer::from_entries(vec![
            entry("left", 5.0, 4.0),
            entry("right", 5.0, 6.0),
        ])
        .expect("valid");
        let place = nearest(&g, LocalPoint::new(5.0, 5.0));
        assert_eq!(place.name, "left");
        assert!((place.distance - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nearest_on_aliases_returns_first_alias() {
        let g = Gazetteer::embedded().expect("embedded gazetteer");
        let place = nearest(&g, LocalPoint::city_center());
        assert_eq!(place.name, "downtown");
        assert_eq!(place.distance, 0.0);
    }

    #[test]
    fn nearest_on_empty_gazetteer_is_custom_location() {
        let place = nearest(&Gazetteer::empty(), LocalPoint::new(3.0, 4.0));
        assert_eq!(place.name, CUSTOM_LOCATION_NAME);
        assert_eq!(place.point(), LocalPoint::new(3.0, 4.0));
        assert_eq!(place.category, Category::Custom);
    }

    #[test]
    fn gps_to_nearest_is_deterministic() {
        let g = Gazetteer::embedded().expect("embedded gazetteer");
        let first = nearest(&g, to_local_space(40.01, -73.98));
        for _ in 0..10 {
            assert_eq!(nearest(&g, to_local_space(40.01, -73.98)), first);
        }
    }
}
