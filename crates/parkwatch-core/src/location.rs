//! Points, categories, and resolution results in the service's local grid.
//!
//! The local coordinate space is a `0..=20` (lat) by `0..=15` (lng) grid that
//! is unrelated to real-world degrees; see [`crate::geo`] for the mapping.

use serde::{Deserialize, Serialize};

use crate::error::LocationError;

pub const MIN_LAT: f64 = 0.0;
pub const MAX_LAT: f64 = 20.0;
pub const MIN_LNG: f64 = 0.0;
pub const MAX_LNG: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPoint {
    pub lat: f64,
    pub lng: f64,
}

impl LocalPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Centre of the grid, the local image of the GPS reference point.
    #[must_use]
    pub const fn city_center() -> Self {
        Self::new(10.0, 7.5)
    }

    #[must_use]
    pub fn in_bounds(&self) -> bool {
        (MIN_LAT..=MAX_LAT).contains(&self.lat) && (MIN_LNG..=MAX_LNG).contains(&self.lng)
    }

    /// Builds a point, rejecting anything outside the grid (including NaN).
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::OutOfBounds`] when either axis is out of range.
    pub fn checked(lat: f64, lng: f64) -> Result<Self, LocationError> {
        let point = Self::new(lat, lng);
        if point.in_bounds() {
            Ok(point)
        } else {
            Err(LocationError::OutOfBounds { lat, lng })
        }
    }

    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(
            self.lat.clamp(MIN_LAT, MAX_LAT),
            self.lng.clamp(MIN_LNG, MAX_LNG),
        )
    }

    /// Plain Euclidean distance in grid units.
    #[must_use]
    pub fn distance_to(&self, other: &LocalPoint) -> f64 {
        let d_lat = self.lat - other.lat;
        let d_lng = self.lng - other.lng;
        (d_lat * d_lat + d_lng * d_lng).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Business,
    Shopping,
    Transit,
    Education,
    Healthcare,
    Residential,
    Leisure,
    Mixed,
    /// Raw coordinates typed by the user.
    Custom,
    /// Estimated point with no textual or numeric match.
    Unknown,
}

impl Category {
    /// Whether the category may appear on a gazetteer entry.
    #[must_use]
    pub fn is_place(self) -> bool {
        !matches!(self, Category::Custom | Category::Unknown)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::Business => "business",
            Category::Shopping => "shopping",
            Category::Transit => "transit",
            Category::Education => "education",
            Category::Healthcare => "healthcare",
            Category::Residential => "residential",
            Category::Leisure => "leisure",
            Category::Mixed => "mixed",
            Category::Custom => "custom",
            Category::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Trust tier of a resolved location.
///
/// Variants are declared from least to most trusted so the derived ordering
/// reads `Exact > Partial > Coordinate > Estimated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Estimated,
    Coordinate,
    Partial,
    Exact,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Confidence::Exact => "exact",
            Confidence::Partial => "partial",
            Confidence::Coordinate => "coordinate",
            Confidence::Estimated => "estimated",
        };
        f.write_str(s)
    }
}

/// The single live user location of a dashboard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

impl UserLocation {
    #[must_use]
    pub fn point(&self) -> LocalPoint {
        LocalPoint::new(self.lat, self.lng)
    }
}

impl Default for UserLocation {
    fn default() -> Self {
        let center = LocalPoint::city_center();
        Self {
            lat: center.lat,
            lng: center.lng,
            name: "City Center".to_string(),
        }
    }
}

/// Result of resolving free text. Consumed immediately to replace the
/// session's [`UserLocation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    pub category: Category,
    pub confidence: Confidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_key: Option<String>,
}

impl ResolvedLocation {
    #[must_use]
    pub fn point(&self) -> LocalPoint {
        LocalPoint::new(self.lat, self.lng)
    }

    /// User-facing notification text for this resolution.
    #[must_use]
    pub fn message(&self) -> String {
        match self.confidence {
            Confidence::Exact => format!("Location set to {}", self.name),
            Confidence::Partial => format!(
                "Using closest match \"{}\"",
                self.matched_key.as_deref().unwrap_or(&self.name)
            ),
            Confidence::Coordinate => format!(
                "Location set to coordinates ({:.2}, {:.2})",
                self.lat, self.lng
            ),
            Confidence::Estimated => format!(
                "Could not find \"{}\"; using an estimated location",
                self.name
            ),
        }
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
