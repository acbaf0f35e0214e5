//! Free-text location resolution.
//!
//! Resolution tiers, in priority order:
//!
//! 1. exact gazetteer key (case/whitespace-insensitive)
//! 2. partial key match, first qualifying key in gazetteer order wins
//! 3. a `<number>, <number>` pair inside the grid
//! 4. a uniformly random point inside the grid
//!
//! Only empty input fails. Partial matching is unranked: a
//! better-scoring key later in the table never beats an earlier one.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use crate::error::LocationError;
use crate::gazetteer::{normalize_key, Gazetteer, GazetteerEntry};
use crate::location::{
    Category, Confidence, LocalPoint, ResolvedLocation, MAX_LAT, MAX_LNG, MIN_LAT, MIN_LNG,
};

static COORDINATE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)").expect("valid coordinate regex")
});

/// Resolves `input` against `gazetteer`, drawing from `rng` only when every
/// other tier misses.
///
/// # Errors
///
/// Returns [`LocationError::EmptyInput`] if `input` is empty or whitespace.
pub fn parse_location<R>(
    input: &str,
    gazetteer: &Gazetteer,
    rng: &mut R,
) -> Result<ResolvedLocation, LocationError>
where
    R: Rng,
{
    let trimmed = input.trim();
    let normalized = normalize_key(trimmed);
    if normalized.is_empty() {
        return Err(LocationError::EmptyInput);
    }

    if let Some(entry) = gazetteer.lookup_exact(&normalized) {
        return Ok(from_entry(entry, trimmed.to_string(), Confidence::Exact, None));
    }

    if let Some(entry) = first_partial_match(gazetteer, &normalized) {
        return Ok(from_entry(
            entry,
            entry.key.clone(),
            Confidence::Partial,
            Some(entry.key.clone()),
        ));
    }

    match coordinate_pair(input) {
        Some(Ok(point)) => {
            return Ok(ResolvedLocation {
                lat: point.lat,
                lng: point.lng,
                name: trimmed.to_string(),
                category: Category::Custom,
                confidence: Confidence::Coordinate,
                matched_key: None,
            });
        }
        Some(Err(e)) => {
            tracing::debug!(input = trimmed, error = %e, "coordinate input rejected; estimating");
        }
        None => {}
    }

    let point = random_point(rng);
    Ok(ResolvedLocation {
        lat: point.lat,
        lng: point.lng,
        name: trimmed.to_string(),
        category: Category::Unknown,
        confidence: Confidence::Estimated,
        matched_key: None,
    })
}

fn from_entry(
    entry: &GazetteerEntry,
    name: String,
    confidence: Confidence,
    matched_key: Option<String>,
) -> ResolvedLocation {
    ResolvedLocation {
        lat: entry.lat,
        lng: entry.lng,
        name,
        category: entry.category,
        confidence,
        matched_key,
    }
}

fn first_partial_match<'g>(gazetteer: &'g Gazetteer, normalized: &str) -> Option<&'g GazetteerEntry> {
    gazetteer
        .iter()
        .find(|entry| normalized.contains(entry.key.as_str()) || entry.key.contains(normalized))
}

/// Extracts the first `<number>, <number>` pair from raw text.
///
/// `None` when no pair is present; `Some(Err(OutOfBounds))` when a pair is
/// present but falls outside the grid.
fn coordinate_pair(raw: &str) -> Option<Result<LocalPoint, LocationError>> {
    let caps = COORDINATE_PAIR.captures(raw)?;
    let lat = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let lng = caps.get(2)?.as_str().parse::<f64>().ok()?;
    Some(LocalPoint::checked(lat, lng))
}

fn random_point<R>(rng: &mut R) -> LocalPoint
where
    R: Rng,
{
    LocalPoint::new(
        rng.random_range(MIN_LAT..=MAX_LAT),
        rng.random_range(MIN_LNG..=MAX_LNG),
    )
}
