//! Static place-name table for the local grid.
//!
//! The default table is embedded at build time from `data/gazetteer.yaml`.
//! Each YAML place lists one or more alias keys; every alias becomes its own
//! [`GazetteerEntry`] so lookups stay flat. Declaration order is preserved and
//! is the tie-break order for partial matches and nearest-place queries.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::location::{Category, LocalPoint};

const EMBEDDED_GAZETTEER: &str = include_str!("../data/gazetteer.yaml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazetteerEntry {
    pub key: String,
    pub lat: f64,
    pub lng: f64,
    pub category: Category,
}

impl GazetteerEntry {
    #[must_use]
    pub fn point(&self) -> LocalPoint {
        LocalPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Deserialize)]
struct GazetteerFile {
    places: Vec<PlaceConfig>,
}

#[derive(Debug, Deserialize)]
struct PlaceConfig {
    keys: Vec<String>,
    lat: f64,
    lng: f64,
    category: Category,
}

/// Immutable name → coordinate table.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: Vec<GazetteerEntry>,
    index: HashMap<String, usize>,
}

/// Lowercases and trims a key or query the same way the table keys are stored.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl Gazetteer {
    /// Loads the table compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the embedded YAML fails to parse or validate.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_yaml_str(EMBEDDED_GAZETTEER)
    }

    /// Loads and validates a gazetteer YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::GazetteerFileIo {
                path: path.display().to_string(),
                source: e,
            })?;
        Self::from_yaml_str(&content)
    }

    /// Parses gazetteer YAML (`places: [{keys, lat, lng, category}]`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on parse or validation failure.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let file: GazetteerFile = serde_yaml::from_str(content)?;
        let entries = file
            .places
            .into_iter()
            .flat_map(|place| {
                place.keys.into_iter().map(move |key| GazetteerEntry {
                    key,
                    lat: place.lat,
                    lng: place.lng,
                    category: place.category,
                })
            })
            .collect();
        Self::from_entries(entries)
    }

    /// Builds a table from entries in iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for empty or non-normalized keys,
    /// duplicate keys, out-of-grid coordinates, or non-place categories.
    pub fn from_entries(entries: Vec<GazetteerEntry>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            if entry.key.is_empty() {
                return Err(ConfigError::Validation(
                    "gazetteer key must be non-empty".to_string(),
                ));
            }
            if normalize_key(&entry.key) != entry.key {
                return Err(ConfigError::Validation(format!(
                    "gazetteer key '{}' is not lowercase-normalized",
                    entry.key
                )));
            }
            if !entry.point().in_bounds() {
                return Err(ConfigError::Validation(format!(
                    "gazetteer key '{}' has out-of-grid coordinates ({}, {})",
                    entry.key, entry.lat, entry.lng
                )));
            }
            if !entry.category.is_place() {
                return Err(ConfigError::Validation(format!(
                    "gazetteer key '{}' uses non-place category '{}'",
                    entry.key, entry.category
                )));
            }
            if index.insert(entry.key.clone(), i).is_some() {
                return Err(ConfigError::Validation(format!(
                    "duplicate gazetteer key: '{}'",
                    entry.key
                )));
            }
        }

        Ok(Self { entries, index })
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Exact lookup of an already-normalized key.
    #[must_use]
    pub fn lookup_exact(&self, normalized_key: &str) -> Option<&GazetteerEntry> {
        self.index.get(normalized_key).map(|&i| &self.entries[i])
    }

    /// All entries in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, GazetteerEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Gazetteer {
    type Item = &'a GazetteerEntry;
    type IntoIter = std::slice::Iter<'a, GazetteerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
