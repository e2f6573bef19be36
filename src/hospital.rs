//! Hospital dataset and app-layer types.
//!
//! Hospitals come from a bundled JSON file and are read-only for the
//! lifetime of a screen. The map screen filters them through [`search_hospitals`]
//! and picks a destination; the details screen reads the metadata and asks
//! [`Hospital::is_open`] for the open/closed badge.

use chrono::NaiveDateTime;
use log::warn;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{LocatorError, Result};
use crate::geo::haversine_distance;
use crate::schedule::{normalize, OperationSchedule};
use crate::Coordinate;

/// A medical service offered by a hospital (e.g. "Cardiologia").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct MedicalService {
    pub name: String,
    /// Icon URI for the service
    pub image: String,
}

/// An insurance plan accepted by a hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct InsurancePlan {
    pub name: String,
    /// Logo URI for the plan
    pub image: String,
}

/// A hospital record from the bundled dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Hospital {
    pub id: u32,
    pub name: String,
    pub coordinate: Coordinate,
    pub address: String,
    /// Photo URIs for the details carousel
    #[serde(default)]
    pub images: Vec<String>,
    /// Number of services offered (shown on the summary card)
    #[serde(default)]
    pub services: u32,
    #[serde(default)]
    pub rating: f64,
    /// Weekly hours in the schedule grammar, e.g.
    /// "Segunda-Sexta: 08:00 às 18:00, Sábado: 08:00 às 12:00"
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub medical_services: Vec<MedicalService>,
    #[serde(default)]
    pub insurance: Vec<InsurancePlan>,
}

impl Hospital {
    /// Parse this hospital's operation schedule.
    pub fn schedule(&self) -> OperationSchedule {
        OperationSchedule::parse(&self.operation)
    }

    /// Whether the hospital is open at the given local timestamp.
    pub fn is_open(&self, now: NaiveDateTime) -> bool {
        self.schedule().is_open_at(now)
    }

    /// Haversine distance from `from` to this hospital, in meters.
    pub fn distance_to(&self, from: &Coordinate) -> f64 {
        haversine_distance(from, &self.coordinate)
    }
}

// ============================================================================
// Dataset Loading
// ============================================================================

/// Deserialize a hospital dataset from JSON.
pub fn load_hospitals(json: &str) -> Result<Vec<Hospital>> {
    serde_json::from_str(json).map_err(|e| LocatorError::dataset(e.to_string()))
}

const BUNDLED_JSON: &str = include_str!("../data/hospitals.json");

static BUNDLED: Lazy<Vec<Hospital>> = Lazy::new(|| match load_hospitals(BUNDLED_JSON) {
    Ok(hospitals) => hospitals,
    Err(e) => {
        warn!("[hospital] bundled dataset failed to load: {e}");
        Vec::new()
    }
});

/// The hospitals shipped with the app, parsed once on first access.
pub fn bundled_hospitals() -> &'static [Hospital] {
    &BUNDLED
}

// ============================================================================
// Search and Proximity
// ============================================================================

/// Filter hospitals by name, case- and accent-insensitively.
///
/// Backs the map screen's search bar; an empty query matches everything.
pub fn search_hospitals<'a>(hospitals: &'a [Hospital], query: &str) -> Vec<&'a Hospital> {
    let needle = normalize(query);
    hospitals
        .iter()
        .filter(|h| normalize(&h.name).contains(&needle))
        .collect()
}

/// The hospital closest to `from`, or `None` for an empty slice.
pub fn nearest_hospital<'a>(hospitals: &'a [Hospital], from: &Coordinate) -> Option<&'a Hospital> {
    hospitals
        .iter()
        .min_by(|a, b| a.distance_to(from).total_cmp(&b.distance_to(from)))
}

// ============================================================================
// Tests
// ============================================================================
