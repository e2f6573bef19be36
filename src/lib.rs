//! # Hospital Locator Core
//!
//! Core logic for a map-based hospital locator app.
//!
//! This library provides:
//! - Route fetching from the public OSRM routing service
//! - Opening-hours evaluation for a textual weekly schedule
//! - The bundled hospital dataset with search and nearest-hospital helpers
//!
//! ## Features
//!
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//!
//! ## Quick Start
//!
//! ```rust
//! use hospital_locator::{bundled_hospitals, OperationSchedule};
//! use chrono::NaiveDate;
//!
//! let schedule = OperationSchedule::parse("Segunda-Sexta: 08:00 às 18:00");
//! let tuesday_morning = NaiveDate::from_ymd_opt(2024, 1, 2)
//!     .unwrap()
//!     .and_hms_opt(10, 0, 0)
//!     .unwrap();
//! assert!(schedule.is_open_at(tuesday_morning));
//!
//! let hospitals = bundled_hospitals();
//! assert!(!hospitals.is_empty());
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{LocatorError, Result};

// Geographic utilities (haversine distance)
pub mod geo;
pub use geo::haversine_distance;

// OSRM route fetching
pub mod routing;
pub use routing::{RouteFetcher, RouteSession, RouteUpdate};

// Weekly operation schedule parsing and evaluation
pub mod schedule;
pub use schedule::{OperationSchedule, ScheduleEntry};

// Hospital dataset and app-layer types
pub mod hospital;
pub use hospital::{
    bundled_hospitals, load_hospitals, nearest_hospital, search_hospitals, Hospital,
    InsurancePlan, MedicalService,
};

// Periodic open-status re-evaluation scoped to the details view
pub mod monitor;
pub use monitor::OpenStatusMonitor;

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("HospitalLocatorRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

/// Helper to calculate elapsed milliseconds from an Instant
#[cfg(feature = "ffi")]
#[inline]
pub(crate) fn elapsed_ms(start: std::time::Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use hospital_locator::Coordinate;
/// let point = Coordinate::new(-23.5505, -46.6333); // São Paulo
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the coordinate has valid values.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(-23.5505, -46.6333).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 181.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_coordinate_serde_camel_case() {
        let point = Coordinate::new(-23.5505, -46.6333);
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("\"latitude\""));
        assert!(json.contains("\"longitude\""));

        let parsed: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, point);
    }
}
