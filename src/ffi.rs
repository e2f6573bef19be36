//! FFI bindings for mobile platforms (iOS/Android).
//!
//! This module provides the UniFFI bindings that expose Rust functionality
//! to Kotlin and Swift. All FFI functions are prefixed with `ffi_` to avoid
//! naming conflicts with the internal API. Nothing here throws across the
//! boundary: fallible operations return a result record with an error string.

use std::time::Instant;

use log::{info, warn};

use crate::hospital::{bundled_hospitals, search_hospitals, Hospital};
use crate::routing::fetch_route_sync;
use crate::schedule::OperationSchedule;
use crate::{elapsed_ms, init_logging, Coordinate};

// ============================================================================
// Result Records
// ============================================================================

/// Result of fetching a route polyline.
#[derive(Debug, Clone, uniffi::Record)]
pub struct RouteFetchResult {
    /// Polyline in path order; empty when no route was found or on error
    pub coordinates: Vec<Coordinate>,
    pub success: bool,
    pub error: Option<String>,
}

// ============================================================================
// Routing
// ============================================================================

/// Fetch the driving route between two coordinates from OSRM.
///
/// Blocking; call it from a background dispatcher on the app side. On
/// failure the previous polyline on screen should be left untouched.
#[uniffi::export]
pub fn ffi_fetch_route(origin: Coordinate, destination: Coordinate) -> RouteFetchResult {
    init_logging();
    let ffi_start = Instant::now();
    info!(
        "[RUST: ffi_fetch_route] ({:.5},{:.5}) -> ({:.5},{:.5})",
        origin.latitude, origin.longitude, destination.latitude, destination.longitude
    );

    match fetch_route_sync(origin, destination) {
        Ok(coordinates) => {
            info!(
                "[RUST: ffi_fetch_route] {} points ({} ms)",
                coordinates.len(),
                elapsed_ms(ffi_start)
            );
            RouteFetchResult {
                coordinates,
                success: true,
                error: None,
            }
        }
        Err(e) => {
            warn!(
                "[RUST: ffi_fetch_route] failed: {} ({} ms)",
                e,
                elapsed_ms(ffi_start)
            );
            RouteFetchResult {
                coordinates: Vec::new(),
                success: false,
                error: Some(e.to_string()),
            }
        }
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// Whether a location with the given weekly schedule is open right now.
///
/// Malformed schedule entries degrade to "closed"; this never throws.
#[uniffi::export]
pub fn ffi_is_open_now(schedule: String) -> bool {
    init_logging();
    OperationSchedule::parse(&schedule).is_open_now()
}

// ============================================================================
// Hospital Dataset
// ============================================================================

/// All hospitals from the bundled dataset.
#[uniffi::export]
pub fn ffi_bundled_hospitals() -> Vec<Hospital> {
    init_logging();
    bundled_hospitals().to_vec()
}

/// Hospitals whose name matches the search query (accent-insensitive).
#[uniffi::export]
pub fn ffi_search_hospitals(query: String) -> Vec<Hospital> {
    init_logging();
    search_hospitals(bundled_hospitals(), &query)
        .into_iter()
        .cloned()
        .collect()
}
