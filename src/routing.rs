//! HTTP client for the public OSRM routing service.
//!
//! Fetches a driving route between two coordinates and returns the full
//! geometry as an ordered polyline. The request encodes coordinates as
//! `longitude,latitude` pairs joined by `;`; the GeoJSON response stores
//! points as `[longitude, latitude]`, so every pair must be swapped when
//! converting to [`Coordinate`].

use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::{LocatorError, Result};
use crate::geo::polyline_length;
use crate::Coordinate;

/// Default public OSRM instance
const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org";

/// Bounded request timeout. The original app had none; a stalled fetch
/// would hang until the OS gave up.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// OSRM Response Shape
// ============================================================================

/// API response for the OSRM route endpoint
#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON LineString coordinates: [longitude, latitude] pairs
    coordinates: Vec<[f64; 2]>,
}

/// Build the OSRM route URL for an origin/destination pair.
///
/// OSRM wants `lon,lat;lon,lat` - the reverse of the app's lat/lng order.
fn build_route_url(base_url: &str, origin: &Coordinate, destination: &Coordinate) -> String {
    format!(
        "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
        base_url,
        origin.longitude,
        origin.latitude,
        destination.longitude,
        destination.latitude,
    )
}

/// Parse an OSRM response body into a polyline.
///
/// Returns an empty vec when the service found no candidate routes; the
/// caller treats that as "no route available", not a failure.
fn parse_route_response(body: &[u8]) -> Result<Vec<Coordinate>> {
    let data: OsrmResponse = serde_json::from_slice(body)
        .map_err(|e| LocatorError::parse(format!("unexpected OSRM response: {e}")))?;

    let Some(first) = data.routes.into_iter().next() else {
        return Ok(Vec::new());
    };

    // Un-swap [lon, lat] into latitude/longitude
    Ok(first
        .geometry
        .coordinates
        .into_iter()
        .map(|pair| Coordinate::new(pair[1], pair[0]))
        .collect())
}

// ============================================================================
// Route Fetcher
// ============================================================================

/// Client for fetching route polylines from OSRM.
pub struct RouteFetcher {
    client: Client,
    base_url: String,
}

impl RouteFetcher {
    /// Create a fetcher against the public OSRM instance.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a fetcher against a custom OSRM instance (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LocatorError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch the driving route from `origin` to `destination`.
    ///
    /// Returns the polyline in path order (first point near the origin,
    /// last near the destination), or an empty vec when OSRM returns no
    /// candidate routes.
    pub async fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Vec<Coordinate>> {
        let url = build_route_url(&self.base_url, &origin, &destination);
        let req_start = Instant::now();

        // Phase 1: send request, receive headers
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LocatorError::network(format!("request error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocatorError::Network {
                message: format!("HTTP {status}"),
                status_code: Some(status.as_u16()),
            });
        }

        // Phase 2: download the body
        let bytes = response
            .bytes()
            .await
            .map_err(|e| LocatorError::network(format!("body download error: {e}")))?;

        // Phase 3: JSON deserialization and coordinate un-swap
        let route = parse_route_response(&bytes)?;

        debug!(
            "[RouteFetcher] ({:.5},{:.5}) -> ({:.5},{:.5}): {} points, {:.0}m, {:.1}KB in {:?}",
            origin.latitude,
            origin.longitude,
            destination.latitude,
            destination.longitude,
            route.len(),
            polyline_length(&route),
            bytes.len() as f64 / 1024.0,
            req_start.elapsed()
        );

        Ok(route)
    }
}

// ============================================================================
// Route Session (stale-response guard)
// ============================================================================

/// Identity of a route request, derived from the coordinate bit patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint([u64; 4]);

impl Fingerprint {
    fn new(origin: &Coordinate, destination: &Coordinate) -> Self {
        Self([
            origin.latitude.to_bits(),
            origin.longitude.to_bits(),
            destination.latitude.to_bits(),
            destination.longitude.to_bits(),
        ])
    }
}

/// Outcome of a session-guarded route fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteUpdate {
    /// Fresh polyline for the most recently requested destination
    Route(Vec<Coordinate>),
    /// An identical fetch is already in flight; nothing was dispatched
    InFlight,
    /// A newer request was issued while this one was outstanding
    Superseded,
}

/// Serializes route fetches for a single map screen.
///
/// The original app let concurrent fetches race: re-selecting a destination
/// before the previous fetch resolved meant last-to-resolve wins. The
/// session tags every fetch with a sequence number and drops completions
/// that are no longer the latest, and it skips dispatching a fetch whose
/// origin/destination pair is already in flight.
pub struct RouteSession {
    fetcher: RouteFetcher,
    latest: AtomicU64,
    in_flight: Mutex<Option<Fingerprint>>,
}

impl RouteSession {
    /// Create a session against the public OSRM instance.
    pub fn new() -> Result<Self> {
        Ok(Self::with_fetcher(RouteFetcher::new()?))
    }

    /// Create a session around an existing fetcher.
    pub fn with_fetcher(fetcher: RouteFetcher) -> Self {
        Self {
            fetcher,
            latest: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    /// Fetch a route, guarded against duplicates and stale completions.
    pub async fn fetch_latest(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteUpdate> {
        let fingerprint = Fingerprint::new(&origin, &destination);

        {
            let mut guard = self.in_flight.lock().await;
            if *guard == Some(fingerprint) {
                info!("[RouteSession] identical fetch already in flight, skipping");
                return Ok(RouteUpdate::InFlight);
            }
            *guard = Some(fingerprint);
        }

        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.fetcher.fetch_route(origin, destination).await;

        {
            let mut guard = self.in_flight.lock().await;
            if *guard == Some(fingerprint) {
                *guard = None;
            }
        }

        if self.latest.load(Ordering::SeqCst) != ticket {
            info!("[RouteSession] discarding stale route result (ticket {ticket})");
            return Ok(RouteUpdate::Superseded);
        }

        result.map(RouteUpdate::Route)
    }
}

// ============================================================================
// Sync wrapper for FFI
// ============================================================================

/// Synchronous wrapper for FFI - runs the async fetch on a tokio runtime.
#[cfg(feature = "ffi")]
pub fn fetch_route_sync(origin: Coordinate, destination: Coordinate) -> Result<Vec<Coordinate>> {
    use log::warn;
    use tokio::runtime::Builder;

    let rt = Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .map_err(|e| {
            warn!("[RUST: fetch_route_sync] Failed to create runtime: {e}");
            LocatorError::network(format!("runtime error: {e}"))
        })?;

    let fetcher = RouteFetcher::new()?;
    rt.block_on(fetcher.fetch_route(origin, destination))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = r#"{
        "code": "Ok",
        "routes": [{
            "geometry": {
                "coordinates": [
                    [-46.6333, -23.5505],
                    [-46.6340, -23.5510],
                    [-46.6350, -23.5520]
                ],
                "type": "LineString"
            },
            "distance": 245.3,
            "duration": 48.2
        }],
        "waypoints": []
    }"#;

    #[test]
    fn test_build_route_url_lon_lat_order() {
        let origin = Coordinate::new(-23.5505, -46.6333);
        let destination = Coordinate::new(-23.5377, -46.3587);
        let url = build_route_url(DEFAULT_BASE_URL, &origin, &destination);

        // Longitude comes first in each pair, pairs joined by ';'
        assert_eq!(
            url,
            "https://router.project-osrm.org/route/v1/driving/\
             -46.6333,-23.5505;-46.3587,-23.5377?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn test_parse_response_unswaps_coordinates() {
        let route = parse_route_response(SAMPLE_RESPONSE.as_bytes()).unwrap();
        assert_eq!(route.len(), 3);
        // [lon, lat] in the body becomes latitude/longitude here
        assert_eq!(route[0], Coordinate::new(-23.5505, -46.6333));
        assert_eq!(route[2], Coordinate::new(-23.5520, -46.6350));
    }

    #[test]
    fn test_parse_response_no_routes_is_empty_not_error() {
        let body = r#"{"code": "Ok", "routes": [], "waypoints": []}"#;
        let route = parse_route_response(body.as_bytes()).unwrap();
        assert!(route.is_empty());

        // A body with the routes key missing entirely also counts as none
        let body = r#"{"code": "NoRoute"}"#;
        let route = parse_route_response(body.as_bytes()).unwrap();
        assert!(route.is_empty());
    }

    #[test]
    fn test_parse_response_malformed_is_parse_error() {
        let result = parse_route_response(b"<html>gateway timeout</html>");
        assert!(matches!(result, Err(LocatorError::Parse { .. })));

        // Valid JSON, wrong shape for a route entry
        let result = parse_route_response(br#"{"routes": [{"no_geometry": true}]}"#);
        assert!(matches!(result, Err(LocatorError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_fetch_route_transport_failure_is_network_error() {
        // Nothing listens on this port; the connection is refused immediately
        let fetcher = RouteFetcher::with_base_url("http://127.0.0.1:9").unwrap();
        let result = fetcher
            .fetch_route(
                Coordinate::new(-23.5505, -46.6333),
                Coordinate::new(-23.5377, -46.3587),
            )
            .await;
        assert!(matches!(result, Err(LocatorError::Network { .. })));
    }

    /// Minimal OSRM stub over a raw socket: the first connection gets its
    /// response after a long delay, every later one is answered at once.
    fn spawn_slow_then_fast_server() -> String {
        use std::io::{Read, Write};
        use std::net::TcpListener;
        use std::sync::atomic::AtomicUsize;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            let served = AtomicUsize::new(0);
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let index = served.fetch_add(1, Ordering::SeqCst);
                std::thread::spawn(move || {
                    let mut buf = [0u8; 1024];
                    let _ = stream.read(&mut buf);
                    if index == 0 {
                        std::thread::sleep(Duration::from_millis(400));
                    }
                    let body =
                        r#"{"routes":[{"geometry":{"coordinates":[[-46.6,-23.5]]}}]}"#;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                         Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes());
                });
            }
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_session_drops_superseded_completion() {
        use std::sync::Arc;

        let fetcher = RouteFetcher::with_base_url(spawn_slow_then_fast_server()).unwrap();
        let session = Arc::new(RouteSession::with_fetcher(fetcher));

        let origin = Coordinate::new(-23.5505, -46.6333);
        let first_destination = Coordinate::new(-23.5377, -46.3587);
        let second_destination = Coordinate::new(-23.5702, -46.6347);

        let slow = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.fetch_latest(origin, first_destination).await })
        };
        // Give the first fetch time to dispatch before re-selecting
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Re-selected destination resolves first and wins
        let fast = session
            .fetch_latest(origin, second_destination)
            .await
            .unwrap();
        assert_eq!(
            fast,
            RouteUpdate::Route(vec![Coordinate::new(-23.5, -46.6)])
        );

        // The earlier fetch is no longer the latest request; its completion
        // must be dropped instead of overwriting the fresh polyline
        let slow = slow.await.unwrap().unwrap();
        assert_eq!(slow, RouteUpdate::Superseded);
    }

    #[tokio::test]
    async fn test_session_clears_in_flight_after_failure() {
        let fetcher = RouteFetcher::with_base_url("http://127.0.0.1:9").unwrap();
        let session = RouteSession::with_fetcher(fetcher);
        let origin = Coordinate::new(-23.5505, -46.6333);
        let destination = Coordinate::new(-23.5377, -46.3587);

        let first = session.fetch_latest(origin, destination).await;
        assert!(first.is_err());

        // The failed fetch must not leave its fingerprint stuck in flight
        let second = session.fetch_latest(origin, destination).await;
        assert!(!matches!(second, Ok(RouteUpdate::InFlight)));
    }

    #[test]
    fn test_fingerprint_identity() {
        let a = Coordinate::new(-23.5505, -46.6333);
        let b = Coordinate::new(-23.5377, -46.3587);
        assert_eq!(Fingerprint::new(&a, &b), Fingerprint::new(&a, &b));
        assert_ne!(Fingerprint::new(&a, &b), Fingerprint::new(&b, &a));
    }
}
