//! Drive distance and duration estimation.
//!
//! Estimates come from three sources in order of preference: an external
//! mapping service (when configured), a great-circle heuristic (when both
//! endpoints have coordinates), and a conservative fallback default (when
//! nothing better is known). Every estimate is tagged with its source so
//! callers can tell a measured figure from a guess.
//!
//! Estimates are cached per appointment for the lifetime of one
//! availability query. Two slot candidates near the same existing
//! appointment share one lookup.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Appointment, DriveEstimate, EstimateSource, GeoPoint};

// ═══════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Assumed average driving speed for the great-circle heuristic.
const AVERAGE_SPEED_KMH: f64 = 40.0;

/// Drive time assumed when no location data exists at all.
pub const FALLBACK_DRIVE_MINUTES: f64 = 30.0;

/// Drive distance assumed when no location data exists at all.
pub const FALLBACK_DRIVE_KM: f64 = 20.0;

/// How many mapping-service lookups run concurrently during prefetch.
const DISTANCE_BATCH_SIZE: usize = 5;

/// Per-request timeout for the mapping service. A slow mapping service
/// must not stall slot generation.
const MAPPING_TIMEOUT_SECS: u64 = 5;

// ═══════════════════════════════════════════════════════════
// Haversine heuristic
// ═══════════════════════════════════════════════════════════

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Estimate drive time from straight-line distance at average city speed.
pub fn heuristic_estimate(from: GeoPoint, to: GeoPoint) -> DriveEstimate {
    let distance_km = haversine_km(from, to);
    DriveEstimate {
        duration_minutes: distance_km / AVERAGE_SPEED_KMH * 60.0,
        distance_km,
        source: EstimateSource::Heuristic,
    }
}

fn fallback_estimate() -> DriveEstimate {
    DriveEstimate {
        duration_minutes: FALLBACK_DRIVE_MINUTES,
        distance_km: FALLBACK_DRIVE_KM,
        source: EstimateSource::FallbackDefault,
    }
}

// ═══════════════════════════════════════════════════════════
// Mapping service client
// ═══════════════════════════════════════════════════════════

/// Response body from the mapping service's /route endpoint.
#[derive(Debug, Deserialize)]
struct RouteResponse {
    duration_minutes: f64,
    distance_km: f64,
}

/// HTTP client for an external routing/matrix service.
pub struct MatrixClient {
    base_url: String,
    client: reqwest::Client,
}

impl MatrixClient {
    /// Create a client pointing at a mapping service instance.
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(MAPPING_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Build a client from `MAPPING_SERVICE_URL`, if set.
    pub fn from_env() -> Option<Self> {
        crate::config::mapping_service_url().map(|url| Self::new(&url))
    }

    /// Route between two coordinate pairs.
    async fn route_by_coords(
        &self,
        from: GeoPoint,
        to: GeoPoint,
    ) -> Result<DriveEstimate, reqwest::Error> {
        let url = format!("{}/route", self.base_url);
        let body: RouteResponse = self
            .client
            .get(&url)
            .query(&[
                ("from_lat", from.latitude),
                ("from_lon", from.longitude),
                ("to_lat", to.latitude),
                ("to_lon", to.longitude),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(DriveEstimate {
            duration_minutes: body.duration_minutes,
            distance_km: body.distance_km,
            source: EstimateSource::MappingService,
        })
    }

    /// Route from a textual address to a coordinate pair. Used for
    /// legacy appointments that were stored before geocoding existed.
    async fn route_by_address(
        &self,
        from_address: &str,
        to: GeoPoint,
    ) -> Result<DriveEstimate, reqwest::Error> {
        let url = format!("{}/route", self.base_url);
        let body: RouteResponse = self
            .client
            .get(&url)
            .query(&[("from_address", from_address)])
            .query(&[("to_lat", to.latitude), ("to_lon", to.longitude)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(DriveEstimate {
            duration_minutes: body.duration_minutes,
            distance_km: body.distance_km,
            source: EstimateSource::MappingService,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// DistanceEstimator
// ═══════════════════════════════════════════════════════════

/// Query-scoped estimator with a per-appointment cache.
///
/// Build one per availability query and drop it when the response is
/// assembled. The cache is keyed by appointment id; a query evaluates
/// every candidate slot against one destination, so the id alone
/// identifies the route.
pub struct DistanceEstimator {
    client: Option<MatrixClient>,
    cache: Mutex<HashMap<Uuid, DriveEstimate>>,
}

impl DistanceEstimator {
    pub fn new(client: Option<MatrixClient>) -> Self {
        Self {
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Estimator with no external service. Coordinates fall back to the
    /// great-circle heuristic.
    pub fn offline() -> Self {
        Self::new(None)
    }

    /// Estimate the drive from an existing appointment to `destination`.
    ///
    /// Never fails: a service error degrades to the heuristic (with
    /// coordinates) or the fallback default (without).
    pub async fn estimate(&self, appointment: &Appointment, destination: GeoPoint) -> DriveEstimate {
        if let Some(hit) = self.cached(appointment.id) {
            return hit;
        }

        let estimate = self.resolve(appointment, destination).await;
        self.cache
            .lock()
            .expect("distance cache lock poisoned")
            .insert(appointment.id, estimate.clone());
        estimate
    }

    /// Warm the cache for every appointment in one batch, at most
    /// [`DISTANCE_BATCH_SIZE`] lookups in flight at a time.
    pub async fn prefetch(&self, destination: GeoPoint, appointments: &[Appointment]) {
        futures_util::stream::iter(appointments)
            .map(|appt| self.estimate(appt, destination))
            .buffer_unordered(DISTANCE_BATCH_SIZE)
            .collect::<Vec<_>>()
            .await;
    }

    /// A snapshot of the cache, for handing to the pure conflict checker.
    pub fn snapshot(&self) -> HashMap<Uuid, DriveEstimate> {
        self.cache
            .lock()
            .expect("distance cache lock poisoned")
            .clone()
    }

    fn cached(&self, id: Uuid) -> Option<DriveEstimate> {
        self.cache
            .lock()
            .expect("distance cache lock poisoned")
            .get(&id)
            .cloned()
    }

    async fn resolve(&self, appointment: &Appointment, destination: GeoPoint) -> DriveEstimate {
        match (appointment.location(), &self.client) {
            (Some(origin), Some(client)) => {
                match client.route_by_coords(origin, destination).await {
                    Ok(estimate) => estimate,
                    Err(e) => {
                        warn!(appointment_id = %appointment.id, error = %e,
                              "Mapping service failed, using heuristic");
                        heuristic_estimate(origin, destination)
                    }
                }
            }
            (Some(origin), None) => heuristic_estimate(origin, destination),
            (None, Some(client)) => match appointment.address.as_deref() {
                Some(address) => match client.route_by_address(address, destination).await {
                    Ok(estimate) => estimate,
                    Err(e) => {
                        warn!(appointment_id = %appointment.id, error = %e,
                              "Mapping service failed for address, using fallback");
                        fallback_estimate()
                    }
                },
                None => {
                    debug!(appointment_id = %appointment.id, "No location data, using fallback");
                    fallback_estimate()
                }
            },
            (None, None) => fallback_estimate(),
        }
    }
}
