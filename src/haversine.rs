//! Haversine route-duration provider (fallback when the LBS API is
//! unavailable).
//!
//! Uses great-circle distance and per-mode speed assumptions to estimate
//! travel time. Less accurate than a routing service (ignores roads,
//! schedules, and traffic) but always available, which makes it the
//! provider of choice for offline runs and tests.

use crate::model::{Coordinate, TransportMode};
use crate::traits::{ProviderError, RouteProvider};

/// Average speed assumptions in km/h.
const DEFAULT_WALK_KMH: f64 = 5.0;
const DEFAULT_RIDE_KMH: f64 = 15.0;
const DEFAULT_TRANSIT_KMH: f64 = 30.0;
const DEFAULT_DRIVE_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine-based route-duration provider.
#[derive(Debug, Clone)]
pub struct HaversineRoutes {
    pub walk_kmh: f64,
    pub ride_kmh: f64,
    pub transit_kmh: f64,
    pub drive_kmh: f64,
}

impl Default for HaversineRoutes {
    fn default() -> Self {
        Self {
            walk_kmh: DEFAULT_WALK_KMH,
            ride_kmh: DEFAULT_RIDE_KMH,
            transit_kmh: DEFAULT_TRANSIT_KMH,
            drive_kmh: DEFAULT_DRIVE_KMH,
        }
    }
}

impl HaversineRoutes {
    fn speed_for(&self, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Walk => self.walk_kmh,
            TransportMode::Ride => self.ride_kmh,
            TransportMode::Transit => self.transit_kmh,
            TransportMode::Drive => self.drive_kmh,
        }
    }

    /// Calculate haversine distance between two points in kilometers.
    fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lng = (to.lng - from.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    fn km_to_minutes(km: f64, speed_kmh: f64) -> u32 {
        let hours = km / speed_kmh;
        (hours * 60.0).round() as u32
    }
}

impl RouteProvider for HaversineRoutes {
    fn duration_minutes(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
        _departure_epoch: i64,
    ) -> Result<u32, ProviderError> {
        let km = Self::haversine_km(origin, destination);
        Ok(Self::km_to_minutes(km, self.speed_for(mode)))
    }
}
