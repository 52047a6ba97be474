//! Real Shanghai locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. Offices sit in the major
//! business districts; residences are spread across the city so each has
//! an unambiguous nearest district.

use commute_planner::model::Coordinate;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub address: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, address: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            name,
            address,
            lat,
            lng,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

// ============================================================================
// Office districts
// ============================================================================

pub const OFFICES: &[Location] = &[
    Location::new("Lujiazui Tower", "501 Yincheng Middle Rd, Pudong", 31.2397, 121.4998),
    Location::new("Xujiahui Center", "1111 Zhaojiabang Rd, Xuhui", 31.1950, 121.4380),
    Location::new("Hongqiao Hub", "100 Shenhong Rd, Minhang", 31.1979, 121.3363),
    Location::new("Zhangjiang Campus", "88 Keyuan Rd, Pudong", 31.2040, 121.5950),
];

// ============================================================================
// Residences
// ============================================================================

pub const RESIDENCES: &[Location] = &[
    Location::new("ann", "600 Weifang Rd, Pudong", 31.2260, 121.5190),
    Location::new("bob", "200 Tianyaoqiao Rd, Xuhui", 31.1890, 121.4430),
    Location::new("cara", "50 Hongsong Rd, Minhang", 31.1830, 121.3710),
    Location::new("dmitri", "300 Guanglan Rd, Pudong", 31.2100, 121.5870),
    Location::new("elena", "900 Changshou Rd, Putuo", 31.2430, 121.4280),
];
