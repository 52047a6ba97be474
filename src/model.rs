//! Core data model for the commute planner.
//!
//! Persons and offices are keyed by their stable name. Travel durations are
//! held per (person, office) pair as a mode → minutes map; the mode
//! preference order is derived from it on demand so that a change in
//! drive-eligibility never invalidates computed durations.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// How many offices are kept in a person's ranking.
pub const NEAREST_OFFICES: usize = 10;

/// How many persons are emitted per office on export.
pub const NEAREST_PERSONS: usize = 20;

/// Sentinel minutes value for a mode the provider could not route.
pub const UNREACHABLE_MINUTES: u32 = u32::MAX;

const COORD_EPSILON: f64 = 1e-8;

/// A latitude/longitude pair. `(0, 0)` means "not yet geocoded".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const UNRESOLVED: Coordinate = Coordinate { lat: 0.0, lng: 0.0 };

    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True for the zero sentinel (within epsilon).
    pub fn is_unresolved(&self) -> bool {
        self.lat.abs() < COORD_EPSILON && self.lng.abs() < COORD_EPSILON
    }
}

/// The four transport modes. Declaration order is the deterministic
/// tie-break order when two modes attain the same duration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Walk,
    Ride,
    // Stored data and exports call this mode "transport".
    #[serde(rename = "transport")]
    Transit,
    Drive,
}

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Walk,
        TransportMode::Ride,
        TransportMode::Transit,
        TransportMode::Drive,
    ];

    /// Storage/export label.
    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Walk => "walk",
            TransportMode::Ride => "ride",
            TransportMode::Transit => "transport",
            TransportMode::Drive => "drive",
        }
    }
}

/// Per-pair travel durations, one entry per transport mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeDurations {
    minutes: BTreeMap<TransportMode, u32>,
}

impl ModeDurations {
    pub fn set(&mut self, mode: TransportMode, minutes: u32) {
        self.minutes.insert(mode, minutes);
    }

    pub fn get(&self, mode: TransportMode) -> Option<u32> {
        self.minutes.get(&mode).copied()
    }

    /// Admissible modes sorted ascending by duration.
    ///
    /// Driving is admissible only for drive-eligible persons; for everyone
    /// else it is appended at the end as a display fallback and is never
    /// the selected mode. If every admissible mode is unreachable the
    /// order is empty and the pair drops out of ranking.
    pub fn preference(&self, can_drive: bool) -> Vec<TransportMode> {
        let mut admissible: Vec<(u32, TransportMode)> = self
            .minutes
            .iter()
            .filter(|(mode, _)| can_drive || **mode != TransportMode::Drive)
            .map(|(mode, minutes)| (*minutes, *mode))
            .collect();
        if admissible
            .iter()
            .all(|(minutes, _)| *minutes == UNREACHABLE_MINUTES)
        {
            return Vec::new();
        }
        admissible.sort();
        let mut order: Vec<TransportMode> =
            admissible.into_iter().map(|(_, mode)| mode).collect();
        if !can_drive {
            order.push(TransportMode::Drive);
        }
        order
    }

    /// The winning (mode, minutes) for this pair, if any mode is usable.
    pub fn designated(&self, can_drive: bool) -> Option<(TransportMode, u32)> {
        let first = *self.preference(can_drive).first()?;
        let minutes = self.get(first).unwrap_or(UNREACHABLE_MINUTES);
        Some((first, minutes))
    }
}

/// Recomputation state of a person.
///
/// `Stale` needs the matrix phase, `Computing` has been admitted to the
/// worker pool, `Ranked` means every current office had a pair entry when
/// ranking last succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonState {
    #[default]
    Stale,
    Computing,
    Ranked,
}

/// One entry of a person's nearest-office ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedOffice {
    pub office: String,
    pub mode: TransportMode,
    pub minutes: u32,
}

/// One entry of an office's nearest-person ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPerson {
    pub person: String,
    pub mode: TransportMode,
    pub minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub address: String,
    pub can_drive: bool,
    #[serde(default)]
    pub location: Coordinate,
    /// Keyed by office name.
    #[serde(default)]
    pub durations: HashMap<String, ModeDurations>,
    #[serde(default)]
    pub nearest: Vec<RankedOffice>,
    #[serde(default)]
    pub state: PersonState,
}

impl Person {
    pub fn from_row(row: &PersonRow) -> Self {
        Self {
            name: row.name.clone(),
            address: row.address.clone(),
            can_drive: row.can_drive,
            location: Coordinate::UNRESOLVED,
            durations: HashMap::new(),
            nearest: Vec::new(),
            state: PersonState::Stale,
        }
    }

    pub fn is_ranked(&self) -> bool {
        self.state == PersonState::Ranked
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Office {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub location: Coordinate,
    /// Full ascending ranking; truncated to [`NEAREST_PERSONS`] on export.
    #[serde(default)]
    pub nearest: Vec<RankedPerson>,
}

impl Office {
    pub fn from_row(row: &OfficeRow) -> Self {
        Self {
            name: row.name.clone(),
            address: row.address.clone(),
            location: Coordinate::UNRESOLVED,
            nearest: Vec::new(),
        }
    }
}

/// A freshly-ingested person row, before reconciliation with the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRow {
    pub name: String,
    pub address: String,
    pub can_drive: bool,
}

/// A freshly-ingested office row.
#[derive(Debug, Clone, PartialEq)]
pub struct OfficeRow {
    pub name: String,
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn durations(entries: &[(TransportMode, u32)]) -> ModeDurations {
        let mut d = ModeDurations::default();
        for (mode, minutes) in entries {
            d.set(*mode, *minutes);
        }
        d
    }

    #[test]
    fn zero_coordinate_is_unresolved() {
        assert!(Coordinate::UNRESOLVED.is_unresolved());
        assert!(Coordinate::new(0.0, 1e-9).is_unresolved());
        assert!(!Coordinate::new(31.2304, 121.4737).is_unresolved());
    }

    #[test]
    fn preference_sorts_ascending_for_drivers() {
        let d = durations(&[
            (TransportMode::Walk, 40),
            (TransportMode::Ride, 25),
            (TransportMode::Transit, 20),
            (TransportMode::Drive, 10),
        ]);
        assert_eq!(
            d.preference(true),
            vec![
                TransportMode::Drive,
                TransportMode::Transit,
                TransportMode::Ride,
                TransportMode::Walk,
            ]
        );
        assert_eq!(d.designated(true), Some((TransportMode::Drive, 10)));
    }

    #[test]
    fn drive_excluded_but_appended_for_non_drivers() {
        let d = durations(&[
            (TransportMode::Walk, 40),
            (TransportMode::Ride, 25),
            (TransportMode::Transit, 20),
            (TransportMode::Drive, 10),
        ]);
        assert_eq!(
            d.preference(false),
            vec![
                TransportMode::Transit,
                TransportMode::Ride,
                TransportMode::Walk,
                TransportMode::Drive,
            ]
        );
        // The fastest raw mode is driving, but it must never win.
        assert_eq!(d.designated(false), Some((TransportMode::Transit, 20)));
    }

    #[test]
    fn mode_ties_break_in_declaration_order() {
        let d = durations(&[
            (TransportMode::Ride, 15),
            (TransportMode::Walk, 15),
            (TransportMode::Drive, 30),
        ]);
        assert_eq!(
            d.preference(true),
            vec![TransportMode::Walk, TransportMode::Ride, TransportMode::Drive]
        );
    }

    #[test]
    fn unreachable_modes_sort_last() {
        let d = durations(&[
            (TransportMode::Walk, UNREACHABLE_MINUTES),
            (TransportMode::Transit, 20),
        ]);
        assert_eq!(
            d.preference(true),
            vec![TransportMode::Transit, TransportMode::Walk]
        );
        assert_eq!(d.designated(true), Some((TransportMode::Transit, 20)));
    }

    #[test]
    fn all_unreachable_yields_empty_preference() {
        let d = durations(&[
            (TransportMode::Walk, UNREACHABLE_MINUTES),
            (TransportMode::Ride, UNREACHABLE_MINUTES),
            (TransportMode::Transit, UNREACHABLE_MINUTES),
            (TransportMode::Drive, UNREACHABLE_MINUTES),
        ]);
        assert!(d.preference(true).is_empty());
        assert_eq!(d.designated(true), None);
    }

    #[test]
    fn non_driver_with_only_drive_reachable_gets_no_mode() {
        let d = durations(&[
            (TransportMode::Walk, UNREACHABLE_MINUTES),
            (TransportMode::Ride, UNREACHABLE_MINUTES),
            (TransportMode::Transit, UNREACHABLE_MINUTES),
            (TransportMode::Drive, 10),
        ]);
        assert!(d.preference(false).is_empty());
        assert_eq!(d.designated(false), None);
    }

    #[test]
    fn transit_serializes_with_its_storage_label() {
        let json = serde_json::to_string(&TransportMode::Transit).unwrap();
        assert_eq!(json, "\"transport\"");
        let back: TransportMode = serde_json::from_str("\"transport\"").unwrap();
        assert_eq!(back, TransportMode::Transit);
        assert_eq!(TransportMode::Transit.label(), "transport");
    }

    #[test]
    fn empty_pair_has_no_preference() {
        let d = ModeDurations::default();
        assert!(d.preference(true).is_empty());
        assert!(d.preference(false).is_empty());
    }
}
