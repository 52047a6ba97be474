//! Test fixtures for commute-planner.
//!
//! Provides realistic test data including:
//! - Real Shanghai locations (from OpenStreetMap)
//! - Row builders and scripted collaborator mocks

#![allow(dead_code)]

pub mod shanghai_locations;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use commute_planner::model::{
    Coordinate, ModeDurations, Office, OfficeRow, Person, PersonRow, RankedOffice, RankedPerson,
    TransportMode,
};
use commute_planner::store::MemoryStore;
use commute_planner::traits::{
    EntityStore, ExportError, Geocoder, ProviderError, ResultSink, RouteProvider, StoreError,
};

pub fn person_row(name: &str, address: &str, can_drive: bool) -> PersonRow {
    PersonRow {
        name: name.to_string(),
        address: address.to_string(),
        can_drive,
    }
}

pub fn office_row(name: &str, address: &str) -> OfficeRow {
    OfficeRow {
        name: name.to_string(),
        address: address.to_string(),
    }
}

pub fn pair(entries: &[(TransportMode, u32)]) -> ModeDurations {
    let mut durations = ModeDurations::default();
    for (mode, minutes) in entries {
        durations.set(*mode, *minutes);
    }
    durations
}

fn coordinate_key(coordinate: Coordinate) -> String {
    format!("{:.6},{:.6}", coordinate.lat, coordinate.lng)
}

/// Address → coordinate lookup; unknown addresses fail to resolve.
#[derive(Default)]
pub struct MockGeocoder {
    map: HashMap<String, Coordinate>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: &str, coordinate: Coordinate) {
        self.map.insert(address.to_string(), coordinate);
    }
}

impl Geocoder for MockGeocoder {
    fn resolve(&self, address: &str) -> Result<Coordinate, ProviderError> {
        self.map
            .get(address)
            .copied()
            .ok_or(ProviderError::NoResult)
    }
}

/// Scripted route durations keyed by (origin, destination, mode), with a
/// call counter. Missing entries fail like an unroutable pair.
#[derive(Default)]
pub struct TableRoutes {
    table: HashMap<(String, String, TransportMode), u32>,
    calls: AtomicUsize,
}

impl TableRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, from: Coordinate, to: Coordinate, mode: TransportMode, minutes: u32) {
        self.table
            .insert((coordinate_key(from), coordinate_key(to), mode), minutes);
    }

    pub fn set_all(&mut self, from: Coordinate, to: Coordinate, minutes: [u32; 4]) {
        for (mode, value) in TransportMode::ALL.into_iter().zip(minutes) {
            self.set(from, to, mode, value);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteProvider for TableRoutes {
    fn duration_minutes(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
        _departure_epoch: i64,
    ) -> Result<u32, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.table
            .get(&(coordinate_key(origin), coordinate_key(destination), mode))
            .copied()
            .ok_or(ProviderError::NoResult)
    }
}

/// Wraps any provider and counts the calls that reach it.
pub struct CountingRoutes<'a, R> {
    inner: &'a R,
    calls: AtomicUsize,
}

impl<'a, R> CountingRoutes<'a, R> {
    pub fn new(inner: &'a R) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<R: RouteProvider> RouteProvider for CountingRoutes<'_, R> {
    fn duration_minutes(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
        departure_epoch: i64,
    ) -> Result<u32, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .duration_minutes(origin, destination, mode, departure_epoch)
    }
}

/// Records exported rankings for assertions.
#[derive(Default)]
pub struct VecSink {
    pub persons: Vec<(String, Vec<RankedOffice>)>,
    pub offices: Vec<(String, Vec<RankedPerson>)>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn person(&self, name: &str) -> &[RankedOffice] {
        self.persons
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn office(&self, name: &str) -> &[RankedPerson] {
        self.offices
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or(&[])
    }
}

impl ResultSink for VecSink {
    fn export_person(&mut self, name: &str, nearest: &[RankedOffice]) -> Result<(), ExportError> {
        self.persons.push((name.to_string(), nearest.to_vec()));
        Ok(())
    }

    fn export_office(&mut self, name: &str, nearest: &[RankedPerson]) -> Result<(), ExportError> {
        self.offices.push((name.to_string(), nearest.to_vec()));
        Ok(())
    }
}

/// A store whose upserts can be made to fail, for degraded-path tests.
pub struct FlakyStore {
    inner: MemoryStore,
    fail_upserts: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_upserts: AtomicBool::new(false),
        }
    }

    pub fn fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }
}

impl EntityStore for FlakyStore {
    fn find_person(&self, name: &str) -> Result<Option<Person>, StoreError> {
        self.inner.find_person(name)
    }

    fn upsert_person(&self, person: &Person) -> Result<(), StoreError> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected upsert failure".to_string()));
        }
        self.inner.upsert_person(person)
    }

    fn find_office(&self, name: &str) -> Result<Option<Office>, StoreError> {
        self.inner.find_office(name)
    }

    fn upsert_office(&self, office: &Office) -> Result<(), StoreError> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected upsert failure".to_string()));
        }
        self.inner.upsert_office(office)
    }
}
