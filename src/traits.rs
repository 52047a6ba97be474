//! Collaborator seams for the commute engine.
//!
//! These are intentionally minimal. The engine only ever talks to
//! geocoding, routing, storage, and export through these traits; concrete
//! adapters live in their own modules.

use std::fmt;
use std::io;

use crate::model::{Coordinate, Office, Person, RankedOffice, RankedPerson, TransportMode};

/// Resolves an address string to a coordinate.
///
/// The engine's only contract with geocoding is that a coordinate equal to
/// the zero sentinel means "not yet resolved".
pub trait Geocoder {
    fn resolve(&self, address: &str) -> Result<Coordinate, ProviderError>;
}

/// Answers one route-duration query in whole minutes.
///
/// Errors are non-fatal to callers: a failed (pair, mode) query is recorded
/// as unreachable, never escalated.
pub trait RouteProvider {
    fn duration_minutes(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
        departure_epoch: i64,
    ) -> Result<u32, ProviderError>;
}

/// Name-keyed entity storage. `Ok(None)` from a find means "create".
///
/// Upserts may arrive from concurrent matrix workers for distinct keys, so
/// implementations take `&self` and synchronize internally.
pub trait EntityStore {
    fn find_person(&self, name: &str) -> Result<Option<Person>, StoreError>;
    fn upsert_person(&self, person: &Person) -> Result<(), StoreError>;
    fn find_office(&self, name: &str) -> Result<Option<Office>, StoreError>;
    fn upsert_office(&self, office: &Office) -> Result<(), StoreError>;
}

/// Receives the final ordered rankings for export.
///
/// Office sequences are already truncated to the export limit; layout is
/// the sink's concern.
pub trait ResultSink {
    fn export_person(&mut self, name: &str, nearest: &[RankedOffice]) -> Result<(), ExportError>;
    fn export_office(&mut self, name: &str, nearest: &[RankedPerson]) -> Result<(), ExportError>;
}

/// Failure of a remote geocoding or routing call.
#[derive(Debug)]
pub enum ProviderError {
    /// Transport-level failure: connection, timeout, or decode.
    Transport(String),
    /// The provider answered with a non-success status.
    Status { code: i64, message: String },
    /// A success response that carried no usable route or result.
    NoResult,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Transport(msg) => write!(f, "transport failure: {}", msg),
            ProviderError::Status { code, message } => {
                write!(f, "provider status {}: {}", code, message)
            }
            ProviderError::NoResult => write!(f, "no result in provider response"),
        }
    }
}

impl std::error::Error for ProviderError {}

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "store io error: {}", err),
            StoreError::Backend(msg) => write!(f, "store backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

#[derive(Debug)]
pub enum ExportError {
    Io(io::Error),
    Sink(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "export io error: {}", err),
            ExportError::Sink(msg) => write!(f, "export sink error: {}", msg),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}
