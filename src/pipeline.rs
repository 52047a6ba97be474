//! The full pass: reconcile → geocode → fill durations → rank → export.
//!
//! Every phase is best-effort. Provider and persistence failures degrade
//! individual entries and are logged; only export/IO failures and worker
//! pool construction abort a pass.

use std::fmt;

use tracing::{error, info};

use crate::matrix::{DurationMatrixComputer, MatrixConfig, MatrixError};
use crate::model::{NEAREST_PERSONS, Office, OfficeRow, Person, PersonRow, PersonState};
use crate::ranking;
use crate::tracker::ChangeTracker;
use crate::traits::{EntityStore, ExportError, Geocoder, ResultSink, RouteProvider};

#[derive(Debug)]
pub enum PipelineError {
    Matrix(MatrixError),
    Export(ExportError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Matrix(err) => write!(f, "matrix phase failed: {}", err),
            PipelineError::Export(err) => write!(f, "export failed: {}", err),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<MatrixError> for PipelineError {
    fn from(err: MatrixError) -> Self {
        PipelineError::Matrix(err)
    }
}

impl From<ExportError> for PipelineError {
    fn from(err: ExportError) -> Self {
        PipelineError::Export(err)
    }
}

/// What one pass touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub persons: usize,
    pub offices: usize,
    /// Persons that went through the matrix phase.
    pub recomputed: usize,
}

pub struct Pipeline<'a, G, R, S> {
    geocoder: &'a G,
    routes: &'a R,
    store: &'a S,
    config: MatrixConfig,
}

impl<'a, G, R, S> Pipeline<'a, G, R, S>
where
    G: Geocoder,
    R: RouteProvider + Sync,
    S: EntityStore + Sync,
{
    pub fn new(geocoder: &'a G, routes: &'a R, store: &'a S, config: MatrixConfig) -> Self {
        Self {
            geocoder,
            routes,
            store,
            config,
        }
    }

    /// Run one full pass over the ingested rows.
    pub fn run<E: ResultSink>(
        &self,
        person_rows: &[PersonRow],
        office_rows: &[OfficeRow],
        sink: &mut E,
    ) -> Result<RunReport, PipelineError> {
        let tracker = ChangeTracker::new(self.store);
        let (mut persons, mut offices) = tracker.reconcile(person_rows, office_rows);

        self.resolve_locations(&mut persons, &mut offices);

        let computer = DurationMatrixComputer::new(self.routes, self.store, self.config.clone());
        let recomputed = computer.fill(&mut persons, &offices)?;

        info!("ranking nearest offices per person");
        for person in &mut persons {
            ranking::designate(person, &offices);
            person.state = PersonState::Ranked;
            if let Err(err) = self.store.upsert_person(person) {
                error!(person = %person.name, %err, "upsert failed");
            }
        }

        info!("ranking nearest persons per office");
        for office in &mut offices {
            ranking::rank_office(office, &persons);
            if let Err(err) = self.store.upsert_office(office) {
                error!(office = %office.name, %err, "upsert failed");
            }
        }

        info!("exporting rankings");
        for person in &persons {
            sink.export_person(&person.name, &person.nearest)?;
        }
        for office in &offices {
            let cut = office.nearest.len().min(NEAREST_PERSONS);
            sink.export_office(&office.name, &office.nearest[..cut])?;
        }

        Ok(RunReport {
            persons: persons.len(),
            offices: offices.len(),
            recomputed,
        })
    }

    fn resolve_locations(&self, persons: &mut [Person], offices: &mut [Office]) {
        info!("resolving coordinates for unresolved addresses");
        for person in persons.iter_mut() {
            if !person.location.is_unresolved() {
                continue;
            }
            match self.geocoder.resolve(&person.address) {
                Ok(location) => {
                    person.location = location;
                    if let Err(err) = self.store.upsert_person(person) {
                        error!(person = %person.name, %err, "upsert failed");
                    }
                }
                Err(err) => {
                    error!(person = %person.name, %err, "geocoding failed");
                }
            }
        }
        for office in offices.iter_mut() {
            if !office.location.is_unresolved() {
                continue;
            }
            match self.geocoder.resolve(&office.address) {
                Ok(location) => {
                    office.location = location;
                    if let Err(err) = self.store.upsert_office(office) {
                        error!(office = %office.name, %err, "upsert failed");
                    }
                }
                Err(err) => {
                    error!(office = %office.name, %err, "geocoding failed");
                }
            }
        }
    }
}
