//! Duration matrix computation under a bounded concurrency budget.
//!
//! Every stale person is handed to a worker from a dedicated pool sized to
//! the budget, which caps the number of persons in flight, and with them
//! the number of concurrent outbound provider calls. Within a worker the
//! office and mode queries run sequentially.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::fmt;

use chrono::NaiveDateTime;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::model::{ModeDurations, Office, Person, PersonState, TransportMode, UNREACHABLE_MINUTES};
use crate::traits::{EntityStore, RouteProvider};

/// All comparisons in one pass share a single assumed departure time.
const REFERENCE_DEPARTURE: &str = "2021-10-11 07:00:00";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DEFAULT_MAX_WORKERS: usize = 40;

#[derive(Debug, Clone)]
pub struct MatrixConfig {
    /// Upper bound on persons processed concurrently.
    pub max_workers: usize,
    /// Shared reference departure time (unix seconds) for every query.
    pub departure_epoch: i64,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            departure_epoch: reference_departure_epoch(),
        }
    }
}

/// The default weekday-morning departure reference.
pub fn reference_departure_epoch() -> i64 {
    NaiveDateTime::parse_from_str(REFERENCE_DEPARTURE, TIME_FORMAT)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0)
}

#[derive(Debug)]
pub enum MatrixError {
    Pool(rayon::ThreadPoolBuildError),
}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixError::Pool(err) => write!(f, "worker pool construction failed: {}", err),
        }
    }
}

impl std::error::Error for MatrixError {}

impl From<rayon::ThreadPoolBuildError> for MatrixError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        MatrixError::Pool(err)
    }
}

pub struct DurationMatrixComputer<'a, R, S> {
    routes: &'a R,
    store: &'a S,
    config: MatrixConfig,
}

impl<'a, R, S> DurationMatrixComputer<'a, R, S>
where
    R: RouteProvider + Sync,
    S: EntityStore + Sync,
{
    pub fn new(routes: &'a R, store: &'a S, config: MatrixConfig) -> Self {
        Self {
            routes,
            store,
            config,
        }
    }

    /// Fill missing pair entries for every non-ranked person.
    ///
    /// Each worker owns exactly one person, so workers never contend on the
    /// matrix itself; only the store sees concurrent upserts. Returns the
    /// number of persons processed. The call joins all workers before
    /// returning.
    pub fn fill(&self, persons: &mut [Person], offices: &[Office]) -> Result<usize, MatrixError> {
        info!(
            budget = self.config.max_workers,
            "computing person-to-office durations"
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers.max(1))
            .build()?;

        let processed = AtomicUsize::new(0);
        pool.install(|| {
            persons
                .par_iter_mut()
                .filter(|person| !person.is_ranked())
                .for_each(|person| {
                    person.state = PersonState::Computing;
                    self.fill_person(person, offices);
                    processed.fetch_add(1, Ordering::Relaxed);
                });
        });

        Ok(processed.into_inner())
    }

    fn fill_person(&self, person: &mut Person, offices: &[Office]) {
        if person.location.is_unresolved() {
            // Durations are still computed against the sentinel rather
            // than skipped; this warning is the only flag.
            warn!(person = %person.name, "computing durations for an unresolved coordinate");
        }
        for office in offices {
            if person.durations.contains_key(&office.name) {
                debug!(person = %person.name, office = %office.name, "pair still valid");
                continue;
            }
            let modes = self.compute_pair(person, office);
            person.durations.insert(office.name.clone(), modes);
        }
        if let Err(err) = self.store.upsert_person(person) {
            error!(person = %person.name, %err, "upsert failed");
        }
    }

    fn compute_pair(&self, person: &Person, office: &Office) -> ModeDurations {
        let mut modes = ModeDurations::default();
        for mode in TransportMode::ALL {
            let minutes = match self.routes.duration_minutes(
                person.location,
                office.location,
                mode,
                self.config.departure_epoch,
            ) {
                Ok(minutes) => minutes,
                Err(err) => {
                    warn!(
                        person = %person.name,
                        office = %office.name,
                        mode = mode.label(),
                        %err,
                        "route query failed, marking unreachable"
                    );
                    UNREACHABLE_MINUTES
                }
            };
            modes.set(mode, minutes);
        }
        modes
    }
}
