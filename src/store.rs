//! Entity repositories keyed by stable name.
//!
//! `MemoryStore` is the plain in-process repository; `JsonStore` adds a
//! write-through JSON snapshot so entities survive across runs. Both accept
//! concurrent upserts for independent keys, which the matrix workers rely
//! on.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Office, Person};
use crate::traits::{EntityStore, StoreError};

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    persons: Mutex<HashMap<String, Person>>,
    offices: Mutex<HashMap<String, Office>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntityStore for MemoryStore {
    fn find_person(&self, name: &str) -> Result<Option<Person>, StoreError> {
        let persons = self
            .persons
            .lock()
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        Ok(persons.get(name).cloned())
    }

    fn upsert_person(&self, person: &Person) -> Result<(), StoreError> {
        let mut persons = self
            .persons
            .lock()
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        persons.insert(person.name.clone(), person.clone());
        Ok(())
    }

    fn find_office(&self, name: &str) -> Result<Option<Office>, StoreError> {
        let offices = self
            .offices
            .lock()
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        Ok(offices.get(name).cloned())
    }

    fn upsert_office(&self, office: &Office) -> Result<(), StoreError> {
        let mut offices = self
            .offices
            .lock()
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        offices.insert(office.name.clone(), office.clone());
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    persons: Vec<Person>,
    offices: Vec<Office>,
}

/// Name-keyed store persisted as a single JSON snapshot file.
///
/// Every upsert rewrites the snapshot through a temp file followed by an
/// atomic rename, so a crash never leaves a torn file behind.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    /// Open the snapshot at `path`, creating an empty store if the file
    /// does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = MemoryStore::new();
        if path.exists() {
            let snapshot: Snapshot = serde_json::from_reader(BufReader::new(File::open(&path)?))?;
            debug!(
                persons = snapshot.persons.len(),
                offices = snapshot.offices.len(),
                "loaded snapshot"
            );
            for person in &snapshot.persons {
                inner.upsert_person(person)?;
            }
            for office in &snapshot.offices {
                inner.upsert_office(office)?;
            }
        }
        Ok(Self { path, inner })
    }

    fn flush(&self) -> Result<(), StoreError> {
        let snapshot = {
            let persons = self
                .inner
                .persons
                .lock()
                .map_err(|err| StoreError::Backend(err.to_string()))?;
            let offices = self
                .inner
                .offices
                .lock()
                .map_err(|err| StoreError::Backend(err.to_string()))?;
            let mut persons: Vec<Person> = persons.values().cloned().collect();
            let mut offices: Vec<Office> = offices.values().cloned().collect();
            persons.sort_by(|a, b| a.name.cmp(&b.name));
            offices.sort_by(|a, b| a.name.cmp(&b.name));
            Snapshot { persons, offices }
        };

        let tmp_path = self.path.with_extension("tmp");
        let writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer_pretty(writer, &snapshot)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntityStore for JsonStore {
    fn find_person(&self, name: &str) -> Result<Option<Person>, StoreError> {
        self.inner.find_person(name)
    }

    fn upsert_person(&self, person: &Person) -> Result<(), StoreError> {
        self.inner.upsert_person(person)?;
        self.flush()
    }

    fn find_office(&self, name: &str) -> Result<Option<Office>, StoreError> {
        self.inner.find_office(name)
    }

    fn upsert_office(&self, office: &Office) -> Result<(), StoreError> {
        self.inner.upsert_office(office)?;
        self.flush()
    }
}
