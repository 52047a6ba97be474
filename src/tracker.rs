//! Change tracking: reconciles ingested rows with stored entities and
//! decides what has to be recomputed.
//!
//! The tracker is the only writer of `Ranked → Stale` transitions. It never
//! computes anything itself; it just resets coordinates, drops invalidated
//! pair entries, and flips states for the later phases to pick up.

use tracing::{debug, error, info};

use crate::model::{Coordinate, Office, OfficeRow, Person, PersonRow, PersonState};
use crate::traits::EntityStore;

pub struct ChangeTracker<'a, S> {
    store: &'a S,
}

impl<'a, S: EntityStore> ChangeTracker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Merge fresh rows with stored state and apply staleness rules.
    ///
    /// Returns the working sets in row order. If any office is new or moved,
    /// every person comes back `Stale` and the affected pair entries are
    /// removed, so the matrix phase requeries exactly those pairs.
    pub fn reconcile(
        &self,
        person_rows: &[PersonRow],
        office_rows: &[OfficeRow],
    ) -> (Vec<Person>, Vec<Office>) {
        let mut persons: Vec<Person> = person_rows
            .iter()
            .map(|row| self.reconcile_person(row))
            .collect();

        let mut changed_offices: Vec<String> = Vec::new();
        let offices: Vec<Office> = office_rows
            .iter()
            .map(|row| {
                let (office, changed) = self.reconcile_office(row);
                if changed {
                    changed_offices.push(office.name.clone());
                }
                office
            })
            .collect();

        if !changed_offices.is_empty() {
            info!(
                offices = changed_offices.len(),
                "office set changed, resetting every person"
            );
            for person in &mut persons {
                for name in &changed_offices {
                    person.durations.remove(name);
                }
                if person.is_ranked() {
                    person.state = PersonState::Stale;
                    if let Err(err) = self.store.upsert_person(person) {
                        error!(person = %person.name, %err, "upsert failed");
                    }
                }
            }
        }

        (persons, offices)
    }

    fn reconcile_person(&self, row: &PersonRow) -> Person {
        let stored = match self.store.find_person(&row.name) {
            Ok(found) => found,
            Err(err) => {
                error!(person = %row.name, %err, "find failed, treating as new");
                None
            }
        };

        let mut person = match stored {
            None => {
                debug!(person = %row.name, "not stored yet, creating");
                let person = Person::from_row(row);
                if let Err(err) = self.store.upsert_person(&person) {
                    error!(person = %person.name, %err, "upsert failed");
                }
                return person;
            }
            Some(person) => person,
        };

        let mut changed = false;
        if row.can_drive != person.can_drive {
            // Durations stay valid; only admissibility changed, so the
            // person re-ranks without new provider calls.
            person.can_drive = row.can_drive;
            changed = true;
        }
        if row.address != person.address {
            info!(
                person = %person.name,
                from = %person.address,
                to = %row.address,
                "address changed, resetting results"
            );
            person.address = row.address.clone();
            person.location = Coordinate::UNRESOLVED;
            person.durations.clear();
            changed = true;
        }
        if changed {
            person.state = PersonState::Stale;
            if let Err(err) = self.store.upsert_person(&person) {
                error!(person = %person.name, %err, "upsert failed");
            }
        }
        // Rankings are derived output, rebuilt every pass.
        person.nearest.clear();
        person
    }

    fn reconcile_office(&self, row: &OfficeRow) -> (Office, bool) {
        let stored = match self.store.find_office(&row.name) {
            Ok(found) => found,
            Err(err) => {
                error!(office = %row.name, %err, "find failed, treating as new");
                None
            }
        };

        let mut office = match stored {
            None => {
                debug!(office = %row.name, "not stored yet, creating");
                let office = Office::from_row(row);
                if let Err(err) = self.store.upsert_office(&office) {
                    error!(office = %office.name, %err, "upsert failed");
                }
                return (office, true);
            }
            Some(office) => office,
        };

        let mut changed = false;
        if row.address != office.address {
            info!(
                office = %office.name,
                from = %office.address,
                to = %row.address,
                "address changed, resetting results"
            );
            office.address = row.address.clone();
            office.location = Coordinate::UNRESOLVED;
            if let Err(err) = self.store.upsert_office(&office) {
                error!(office = %office.name, %err, "upsert failed");
            }
            changed = true;
        }
        office.nearest.clear();
        (office, changed)
    }
}
