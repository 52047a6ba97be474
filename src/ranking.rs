//! Deterministic nearest-office / nearest-person rankings.
//!
//! Both directions group entries by designated duration, walk the distinct
//! durations ascending, and keep ties in enumeration order: offices in
//! sheet order on the person side, persons in sheet order on the office
//! side. A tie group that straddles the top-K boundary is included only up
//! to K; callers wanting whole groups must post-filter.

use std::collections::BTreeMap;

use crate::model::{NEAREST_OFFICES, Office, Person, RankedOffice, RankedPerson};

/// Rebuild `person.nearest`: the top-K offices by designated duration.
///
/// Offices without a pair entry, and pairs with no usable mode, are
/// skipped. Fewer than K candidates leave a shorter list.
pub fn designate(person: &mut Person, offices: &[Office]) {
    let mut groups: BTreeMap<u32, Vec<RankedOffice>> = BTreeMap::new();
    for office in offices {
        let Some(pair) = person.durations.get(&office.name) else {
            continue;
        };
        let Some((mode, minutes)) = pair.designated(person.can_drive) else {
            continue;
        };
        groups.entry(minutes).or_default().push(RankedOffice {
            office: office.name.clone(),
            mode,
            minutes,
        });
    }
    person.nearest = groups
        .into_values()
        .flatten()
        .take(NEAREST_OFFICES)
        .collect();
}

/// Rebuild `office.nearest`: every person ranked by the duration of *their
/// pair with this office*, not by the person's global first choice.
///
/// The list is kept in full; export truncates it.
pub fn rank_office(office: &mut Office, persons: &[Person]) {
    let mut groups: BTreeMap<u32, Vec<RankedPerson>> = BTreeMap::new();
    for person in persons {
        let Some(pair) = person.durations.get(&office.name) else {
            continue;
        };
        let Some((mode, minutes)) = pair.designated(person.can_drive) else {
            continue;
        };
        groups.entry(minutes).or_default().push(RankedPerson {
            person: person.name.clone(),
            mode,
            minutes,
        });
    }
    office.nearest = groups.into_values().flatten().collect();
}
