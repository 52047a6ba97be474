//! CSV ingestion and export glue.
//!
//! Person sheets carry `name,address,can_drive` rows; office sheets carry
//! `name,address`. The first row is a header and rows missing the address
//! column are skipped. Result cells are written as `name (minutes)`.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::model::{OfficeRow, PersonRow, RankedOffice, RankedPerson};
use crate::traits::{ExportError, ResultSink};

#[derive(Debug)]
pub enum SheetError {
    Csv(csv::Error),
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::Csv(err) => write!(f, "csv error: {}", err),
        }
    }
}

impl std::error::Error for SheetError {}

impl From<csv::Error> for SheetError {
    fn from(err: csv::Error) -> Self {
        SheetError::Csv(err)
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Sink(err.to_string())
    }
}

/// `Yes`, `Y`, and `y` mean true; anything else means false.
fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "Yes" | "Y" | "y")
}

pub fn read_persons<R: io::Read>(reader: R) -> Result<Vec<PersonRow>, SheetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.len() < 2 {
            continue;
        }
        rows.push(PersonRow {
            name: record[0].to_string(),
            address: record[1].to_string(),
            can_drive: parse_flag(record.get(2).unwrap_or("")),
        });
    }
    Ok(rows)
}

pub fn read_offices<R: io::Read>(reader: R) -> Result<Vec<OfficeRow>, SheetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.len() < 2 {
            continue;
        }
        rows.push(OfficeRow {
            name: record[0].to_string(),
            address: record[1].to_string(),
        });
    }
    Ok(rows)
}

pub fn read_persons_file(path: impl AsRef<Path>) -> Result<Vec<PersonRow>, SheetError> {
    let file = File::open(path).map_err(csv::Error::from)?;
    read_persons(file)
}

pub fn read_offices_file(path: impl AsRef<Path>) -> Result<Vec<OfficeRow>, SheetError> {
    let file = File::open(path).map_err(csv::Error::from)?;
    read_offices(file)
}

/// Writes one row per entity: the name followed by `name (minutes)` cells.
pub struct CsvSink<W: io::Write> {
    persons: csv::Writer<W>,
    offices: csv::Writer<W>,
}

impl CsvSink<File> {
    pub fn create(
        persons_path: impl AsRef<Path>,
        offices_path: impl AsRef<Path>,
    ) -> Result<Self, ExportError> {
        Ok(Self::from_writers(
            File::create(persons_path)?,
            File::create(offices_path)?,
        ))
    }
}

impl<W: io::Write> CsvSink<W> {
    pub fn from_writers(persons: W, offices: W) -> Self {
        Self {
            persons: csv::WriterBuilder::new().flexible(true).from_writer(persons),
            offices: csv::WriterBuilder::new().flexible(true).from_writer(offices),
        }
    }

    /// Flush both writers and hand the underlying writers back.
    pub fn into_inner(self) -> Result<(W, W), ExportError> {
        let persons = self
            .persons
            .into_inner()
            .map_err(|err| ExportError::Sink(err.to_string()))?;
        let offices = self
            .offices
            .into_inner()
            .map_err(|err| ExportError::Sink(err.to_string()))?;
        Ok((persons, offices))
    }
}

impl<W: io::Write> ResultSink for CsvSink<W> {
    fn export_person(&mut self, name: &str, nearest: &[RankedOffice]) -> Result<(), ExportError> {
        let mut record = Vec::with_capacity(nearest.len() + 1);
        record.push(name.to_string());
        record.extend(
            nearest
                .iter()
                .map(|entry| format!("{} ({})", entry.office, entry.minutes)),
        );
        self.persons.write_record(&record)?;
        Ok(())
    }

    fn export_office(&mut self, name: &str, nearest: &[RankedPerson]) -> Result<(), ExportError> {
        let mut record = Vec::with_capacity(nearest.len() + 1);
        record.push(name.to_string());
        record.extend(
            nearest
                .iter()
                .map(|entry| format!("{} ({})", entry.person, entry.minutes)),
        );
        self.offices.write_record(&record)?;
        Ok(())
    }
}
