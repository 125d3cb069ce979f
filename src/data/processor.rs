//! Data Processor Module
//! Reduces raw records into chart-ready series for both charts.

use crate::data::loader::RecordSet;
use crate::stats::{SpecialtySummary, StatsCalculator};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use tracing::{debug, warn};

pub const DIAGNOSIS_COLUMN: &str = "diag_1";
pub const AGE_COLUMN: &str = "age";
pub const SPECIALTY_COLUMN: &str = "medical_specialty";
pub const RATE_COLUMN: &str = "readmission_rate";
pub const COUNT_COLUMN: &str = "count";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessorError {
    #[error("Invalid value {value:?} in column '{column}' at data row {row}: {reason}")]
    InvalidData {
        row: usize,
        column: String,
        value: String,
        reason: &'static str,
    },
}

/// One bar of the grouped diagnosis chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedCell {
    pub diagnosis: String,
    pub age: String,
    pub count: usize,
}

/// Prepared data for the diagnosis-by-age chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosisSeries {
    /// Category domain: retained diagnoses in descending frequency.
    pub diagnoses: Vec<String>,
    /// Subcategory domain: observed age brackets in lexical order.
    pub ages: Vec<String>,
    pub cells: Vec<AggregatedCell>,
}

impl DiagnosisSeries {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.cells.iter().map(|c| c.count).max().unwrap_or(0)
    }
}

/// One bar of the specialty chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialtyRow {
    pub medical_specialty: String,
    pub readmission_rate: f64,
    pub count: u64,
}

/// Prepared data for the readmission-by-specialty chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpecialtySeries {
    /// Rows sorted by descending rate, ties in input order.
    pub rows: Vec<SpecialtyRow>,
    pub summary: SpecialtySummary,
}

impl SpecialtySeries {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Options for the diagnosis aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisOptions {
    pub top_n: usize,
    pub missing_label: String,
}

impl Default for DiagnosisOptions {
    fn default() -> Self {
        Self {
            top_n: 7,
            missing_label: "Missing".to_string(),
        }
    }
}

/// Counts keyed by value, kept in first-seen order.
#[derive(Debug, Default)]
struct OrderedCounts<'a> {
    slots: HashMap<&'a str, usize>,
    entries: Vec<(&'a str, usize)>,
}

impl<'a> OrderedCounts<'a> {
    fn add(&mut self, key: &'a str) {
        match self.slots.get(key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.slots.insert(key, self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }
}

/// Handles data aggregation and coercion.
pub struct DataProcessor;

impl DataProcessor {
    /// Count diagnoses per age bracket for the most frequent diagnoses.
    ///
    /// The top `top_n` codes are chosen from all records (ties keep first
    /// occurrence order); the missing sentinel and rows without an age are
    /// then dropped. Cells follow first-seen diagnosis, then first-seen age.
    pub fn aggregate_diagnoses(records: &RecordSet, options: &DiagnosisOptions) -> DiagnosisSeries {
        let (Some(diag_col), Some(age_col)) = (
            records.column_index(DIAGNOSIS_COLUMN),
            records.column_index(AGE_COLUMN),
        ) else {
            warn!(
                "Hospital data lacks '{}' or '{}' column; diagnosis chart will be empty",
                DIAGNOSIS_COLUMN, AGE_COLUMN
            );
            return DiagnosisSeries::default();
        };

        let mut totals = OrderedCounts::default();
        for record in records.records() {
            totals.add(record.value(diag_col));
        }

        let mut ranked = totals.entries;
        // sort_by is stable, so equal counts keep first-occurrence order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let top: Vec<&str> = ranked
            .iter()
            .take(options.top_n)
            .map(|(diag, _)| *diag)
            .collect();
        debug!("Top diagnoses: {:?}", top);

        let mut groups: Vec<(&str, OrderedCounts)> = Vec::new();
        let mut group_slots: HashMap<&str, usize> = HashMap::new();
        for record in records.records() {
            let diag = record.value(diag_col);
            let age = record.value(age_col);
            if !top.contains(&diag) || diag == options.missing_label || age.is_empty() {
                continue;
            }
            let slot = *group_slots.entry(diag).or_insert_with(|| {
                groups.push((diag, OrderedCounts::default()));
                groups.len() - 1
            });
            groups[slot].1.add(age);
        }

        let cells: Vec<AggregatedCell> = groups
            .iter()
            .flat_map(|(diag, ages)| {
                ages.entries.iter().map(move |(age, count)| AggregatedCell {
                    diagnosis: diag.to_string(),
                    age: age.to_string(),
                    count: *count,
                })
            })
            .collect();

        let diagnoses = top
            .iter()
            .filter(|diag| group_slots.contains_key(*diag))
            .map(|diag| diag.to_string())
            .collect();

        let ages = cells
            .iter()
            .map(|c| c.age.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        DiagnosisSeries {
            diagnoses,
            ages,
            cells,
        }
    }

    /// Coerce, validate and sort specialty rows, then summarize them.
    pub fn prepare_specialties(records: &RecordSet) -> Result<SpecialtySeries, ProcessorError> {
        let (Some(name_col), Some(rate_col), Some(count_col)) = (
            records.column_index(SPECIALTY_COLUMN),
            records.column_index(RATE_COLUMN),
            records.column_index(COUNT_COLUMN),
        ) else {
            warn!(
                "Specialty data lacks one of '{}', '{}', '{}'; specialty chart will be empty",
                SPECIALTY_COLUMN, RATE_COLUMN, COUNT_COLUMN
            );
            return Ok(SpecialtySeries::default());
        };

        let mut rows = Vec::with_capacity(records.len());
        for (i, record) in records.records().enumerate() {
            let row = i + 1;
            let name = record.value(name_col).trim();
            if name.is_empty() {
                return Err(Self::invalid(row, SPECIALTY_COLUMN, name, "empty label"));
            }
            let raw_rate = record.value(rate_col);
            let raw_count = record.value(count_col);
            let readmission_rate = Self::parse_rate(raw_rate)
                .map_err(|reason| Self::invalid(row, RATE_COLUMN, raw_rate, reason))?;
            let count = Self::parse_count(raw_count)
                .map_err(|reason| Self::invalid(row, COUNT_COLUMN, raw_count, reason))?;

            rows.push(SpecialtyRow {
                medical_specialty: name.to_string(),
                readmission_rate,
                count,
            });
        }

        // Stable: equal rates stay in input order
        rows.sort_by(|a, b| b.readmission_rate.total_cmp(&a.readmission_rate));
        let summary = StatsCalculator::summarize(&rows);
        debug!(
            "Prepared {} specialties, overall rate {:?}",
            rows.len(),
            summary.overall_rate
        );

        Ok(SpecialtySeries { rows, summary })
    }

    /// Parse a readmission rate as a finite fraction in [0, 1].
    pub fn parse_rate(raw: &str) -> Result<f64, &'static str> {
        let value: f64 = raw.trim().parse().map_err(|_| "not a number")?;
        if !value.is_finite() {
            return Err("not a finite number");
        }
        if !(0.0..=1.0).contains(&value) {
            return Err("rate outside [0, 1]");
        }
        Ok(value)
    }

    /// Parse a sample size as a non-negative whole number ("50" or "50.0").
    pub fn parse_count(raw: &str) -> Result<u64, &'static str> {
        let text = raw.trim();
        if let Ok(value) = text.parse::<u64>() {
            return Ok(value);
        }
        let value: f64 = text.parse().map_err(|_| "not a number")?;
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
            return Err("not a non-negative whole number");
        }
        Ok(value as u64)
    }

    fn invalid(row: usize, column: &str, value: &str, reason: &'static str) -> ProcessorError {
        ProcessorError::InvalidData {
            row,
            column: column.to_string(),
            value: value.to_string(),
            reason,
        }
    }
}
