//! Chart Preparation Pipeline
//! Loads both CSV sources concurrently and prepares each chart independently.

use crate::data::loader::{DataLoader, LoaderError};
use crate::data::processor::{
    DataProcessor, DiagnosisOptions, DiagnosisSeries, ProcessorError, SpecialtySeries,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};

/// Why a chart could not be prepared.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Could not load data: {0}")]
    Load(#[from] LoaderError),
    #[error("Invalid data: {0}")]
    Data(#[from] ProcessorError),
}

/// Locations of the two CSV inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub hospital: PathBuf,
    pub specialty: PathBuf,
}

/// Outcome of preparing both charts. Each side fails on its own.
#[derive(Debug)]
pub struct PreparedCharts {
    pub diagnosis: Result<DiagnosisSeries, PipelineError>,
    pub specialty: Result<SpecialtySeries, PipelineError>,
}

impl PreparedCharts {
    pub fn failure_count(&self) -> usize {
        usize::from(self.diagnosis.is_err()) + usize::from(self.specialty.is_err())
    }
}

/// Load and aggregate both sources, waiting for both before returning.
pub fn prepare_charts(sources: &DataSources, options: &DiagnosisOptions) -> PreparedCharts {
    let start = Instant::now();
    let (diagnosis, specialty) = rayon::join(
        || prepare_diagnosis(&sources.hospital, options),
        || prepare_specialty(&sources.specialty),
    );

    match &diagnosis {
        Ok(series) if series.is_empty() => warn!("Diagnosis chart has no bars to draw"),
        Ok(_) => {}
        Err(e) => error!("Diagnosis chart unavailable: {}", e),
    }
    match &specialty {
        Ok(series) if series.is_empty() => warn!("Specialty chart has no bars to draw"),
        Ok(_) => {}
        Err(e) => error!("Specialty chart unavailable: {}", e),
    }
    info!("Prepared chart data in {:?}", start.elapsed());

    PreparedCharts {
        diagnosis,
        specialty,
    }
}

pub fn prepare_diagnosis(
    path: &Path,
    options: &DiagnosisOptions,
) -> Result<DiagnosisSeries, PipelineError> {
    let records = DataLoader::load_csv(path)?;
    Ok(DataProcessor::aggregate_diagnoses(&records, options))
}

pub fn prepare_specialty(path: &Path) -> Result<SpecialtySeries, PipelineError> {
    let records = DataLoader::load_csv(path)?;
    Ok(DataProcessor::prepare_specialties(&records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn one_failed_source_does_not_block_the_other() {
        let dir = TempDir::new().unwrap();
        let specialty = dir.path().join("specialty_readmission.csv");
        std::fs::write(
            &specialty,
            "medical_specialty,readmission_rate,count\nCardiology,0.2,100\nSurgery,0.1,50\n",
        )
        .unwrap();

        let sources = DataSources {
            hospital: dir.path().join("missing.csv"),
            specialty,
        };
        let charts = prepare_charts(&sources, &DiagnosisOptions::default());

        assert!(matches!(
            charts.diagnosis,
            Err(PipelineError::Load(LoaderError::NotFound(_)))
        ));
        let series = charts.specialty.unwrap();
        assert_eq!(series.rows.len(), 2);
    }

    #[test]
    fn empty_files_give_empty_series() {
        let dir = TempDir::new().unwrap();
        let hospital = dir.path().join("hospital_readmissions.csv");
        let specialty = dir.path().join("specialty_readmission.csv");
        std::fs::write(&hospital, "").unwrap();
        std::fs::write(&specialty, "").unwrap();

        let charts = prepare_charts(
            &DataSources {
                hospital,
                specialty,
            },
            &DiagnosisOptions::default(),
        );

        assert_eq!(charts.failure_count(), 0);
        assert!(charts.diagnosis.unwrap().is_empty());
        assert!(charts.specialty.unwrap().is_empty());
    }

    #[test]
    fn coercion_failure_is_surfaced() {
        let dir = TempDir::new().unwrap();
        let hospital = dir.path().join("hospital_readmissions.csv");
        let specialty = dir.path().join("specialty_readmission.csv");
        std::fs::write(&hospital, "diag_1,age\n428,[70-80)\n428,[60-70)\n").unwrap();
        std::fs::write(
            &specialty,
            "medical_specialty,readmission_rate,count\nCardiology,high,100\n",
        )
        .unwrap();

        let charts = prepare_charts(
            &DataSources {
                hospital,
                specialty,
            },
            &DiagnosisOptions::default(),
        );

        assert_eq!(charts.failure_count(), 1);
        assert_eq!(charts.diagnosis.unwrap().cells.len(), 2);
        assert!(matches!(charts.specialty, Err(PipelineError::Data(_))));
    }
}
