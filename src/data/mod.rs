//! Data module - CSV loading, aggregation and the chart preparation pipeline

mod loader;
mod pipeline;
mod processor;

pub use loader::{LoaderError, RecordSet};
pub use pipeline::{prepare_charts, DataSources, PipelineError, PreparedCharts};
pub use processor::{
    AggregatedCell, DataProcessor, DiagnosisOptions, DiagnosisSeries, SpecialtyRow,
    SpecialtySeries,
};
