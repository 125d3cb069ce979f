//! Stats module - weighted readmission statistics

mod calculator;

pub use calculator::{SpecialtySummary, StatsCalculator};
