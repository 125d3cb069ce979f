//! Statistics Calculator Module
//! Count-weighted readmission statistics for the specialty chart.

use crate::data::SpecialtyRow;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Totals and the count-weighted mean readmission rate across specialties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpecialtySummary {
    pub total_patients: u64,
    pub total_readmissions: f64,
    /// `None` when there are no patients; never NaN.
    pub overall_rate: Option<f64>,
}

/// Observed range of readmission rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateExtent {
    pub min: f64,
    pub max: f64,
}

/// Handles statistical calculations over prepared specialty rows.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute `Σ(rate × count) / Σcount`.
    pub fn summarize(rows: &[SpecialtyRow]) -> SpecialtySummary {
        let total_patients: u64 = rows.iter().map(|r| r.count).sum();
        let total_readmissions: f64 = rows
            .iter()
            .map(|r| r.readmission_rate * r.count as f64)
            .fold(0.0, |acc, x| acc + x);

        let overall_rate = if total_patients > 0 {
            Some(total_readmissions / total_patients as f64)
        } else {
            None
        };

        SpecialtySummary {
            total_patients,
            total_readmissions,
            overall_rate,
        }
    }

    /// Min and max rate, or `None` for an empty slice.
    pub fn rate_extent(rows: &[SpecialtyRow]) -> Option<RateExtent> {
        if rows.is_empty() {
            return None;
        }
        let rates: Vec<f64> = rows.iter().map(|r| r.readmission_rate).collect();
        Some(RateExtent {
            min: Statistics::min(rates.iter()),
            max: Statistics::max(rates.iter()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(name: &str, rate: f64, count: u64) -> SpecialtyRow {
        SpecialtyRow {
            medical_specialty: name.to_string(),
            readmission_rate: rate,
            count,
        }
    }

    #[test]
    fn weighted_mean_uses_counts() {
        let rows = vec![row("Cardiology", 0.2, 100), row("Surgery", 0.1, 50)];
        let summary = StatsCalculator::summarize(&rows);

        assert_eq!(summary.total_patients, 150);
        assert!((summary.total_readmissions - 25.0).abs() < 1e-9);
        let rate = summary.overall_rate.unwrap();
        assert!((rate - 0.166_666_666).abs() < 1e-6);
    }

    #[test]
    fn no_patients_has_no_rate() {
        assert_eq!(StatsCalculator::summarize(&[]).overall_rate, None);
        let rows = vec![row("Empty", 0.5, 0)];
        assert_eq!(StatsCalculator::summarize(&rows).overall_rate, None);
    }

    #[test]
    fn empty_totals_are_positive_zero() {
        let summary = StatsCalculator::summarize(&[]);
        assert_eq!(summary.total_readmissions, 0.0);
        assert!(summary.total_readmissions.is_sign_positive());
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains(r#""total_readmissions":0.0"#), "{}", json);
    }

    #[test]
    fn extent_of_rates() {
        let rows = vec![row("A", 0.3, 1), row("B", 0.05, 1), row("C", 0.12, 1)];
        let extent = StatsCalculator::rate_extent(&rows).unwrap();
        assert_eq!(extent.min, 0.05);
        assert_eq!(extent.max, 0.3);
        assert_eq!(StatsCalculator::rate_extent(&[]), None);
    }

    proptest! {
        /// The weighted mean always lies between the smallest and largest rate.
        #[test]
        fn overall_rate_is_bounded(
            entries in prop::collection::vec((0.0f64..=1.0, 1u64..10_000), 1..40)
        ) {
            let rows: Vec<SpecialtyRow> = entries
                .iter()
                .enumerate()
                .map(|(i, &(rate, count))| row(&format!("S{i}"), rate, count))
                .collect();

            let summary = StatsCalculator::summarize(&rows);
            let extent = StatsCalculator::rate_extent(&rows).unwrap();
            let rate = summary.overall_rate.unwrap();

            prop_assert!(rate >= extent.min - 1e-12, "{} < {}", rate, extent.min);
            prop_assert!(rate <= extent.max + 1e-12, "{} > {}", rate, extent.max);
        }
    }
}
