//! Scale Builder
//! Derives the scales of each chart from its prepared series.

use crate::charts::scales::{BandScale, LinearScale, OrdinalColorScale, SequentialColorScale};
use crate::data::{AggregatedCell, DiagnosisSeries, SpecialtySeries};
use crate::stats::StatsCalculator;
use tracing::warn;

const DIAGNOSIS_PADDING: f64 = 0.2;
const AGE_PADDING: f64 = 0.05;
const SPECIALTY_PADDING: f64 = 0.15;
const COUNT_TICKS: usize = 10;

/// Horizontal extent of a bar along its band axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSpan {
    pub start: f64,
    pub width: f64,
}

impl BarSpan {
    pub fn center(&self) -> f64 {
        self.start + self.width / 2.0
    }
}

/// Scales of the grouped diagnosis chart.
#[derive(Debug, Clone)]
pub struct DiagnosisScales {
    /// Outer bands: one per diagnosis.
    pub x0: BandScale,
    /// Inner bands: one per age bracket, nested in an outer band.
    pub x1: BandScale,
    /// Patient count, domain rounded up to a nice bound.
    pub y: LinearScale,
    pub color: OrdinalColorScale,
}

/// Scales of the horizontal specialty chart.
#[derive(Debug, Clone)]
pub struct SpecialtyScales {
    /// Rows: one per specialty, top to bottom in sorted order.
    pub y: BandScale,
    /// Readmission rate, from 0 to the headroom-scaled maximum.
    pub x: LinearScale,
    pub color: SequentialColorScale,
}

/// Builds chart scales for a given drawing extent.
pub struct ScaleBuilder;

impl ScaleBuilder {
    /// Build the diagnosis scales. `y_range` is `(height, 0)` in screen
    /// coordinates, or `(0, height)` when y grows upwards.
    pub fn diagnosis(series: &DiagnosisSeries, width: f64, y_range: (f64, f64)) -> DiagnosisScales {
        let x0 = BandScale::new(series.diagnoses.clone(), (0.0, width)).padding(DIAGNOSIS_PADDING);
        let x1 = BandScale::new(series.ages.clone(), (0.0, x0.bandwidth())).padding(AGE_PADDING);

        let max = series.max_count() as f64;
        let domain = if max > 0.0 { (0.0, max) } else { (0.0, 1.0) };
        let y = LinearScale::new(domain, y_range).nice(COUNT_TICKS);

        let color = OrdinalColorScale::age_brackets(series.ages.clone());
        if color.repeats() {
            warn!(
                "{} age brackets exceed the 10-color palette; colors will repeat",
                series.ages.len()
            );
        }

        DiagnosisScales { x0, x1, y, color }
    }

    pub fn specialty(
        series: &SpecialtySeries,
        x_range: (f64, f64),
        height: f64,
        headroom: f64,
    ) -> SpecialtyScales {
        let names = series
            .rows
            .iter()
            .map(|r| r.medical_specialty.clone())
            .collect();
        let y = BandScale::new(names, (0.0, height)).padding(SPECIALTY_PADDING);

        let extent = StatsCalculator::rate_extent(&series.rows);
        let max = extent.map(|e| e.max * headroom).unwrap_or(0.0);
        let domain = if max > 0.0 { (0.0, max) } else { (0.0, 1.0) };
        let x = LinearScale::new(domain, x_range);

        let color = extent
            .map(|e| SequentialColorScale::new(e.min, e.max))
            .unwrap_or_else(|| SequentialColorScale::new(0.0, 1.0));

        SpecialtyScales { y, x, color }
    }
}

impl DiagnosisScales {
    /// Band-axis extent of a cell's bar.
    pub fn bar_span(&self, cell: &AggregatedCell) -> Option<BarSpan> {
        let outer = self.x0.position(&cell.diagnosis)?;
        let inner = self.x1.position(&cell.age)?;
        Some(BarSpan {
            start: outer + inner,
            width: self.x1.bandwidth(),
        })
    }

    /// Index of the cell whose bar contains (`x`, `value`). `grown` gives the
    /// fraction of each bar currently drawn.
    pub fn cell_at(
        &self,
        series: &DiagnosisSeries,
        x: f64,
        value: f64,
        grown: impl Fn(usize) -> f64,
    ) -> Option<usize> {
        let outer = self.x0.index_at(x)?;
        let inner = self.x1.index_at(x - self.x0.position_at(outer))?;
        let diagnosis = &self.x0.domain()[outer];
        let age = &self.x1.domain()[inner];

        let index = series
            .cells
            .iter()
            .position(|c| &c.diagnosis == diagnosis && &c.age == age)?;
        let top = series.cells[index].count as f64 * grown(index);
        (value >= 0.0 && value <= top).then_some(index)
    }
}

impl SpecialtyScales {
    /// Index of the row whose bar contains (`band`, `value`), `band` measured
    /// from the top of the chart.
    pub fn row_at(
        &self,
        series: &SpecialtySeries,
        band: f64,
        value: f64,
        grown: impl Fn(usize) -> f64,
    ) -> Option<usize> {
        let index = self.y.index_at(band)?;
        let top = series.rows.get(index)?.readmission_rate * grown(index);
        (value >= 0.0 && value <= top).then_some(index)
    }
}
