//! Chart Scales
//! Band, linear and color scales mapping data values to positions and colors.

use crate::charts::palette::{viridis, AGE_PALETTE};
use plotters::style::RGBColor;
use std::collections::HashSet;

/// Maps an ordered set of categories to evenly spaced bands.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// Repeated keys collapse onto the band of their first occurrence.
    pub fn new(domain: Vec<String>, range: (f64, f64)) -> Self {
        let mut seen = HashSet::with_capacity(domain.len());
        let domain: Vec<String> = domain
            .into_iter()
            .filter(|key| seen.insert(key.clone()))
            .collect();
        let mut scale = Self {
            domain,
            range,
            padding_inner: 0.0,
            padding_outer: 0.0,
            start: range.0,
            step: 0.0,
            bandwidth: 0.0,
        };
        scale.rescale();
        scale
    }

    /// Set inner and outer padding, as a fraction of the step.
    pub fn padding(mut self, padding: f64) -> Self {
        self.padding_inner = padding.clamp(0.0, 1.0);
        self.padding_outer = padding.max(0.0);
        self.rescale();
        self
    }

    fn rescale(&mut self) {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        let span = r1 - r0;
        self.step = span / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0);
        // Center the bands within the range
        self.start = r0 + (span - self.step * (n - self.padding_inner)) * 0.5;
        self.bandwidth = self.step * (1.0 - self.padding_inner);
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Start of the band at `index`.
    pub fn position_at(&self, index: usize) -> f64 {
        self.start + self.step * index as f64
    }

    /// Start of the band for `key`, if it is in the domain.
    pub fn position(&self, key: &str) -> Option<f64> {
        self.index_of(key).map(|i| self.position_at(i))
    }

    pub fn center(&self, key: &str) -> Option<f64> {
        self.position(key).map(|p| p + self.bandwidth / 2.0)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.domain.iter().position(|k| k == key)
    }

    /// Index of the band containing `value`; padding between bands hits nothing.
    pub fn index_at(&self, value: f64) -> Option<usize> {
        if self.is_empty() || self.step <= 0.0 || !value.is_finite() {
            return None;
        }
        let offset = value - self.start;
        if offset < 0.0 {
            return None;
        }
        let index = (offset / self.step).floor() as usize;
        if index < self.domain.len() && value - self.position_at(index) <= self.bandwidth {
            Some(index)
        } else {
            None
        }
    }
}

/// Continuous linear mapping from a numeric domain to a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

/// Tick positions as integers over a shared increment.
/// A negative increment means "divide by its magnitude", which keeps
/// fractional ticks exact (0.3 rather than 0.30000000000000004).
#[derive(Debug, Clone, Copy)]
struct TickSpec {
    first: i64,
    last: i64,
    increment: f64,
}

impl TickSpec {
    fn new(start: f64, stop: f64, count: f64) -> Option<Self> {
        let step = (stop - start) / count.max(0.0);
        if !(step.is_finite() && step > 0.0) {
            return None;
        }
        let power = step.log10().floor();
        let error = step / 10f64.powf(power);
        let factor = if error >= 50f64.sqrt() {
            10.0
        } else if error >= 10f64.sqrt() {
            5.0
        } else if error >= 2f64.sqrt() {
            2.0
        } else {
            1.0
        };

        let (first, last, increment) = if power < 0.0 {
            let inverse = 10f64.powf(-power) / factor;
            let mut first = (start * inverse).round() as i64;
            let mut last = (stop * inverse).round() as i64;
            if (first as f64) / inverse < start {
                first += 1;
            }
            if (last as f64) / inverse > stop {
                last -= 1;
            }
            (first, last, -inverse)
        } else {
            let inc = 10f64.powf(power) * factor;
            let mut first = (start / inc).round() as i64;
            let mut last = (stop / inc).round() as i64;
            if (first as f64) * inc < start {
                first += 1;
            }
            if (last as f64) * inc > stop {
                last -= 1;
            }
            (first, last, inc)
        };

        if last < first && (0.5..2.0).contains(&count) {
            return Self::new(start, stop, count * 2.0);
        }
        Some(Self {
            first,
            last,
            increment,
        })
    }

    fn value(&self, i: i64) -> f64 {
        if self.increment < 0.0 {
            i as f64 / -self.increment
        } else {
            i as f64 * self.increment
        }
    }
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        r0 + t * (r1 - r0)
    }

    /// Extend the domain outwards to round tick boundaries.
    pub fn nice(mut self, count: usize) -> Self {
        let (mut start, mut stop) = self.domain;
        if !(stop > start) {
            return self;
        }
        let mut previous: Option<f64> = None;
        for _ in 0..10 {
            let Some(spec) = TickSpec::new(start, stop, count as f64) else {
                break;
            };
            let step = spec.increment;
            if previous == Some(step) {
                self.domain = (start, stop);
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            }
            previous = Some(step);
        }
        self
    }

    /// Roughly `count` round values spanning the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (start, stop) = self.domain;
        if count == 0 || !start.is_finite() || !stop.is_finite() {
            return Vec::new();
        }
        if start == stop {
            return vec![start];
        }
        let (lo, hi) = if start < stop { (start, stop) } else { (stop, start) };
        let Some(spec) = TickSpec::new(lo, hi, count as f64) else {
            return Vec::new();
        };
        let mut ticks: Vec<f64> = (spec.first..=spec.last).map(|i| spec.value(i)).collect();
        if start > stop {
            ticks.reverse();
        }
        ticks
    }
}

/// Assigns each category a color from a fixed palette, cycling when exhausted.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalColorScale {
    domain: Vec<String>,
    palette: Vec<RGBColor>,
}

impl OrdinalColorScale {
    pub fn new(domain: Vec<String>, palette: Vec<RGBColor>) -> Self {
        Self { domain, palette }
    }

    /// The ten named age colors.
    pub fn age_brackets(domain: Vec<String>) -> Self {
        Self::new(domain, AGE_PALETTE.iter().map(|(_, c)| *c).collect())
    }

    /// True when the domain has more categories than distinct colors.
    pub fn repeats(&self) -> bool {
        self.domain.len() > self.palette.len()
    }

    pub fn color(&self, key: &str) -> RGBColor {
        if self.palette.is_empty() {
            return RGBColor(0, 0, 0);
        }
        let index = self
            .domain
            .iter()
            .position(|k| k == key)
            .unwrap_or(self.domain.len());
        self.palette[index % self.palette.len()]
    }
}

/// Maps a numeric extent onto the viridis ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequentialColorScale {
    min: f64,
    max: f64,
}

impl SequentialColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn color(&self, value: f64) -> RGBColor {
        let t = if self.max == self.min {
            0.5
        } else {
            (value - self.min) / (self.max - self.min)
        };
        viridis(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn band_positions_with_padding() {
        let scale = BandScale::new(keys(&["a", "b", "c", "d"]), (0.0, 100.0)).padding(0.2);
        // step = 100 / (4 - 0.2 + 0.4)
        let step = 100.0 / 4.2;
        assert!(approx(scale.step(), step));
        assert!(approx(scale.bandwidth(), step * 0.8));
        assert!(approx(scale.position("a").unwrap(), step * 0.2));
        assert!(approx(scale.position("d").unwrap(), step * 3.2));
        assert_eq!(scale.position("z"), None);
    }

    #[test]
    fn band_lookup_skips_padding() {
        let scale = BandScale::new(keys(&["a", "b"]), (0.0, 10.0));
        assert_eq!(scale.index_at(2.0), Some(0));
        assert_eq!(scale.index_at(7.5), Some(1));
        assert_eq!(scale.index_at(-1.0), None);
        assert_eq!(scale.index_at(11.0), None);

        let padded = BandScale::new(keys(&["a", "b"]), (0.0, 10.0)).padding(0.5);
        let gap = padded.position_at(0) + padded.bandwidth() + padded.step() * 0.25;
        assert_eq!(padded.index_at(gap), None);
        assert_eq!(padded.index_at(padded.center("b").unwrap()), Some(1));
    }

    #[test]
    fn repeated_keys_share_one_band() {
        let scale = BandScale::new(keys(&["A", "A", "B", "A"]), (0.0, 20.0));
        assert_eq!(scale.len(), 2);
        assert_eq!(scale.domain(), keys(&["A", "B"]).as_slice());
        assert_eq!(scale.index_of("B"), Some(1));
        assert!(approx(scale.position("B").unwrap(), 10.0));
        assert_eq!(scale.index_at(15.0), Some(1));
    }

    #[test]
    fn empty_band_scale_has_no_bands() {
        let scale = BandScale::new(Vec::new(), (0.0, 500.0)).padding(0.2);
        assert!(scale.is_empty());
        assert_eq!(scale.index_at(10.0), None);
        assert!(scale.bandwidth().is_finite());
    }

    #[test]
    fn nice_rounds_up_to_friendly_bounds() {
        let y = LinearScale::new((0.0, 37.0), (370.0, 0.0)).nice(10);
        assert_eq!(y.domain(), (0.0, 40.0));

        let y = LinearScale::new((0.0, 2873.0), (1.0, 0.0)).nice(10);
        assert_eq!(y.domain(), (0.0, 3000.0));

        let y = LinearScale::new((0.0, 0.33), (0.0, 1.0)).nice(10);
        assert_eq!(y.domain(), (0.0, 0.35));

        let flat = LinearScale::new((0.0, 0.0), (0.0, 1.0)).nice(10);
        assert_eq!(flat.domain(), (0.0, 0.0));
    }

    #[test]
    fn ticks_are_round_numbers() {
        let y = LinearScale::new((0.0, 40.0), (0.0, 1.0));
        assert_eq!(
            y.ticks(10),
            vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0]
        );

        let x = LinearScale::new((0.0, 0.33), (0.0, 1.0));
        assert_eq!(x.ticks(6), vec![0.0, 0.05, 0.1, 0.15, 0.2, 0.25, 0.3]);
    }

    #[test]
    fn linear_scale_maps_values() {
        let y = LinearScale::new((0.0, 40.0), (400.0, 0.0));
        assert!(approx(y.scale(10.0), 300.0));
        assert!(approx(y.scale(40.0), 0.0));
        assert!(approx(LinearScale::new((5.0, 5.0), (0.0, 10.0)).scale(5.0), 5.0));
    }

    #[test]
    fn ordinal_colors_cycle_after_ten() {
        let ages: Vec<String> = (0..12).map(|i| format!("[{}-{})", i * 10, i * 10 + 10)).collect();
        let color = OrdinalColorScale::age_brackets(ages.clone());

        assert!(color.repeats());
        assert_eq!(color.color(&ages[0]), RGBColor(148, 0, 211));
        assert_eq!(color.color(&ages[9]), RGBColor(255, 255, 0));
        assert_eq!(color.color(&ages[10]), color.color(&ages[0]));
        assert_eq!(color.color(&ages[11]), color.color(&ages[1]));
    }

    #[test]
    fn sequential_color_spans_extent() {
        let color = SequentialColorScale::new(0.1, 0.3);
        assert_eq!(color.color(0.1), viridis(0.0));
        assert_eq!(color.color(0.3), viridis(1.0));
        assert_eq!(SequentialColorScale::new(0.2, 0.2).color(0.2), viridis(0.5));
    }
}
