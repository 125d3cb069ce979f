//! Chart Plotter Module
//! Interactive versions of both charts drawn with egui_plot.
//!
//! Each panel owns its series, its scales, its growth animation and exactly
//! one tooltip. Bars grow in with a staggered ease on first display and after
//! every reload; the specialty chart's average line fades in once all bars
//! have finished growing.

use crate::charts::animation::{AnimationClock, FadeIn, GrowthAnimation};
use crate::charts::builder::{DiagnosisScales, ScaleBuilder, SpecialtyScales};
use crate::charts::palette::{to_color32, AVERAGE_LINE, BAR_STROKE};
use crate::charts::renderer::format_percent;
use crate::charts::tooltip::{diagnosis_lines, specialty_lines, Tooltip};
use crate::config::{DiagnosisChartConfig, SpecialtyChartConfig};
use crate::data::{DiagnosisSeries, SpecialtySeries};
use egui::{Align2, RichText, Stroke};
use egui_plot::{
    Bar, BarChart, Corner, GridMark, Legend, LineStyle, Plot, PlotPoint, Text, VLine,
};

const COUNT_TICKS: usize = 10;
const RATE_TICKS: usize = 6;

/// Grid marks at the given values, labelled at every mark.
fn grid_marks(values: &[f64]) -> Vec<GridMark> {
    let step = values
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .find(|s| *s > 0.0)
        .unwrap_or(1.0);
    values
        .iter()
        .map(|&value| GridMark {
            value,
            step_size: step,
        })
        .collect()
}

/// Label of the category whose position is closest to `value`.
fn nearest_label(positions: &[(f64, String)], value: f64, tolerance: f64) -> String {
    positions
        .iter()
        .find(|(p, _)| (p - value).abs() <= tolerance)
        .map(|(_, label)| label.clone())
        .unwrap_or_default()
}

fn bar_stroke() -> Stroke {
    Stroke::new(1.0, to_color32(BAR_STROKE))
}

/// Grouped vertical bar chart of diagnosis counts per age bracket.
pub struct DiagnosisPanel {
    series: DiagnosisSeries,
    scales: DiagnosisScales,
    config: DiagnosisChartConfig,
    growth: GrowthAnimation,
    clock: AnimationClock,
    tooltip: Tooltip,
}

impl DiagnosisPanel {
    pub fn new(series: DiagnosisSeries, config: &DiagnosisChartConfig) -> Self {
        let width = config.canvas.plot_width() as f64;
        let scales = ScaleBuilder::diagnosis(&series, width, (0.0, 1.0));
        let growth = GrowthAnimation::new(
            config.animation.duration_ms,
            config.animation.stagger_ms,
            series.cells.len(),
        );
        Self {
            series,
            scales,
            config: config.clone(),
            growth,
            clock: AnimationClock::default(),
            tooltip: Tooltip::default(),
        }
    }

    pub fn series(&self) -> &DiagnosisSeries {
        &self.series
    }

    /// Replay the growth animation and drop any visible tooltip.
    pub fn restart(&mut self) {
        self.clock.reset();
        self.tooltip.reset();
    }

    /// Bars grouped by age bracket, in age order, each grown to `grown(i)`.
    pub fn bars_by_age(&self, grown: impl Fn(usize) -> f64) -> Vec<(String, Vec<Bar>)> {
        self.series
            .ages
            .iter()
            .map(|age| {
                let color = to_color32(self.scales.color.color(age));
                let bars = self
                    .series
                    .cells
                    .iter()
                    .enumerate()
                    .filter(|(_, cell)| &cell.age == age)
                    .filter_map(|(i, cell)| {
                        let span = self.scales.bar_span(cell)?;
                        let fill = color.gamma_multiply(self.tooltip.opacity(i));
                        Some(
                            Bar::new(span.center(), cell.count as f64 * grown(i))
                                .width(span.width)
                                .fill(fill)
                                .stroke(bar_stroke()),
                        )
                    })
                    .collect();
                (age.clone(), bars)
            })
            .collect()
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        let now = ui.input(|i| i.time);
        let elapsed = self.clock.elapsed(now);
        let growth = self.growth;
        let grown = |i: usize| growth.progress(i, elapsed);
        if !growth.is_complete(elapsed) {
            ui.ctx().request_repaint();
        }

        ui.label(RichText::new(&self.config.title).strong().size(18.0));

        let width = self.config.canvas.plot_width() as f64;
        let (_, y_max) = self.scales.y.domain();
        let y_ticks = self.scales.y.ticks(COUNT_TICKS);
        let centers: Vec<(f64, String)> = self
            .scales
            .x0
            .domain()
            .iter()
            .filter_map(|d| Some((self.scales.x0.center(d)?, d.clone())))
            .collect();
        let x_marks: Vec<f64> = centers.iter().map(|(c, _)| *c).collect();
        let tolerance = self.scales.x0.bandwidth() / 2.0;

        let groups = self.bars_by_age(grown);
        let colors: Vec<_> = self
            .series
            .ages
            .iter()
            .map(|age| to_color32(self.scales.color.color(age)))
            .collect();

        let response = Plot::new("diagnosis_by_age")
            .height(self.config.canvas.plot_height() as f32)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_x(false)
            .show_y(false)
            .show_grid([false, true])
            .legend(Legend::default().position(Corner::RightTop))
            .x_axis_label(self.config.x_label.clone())
            .y_axis_label(self.config.y_label.clone())
            .include_x(0.0)
            .include_x(width)
            .include_y(0.0)
            .include_y(y_max)
            .x_grid_spacer(move |_input| grid_marks(&x_marks))
            .x_axis_formatter(move |mark, _range| nearest_label(&centers, mark.value, tolerance))
            .y_grid_spacer(move |_input| grid_marks(&y_ticks))
            .y_axis_formatter(|mark, _range| format!("{}", mark.value))
            .show(ui, |plot_ui| {
                for ((age, bars), color) in groups.into_iter().zip(colors) {
                    plot_ui.bar_chart(
                        BarChart::new(bars)
                            .name(age)
                            .color(color)
                            .element_formatter(Box::new(|_, _| String::new())),
                    );
                }
                plot_ui.pointer_coordinate()
            });

        let hovered = response.inner.and_then(|point| {
            self.scales
                .cell_at(&self.series, point.x, point.y, grown)
        });
        match hovered {
            Some(index) if self.tooltip.hovered() != Some(index) => {
                let lines = diagnosis_lines(&self.series.cells[index]);
                self.tooltip.show(index, lines);
            }
            Some(_) => {}
            None => self.tooltip.hide(),
        }
        if self.tooltip.is_visible() {
            let tooltip = &self.tooltip;
            response
                .response
                .on_hover_ui_at_pointer(|ui| tooltip.ui(ui));
        }
    }
}

/// Horizontal bar chart of readmission rate per specialty with an
/// average-rate reference line.
pub struct SpecialtyPanel {
    series: SpecialtySeries,
    scales: SpecialtyScales,
    config: SpecialtyChartConfig,
    growth: GrowthAnimation,
    fade: FadeIn,
    clock: AnimationClock,
    tooltip: Tooltip,
}

impl SpecialtyPanel {
    pub fn new(series: SpecialtySeries, config: &SpecialtyChartConfig) -> Self {
        let height = config.canvas.plot_height() as f64;
        let scales = ScaleBuilder::specialty(&series, (0.0, 1.0), height, config.headroom);
        let growth = GrowthAnimation::new(
            config.animation.duration_ms,
            config.animation.stagger_ms,
            series.rows.len(),
        );
        Self {
            series,
            scales,
            config: config.clone(),
            growth,
            fade: FadeIn::new(config.reference_fade_ms),
            clock: AnimationClock::default(),
            tooltip: Tooltip::default(),
        }
    }

    pub fn series(&self) -> &SpecialtySeries {
        &self.series
    }

    pub fn restart(&mut self) {
        self.clock.reset();
        self.tooltip.reset();
    }

    /// One bar per row. Rows run top to bottom, so a row's argument is the
    /// negated center of its band.
    pub fn bars(&self, grown: impl Fn(usize) -> f64) -> Vec<Bar> {
        self.series
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let center = self.scales.y.center(&row.medical_specialty)?;
                let color = to_color32(self.scales.color.color(row.readmission_rate));
                Some(
                    Bar::new(-center, row.readmission_rate * grown(i))
                        .width(self.scales.y.bandwidth())
                        .fill(color.gamma_multiply(self.tooltip.opacity(i)))
                        .stroke(bar_stroke()),
                )
            })
            .collect()
    }

    /// Opacity of the average line `elapsed` seconds after the chart appeared.
    pub fn reference_opacity(&self, elapsed: f64) -> f64 {
        let since = self
            .growth
            .is_complete(elapsed)
            .then(|| elapsed - self.growth.total_duration());
        self.fade.opacity(since)
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        let now = ui.input(|i| i.time);
        let elapsed = self.clock.elapsed(now);
        let growth = self.growth;
        let grown = |i: usize| growth.progress(i, elapsed);
        let line_opacity = self.reference_opacity(elapsed);
        let animating = !growth.is_complete(elapsed)
            || (self.series.summary.overall_rate.is_some() && line_opacity < 1.0);
        if animating {
            ui.ctx().request_repaint();
        }

        ui.label(RichText::new(&self.config.title).strong().size(18.0));

        let height = self.config.canvas.plot_height() as f64;
        let (_, x_max) = self.scales.x.domain();
        let x_ticks = self.scales.x.ticks(RATE_TICKS);
        let rows: Vec<(f64, String)> = self
            .scales
            .y
            .domain()
            .iter()
            .filter_map(|name| Some((-self.scales.y.center(name)?, name.clone())))
            .collect();
        let y_marks: Vec<f64> = rows.iter().map(|(c, _)| *c).collect();
        let tolerance = self.scales.y.bandwidth() / 2.0;

        let bars = self.bars(grown);
        let average = self.series.summary.overall_rate;
        let crimson = to_color32(AVERAGE_LINE).gamma_multiply(line_opacity as f32);

        let response = Plot::new("readmission_by_specialty")
            .height(self.config.canvas.plot_height() as f32)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_x(false)
            .show_y(false)
            .show_grid([true, false])
            .y_axis_min_width(self.config.canvas.margin_left as f32 - 50.0)
            .x_axis_label(self.config.x_label.clone())
            .y_axis_label(self.config.y_label.clone())
            .include_x(0.0)
            .include_x(x_max)
            .include_y(0.0)
            .include_y(-height)
            .x_grid_spacer(move |_input| grid_marks(&x_ticks))
            .x_axis_formatter(|mark, _range| format_percent(mark.value))
            .y_grid_spacer(move |_input| grid_marks(&y_marks))
            .y_axis_formatter(move |mark, _range| nearest_label(&rows, mark.value, tolerance))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .horizontal()
                        .element_formatter(Box::new(|_, _| String::new())),
                );
                if let Some(rate) = average {
                    if line_opacity > 0.0 {
                        plot_ui.vline(
                            VLine::new(rate)
                                .color(crimson)
                                .width(2.5)
                                .style(LineStyle::Dashed { length: 6.0 }),
                        );
                        plot_ui.text(
                            Text::new(
                                PlotPoint::new(rate, 0.0),
                                RichText::new("Average Rate").strong().color(crimson),
                            )
                            .anchor(Align2::CENTER_BOTTOM),
                        );
                    }
                }
                plot_ui.pointer_coordinate()
            });

        let hovered = response
            .inner
            .and_then(|point| self.scales.row_at(&self.series, -point.y, point.x, grown));
        match hovered {
            Some(index) if self.tooltip.hovered() != Some(index) => {
                let lines = specialty_lines(&self.series.rows[index]);
                self.tooltip.show(index, lines);
            }
            Some(_) => {}
            None => self.tooltip.hide(),
        }
        if self.tooltip.is_visible() {
            let tooltip = &self.tooltip;
            response
                .response
                .on_hover_ui_at_pointer(|ui| tooltip.ui(ui));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::data::{AggregatedCell, SpecialtyRow};
    use crate::stats::StatsCalculator;

    fn diagnosis_panel() -> DiagnosisPanel {
        let series = DiagnosisSeries {
            diagnoses: vec!["428".to_string(), "414".to_string()],
            ages: vec!["[60-70)".to_string(), "[70-80)".to_string()],
            cells: vec![
                AggregatedCell {
                    diagnosis: "428".to_string(),
                    age: "[70-80)".to_string(),
                    count: 12,
                },
                AggregatedCell {
                    diagnosis: "414".to_string(),
                    age: "[60-70)".to_string(),
                    count: 7,
                },
                AggregatedCell {
                    diagnosis: "428".to_string(),
                    age: "[60-70)".to_string(),
                    count: 3,
                },
            ],
        };
        DiagnosisPanel::new(series, &ChartConfig::default().diagnosis)
    }

    fn specialty_panel() -> SpecialtyPanel {
        let rows = vec![
            SpecialtyRow {
                medical_specialty: "Cardiology".to_string(),
                readmission_rate: 0.2,
                count: 100,
            },
            SpecialtyRow {
                medical_specialty: "Surgery".to_string(),
                readmission_rate: 0.1,
                count: 50,
            },
        ];
        let summary = StatsCalculator::summarize(&rows);
        SpecialtyPanel::new(
            SpecialtySeries { rows, summary },
            &ChartConfig::default().specialty,
        )
    }

    #[test]
    fn diagnosis_bars_are_grouped_by_age() {
        let panel = diagnosis_panel();
        let groups = panel.bars_by_age(|_| 1.0);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "[60-70)");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].1.len(), 1);
        assert_eq!(groups[1].1[0].value, 12.0);
    }

    #[test]
    fn bars_start_flat_and_grow() {
        let panel = diagnosis_panel();
        let flat = panel.bars_by_age(|_| 0.0);
        assert!(flat.iter().flat_map(|(_, b)| b).all(|bar| bar.value == 0.0));

        let half = panel.bars_by_age(|_| 0.5);
        assert_eq!(half[1].1[0].value, 6.0);
    }

    #[test]
    fn specialty_rows_run_top_to_bottom() {
        let panel = specialty_panel();
        let bars = panel.bars(|_| 1.0);

        assert_eq!(bars.len(), 2);
        assert!(bars[0].argument > bars[1].argument);
        assert_eq!(bars[0].value, 0.2);
    }

    #[test]
    fn reference_line_waits_for_bars() {
        let panel = specialty_panel();
        // 2 bars: 100ms stagger + 1000ms growth
        assert_eq!(panel.reference_opacity(0.5), 0.0);
        assert_eq!(panel.reference_opacity(1.1), 0.0);
        assert!((panel.reference_opacity(1.35) - 0.5).abs() < 1e-9);
        assert_eq!(panel.reference_opacity(2.0), 1.0);
    }

    #[test]
    fn axis_labels_snap_to_categories() {
        let positions = vec![(10.0, "428".to_string()), (30.0, "414".to_string())];
        assert_eq!(nearest_label(&positions, 10.0, 5.0), "428");
        assert_eq!(nearest_label(&positions, 20.0, 5.0), "");

        let marks = grid_marks(&[0.0, 0.05, 0.1]);
        assert_eq!(marks.len(), 3);
        assert!((marks[0].step_size - 0.05).abs() < 1e-12);
    }
}
