//! Static Chart Renderer
//! Draws both charts to SVG or PNG files with plotters.
//!
//! Layout per chart:
//! 1. Title centered above the plot area
//! 2. Dashed gridlines at the value-axis ticks
//! 3. Bars positioned by the chart's band and linear scales
//! 4. Axes with tick labels, axis titles
//! 5. Age legend (diagnosis) or average-rate reference line (specialty)
//!
//! A chart whose data could not be prepared is written as a placeholder
//! carrying the error message, so the output file is never silently missing.

use crate::charts::builder::ScaleBuilder;
use crate::charts::palette::{AVERAGE_LINE, BAR_STROKE, DIAGNOSIS_GRID, SPECIALTY_GRID};
use crate::config::{Canvas, ChartConfig};
use crate::data::{DiagnosisSeries, PipelineError, PreparedCharts, SpecialtySeries};
use plotters::coord::Shift;
use plotters::element::DashedPathElement;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const TICK_SIZE: i32 = 6;
const AXIS_COLOR: RGBColor = RGBColor(0, 0, 0);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

fn font_desc(family: &str, size: f64, style: FontStyle) -> FontDesc<'_> {
    FontDesc::new(FontFamily::from(family), size, style)
}

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Drawing(e.to_string())
}

/// Output file format for static charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
        }
    }
}

/// What to draw on one canvas.
#[derive(Debug, Clone, Copy)]
pub enum StaticChart<'a> {
    Diagnosis(&'a DiagnosisSeries),
    Specialty(&'a SpecialtySeries),
    Placeholder {
        title: &'a str,
        message: &'a str,
    },
}

/// Result of exporting one chart.
#[derive(Debug)]
pub struct ExportOutcome {
    pub chart: &'static str,
    pub result: Result<PathBuf, RenderError>,
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Write `v6` and `v7` into `out_dir`. Unavailable charts become placeholders.
    pub fn export_all(
        charts: &PreparedCharts,
        out_dir: &Path,
        format: ExportFormat,
        config: &ChartConfig,
    ) -> Vec<ExportOutcome> {
        let diagnosis_error = charts.diagnosis.as_ref().err().map(placeholder_message);
        let diagnosis = match (&charts.diagnosis, &diagnosis_error) {
            (Ok(series), _) => StaticChart::Diagnosis(series),
            (Err(_), message) => StaticChart::Placeholder {
                title: &config.diagnosis.title,
                message: message.as_deref().unwrap_or_default(),
            },
        };

        let specialty_error = charts.specialty.as_ref().err().map(placeholder_message);
        let specialty = match (&charts.specialty, &specialty_error) {
            (Ok(series), _) => StaticChart::Specialty(series),
            (Err(_), message) => StaticChart::Placeholder {
                title: &config.specialty.title,
                message: message.as_deref().unwrap_or_default(),
            },
        };

        Self::export(diagnosis, specialty, out_dir, format, config)
    }

    /// Write the two given charts as `v6` and `v7` into `out_dir`.
    pub fn export(
        diagnosis: StaticChart,
        specialty: StaticChart,
        out_dir: &Path,
        format: ExportFormat,
        config: &ChartConfig,
    ) -> Vec<ExportOutcome> {
        if let Err(e) = std::fs::create_dir_all(out_dir) {
            let message = format!("cannot create {}: {}", out_dir.display(), e);
            return ["v6", "v7"]
                .into_iter()
                .map(|chart| ExportOutcome {
                    chart,
                    result: Err(RenderError::Io(std::io::Error::new(e.kind(), message.clone()))),
                })
                .collect();
        }

        [
            ("v6", diagnosis, config.diagnosis.canvas),
            ("v7", specialty, config.specialty.canvas),
        ]
        .into_iter()
        .map(|(chart, content, canvas)| {
            let path = out_dir.join(format!("{}.{}", chart, format.extension()));
            let result = Self::render_to_file(&path, format, &canvas, content, config)
                .map(|()| path);
            if let Ok(path) = &result {
                info!("Wrote {}", path.display());
            }
            ExportOutcome { chart, result }
        })
        .collect()
    }

    pub fn render_to_file(
        path: &Path,
        format: ExportFormat,
        canvas: &Canvas,
        chart: StaticChart,
        config: &ChartConfig,
    ) -> Result<(), RenderError> {
        let size = (canvas.width, canvas.height);
        match format {
            ExportFormat::Svg => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                Self::draw(&root, canvas, chart, config)?;
                root.present().map_err(draw_err)?;
            }
            ExportFormat::Png => {
                let root = BitMapBackend::new(path, size).into_drawing_area();
                Self::draw(&root, canvas, chart, config)?;
                root.present().map_err(draw_err)?;
            }
        }
        Ok(())
    }

    /// Render into an in-memory SVG document.
    pub fn render_svg_string(
        canvas: &Canvas,
        chart: StaticChart,
        config: &ChartConfig,
    ) -> Result<String, RenderError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (canvas.width, canvas.height))
                .into_drawing_area();
            Self::draw(&root, canvas, chart, config)?;
            root.present().map_err(draw_err)?;
        }
        Ok(svg)
    }

    fn draw<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        canvas: &Canvas,
        chart: StaticChart,
        config: &ChartConfig,
    ) -> Result<(), RenderError> {
        root.fill(&WHITE).map_err(draw_err)?;
        match chart {
            StaticChart::Diagnosis(series) => Self::draw_diagnosis(root, canvas, series, config),
            StaticChart::Specialty(series) => Self::draw_specialty(root, canvas, series, config),
            StaticChart::Placeholder { title, message } => {
                Self::draw_placeholder(root, canvas, title, message, &config.font_family)
            }
        }
    }

    fn draw_diagnosis<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        canvas: &Canvas,
        series: &DiagnosisSeries,
        config: &ChartConfig,
    ) -> Result<(), RenderError> {
        let font = config.font_family.as_str();
        let labels = &config.diagnosis;
        let left = canvas.margin_left as i32;
        let top = canvas.margin_top as i32;
        let width = canvas.plot_width() as i32;
        let height = canvas.plot_height() as i32;
        let bottom = top + height;

        let scales = ScaleBuilder::diagnosis(series, width as f64, (height as f64, 0.0));
        debug!(
            "Drawing diagnosis chart: {} bars, y domain {:?}",
            series.cells.len(),
            scales.y.domain()
        );

        // Gridlines
        let grid = DIAGNOSIS_GRID.mix(0.3).stroke_width(1);
        let ticks = scales.y.ticks(10);
        for &tick in &ticks {
            let y = top + scales.y.scale(tick).round() as i32;
            Self::dashed_line(root, (left, y), (left + width, y), 3, 3, grid)?;
        }

        // Bars
        for cell in &series.cells {
            let Some(span) = scales.bar_span(cell) else {
                continue;
            };
            let x0 = left + span.start.round() as i32;
            let x1 = left + (span.start + span.width).round() as i32;
            let y = top + scales.y.scale(cell.count as f64).round() as i32;
            let fill = scales.color.color(&cell.age);
            root.draw(&Rectangle::new([(x0, y), (x1, bottom)], fill.filled()))
                .map_err(draw_err)?;
            root.draw(&Rectangle::new(
                [(x0, y), (x1, bottom)],
                BAR_STROKE.stroke_width(1),
            ))
            .map_err(draw_err)?;
        }

        // Axes
        Self::line(root, (left, bottom), (left + width, bottom))?;
        Self::line(root, (left, top), (left, bottom))?;
        // Codes read upward and end at their tick
        let category_style = TextStyle::from(
            font_desc(font, 12.0, FontStyle::Bold).transform(FontTransform::Rotate270),
        )
        .pos(Pos::new(HPos::Right, VPos::Center));
        for diagnosis in scales.x0.domain() {
            if let Some(center) = scales.x0.center(diagnosis) {
                let x = left + center.round() as i32;
                Self::line(root, (x, bottom), (x, bottom + TICK_SIZE))?;
                root.draw(&Text::new(
                    diagnosis.clone(),
                    (x, bottom + TICK_SIZE + 3),
                    category_style.clone(),
                ))
                .map_err(draw_err)?;
            }
        }
        let tick_style = TextStyle::from(font_desc(font, 12.0, FontStyle::Normal))
            .pos(Pos::new(HPos::Right, VPos::Center));
        for &tick in &ticks {
            let y = top + scales.y.scale(tick).round() as i32;
            Self::line(root, (left - TICK_SIZE, y), (left, y))?;
            root.draw(&Text::new(
                format!("{}", tick),
                (left - TICK_SIZE - 3, y),
                tick_style.clone(),
            ))
            .map_err(draw_err)?;
        }

        // Titles
        Self::draw_title(root, font, &labels.title, left + width / 2, top - 30)?;
        Self::draw_axis_title(root, font, &labels.x_label, (left + width / 2, bottom + 100), false)?;
        Self::draw_axis_title(root, font, &labels.y_label, (left - 55, top + height / 2), true)?;

        // Legend
        let legend_x = left + width + 30;
        let legend_style = TextStyle::from(font_desc(font, 12.0, FontStyle::Normal))
            .pos(Pos::new(HPos::Left, VPos::Center));
        for (i, age) in series.ages.iter().enumerate() {
            let y = top + i as i32 * 25;
            let color = scales.color.color(age);
            root.draw(&Rectangle::new(
                [(legend_x, y), (legend_x + 18, y + 18)],
                color.filled(),
            ))
            .map_err(draw_err)?;
            root.draw(&Rectangle::new(
                [(legend_x, y), (legend_x + 18, y + 18)],
                BAR_STROKE.stroke_width(1),
            ))
            .map_err(draw_err)?;
            root.draw(&Text::new(
                age.clone(),
                (legend_x + 24, y + 9),
                legend_style.clone(),
            ))
            .map_err(draw_err)?;
        }

        Ok(())
    }

    fn draw_specialty<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        canvas: &Canvas,
        series: &SpecialtySeries,
        config: &ChartConfig,
    ) -> Result<(), RenderError> {
        let font = config.font_family.as_str();
        let labels = &config.specialty;
        let left = canvas.margin_left as i32;
        let top = canvas.margin_top as i32;
        let width = canvas.plot_width() as i32;
        let height = canvas.plot_height() as i32;
        let bottom = top + height;

        let scales =
            ScaleBuilder::specialty(series, (0.0, width as f64), height as f64, labels.headroom);
        let ticks = scales.x.ticks(6);

        // Gridlines
        let grid = SPECIALTY_GRID.mix(0.7).stroke_width(1);
        for &tick in &ticks {
            let x = left + scales.x.scale(tick).round() as i32;
            Self::dashed_line(root, (x, top), (x, bottom), 2, 2, grid)?;
        }

        // Bars
        for row in &series.rows {
            let Some(y0) = scales.y.position(&row.medical_specialty) else {
                continue;
            };
            let y1 = y0 + scales.y.bandwidth();
            let x1 = left + scales.x.scale(row.readmission_rate).round() as i32;
            let corners = [
                (left, top + y0.round() as i32),
                (x1, top + y1.round() as i32),
            ];
            let fill = scales.color.color(row.readmission_rate);
            root.draw(&Rectangle::new(corners, fill.filled()))
                .map_err(draw_err)?;
            root.draw(&Rectangle::new(corners, BAR_STROKE.stroke_width(1)))
                .map_err(draw_err)?;
        }

        // Axes
        Self::line(root, (left, top), (left, bottom))?;
        Self::line(root, (left, bottom), (left + width, bottom))?;
        let name_style =
            TextStyle::from(font_desc(font, 13.0, FontStyle::Normal))
                .pos(Pos::new(HPos::Right, VPos::Center));
        for name in scales.y.domain() {
            if let Some(center) = scales.y.center(name) {
                let y = top + center.round() as i32;
                Self::line(root, (left - TICK_SIZE, y), (left, y))?;
                root.draw(&Text::new(
                    name.clone(),
                    (left - TICK_SIZE - 3, y),
                    name_style.clone(),
                ))
                .map_err(draw_err)?;
            }
        }
        let tick_style =
            TextStyle::from(font_desc(font, 12.0, FontStyle::Normal))
                .pos(Pos::new(HPos::Center, VPos::Top));
        for &tick in &ticks {
            let x = left + scales.x.scale(tick).round() as i32;
            Self::line(root, (x, bottom), (x, bottom + TICK_SIZE))?;
            root.draw(&Text::new(
                format_percent(tick),
                (x, bottom + TICK_SIZE + 3),
                tick_style.clone(),
            ))
            .map_err(draw_err)?;
        }

        // Average rate reference line
        if let Some(rate) = series.summary.overall_rate {
            let x = left + scales.x.scale(rate).round() as i32;
            Self::dashed_line(
                root,
                (x, top - 20),
                (x, bottom + 20),
                6,
                4,
                AVERAGE_LINE.stroke_width(2),
            )?;
            let style = TextStyle::from(font_desc(font, 13.0, FontStyle::Bold))
                .color(&AVERAGE_LINE)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            root.draw(&Text::new("Average Rate", (x, top - 24), style))
                .map_err(draw_err)?;
        }

        // Titles
        Self::draw_title(root, font, &labels.title, left + width / 2, top - 50)?;
        Self::draw_axis_title(root, font, &labels.x_label, (left + width / 2, bottom + 55), false)?;
        Self::draw_axis_title(root, font, &labels.y_label, (left - 200, top + height / 2), true)?;

        Ok(())
    }

    fn draw_placeholder<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        canvas: &Canvas,
        title: &str,
        message: &str,
        font: &str,
    ) -> Result<(), RenderError> {
        let center_x = canvas.width as i32 / 2;
        let center_y = canvas.height as i32 / 2;
        Self::draw_title(root, font, title, center_x, canvas.margin_top as i32 - 30)?;
        let style = TextStyle::from(font_desc(font, 14.0, FontStyle::Normal))
            .color(&AVERAGE_LINE)
            .pos(Pos::new(HPos::Center, VPos::Center));
        root.draw(&Text::new(message.to_string(), (center_x, center_y), style))
            .map_err(draw_err)?;
        Ok(())
    }

    fn draw_title<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        font: &str,
        title: &str,
        x: i32,
        y: i32,
    ) -> Result<(), RenderError> {
        let style = TextStyle::from(font_desc(font, 18.0, FontStyle::Bold))
            .pos(Pos::new(HPos::Center, VPos::Center));
        root.draw(&Text::new(title.to_string(), (x, y), style))
            .map_err(draw_err)?;
        Ok(())
    }

    fn draw_axis_title<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        font: &str,
        label: &str,
        at: (i32, i32),
        vertical: bool,
    ) -> Result<(), RenderError> {
        let mut desc = font_desc(font, 14.0, FontStyle::Bold);
        if vertical {
            desc = desc.transform(FontTransform::Rotate270);
        }
        let style = TextStyle::from(desc).pos(Pos::new(HPos::Center, VPos::Center));
        root.draw(&Text::new(label.to_string(), at, style))
            .map_err(draw_err)?;
        Ok(())
    }

    fn line<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        from: (i32, i32),
        to: (i32, i32),
    ) -> Result<(), RenderError> {
        root.draw(&PathElement::new(vec![from, to], AXIS_COLOR.stroke_width(1)))
            .map_err(draw_err)
    }

    fn dashed_line<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        from: (i32, i32),
        to: (i32, i32),
        dash: u32,
        gap: u32,
        style: ShapeStyle,
    ) -> Result<(), RenderError> {
        root.draw(&DashedPathElement::new(vec![from, to], dash, gap, style))
            .map_err(draw_err)
    }
}

/// Text shown in place of a chart whose data could not be prepared.
pub fn placeholder_message(error: &PipelineError) -> String {
    format!("Chart unavailable. {}", error)
}

/// Rate tick label: 0.15 -> "15%".
pub fn format_percent(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AggregatedCell, SpecialtyRow};
    use crate::stats::StatsCalculator;
    use tempfile::TempDir;

    fn diagnosis_series() -> DiagnosisSeries {
        DiagnosisSeries {
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
            ],
        }
    }

    fn specialty_series() -> SpecialtySeries {
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
        SpecialtySeries { rows, summary }
    }

    #[test]
    fn percent_labels() {
        assert_eq!(format_percent(0.15), "15%");
        assert_eq!(format_percent(0.0), "0%");
    }

    #[test]
    fn diagnosis_svg_has_title_bars_and_legend() {
        let config = ChartConfig::default();
        let series = diagnosis_series();
        let svg = StaticChartRenderer::render_svg_string(
            &config.diagnosis.canvas,
            StaticChart::Diagnosis(&series),
            &config,
        )
        .unwrap();

        assert!(svg.contains("Frequency of Diagnosis by Age"));
        assert!(svg.contains("Primary Diagnosis"));
        assert!(svg.contains("[60-70)"));
        assert!(svg.contains("428"));
        // background + 2 bars (fill and outline) + 2 legend swatches (fill and outline)
        assert!(svg.matches("<rect").count() >= 9);
    }

    #[test]
    fn diagnosis_labels_are_turned_upright() {
        let config = ChartConfig::default();
        let series = diagnosis_series();
        let svg = StaticChartRenderer::render_svg_string(
            &config.diagnosis.canvas,
            StaticChart::Diagnosis(&series),
            &config,
        )
        .unwrap();

        let rotated: Vec<&str> = svg
            .split("<text")
            .skip(1)
            .filter_map(|element| element.split("</text>").next())
            .filter(|element| element.contains("rotate("))
            .map(|element| element.rsplit('>').next().unwrap_or("").trim())
            .collect();
        // two category labels plus the y-axis title
        assert_eq!(rotated.len(), 3, "{:#?}", rotated);
        assert!(rotated.contains(&"428"));
        assert!(rotated.contains(&"414"));
    }

    #[test]
    fn specialty_svg_has_reference_line_label() {
        let config = ChartConfig::default();
        let series = specialty_series();
        let svg = StaticChartRenderer::render_svg_string(
            &config.specialty.canvas,
            StaticChart::Specialty(&series),
            &config,
        )
        .unwrap();

        assert!(svg.contains("Average Rate"));
        assert!(svg.contains("Cardiology"));
        assert!(svg.contains("20%"));
    }

    #[test]
    fn empty_series_still_renders_axes() {
        let config = ChartConfig::default();
        let empty = DiagnosisSeries::default();
        let svg = StaticChartRenderer::render_svg_string(
            &config.diagnosis.canvas,
            StaticChart::Diagnosis(&empty),
            &config,
        )
        .unwrap();
        assert!(svg.contains("Frequency of Diagnosis"));

        let empty = SpecialtySeries::default();
        let svg = StaticChartRenderer::render_svg_string(
            &config.specialty.canvas,
            StaticChart::Specialty(&empty),
            &config,
        )
        .unwrap();
        assert!(!svg.contains("Average Rate"));
    }

    #[test]
    fn export_writes_placeholder_for_failed_chart() {
        let dir = TempDir::new().unwrap();
        let config = ChartConfig::default();
        let charts = PreparedCharts {
            diagnosis: Err(PipelineError::Load(crate::data::LoaderError::NotFound(
                PathBuf::from("hospital_readmissions.csv"),
            ))),
            specialty: Ok(specialty_series()),
        };

        let outcomes =
            StaticChartRenderer::export_all(&charts, dir.path(), ExportFormat::Svg, &config);

        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            let path = outcome.result.as_ref().unwrap();
            assert!(path.exists());
        }
        let placeholder = std::fs::read_to_string(dir.path().join("v6.svg")).unwrap();
        assert!(placeholder.contains("Chart unavailable"));
        assert!(placeholder.contains("hospital_readmissions.csv"));
    }
}
