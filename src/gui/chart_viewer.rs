//! Chart Viewer Widget
//! Scrollable central panel showing the diagnosis chart (`#v6`) above the
//! specialty chart (`#v7`).

use crate::charts::{placeholder_message, DiagnosisPanel, SpecialtyPanel, StaticChart};
use crate::config::ChartConfig;
use crate::data::PreparedCharts;
use egui::{Color32, RichText, ScrollArea};

const CHART_SPACING: f32 = 20.0;
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 20, 60);

/// Display state of one chart panel.
pub enum PanelState<P> {
    Empty,
    Loading,
    Ready(P),
    Failed(String),
}

impl<P> PanelState<P> {
    pub fn is_ready(&self) -> bool {
        matches!(self, PanelState::Ready(_))
    }

    fn placeholder_ui(&self, ui: &mut egui::Ui, title: &str) {
        ui.label(RichText::new(title).strong().size(18.0));
        ui.add_space(8.0);
        match self {
            PanelState::Empty => {
                ui.label(RichText::new("No Data").size(16.0).color(Color32::GRAY));
            }
            PanelState::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading...");
                });
            }
            PanelState::Failed(message) => {
                ui.label(RichText::new(message).size(14.0).color(ERROR_COLOR));
            }
            PanelState::Ready(_) => {}
        }
    }
}

/// Both chart panels, each in its own state.
pub struct ChartViewer {
    pub diagnosis: PanelState<DiagnosisPanel>,
    pub specialty: PanelState<SpecialtyPanel>,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            diagnosis: PanelState::Empty,
            specialty: PanelState::Empty,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_loading(&mut self) {
        self.diagnosis = PanelState::Loading;
        self.specialty = PanelState::Loading;
    }

    /// Replace both panels with freshly prepared data.
    pub fn set_charts(&mut self, charts: PreparedCharts, config: &ChartConfig) {
        self.diagnosis = match charts.diagnosis {
            Ok(series) => PanelState::Ready(DiagnosisPanel::new(series, &config.diagnosis)),
            Err(e) => PanelState::Failed(placeholder_message(&e)),
        };
        self.specialty = match charts.specialty {
            Ok(series) => PanelState::Ready(SpecialtyPanel::new(series, &config.specialty)),
            Err(e) => PanelState::Failed(placeholder_message(&e)),
        };
    }

    /// Replay the growth animations of the ready panels.
    pub fn restart(&mut self) {
        if let PanelState::Ready(panel) = &mut self.diagnosis {
            panel.restart();
        }
        if let PanelState::Ready(panel) = &mut self.specialty {
            panel.restart();
        }
    }

    pub fn has_charts(&self) -> bool {
        self.diagnosis.is_ready() || self.specialty.is_ready()
    }

    /// Static counterparts of the current panels; failed panels become placeholders.
    pub fn static_charts<'a>(&'a self, config: &'a ChartConfig) -> (StaticChart<'a>, StaticChart<'a>) {
        let diagnosis = match &self.diagnosis {
            PanelState::Ready(panel) => StaticChart::Diagnosis(panel.series()),
            PanelState::Failed(message) => StaticChart::Placeholder {
                title: &config.diagnosis.title,
                message,
            },
            PanelState::Empty | PanelState::Loading => StaticChart::Placeholder {
                title: &config.diagnosis.title,
                message: "No Data",
            },
        };
        let specialty = match &self.specialty {
            PanelState::Ready(panel) => StaticChart::Specialty(panel.series()),
            PanelState::Failed(message) => StaticChart::Placeholder {
                title: &config.specialty.title,
                message,
            },
            PanelState::Empty | PanelState::Loading => StaticChart::Placeholder {
                title: &config.specialty.title,
                message: "No Data",
            },
        };
        (diagnosis, specialty)
    }

    pub fn show(&mut self, ui: &mut egui::Ui, config: &ChartConfig) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::card(ui, |ui| match &mut self.diagnosis {
                    PanelState::Ready(panel) => panel.ui(ui),
                    state => state.placeholder_ui(ui, &config.diagnosis.title),
                });
                ui.add_space(CHART_SPACING);
                Self::card(ui, |ui| match &mut self.specialty {
                    PanelState::Ready(panel) => panel.ui(ui),
                    state => state.placeholder_ui(ui, &config.specialty.title),
                });
            });
    }

    fn card(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(ui.visuals().widgets.noninteractive.bg_stroke)
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical(add_contents);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DiagnosisSeries, LoaderError, PipelineError};
    use std::path::PathBuf;

    #[test]
    fn failed_chart_does_not_block_the_other() {
        let config = ChartConfig::default();
        let mut viewer = ChartViewer::new();
        viewer.set_charts(
            PreparedCharts {
                diagnosis: Ok(DiagnosisSeries::default()),
                specialty: Err(PipelineError::Load(LoaderError::NotFound(PathBuf::from(
                    "specialty_readmission.csv",
                )))),
            },
            &config,
        );

        assert!(viewer.diagnosis.is_ready());
        assert!(viewer.has_charts());
        match &viewer.specialty {
            PanelState::Failed(message) => assert!(message.contains("specialty_readmission.csv")),
            _ => panic!("specialty panel should have failed"),
        }

        let (_, specialty) = viewer.static_charts(&config);
        assert!(matches!(specialty, StaticChart::Placeholder { .. }));
    }

    #[test]
    fn loading_replaces_previous_panels() {
        let config = ChartConfig::default();
        let mut viewer = ChartViewer::new();
        viewer.set_charts(
            PreparedCharts {
                diagnosis: Ok(DiagnosisSeries::default()),
                specialty: Ok(Default::default()),
            },
            &config,
        );
        viewer.set_loading();
        assert!(!viewer.has_charts());
    }
}
