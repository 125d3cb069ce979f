//! Control Panel Widget
//! Left side panel with data sources, reload, replay and export controls.

use crate::charts::ExportFormat;
use crate::data::DataSources;
use egui::{Color32, RichText};
use std::path::Path;

/// Left side control panel.
pub struct ControlPanel {
    pub export_format: ExportFormat,
    pub status: String,
    pub busy: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            export_format: ExportFormat::Svg,
            status: "Ready".to_string(),
            busy: false,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Draw the control panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        sources: &DataSources,
        has_charts: bool,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("Readmission Charts")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Sources =====
        ui.label(RichText::new("Data Sources").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("sources")
                    .num_columns(2)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("Patients:");
                        ui.label(RichText::new(file_name(&sources.hospital)).size(12.0))
                            .on_hover_text(sources.hospital.display().to_string());
                        ui.end_row();
                        ui.label("Specialties:");
                        ui.label(RichText::new(file_name(&sources.specialty)).size(12.0))
                            .on_hover_text(sources.specialty.display().to_string());
                        ui.end_row();
                    });
            });

        ui.add_space(10.0);
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.busy, |ui| {
                let button = egui::Button::new(RichText::new("Reload data").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Reload;
                }
            });
            ui.add_space(5.0);
            ui.add_enabled_ui(has_charts, |ui| {
                if ui.button("Replay animation").clicked() {
                    action = ControlPanelAction::Replay;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.label(RichText::new("Export").size(14.0).strong());
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            ui.radio_value(&mut self.export_format, ExportFormat::Svg, "SVG");
            ui.radio_value(&mut self.export_format, ExportFormat::Png, "PNG");
        });
        ui.add_space(5.0);
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.busy, |ui| {
                let button = egui::Button::new(RichText::new("Export charts").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Export;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        ui.horizontal(|ui| {
            if self.busy {
                ui.spinner();
            }
            let status_color = if self.status.contains("Error") || self.status.contains("failed") {
                Color32::from_rgb(220, 53, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        });

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlPanelAction {
    None,
    Reload,
    Replay,
    Export,
}
