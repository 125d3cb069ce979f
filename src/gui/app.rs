//! Readmission Charts Main Application
//! Main window with control panel and chart viewer.

use crate::charts::{ExportFormat, StaticChartRenderer};
use crate::config::ChartConfig;
use crate::data::{prepare_charts, DataSources, PreparedCharts};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use anyhow::{Context, Result};
use egui::SidePanel;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{error, info, warn};

/// CSV loading result from background thread
enum LoadResult {
    Progress(String),
    Complete(PreparedCharts),
}

/// Main application window.
pub struct ReadmissionApp {
    config: ChartConfig,
    sources: DataSources,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl ReadmissionApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: ChartConfig, sources: DataSources) -> Self {
        let mut app = Self {
            config,
            sources,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        };
        app.start_loading();
        app
    }

    /// Load both sources on a background thread.
    fn start_loading(&mut self) {
        if self.is_loading {
            return;
        }

        self.chart_viewer.set_loading();
        self.control_panel.set_status("Loading data...");
        self.control_panel.busy = true;
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let sources = self.sources.clone();
        let options = self.config.diagnosis.options();

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress("Reading CSV files...".to_string()));
            let charts = prepare_charts(&sources, &options);
            let _ = tx.send(LoadResult::Complete(charts));
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_status(status);
                    }
                    LoadResult::Complete(charts) => {
                        let failures = charts.failure_count();
                        self.chart_viewer.set_charts(charts, &self.config);
                        self.control_panel.set_status(match failures {
                            0 => "Charts ready".to_string(),
                            n => format!("{} of 2 charts failed to load", n),
                        });
                        self.control_panel.busy = false;
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Ask for a folder, write both charts into it and reveal it.
    fn handle_export(&mut self) {
        let Some(dir) = rfd::FileDialog::new()
            .set_title("Export charts")
            .pick_folder()
        else {
            return; // User cancelled
        };

        match self.export_to(&dir, self.control_panel.export_format) {
            Ok(paths) => {
                self.control_panel
                    .set_status(format!("Exported {} charts to {}", paths.len(), dir.display()));
                if let Err(e) = open::that(&dir) {
                    warn!("Could not open {}: {}", dir.display(), e);
                }
            }
            Err(e) => {
                error!("Export failed: {:#}", e);
                self.control_panel.set_status(format!("Error: {:#}", e));
            }
        }
    }

    fn export_to(&self, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
        let (diagnosis, specialty) = self.chart_viewer.static_charts(&self.config);
        let outcomes =
            StaticChartRenderer::export(diagnosis, specialty, dir, format, &self.config);

        let mut paths = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            let path = outcome
                .result
                .with_context(|| format!("Failed to export chart {}", outcome.chart))?;
            paths.push(path);
        }
        info!("Exported {} charts to {}", paths.len(), dir.display());
        Ok(paths)
    }
}

impl eframe::App for ReadmissionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(240.0)
            .max_width(300.0)
            .show(ctx, |ui| {
                let action =
                    self.control_panel
                        .show(ui, &self.sources, self.chart_viewer.has_charts());

                match action {
                    ControlPanelAction::Reload => self.start_loading(),
                    ControlPanelAction::Replay => self.chart_viewer.restart(),
                    ControlPanelAction::Export => self.handle_export(),
                    ControlPanelAction::None => {}
                }
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, &self.config);
        });
    }
}
