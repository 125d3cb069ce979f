//! Charts module - scales, animation and the interactive and static renderers

mod animation;
mod builder;
mod palette;
mod plotter;
mod renderer;
mod scales;
mod tooltip;

pub use plotter::{DiagnosisPanel, SpecialtyPanel};
pub use renderer::{placeholder_message, ExportFormat, StaticChart, StaticChartRenderer};
