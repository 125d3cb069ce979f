//! Chart configuration.
//!
//! Canvas sizes, labels, aggregation limits and animation timings, loaded
//! from an optional JSON file. Every field has a default, so a partial file
//! only overrides what it names.

use crate::data::DiagnosisOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Font family used by the static renderer.
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Diagnosis-by-age chart (`#v6`).
    #[serde(default)]
    pub diagnosis: DiagnosisChartConfig,

    /// Readmission-by-specialty chart (`#v7`).
    #[serde(default)]
    pub specialty: SpecialtyChartConfig,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            diagnosis: DiagnosisChartConfig::default(),
            specialty: SpecialtyChartConfig::default(),
        }
    }
}

fn default_font_family() -> String {
    "serif".to_string()
}

/// Outer canvas size and the margins around the plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub margin_top: u32,
    pub margin_right: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
}

impl Canvas {
    pub fn plot_width(&self) -> u32 {
        self.width
            .saturating_sub(self.margin_left + self.margin_right)
    }

    pub fn plot_height(&self) -> u32 {
        self.height
            .saturating_sub(self.margin_top + self.margin_bottom)
    }
}

/// Bar growth timings in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    pub duration_ms: u64,
    pub stagger_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisChartConfig {
    /// Number of most frequent diagnoses kept.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Placeholder code for an unknown primary diagnosis.
    #[serde(default = "default_missing_label")]
    pub missing_label: String,

    #[serde(default = "default_diagnosis_canvas")]
    pub canvas: Canvas,

    #[serde(default = "default_diagnosis_title")]
    pub title: String,

    #[serde(default = "default_diagnosis_x_label")]
    pub x_label: String,

    #[serde(default = "default_diagnosis_y_label")]
    pub y_label: String,

    #[serde(default = "default_diagnosis_animation")]
    pub animation: AnimationConfig,
}

impl Default for DiagnosisChartConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            missing_label: default_missing_label(),
            canvas: default_diagnosis_canvas(),
            title: default_diagnosis_title(),
            x_label: default_diagnosis_x_label(),
            y_label: default_diagnosis_y_label(),
            animation: default_diagnosis_animation(),
        }
    }
}

impl DiagnosisChartConfig {
    pub fn options(&self) -> DiagnosisOptions {
        DiagnosisOptions {
            top_n: self.top_n,
            missing_label: self.missing_label.clone(),
        }
    }
}

fn default_top_n() -> usize {
    7
}

fn default_missing_label() -> String {
    "Missing".to_string()
}

fn default_diagnosis_canvas() -> Canvas {
    Canvas {
        width: 1000,
        height: 550,
        margin_top: 60,
        margin_right: 180,
        margin_bottom: 120,
        margin_left: 80,
    }
}

fn default_diagnosis_title() -> String {
    "Frequency of Diagnosis by Age & Primary Diagnosis".to_string()
}

fn default_diagnosis_x_label() -> String {
    "Primary Diagnosis".to_string()
}

fn default_diagnosis_y_label() -> String {
    "Frequency of Diagnosis".to_string()
}

fn default_diagnosis_animation() -> AnimationConfig {
    AnimationConfig {
        duration_ms: 800,
        stagger_ms: 30,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialtyChartConfig {
    #[serde(default = "default_specialty_canvas")]
    pub canvas: Canvas,

    #[serde(default = "default_specialty_title")]
    pub title: String,

    #[serde(default = "default_specialty_x_label")]
    pub x_label: String,

    #[serde(default = "default_specialty_y_label")]
    pub y_label: String,

    /// Rate axis upper bound as a multiple of the largest rate.
    #[serde(default = "default_headroom")]
    pub headroom: f64,

    #[serde(default = "default_specialty_animation")]
    pub animation: AnimationConfig,

    /// Fade-in of the average-rate line once the bars have grown.
    #[serde(default = "default_reference_fade_ms")]
    pub reference_fade_ms: u64,
}

impl Default for SpecialtyChartConfig {
    fn default() -> Self {
        Self {
            canvas: default_specialty_canvas(),
            title: default_specialty_title(),
            x_label: default_specialty_x_label(),
            y_label: default_specialty_y_label(),
            headroom: default_headroom(),
            animation: default_specialty_animation(),
            reference_fade_ms: default_reference_fade_ms(),
        }
    }
}

fn default_specialty_canvas() -> Canvas {
    Canvas {
        width: 1100,
        height: 600,
        margin_top: 80,
        margin_right: 80,
        margin_bottom: 80,
        margin_left: 230,
    }
}

fn default_specialty_title() -> String {
    "Medical Specialty Categories with Readmission Rates".to_string()
}

fn default_specialty_x_label() -> String {
    "Readmission Rate".to_string()
}

fn default_specialty_y_label() -> String {
    "Medical Specialty".to_string()
}

fn default_headroom() -> f64 {
    1.1
}

fn default_specialty_animation() -> AnimationConfig {
    AnimationConfig {
        duration_ms: 1000,
        stagger_ms: 100,
    }
}

fn default_reference_fade_ms() -> u64 {
    500
}

impl ChartConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.diagnosis.top_n == 0 {
            anyhow::bail!("diagnosis.top_n must be at least 1");
        }
        if !(self.specialty.headroom.is_finite() && self.specialty.headroom >= 1.0) {
            anyhow::bail!("specialty.headroom must be a finite value >= 1.0");
        }
        for (name, canvas) in [
            ("diagnosis", &self.diagnosis.canvas),
            ("specialty", &self.specialty.canvas),
        ] {
            if canvas.plot_width() == 0 || canvas.plot_height() == 0 {
                anyhow::bail!("{name}.canvas leaves no room for the plot inside its margins");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn default_canvases_leave_plot_room() {
        let config = ChartConfig::default();
        assert_eq!(config.diagnosis.top_n, 7);
        assert_eq!(config.diagnosis.canvas.plot_width(), 740);
        assert_eq!(config.diagnosis.canvas.plot_height(), 370);
        assert_eq!(config.specialty.canvas.plot_width(), 790);
        assert_eq!(config.specialty.canvas.plot_height(), 440);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn no_path_gives_defaults() {
        assert_eq!(ChartConfig::load(None).unwrap(), ChartConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("charts.json");
        std::fs::write(
            &path,
            r#"{ "diagnosis": { "top_n": 5, "title": "Top five" }, "specialty": { "headroom": 1.25 } }"#,
        )
        .unwrap();

        let config = ChartConfig::load(Some(&path)).unwrap();
        assert_eq!(config.diagnosis.top_n, 5);
        assert_eq!(config.diagnosis.title, "Top five");
        assert_eq!(config.diagnosis.missing_label, "Missing");
        assert_eq!(config.specialty.headroom, 1.25);
        assert_eq!(config.specialty.animation.stagger_ms, 100);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("charts.json");
        std::fs::write(&path, r#"{ "diagnosis": { "top_n": 0 } }"#).unwrap();
        assert!(ChartConfig::load(Some(&path)).is_err());

        std::fs::write(&path, "not json").unwrap();
        assert!(ChartConfig::load(Some(&path)).is_err());
    }
}
