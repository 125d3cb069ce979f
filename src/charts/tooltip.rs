//! Hover tooltip owned by a single chart panel.

use crate::data::{AggregatedCell, SpecialtyRow};
use egui::RichText;

/// Opacity of a bar while the pointer is over it.
pub const HIGHLIGHT_OPACITY: f32 = 0.7;

/// Labelled field values shown for one mark.
pub type TooltipLines = Vec<(&'static str, String)>;

/// Overlay tracking the hovered mark and its description.
///
/// Each chart panel holds exactly one; [`Tooltip::reset`] clears it when the
/// chart is re-rendered so no stale overlay survives a reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
    hovered: Option<usize>,
    lines: TooltipLines,
}

impl Tooltip {
    /// Pointer entered mark `index`.
    pub fn show(&mut self, index: usize, lines: TooltipLines) {
        self.hovered = Some(index);
        self.lines = lines;
    }

    /// Pointer left all marks.
    pub fn hide(&mut self) {
        self.hovered = None;
        self.lines.clear();
    }

    pub fn reset(&mut self) {
        self.hide();
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn is_visible(&self) -> bool {
        self.hovered.is_some()
    }

    pub fn lines(&self) -> &[(&'static str, String)] {
        &self.lines
    }

    /// Opacity of mark `index` given the current hover.
    pub fn opacity(&self, index: usize) -> f32 {
        if self.hovered == Some(index) {
            HIGHLIGHT_OPACITY
        } else {
            1.0
        }
    }

    pub fn ui(&self, ui: &mut egui::Ui) {
        for (label, value) in &self.lines {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("{label}:")).strong());
                ui.label(value);
            });
        }
    }
}

pub fn diagnosis_lines(cell: &AggregatedCell) -> TooltipLines {
    vec![
        ("Age Group", cell.age.clone()),
        ("Diagnosis", cell.diagnosis.clone()),
        ("Patient Count", cell.count.to_string()),
    ]
}

pub fn specialty_lines(row: &SpecialtyRow) -> TooltipLines {
    vec![
        ("Specialty", row.medical_specialty.clone()),
        (
            "Readmission Rate",
            format!("{:.1}%", row.readmission_rate * 100.0),
        ),
        (
            "Sample Size",
            format!("{} patients", group_thousands(row.count)),
        ),
    ]
}

/// Format with comma thousands separators: 12345 -> "12,345".
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
