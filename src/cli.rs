//! Command-line interface argument parsing.

use crate::charts::ExportFormat;
use crate::data::DataSources;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hospital readmission charts
///
/// Draws the frequency of primary diagnoses per age bracket and the
/// readmission rate of each medical specialty.
///
/// Examples:
///   readmission-charts
///   readmission-charts export --out-dir charts --format png
///   readmission-charts --hospital data/hospital.csv summary --pretty
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Patient records CSV (`diag_1`, `age`)
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        default_value = "hospital_readmissions.csv",
        env = "READMISSION_HOSPITAL_CSV"
    )]
    pub hospital: PathBuf,

    /// Per-specialty rates CSV (`medical_specialty`, `readmission_rate`, `count`)
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        default_value = "specialty_readmission.csv",
        env = "READMISSION_SPECIALTY_CSV"
    )]
    pub specialty: PathBuf,

    /// JSON chart configuration; defaults apply to anything it leaves out
    #[arg(short, long, global = true, value_name = "FILE", env = "READMISSION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Open the interactive chart window (default)
    View,

    /// Write both charts as static files (`v6`, `v7`)
    Export {
        /// Directory receiving the chart files
        #[arg(short, long, value_name = "DIR", default_value = "charts")]
        out_dir: PathBuf,

        /// Output file format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Svg)]
        format: ExportFormat,
    },

    /// Print both prepared series as JSON
    Summary {
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::View)
    }

    pub fn sources(&self) -> DataSources {
        DataSources {
            hospital: self.hospital.clone(),
            specialty: self.specialty.clone(),
        }
    }

    /// Default filter directive when `RUST_LOG` is unset.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_opens_viewer() {
        let args = Args::try_parse_from(["readmission-charts"]).unwrap();
        assert_eq!(args.command(), Command::View);
        assert_eq!(args.sources().hospital, PathBuf::from("hospital_readmissions.csv"));
        assert_eq!(args.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn export_options_parse() {
        let args = Args::try_parse_from([
            "readmission-charts",
            "export",
            "--out-dir",
            "out",
            "--format",
            "png",
            "--specialty",
            "rates.csv",
            "-v",
        ])
        .unwrap();

        assert_eq!(
            args.command(),
            Command::Export {
                out_dir: PathBuf::from("out"),
                format: ExportFormat::Png,
            }
        );
        assert_eq!(args.specialty, PathBuf::from("rates.csv"));
        assert_eq!(args.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Args::try_parse_from(["readmission-charts", "-v", "-q"]).is_err());
    }
}
