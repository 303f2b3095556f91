//! Command-line parsing for the OSIS SNR client.
//!
//! Argument parsing and dispatch are kept apart from the physics, client and
//! sweep code; handlers in `app` turn these structs into domain values.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{PhysicalInputs, RecordingMaterial};
use crate::sweep::SweepRange;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "osis", version, about = "Optical storage SNR predictor client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show derived features and the local physics estimate. No network.
    Preview(PreviewArgs),
    /// Ask the predictor for one SNR value.
    Predict(PredictArgs),
    /// Predict, then sweep numerical aperture around the inputs.
    Sweep(SweepArgs),
    /// Launch the interactive TUI.
    ///
    /// Same submit workflow as `osis sweep`, rendered with Ratatui.
    Tui(TuiArgs),
    /// Generate a synthetic dataset shaped like the training data.
    Dataset(DatasetArgs),
    /// Score the predictor against a synthetic dataset.
    Evaluate(EvaluateArgs),
}

/// Physical inputs, either from flags or from a JSON file.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Read inputs from a JSON file (wire key names). Overrides the flags below.
    #[arg(long, value_name = "JSON")]
    pub inputs: Option<PathBuf>,

    /// Laser wavelength (nm).
    #[arg(short = 'l', long, default_value_t = 405)]
    pub wavelength: u32,

    /// Objective numerical aperture.
    #[arg(short = 'a', long = "na", default_value_t = 0.85)]
    pub numerical_aperture: f64,

    /// Track pitch (nm).
    #[arg(short = 'p', long, default_value_t = 320.0)]
    pub pitch: f64,

    /// Spacing between recording layers (nm).
    #[arg(long, default_value_t = 25_000.0)]
    pub layer_spacing: f64,

    /// Number of recording layers.
    #[arg(long, default_value_t = 1)]
    pub layers: u32,

    /// Recording material (GST_HTL, DYE_LTH, MDISC).
    #[arg(short = 'm', long, value_enum, default_value_t = RecordingMaterial::GstHtl)]
    pub material: RecordingMaterial,

    /// Thermal conductivity (W/m·K).
    #[arg(long, default_value_t = 1.0)]
    pub thermal_conductivity: f64,

    /// Activation energy (eV).
    #[arg(long, default_value_t = 2.0)]
    pub activation_energy: f64,

    /// Ambient temperature (°C).
    #[arg(long, default_value_t = 25.0)]
    pub temperature: f64,

    /// Relative humidity (%).
    #[arg(long, default_value_t = 45.0)]
    pub humidity: f64,

    /// Disable PRML detection.
    #[arg(long)]
    pub no_prml: bool,

    /// Disable crosstalk cancellation.
    #[arg(long)]
    pub no_ctc: bool,
}

impl InputArgs {
    /// Inputs from flags only (the `--inputs` file is handled by the caller).
    pub fn to_inputs(&self) -> PhysicalInputs {
        PhysicalInputs {
            wavelength_nm: self.wavelength,
            numerical_aperture: self.numerical_aperture,
            track_pitch_nm: self.pitch,
            layer_spacing_nm: self.layer_spacing,
            layer_count: self.layers,
            recording_material: self.material,
            thermal_conductivity_w_mk: self.thermal_conductivity,
            activation_energy_ev: self.activation_energy,
            temperature_c: self.temperature,
            relative_humidity: self.humidity,
            prml_enabled: !self.no_prml,
            ctc_enabled: !self.no_ctc,
        }
    }
}

/// Where the predictor lives.
#[derive(Debug, Args, Clone)]
pub struct ServiceArgs {
    /// Predictor base URL (overrides OSIS_API_URL).
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Request timeout in seconds (overrides OSIS_TIMEOUT_SECS).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// NA sweep range.
#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    /// Lowest NA in the sweep.
    #[arg(long, default_value_t = 0.60)]
    pub na_min: f64,

    /// Highest NA in the sweep (included when it lands on the grid).
    #[arg(long, default_value_t = 0.95)]
    pub na_max: f64,

    /// NA step.
    #[arg(long, default_value_t = 0.05)]
    pub na_step: f64,
}

impl RangeArgs {
    pub fn to_range(&self) -> SweepRange {
        SweepRange {
            min: self.na_min,
            max: self.na_max,
            step: self.na_step,
        }
    }
}

#[derive(Debug, Parser, Clone)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Print the raw response JSON instead of the report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub service: ServiceArgs,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Skip the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the sweep to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub service: ServiceArgs,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct DatasetArgs {
    /// Number of rows.
    #[arg(short = 'n', long, default_value_t = 5000)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV path.
    #[arg(short = 'o', long, default_value = "osis_dataset.csv")]
    pub out: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Number of synthetic rows to score.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub count: usize,

    /// Random seed for the synthetic rows.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Requests in flight at once.
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,
}
