//! Shared domain types.
//!
//! The one rule these types encode: derived features (`spot_size_nm`,
//! `isi_factor`, `crosstalk_factor`) are never stored next to their generating
//! fields where they could go stale. `PredictionRequest` keeps its fields
//! private and every constructor runs the deriver.

use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::PredictError;
use crate::physics::{self, DeriveInputs, DerivedFeatures};

/// Recording layer chemistry understood by the predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum RecordingMaterial {
    /// Phase-change GST, high-to-low.
    #[serde(rename = "GST_HTL")]
    #[value(name = "GST_HTL", alias = "gst")]
    GstHtl,
    /// Organic dye, low-to-high.
    #[serde(rename = "DYE_LTH")]
    #[value(name = "DYE_LTH", alias = "dye")]
    DyeLth,
    /// Inorganic archival layer.
    #[serde(rename = "MDISC")]
    #[value(name = "MDISC", alias = "mdisc")]
    Mdisc,
}

impl RecordingMaterial {
    pub const ALL: [RecordingMaterial; 3] = [
        RecordingMaterial::GstHtl,
        RecordingMaterial::DyeLth,
        RecordingMaterial::Mdisc,
    ];

    /// Wire identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordingMaterial::GstHtl => "GST_HTL",
            RecordingMaterial::DyeLth => "DYE_LTH",
            RecordingMaterial::Mdisc => "MDISC",
        }
    }

    pub fn next(self) -> Self {
        match self {
            RecordingMaterial::GstHtl => RecordingMaterial::DyeLth,
            RecordingMaterial::DyeLth => RecordingMaterial::Mdisc,
            RecordingMaterial::Mdisc => RecordingMaterial::GstHtl,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            RecordingMaterial::GstHtl => RecordingMaterial::Mdisc,
            RecordingMaterial::DyeLth => RecordingMaterial::GstHtl,
            RecordingMaterial::Mdisc => RecordingMaterial::DyeLth,
        }
    }
}

/// Raw physical parameters chosen by the user.
///
/// JSON files passed with `--inputs` use these keys (the wire names minus the
/// derived fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalInputs {
    #[serde(rename = "laser_wavelength_nm")]
    pub wavelength_nm: u32,
    pub numerical_aperture: f64,
    pub track_pitch_nm: f64,
    pub layer_spacing_nm: f64,
    pub layer_count: u32,
    pub recording_material: RecordingMaterial,
    pub thermal_conductivity_w_mk: f64,
    pub activation_energy_ev: f64,
    pub temperature_c: f64,
    pub relative_humidity: f64,
    #[serde(default)]
    pub prml_enabled: bool,
    #[serde(default)]
    pub ctc_enabled: bool,
}

impl Default for PhysicalInputs {
    /// Blu-ray-class single layer disc at room conditions.
    fn default() -> Self {
        Self {
            wavelength_nm: 405,
            numerical_aperture: 0.85,
            track_pitch_nm: 320.0,
            layer_spacing_nm: 25_000.0,
            layer_count: 1,
            recording_material: RecordingMaterial::GstHtl,
            thermal_conductivity_w_mk: 1.0,
            activation_energy_ev: 2.0,
            temperature_c: 25.0,
            relative_humidity: 45.0,
            prml_enabled: true,
            ctc_enabled: true,
        }
    }
}

impl PhysicalInputs {
    /// The subset of fields the deriver reads.
    pub fn derive_inputs(&self) -> DeriveInputs {
        DeriveInputs {
            wavelength_nm: f64::from(self.wavelength_nm),
            numerical_aperture: self.numerical_aperture,
            track_pitch_nm: self.track_pitch_nm,
            layer_spacing_nm: self.layer_spacing_nm,
        }
    }

    /// Check every field against its documented domain.
    ///
    /// This is the caller-side gate in front of submission; derivation itself
    /// does not validate.
    pub fn validate(&self) -> Result<(), PredictError> {
        if self.wavelength_nm == 0 {
            return Err(PredictError::validation("laser_wavelength_nm", "must be > 0"));
        }
        check_na(self.numerical_aperture)?;
        if !(self.track_pitch_nm.is_finite() && self.track_pitch_nm > 0.0) {
            return Err(PredictError::validation(
                "track_pitch_nm",
                format!("must be finite and > 0 (got {})", self.track_pitch_nm),
            ));
        }
        non_negative("layer_spacing_nm", self.layer_spacing_nm)?;
        if self.layer_count == 0 {
            return Err(PredictError::validation("layer_count", "must be >= 1"));
        }
        non_negative("thermal_conductivity_w_mk", self.thermal_conductivity_w_mk)?;
        non_negative("activation_energy_ev", self.activation_energy_ev)?;
        if !self.temperature_c.is_finite() {
            return Err(PredictError::validation("temperature_c", "must be finite"));
        }
        if !(self.relative_humidity.is_finite() && (0.0..=100.0).contains(&self.relative_humidity)) {
            return Err(PredictError::validation(
                "relative_humidity",
                format!("must be within [0, 100] (got {})", self.relative_humidity),
            ));
        }
        Ok(())
    }
}

pub(crate) fn check_na(na: f64) -> Result<(), PredictError> {
    if na.is_finite() && na > 0.0 && na <= 1.0 {
        Ok(())
    } else {
        Err(PredictError::validation(
            "numerical_aperture",
            format!("must be within (0, 1] (got {na})"),
        ))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), PredictError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PredictError::validation(field, format!("must be finite and >= 0 (got {value})")))
    }
}

/// Partially filled inputs, as typed into a form.
///
/// Missing generating fields are allowed here: the live preview derives from
/// whatever is present and shows NaN for the rest. Submission goes through
/// [`InputDraft::complete`], which reports the first gap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputDraft {
    pub wavelength_nm: Option<f64>,
    pub numerical_aperture: Option<f64>,
    pub track_pitch_nm: Option<f64>,
    pub layer_spacing_nm: Option<f64>,
    pub layer_count: Option<f64>,
    pub thermal_conductivity_w_mk: Option<f64>,
    pub activation_energy_ev: Option<f64>,
    pub temperature_c: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub recording_material: Option<RecordingMaterial>,
    pub prml_enabled: bool,
    pub ctc_enabled: bool,
}

impl InputDraft {
    pub fn derive_inputs(&self) -> DeriveInputs {
        DeriveInputs {
            wavelength_nm: self.wavelength_nm.unwrap_or(f64::NAN),
            numerical_aperture: self.numerical_aperture.unwrap_or(f64::NAN),
            track_pitch_nm: self.track_pitch_nm.unwrap_or(f64::NAN),
            layer_spacing_nm: self.layer_spacing_nm.unwrap_or(f64::NAN),
        }
    }

    /// Live preview of the derived features. Never fails.
    pub fn preview(&self) -> DerivedFeatures {
        physics::derive(&self.derive_inputs())
    }

    /// Turn the draft into validated inputs, or name the first missing field.
    pub fn complete(&self) -> Result<PhysicalInputs, PredictError> {
        let wavelength = required("laser_wavelength_nm", self.wavelength_nm)?;
        if wavelength.fract() != 0.0 || wavelength <= 0.0 || wavelength > f64::from(u32::MAX) {
            return Err(PredictError::validation(
                "laser_wavelength_nm",
                format!("must be a positive whole number of nm (got {wavelength})"),
            ));
        }
        let layer_count = required("layer_count", self.layer_count)?;
        if layer_count.fract() != 0.0 || layer_count < 1.0 || layer_count > f64::from(u32::MAX) {
            return Err(PredictError::validation(
                "layer_count",
                format!("must be a whole number >= 1 (got {layer_count})"),
            ));
        }

        let inputs = PhysicalInputs {
            wavelength_nm: wavelength as u32,
            numerical_aperture: required("numerical_aperture", self.numerical_aperture)?,
            track_pitch_nm: required("track_pitch_nm", self.track_pitch_nm)?,
            layer_spacing_nm: required("layer_spacing_nm", self.layer_spacing_nm)?,
            layer_count: layer_count as u32,
            recording_material: self
                .recording_material
                .ok_or_else(|| PredictError::validation("recording_material", "missing"))?,
            thermal_conductivity_w_mk: required(
                "thermal_conductivity_w_mk",
                self.thermal_conductivity_w_mk,
            )?,
            activation_energy_ev: required("activation_energy_ev", self.activation_energy_ev)?,
            temperature_c: required("temperature_c", self.temperature_c)?,
            relative_humidity: required("relative_humidity", self.relative_humidity)?,
            prml_enabled: self.prml_enabled,
            ctc_enabled: self.ctc_enabled,
        };
        inputs.validate()?;
        Ok(inputs)
    }
}

impl From<&PhysicalInputs> for InputDraft {
    fn from(inputs: &PhysicalInputs) -> Self {
        Self {
            wavelength_nm: Some(f64::from(inputs.wavelength_nm)),
            numerical_aperture: Some(inputs.numerical_aperture),
            track_pitch_nm: Some(inputs.track_pitch_nm),
            layer_spacing_nm: Some(inputs.layer_spacing_nm),
            layer_count: Some(f64::from(inputs.layer_count)),
            thermal_conductivity_w_mk: Some(inputs.thermal_conductivity_w_mk),
            activation_energy_ev: Some(inputs.activation_energy_ev),
            temperature_c: Some(inputs.temperature_c),
            relative_humidity: Some(inputs.relative_humidity),
            recording_material: Some(inputs.recording_material),
            prml_enabled: inputs.prml_enabled,
            ctc_enabled: inputs.ctc_enabled,
        }
    }
}

fn required(field: &'static str, value: Option<f64>) -> Result<f64, PredictError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(PredictError::validation(field, format!("not a number ({v})"))),
        None => Err(PredictError::validation(field, "missing")),
    }
}

/// Inputs plus the features derived from them, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    inputs: PhysicalInputs,
    derived: DerivedFeatures,
}

impl PredictionRequest {
    /// Validate the inputs and derive their features.
    pub fn from_inputs(inputs: PhysicalInputs) -> Result<Self, PredictError> {
        inputs.validate()?;
        let derived = physics::derive(&inputs.derive_inputs());
        Ok(Self { inputs, derived })
    }

    /// Copy of this request at a different numerical aperture.
    ///
    /// Spot size and ISI are re-derived for `na`. Crosstalk keeps the base
    /// value: it depends only on layer spacing and track pitch.
    pub fn with_numerical_aperture(&self, na: f64) -> Result<Self, PredictError> {
        check_na(na)?;
        let mut inputs = self.inputs.clone();
        inputs.numerical_aperture = na;
        let fresh = physics::derive(&inputs.derive_inputs());
        Ok(Self {
            inputs,
            derived: DerivedFeatures {
                spot_size_nm: fresh.spot_size_nm,
                isi_factor: fresh.isi_factor,
                crosstalk_factor: self.derived.crosstalk_factor,
            },
        })
    }

    pub fn inputs(&self) -> &PhysicalInputs {
        &self.inputs
    }

    pub fn derived(&self) -> &DerivedFeatures {
        &self.derived
    }

    pub fn numerical_aperture(&self) -> f64 {
        self.inputs.numerical_aperture
    }
}

/// Flattened `POST /predict_snr` body.
#[derive(Serialize)]
struct WireBody<'a> {
    laser_wavelength_nm: u32,
    numerical_aperture: f64,
    spot_size_nm: f64,
    track_pitch_nm: f64,
    layer_count: u32,
    layer_spacing_nm: f64,
    isi_factor: f64,
    crosstalk_factor: f64,
    recording_material: &'a str,
    thermal_conductivity_w_mk: f64,
    activation_energy_ev: f64,
    temperature_c: f64,
    relative_humidity: f64,
    prml_enabled: u8,
    ctc_enabled: u8,
}

impl Serialize for PredictionRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let i = &self.inputs;
        let d = &self.derived;
        WireBody {
            laser_wavelength_nm: i.wavelength_nm,
            numerical_aperture: i.numerical_aperture,
            spot_size_nm: d.spot_size_nm,
            track_pitch_nm: i.track_pitch_nm,
            layer_count: i.layer_count,
            layer_spacing_nm: i.layer_spacing_nm,
            isi_factor: d.isi_factor,
            crosstalk_factor: d.crosstalk_factor,
            recording_material: i.recording_material.as_str(),
            thermal_conductivity_w_mk: i.thermal_conductivity_w_mk,
            activation_energy_ev: i.activation_energy_ev,
            temperature_c: i.temperature_c,
            relative_humidity: i.relative_humidity,
            prml_enabled: u8::from(i.prml_enabled),
            ctc_enabled: u8::from(i.ctc_enabled),
        }
        .serialize(serializer)
    }
}

/// Server response. The service rounds each field to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_snr_db: f64,
    pub physics_snr_db: f64,
    pub ml_residual_db: f64,
}

impl PredictionResponse {
    /// Slack allowed by independent 2-decimal rounding of the three fields.
    pub const ROUNDING_TOLERANCE_DB: f64 = 0.011;

    /// `predicted - (physics + residual)`.
    pub fn decomposition_gap(&self) -> f64 {
        self.predicted_snr_db - (self.physics_snr_db + self.ml_residual_db)
    }

    pub fn is_consistent(&self) -> bool {
        self.decomposition_gap().abs() <= Self::ROUNDING_TOLERANCE_DB
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub numerical_aperture: f64,
    pub predicted_snr_db: f64,
}

/// Sweep output, ordered by ascending numerical aperture.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SweepSeries {
    points: Vec<SweepPoint>,
}

impl SweepSeries {
    /// Build from points already in grid order.
    pub(crate) fn from_grid_order(points: Vec<SweepPoint>) -> Self {
        debug_assert!(
            points
                .windows(2)
                .all(|w| w[0].numerical_aperture < w[1].numerical_aperture),
            "sweep points must be in ascending NA order"
        );
        Self { points }
    }

    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(na, snr)` pairs for plotting.
    pub fn xy(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.numerical_aperture, p.predicted_snr_db))
            .collect()
    }

    /// The grid point with the highest predicted SNR.
    pub fn peak(&self) -> Option<SweepPoint> {
        self.points.iter().copied().fold(None, |best, p| match best {
            Some(b) if b.predicted_snr_db >= p.predicted_snr_db => Some(b),
            _ => Some(p),
        })
    }
}
