//! Synthetic OSIS dataset generation.
//!
//! Produces rows shaped like the predictor's training data: a drive family
//! (405/650/780 nm with matching NA and track-pitch ranges), disc layout,
//! recording material, environment and channel-coding flags, plus a physics
//! baseline and a "measured" SNR carrying the non-linear effects the residual
//! model is meant to learn.
//!
//! The dataset uses its own crosstalk model, `exp(-α·(pitch − spot))`, not the
//! client-side layer-spacing estimate. Rows keep that value in
//! `crosstalk_factor`; requests built from a row re-derive their own.
//!
//! Rows are generated in parallel, each from its own seeded RNG, so output is
//! reproducible for a given `(seed, count)` regardless of thread scheduling.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{PhysicalInputs, RecordingMaterial};
use crate::error::AppError;
use crate::physics::{baseline_snr_db, isi_factor, spot_size_nm, thermal_factor};

/// Exponent scale of the dataset crosstalk model.
pub const DATASET_CROSSTALK_ALPHA: f64 = 0.002;

/// Layer spacing recorded for single-layer discs (effectively "no neighbour").
pub const SINGLE_LAYER_SPACING_NM: f64 = 1e6;

/// Floor applied to measured SNR.
const SNR_FLOOR_DB: f64 = 1.0;

/// Drive family: wavelength with its NA range and nominal track pitch.
#[derive(Debug, Clone, Copy)]
struct DriveFamily {
    wavelength_nm: u32,
    na_min: f64,
    na_max: f64,
    pitch_nm: f64,
}

const FAMILIES: [DriveFamily; 3] = [
    DriveFamily { wavelength_nm: 405, na_min: 0.80, na_max: 0.95, pitch_nm: 225.0 },
    DriveFamily { wavelength_nm: 650, na_min: 0.60, na_max: 0.70, pitch_nm: 740.0 },
    DriveFamily { wavelength_nm: 780, na_min: 0.40, na_max: 0.55, pitch_nm: 1600.0 },
];

const LAYER_COUNTS: [u32; 4] = [1, 2, 3, 4];
const LAYER_WEIGHTS: [f64; 4] = [0.5, 0.3, 0.15, 0.05];
const MATERIAL_WEIGHTS: [f64; 3] = [0.5, 0.3, 0.2];

/// One synthetic sample (CSV column names match the training data).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRow {
    pub laser_wavelength_nm: u32,
    pub numerical_aperture: f64,
    pub spot_size_nm: f64,
    pub track_pitch_nm: f64,
    pub layer_count: u32,
    pub layer_spacing_nm: f64,
    pub isi_factor: f64,
    pub crosstalk_factor: f64,
    pub recording_material: RecordingMaterial,
    pub thermal_conductivity_w_mk: f64,
    pub activation_energy_ev: f64,
    pub temperature_c: f64,
    pub relative_humidity: f64,
    pub prml_enabled: u8,
    pub ctc_enabled: u8,
    pub physics_snr_db: f64,
    pub measured_snr_db: f64,
    pub thermal_factor: f64,
}

impl DatasetRow {
    /// The generating fields of this row, as a user would have entered them.
    pub fn inputs(&self) -> PhysicalInputs {
        PhysicalInputs {
            wavelength_nm: self.laser_wavelength_nm,
            numerical_aperture: self.numerical_aperture,
            track_pitch_nm: self.track_pitch_nm,
            layer_spacing_nm: self.layer_spacing_nm,
            layer_count: self.layer_count,
            recording_material: self.recording_material,
            thermal_conductivity_w_mk: self.thermal_conductivity_w_mk,
            activation_energy_ev: self.activation_energy_ev,
            temperature_c: self.temperature_c,
            relative_humidity: self.relative_humidity,
            prml_enabled: self.prml_enabled == 1,
            ctc_enabled: self.ctc_enabled == 1,
        }
    }
}

/// Crosstalk as modelled by the dataset (not the client estimate).
pub fn dataset_crosstalk(track_pitch_nm: f64, spot_size_nm: f64) -> f64 {
    (-DATASET_CROSSTALK_ALPHA * (track_pitch_nm - spot_size_nm)).exp()
}

/// Generate `count` rows deterministically from `seed`.
pub fn generate_dataset(count: usize, seed: u64) -> Result<Vec<DatasetRow>, AppError> {
    if count == 0 {
        return Err(AppError::new(2, "Dataset size must be > 0."));
    }

    let noise = Noise::new()?;
    let layers = WeightedIndex::new(LAYER_WEIGHTS)
        .map_err(|e| AppError::new(4, format!("Layer distribution error: {e}")))?;
    let materials = WeightedIndex::new(MATERIAL_WEIGHTS)
        .map_err(|e| AppError::new(4, format!("Material distribution error: {e}")))?;

    let rows = (0..count)
        .into_par_iter()
        .map(|idx| {
            let mut rng = StdRng::seed_from_u64(row_seed(seed, idx));
            sample_row(&mut rng, &noise, &layers, &materials)
        })
        .collect();
    Ok(rows)
}

#[derive(Debug, Clone, Copy)]
struct Noise {
    baseline: Normal<f64>,
    measurement: Normal<f64>,
}

impl Noise {
    fn new() -> Result<Self, AppError> {
        let baseline = Normal::new(0.0, 0.2)
            .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
        let measurement = Normal::new(0.0, 0.5)
            .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
        Ok(Self { baseline, measurement })
    }
}

fn sample_row(
    rng: &mut StdRng,
    noise: &Noise,
    layers: &WeightedIndex<f64>,
    materials: &WeightedIndex<f64>,
) -> DatasetRow {
    let family = FAMILIES[rng.gen_range(0..FAMILIES.len())];
    let wl = f64::from(family.wavelength_nm);
    let na = rng.gen_range(family.na_min..family.na_max);
    let pitch = family.pitch_nm * rng.gen_range(0.9..1.1);

    let spot = spot_size_nm(wl, na);
    let isi = isi_factor(spot, pitch);

    let layer_count = LAYER_COUNTS[layers.sample(rng)];
    let spacing = if layer_count > 1 {
        rng.gen_range(15_000.0..30_000.0)
    } else {
        SINGLE_LAYER_SPACING_NM
    };
    let crosstalk = dataset_crosstalk(pitch, spot);

    let material = RecordingMaterial::ALL[materials.sample(rng)];
    let (conductivity, activation) = match material {
        RecordingMaterial::GstHtl => (rng.gen_range(0.5..1.5), rng.gen_range(1.8..2.2)),
        RecordingMaterial::DyeLth => (rng.gen_range(0.1..0.4), rng.gen_range(0.8..1.2)),
        RecordingMaterial::Mdisc => (rng.gen_range(1.2..2.0), rng.gen_range(2.0..2.5)),
    };

    let temperature = rng.gen_range(20.0..80.0);
    let humidity = rng.gen_range(10.0..90.0);
    let prml = rng.gen_bool(0.5);
    let ctc = rng.gen_bool(0.5);

    let thermal = thermal_factor(activation, temperature);
    let physics = baseline_snr_db(wl, na, isi, crosstalk, thermal) + noise.baseline.sample(rng);

    // Channel coding gains.
    let prml_gain = if prml { 2.5 } else { 0.0 };
    let ctc_gain = if ctc { 1.5 } else { 0.0 };

    let measured = physics - density_penalty(isi) - humidity_penalty(material, humidity)
        - layer_penalty(layer_count)
        + prml_gain
        + ctc_gain
        + noise.measurement.sample(rng);

    DatasetRow {
        laser_wavelength_nm: family.wavelength_nm,
        numerical_aperture: na,
        spot_size_nm: spot,
        track_pitch_nm: pitch,
        layer_count,
        layer_spacing_nm: spacing,
        isi_factor: isi,
        crosstalk_factor: crosstalk,
        recording_material: material,
        thermal_conductivity_w_mk: conductivity,
        activation_energy_ev: activation,
        temperature_c: temperature,
        relative_humidity: humidity,
        prml_enabled: u8::from(prml),
        ctc_enabled: u8::from(ctc),
        physics_snr_db: physics,
        measured_snr_db: measured.max(SNR_FLOOR_DB),
        thermal_factor: thermal,
    }
}

/// Dense recording (spot much wider than the pitch) hurts more than linearly.
fn density_penalty(isi: f64) -> f64 {
    if isi > 0.8 { 5.0 * (isi - 0.8).powi(2) } else { 0.0 }
}

/// Dye layers degrade with humidity above 40 %RH.
fn humidity_penalty(material: RecordingMaterial, humidity: f64) -> f64 {
    if material == RecordingMaterial::DyeLth && humidity > 40.0 {
        0.05 * (humidity - 40.0)
    } else {
        0.0
    }
}

fn layer_penalty(layer_count: u32) -> f64 {
    if layer_count > 1 {
        2.0 * f64::from(layer_count - 1).powf(1.5)
    } else {
        0.0
    }
}

fn row_seed(seed: u64, idx: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    idx.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_rows() {
        let a = generate_dataset(64, 42).unwrap();
        let b = generate_dataset(64, 42).unwrap();
        assert_eq!(a, b);
        let c = generate_dataset(64, 43).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn rows_respect_family_ranges_and_formulas() {
        for row in generate_dataset(500, 7).unwrap() {
            let family = FAMILIES
                .iter()
                .find(|f| f.wavelength_nm == row.laser_wavelength_nm)
                .expect("known wavelength");
            assert!(row.numerical_aperture >= family.na_min && row.numerical_aperture < family.na_max);
            assert!(row.track_pitch_nm >= family.pitch_nm * 0.9 - 1e-9);
            assert!(row.track_pitch_nm <= family.pitch_nm * 1.1 + 1e-9);

            let spot = 0.61 * f64::from(row.laser_wavelength_nm) / row.numerical_aperture;
            assert!((row.spot_size_nm - spot).abs() < 1e-9);
            assert!((row.isi_factor - spot / row.track_pitch_nm).abs() < 1e-12);

            if row.layer_count == 1 {
                assert_eq!(row.layer_spacing_nm, SINGLE_LAYER_SPACING_NM);
            } else {
                assert!((15_000.0..30_000.0).contains(&row.layer_spacing_nm));
            }
            assert!(row.measured_snr_db >= SNR_FLOOR_DB);
            assert!(row.inputs().validate().is_ok());
        }
    }

    #[test]
    fn penalties_match_reference_shapes() {
        assert_eq!(density_penalty(0.8), 0.0);
        assert!((density_penalty(1.0) - 0.2).abs() < 1e-12);
        assert_eq!(humidity_penalty(RecordingMaterial::GstHtl, 90.0), 0.0);
        assert!((humidity_penalty(RecordingMaterial::DyeLth, 60.0) - 1.0).abs() < 1e-12);
        assert_eq!(layer_penalty(1), 0.0);
        assert!((layer_penalty(3) - 2.0 * 2f64.powf(1.5)).abs() < 1e-12);
    }

    #[test]
    fn empty_dataset_is_rejected() {
        assert_eq!(generate_dataset(0, 1).unwrap_err().exit_code(), 2);
    }
}
