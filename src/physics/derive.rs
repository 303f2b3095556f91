//! Derived optical features.
//!
//! These formulas must match the predictor's training data exactly:
//!
//! - `spot_size_nm = 0.61 · λ / NA` (diffraction-limited spot, Rayleigh criterion)
//! - `isi_factor = spot_size_nm / track_pitch_nm`
//! - `crosstalk_factor = exp(-layer_spacing_nm / track_pitch_nm)`
//!
//! The crosstalk term is a first-order local estimate. The service may compute
//! its own; the two are kept side by side and never reconciled.
//!
//! Missing or invalid inputs are not rejected here. They propagate as NaN and
//! callers check completeness before submitting.

use serde::Serialize;

/// Rayleigh spot-size coefficient.
pub const SPOT_COEFFICIENT: f64 = 0.61;

/// Generating fields read by [`derive`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeriveInputs {
    pub wavelength_nm: f64,
    pub numerical_aperture: f64,
    pub track_pitch_nm: f64,
    pub layer_spacing_nm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedFeatures {
    pub spot_size_nm: f64,
    pub isi_factor: f64,
    pub crosstalk_factor: f64,
}

pub fn spot_size_nm(wavelength_nm: f64, numerical_aperture: f64) -> f64 {
    SPOT_COEFFICIENT * wavelength_nm / numerical_aperture
}

pub fn isi_factor(spot_size_nm: f64, track_pitch_nm: f64) -> f64 {
    spot_size_nm / track_pitch_nm
}

pub fn crosstalk_factor(layer_spacing_nm: f64, track_pitch_nm: f64) -> f64 {
    (-layer_spacing_nm / track_pitch_nm).exp()
}

/// Compute all derived features from their generators.
pub fn derive(inputs: &DeriveInputs) -> DerivedFeatures {
    let spot = spot_size_nm(inputs.wavelength_nm, inputs.numerical_aperture);
    DerivedFeatures {
        spot_size_nm: spot,
        isi_factor: isi_factor(spot, inputs.track_pitch_nm),
        crosstalk_factor: crosstalk_factor(inputs.layer_spacing_nm, inputs.track_pitch_nm),
    }
}
