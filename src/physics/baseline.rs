//! Deterministic SNR baseline.
//!
//! The predictor adds a learned residual on top of this linear physics model.
//! We reproduce the baseline locally so the preview can show a rough figure
//! before anything is sent; it is never used in place of the service's answer.
//! Crosstalk fed in here is whatever the caller has, so a local baseline built
//! from the client crosstalk estimate can differ from the service's own.

use crate::domain::PhysicalInputs;
use crate::physics::DerivedFeatures;

/// Boltzmann constant in eV/K.
pub const K_BOLTZMANN_EV: f64 = 8.617e-5;

const CELSIUS_TO_KELVIN: f64 = 273.15;

/// Arrhenius-style thermal stability factor `exp(-Ea / (k·T))`.
pub fn thermal_factor(activation_energy_ev: f64, temperature_c: f64) -> f64 {
    let temp_k = temperature_c + CELSIUS_TO_KELVIN;
    (-activation_energy_ev / (K_BOLTZMANN_EV * temp_k)).exp()
}

/// `85 + 30·NA − 0.02·λ − 15·isi − 10·crosstalk + 5·thermal`
pub fn baseline_snr_db(
    wavelength_nm: f64,
    numerical_aperture: f64,
    isi_factor: f64,
    crosstalk_factor: f64,
    thermal_factor: f64,
) -> f64 {
    85.0 + 30.0 * numerical_aperture - 0.02 * wavelength_nm - 15.0 * isi_factor
        - 10.0 * crosstalk_factor
        + 5.0 * thermal_factor
}

/// Baseline for a full set of inputs, using the given (client-side) features.
pub fn local_baseline_snr_db(inputs: &PhysicalInputs, derived: &DerivedFeatures) -> f64 {
    baseline_snr_db(
        f64::from(inputs.wavelength_nm),
        inputs.numerical_aperture,
        derived.isi_factor,
        derived.crosstalk_factor,
        thermal_factor(inputs.activation_energy_ev, inputs.temperature_c),
    )
}
