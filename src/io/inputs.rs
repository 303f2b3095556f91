//! Read physical inputs from a JSON file.
//!
//! Keys use the predictor's wire names (`laser_wavelength_nm`, ...), so a
//! request body captured from elsewhere can be replayed as-is. Derived feature
//! keys, if present, are ignored and recomputed.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::domain::PhysicalInputs;
use crate::error::AppError;

/// Load and validate inputs from `path`.
pub fn read_inputs_json(path: &Path) -> Result<PhysicalInputs, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open inputs JSON '{}': {e}", path.display())))?;
    let inputs: PhysicalInputs = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid inputs JSON '{}': {e}", path.display())))?;
    inputs.validate()?;
    Ok(inputs)
}
