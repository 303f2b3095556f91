//! CSV exports.
//!
//! Both files are meant to be easy to load in spreadsheets or pandas. Dataset
//! columns match the predictor's training data.

use std::path::Path;

use crate::data::DatasetRow;
use crate::domain::SweepSeries;
use crate::error::AppError;

/// Write synthetic dataset rows, header included.
pub fn write_dataset_csv(path: &Path, rows: &[DatasetRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create dataset CSV '{}': {e}", path.display())))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write dataset CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush dataset CSV: {e}")))?;
    Ok(())
}

/// Write a sweep as `numerical_aperture,predicted_snr_db` rows.
pub fn write_sweep_csv(path: &Path, series: &SweepSeries) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sweep CSV '{}': {e}", path.display())))?;
    for point in series.points() {
        writer
            .serialize(point)
            .map_err(|e| AppError::new(2, format!("Failed to write sweep CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sweep CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_dataset;
    use crate::domain::SweepPoint;

    #[test]
    fn dataset_csv_has_training_header() {
        let path = std::env::temp_dir().join(format!("osis-{}-dataset.csv", std::process::id()));
        let rows = generate_dataset(3, 7).unwrap();
        write_dataset_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("laser_wavelength_nm,numerical_aperture,spot_size_nm,"));
        assert!(header.ends_with("physics_snr_db,measured_snr_db,thermal_factor"));
        assert_eq!(lines.count(), 3);
    }

    #[test]
    fn sweep_csv_keeps_series_order() {
        let path = std::env::temp_dir().join(format!("osis-{}-sweep.csv", std::process::id()));
        let series = SweepSeries::from_grid_order(vec![
            SweepPoint { numerical_aperture: 0.6, predicted_snr_db: 20.5 },
            SweepPoint { numerical_aperture: 0.65, predicted_snr_db: 21.0 },
        ]);
        write_sweep_csv(&path, &series).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(
            text,
            "numerical_aperture,predicted_snr_db\n0.6,20.5\n0.65,21.0\n"
        );
    }
}
