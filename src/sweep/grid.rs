//! Sweep grid generation.
//!
//! The grid is a closed arithmetic sequence `min, min+step, …, max`. We never
//! accumulate a fractional step: bounds and step are scaled to integers by a
//! power of ten, iterated with an integer counter, and divided back. With the
//! default range that yields `60/100, 65/100, …, 95/100`, each of which is the
//! nearest double to the decimal literal.

use clap::ValueEnum;

use crate::error::PredictError;

/// Most decimal places accepted in sweep bounds and step.
pub const MAX_GRID_DECIMALS: u32 = 6;

/// Which input a sweep varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SweepAxis {
    #[value(name = "numerical-aperture", alias = "na")]
    NumericalAperture,
}

impl SweepAxis {
    pub fn label(self) -> &'static str {
        match self {
            SweepAxis::NumericalAperture => "NA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for SweepRange {
    /// `0.60..=0.95` by `0.05`: 8 points.
    fn default() -> Self {
        Self {
            min: 0.60,
            max: 0.95,
            step: 0.05,
        }
    }
}

/// Generate the closed grid `min..=max` by `step`.
pub fn linear_grid(range: &SweepRange) -> Result<Vec<f64>, PredictError> {
    let SweepRange { min, max, step } = *range;
    if !(min.is_finite() && max.is_finite() && step.is_finite()) {
        return Err(PredictError::validation(
            "sweep range",
            format!("bounds and step must be finite (min={min}, max={max}, step={step})"),
        ));
    }
    if step <= 0.0 {
        return Err(PredictError::validation("sweep range", format!("step must be > 0 (got {step})")));
    }
    if min > max {
        return Err(PredictError::validation(
            "sweep range",
            format!("min must not exceed max (min={min}, max={max})"),
        ));
    }

    let decimals = [min, max, step]
        .iter()
        .map(|&v| decimal_places(v))
        .try_fold(0u32, |acc, d| d.map(|d| acc.max(d)))
        .ok_or_else(|| {
            PredictError::validation(
                "sweep range",
                format!("bounds and step may use at most {MAX_GRID_DECIMALS} decimal places"),
            )
        })?;

    let scale = 10i64.pow(decimals);
    let lo = (min * scale as f64).round() as i64;
    let hi = (max * scale as f64).round() as i64;
    let stride = usize::try_from((step * scale as f64).round() as i64)
        .ok()
        .filter(|&s| s > 0)
        .ok_or_else(|| {
            PredictError::validation("sweep range", format!("step is too small (got {step})"))
        })?;

    let out = (lo..=hi)
        .step_by(stride)
        .map(|k| k as f64 / scale as f64)
        .collect();
    Ok(out)
}

/// Numerical-aperture grid: a linear grid restricted to `(0, 1]`.
pub fn na_grid(range: &SweepRange) -> Result<Vec<f64>, PredictError> {
    if !(range.min > 0.0 && range.max <= 1.0) {
        return Err(PredictError::validation(
            "sweep range",
            format!(
                "numerical aperture must stay within (0, 1] (min={}, max={})",
                range.min, range.max
            ),
        ));
    }
    linear_grid(range)
}

/// Grid for the given axis.
pub fn axis_grid(axis: SweepAxis, range: &SweepRange) -> Result<Vec<f64>, PredictError> {
    match axis {
        SweepAxis::NumericalAperture => na_grid(range),
    }
}

/// Smallest number of decimals `d` such that `v·10^d` is (numerically) whole.
///
/// "Whole" allows a relative error of 1e-9, so values within that of a
/// `d`-decimal number snap to it (`0.6000000001` is read as `0.6`). A nonzero
/// `v` never counts as having `d` decimals when `v·10^d` rounds to zero.
fn decimal_places(v: f64) -> Option<u32> {
    (0..=MAX_GRID_DECIMALS).find(|&d| {
        let scaled = v * 10f64.powi(d as i32);
        let whole = scaled.round();
        (v == 0.0 || whole != 0.0) && (scaled - whole).abs() <= 1e-9 * scaled.abs().max(1.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_is_exactly_eight_literals() {
        let grid = na_grid(&SweepRange::default()).unwrap();
        let expected = [0.60, 0.65, 0.70, 0.75, 0.80, 0.85, 0.90, 0.95];
        assert_eq!(grid.len(), 8);
        for (got, want) in grid.iter().zip(expected) {
            assert_eq!(*got, want);
            assert_eq!(format!("{got:.2}"), format!("{want:.2}"));
        }
    }

    #[test]
    fn accumulated_addition_would_drift() {
        // Sanity check that the integer-scaled grid matters.
        let mut na = 0.60;
        let mut added = Vec::new();
        while na <= 0.95 {
            added.push(na);
            na += 0.05;
        }
        let grid = na_grid(&SweepRange::default()).unwrap();
        assert!(added.len() != grid.len() || added.iter().zip(&grid).any(|(a, b)| a != b));
    }

    #[test]
    fn single_point_when_min_equals_max() {
        let grid = na_grid(&SweepRange { min: 0.85, max: 0.85, step: 0.05 }).unwrap();
        assert_eq!(grid, vec![0.85]);
    }

    #[test]
    fn inexact_upper_bound_stops_below_max() {
        let grid = na_grid(&SweepRange { min: 0.6, max: 0.9, step: 0.25 }).unwrap();
        assert_eq!(grid, vec![0.6, 0.85]);
    }

    #[test]
    fn rejects_bad_ranges() {
        assert!(na_grid(&SweepRange { min: 0.9, max: 0.6, step: 0.05 }).is_err());
        assert!(na_grid(&SweepRange { min: 0.6, max: 0.9, step: 0.0 }).is_err());
        assert!(na_grid(&SweepRange { min: 0.0, max: 0.9, step: 0.1 }).is_err());
        assert!(na_grid(&SweepRange { min: 0.6, max: 1.2, step: 0.1 }).is_err());
        assert!(na_grid(&SweepRange { min: 0.6, max: 0.9, step: f64::NAN }).is_err());
        assert!(na_grid(&SweepRange { min: 0.6, max: 0.9, step: 1e-9 }).is_err());
    }

    #[test]
    fn tiny_steps_are_validation_errors() {
        for step in [1e-9, 4e-10, 1e-7, f64::MIN_POSITIVE] {
            let result = std::panic::catch_unwind(|| {
                na_grid(&SweepRange { min: 0.6, max: 0.9, step })
            });
            match result {
                Ok(Err(PredictError::ValidationGap { field, .. })) => assert_eq!(field, "sweep range"),
                Ok(other) => panic!("step {step}: expected validation gap, got {other:?}"),
                Err(_) => panic!("step {step}: grid generation panicked"),
            }
        }
    }

    #[test]
    fn near_decimal_bounds_snap_to_the_grid() {
        let grid = na_grid(&SweepRange { min: 0.6000000001, max: 0.7, step: 0.05 }).unwrap();
        assert_eq!(grid, vec![0.6, 0.65, 0.7]);
    }
}
