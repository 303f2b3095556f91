//! Concurrent sweep orchestration.
//!
//! One request per grid point, all outstanding at once, joined with
//! all-or-nothing semantics. Every leg carries its grid index so the series is
//! assembled in grid order regardless of which response lands first.
//!
//! The legs are polled on the caller's task (no spawning): concurrency here is
//! overlapping I/O waits, not parallel execution.

use futures::future::try_join_all;
use log::{debug, error, info};

use crate::client::Predictor;
use crate::domain::{PredictionRequest, PredictionResponse, SweepPoint, SweepSeries};
use crate::error::PredictError;
use crate::sweep::grid::{SweepAxis, SweepRange, axis_grid};

/// Run `base` across the grid for `axis` and collect predicted SNR per point.
///
/// Fails with [`PredictError::SweepFailure`] if any single leg fails; no
/// partial series is ever returned. Range problems are reported as
/// [`PredictError::ValidationGap`] before anything is sent.
pub async fn sweep<P: Predictor>(
    predictor: &P,
    base: &PredictionRequest,
    axis: SweepAxis,
    range: &SweepRange,
) -> Result<SweepSeries, PredictError> {
    let grid = axis_grid(axis, range)?;
    let requests = grid
        .iter()
        .map(|&value| point_request(base, axis, value))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "sweeping {} over {} points [{:.2}..{:.2}]",
        axis.label(),
        grid.len(),
        range.min,
        range.max
    );

    let legs = requests.iter().enumerate().map(|(idx, request)| async move {
        match predictor.predict(request).await {
            Ok(response) => {
                debug!("sweep leg {idx} done ({} = {:.2})", axis.label(), request.numerical_aperture());
                Ok((idx, response))
            }
            Err(e) => Err(PredictError::SweepFailure {
                numerical_aperture: request.numerical_aperture(),
                source: Box::new(e),
            }),
        }
    });

    let tagged = try_join_all(legs).await.map_err(|e| {
        error!("{e}");
        e
    })?;

    let series = assemble(&grid, tagged);
    info!("sweep complete ({} points)", series.len());
    Ok(series)
}

/// Per-point request with the swept field overwritten and its features re-derived.
fn point_request(base: &PredictionRequest, axis: SweepAxis, value: f64) -> Result<PredictionRequest, PredictError> {
    match axis {
        SweepAxis::NumericalAperture => base.with_numerical_aperture(value),
    }
}

/// Zip grid values with responses by their originating index.
fn assemble(grid: &[f64], mut tagged: Vec<(usize, PredictionResponse)>) -> SweepSeries {
    tagged.sort_by_key(|(idx, _)| *idx);
    let points = tagged
        .into_iter()
        .map(|(idx, response)| SweepPoint {
            numerical_aperture: grid[idx],
            predicted_snr_db: response.predicted_snr_db,
        })
        .collect();
    SweepSeries::from_grid_order(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(snr: f64) -> PredictionResponse {
        PredictionResponse {
            predicted_snr_db: snr,
            physics_snr_db: snr,
            ml_residual_db: 0.0,
        }
    }

    #[test]
    fn assemble_ignores_arrival_order() {
        let grid = [0.6, 0.7, 0.8];
        let tagged = vec![(2, response(30.0)), (0, response(10.0)), (1, response(20.0))];
        let series = assemble(&grid, tagged);
        assert_eq!(
            series.xy(),
            vec![(0.6, 10.0), (0.7, 20.0), (0.8, 30.0)]
        );
    }
}
