//! Shared "submit" workflow used by both CLI and TUI front-ends.
//!
//! inputs -> derived request -> single prediction -> NA sweep
//!
//! Also the batch evaluation used by `osis evaluate`.
//!
//! The CLI and the TUI then only differ in presentation (printing vs widgets).

use futures::{StreamExt, TryStreamExt, stream};
use log::info;

use crate::client::Predictor;
use crate::data::DatasetRow;
use crate::domain::{PhysicalInputs, PredictionRequest, PredictionResponse, SweepSeries};
use crate::error::PredictError;
use crate::physics::local_baseline_snr_db;
use crate::report::{RegressionMetrics, regression_metrics};
use crate::sweep::{SweepAxis, SweepRange, sweep};

/// Everything computed for one submission.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub request: PredictionRequest,
    pub prediction: PredictionResponse,
    /// Kept separate from `prediction`: a failed sweep must not hide a good
    /// single-point answer, and must not produce a partial chart either.
    pub sweep: Result<SweepSeries, PredictError>,
}

/// Predict the user's point, then sweep NA around it.
///
/// A failed single prediction fails the whole run; the sweep is not attempted.
pub async fn run_submission<P: Predictor>(
    predictor: &P,
    inputs: PhysicalInputs,
    range: &SweepRange,
) -> Result<RunOutput, PredictError> {
    let request = PredictionRequest::from_inputs(inputs)?;
    let prediction = predictor.predict(&request).await?;
    let sweep = sweep(predictor, &request, SweepAxis::NumericalAperture, range).await;

    Ok(RunOutput {
        request,
        prediction,
        sweep,
    })
}

/// Predictor accuracy against a labelled dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub metrics: RegressionMetrics,
    /// Mean |service physics − local physics| over the rows.
    pub physics_gap_mae: f64,
}

/// Send every row to the predictor (at most `concurrency` in flight) and score
/// the answers against `measured_snr_db`.
///
/// Any failed row fails the evaluation.
pub async fn run_evaluation<P: Predictor>(
    predictor: &P,
    rows: &[DatasetRow],
    concurrency: usize,
) -> Result<Evaluation, PredictError> {
    if rows.is_empty() {
        return Err(PredictError::validation("count", "no rows to evaluate"));
    }

    let requests = rows
        .iter()
        .map(|row| PredictionRequest::from_inputs(row.inputs()))
        .collect::<Result<Vec<_>, _>>()?;

    info!("evaluating {} rows, concurrency {}", requests.len(), concurrency.max(1));

    let responses: Vec<PredictionResponse> = stream::iter(requests.iter())
        .map(|request| predictor.predict(request))
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let observed: Vec<f64> = rows.iter().map(|r| r.measured_snr_db).collect();
    let predicted: Vec<f64> = responses.iter().map(|r| r.predicted_snr_db).collect();
    let metrics = regression_metrics(&observed, &predicted)
        .ok_or_else(|| PredictError::Decode("response count does not match rows".to_string()))?;

    let physics_gap_mae = requests
        .iter()
        .zip(&responses)
        .map(|(req, resp)| {
            (resp.physics_snr_db - local_baseline_snr_db(req.inputs(), req.derived())).abs()
        })
        .sum::<f64>()
        / responses.len() as f64;

    Ok(Evaluation {
        metrics,
        physics_gap_mae,
    })
}
