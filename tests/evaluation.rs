use std::time::Duration;

use osis_snr::app::pipeline::run_evaluation;
use osis_snr::client::Predictor;
use osis_snr::data::generate_dataset;
use osis_snr::domain::{PredictionRequest, PredictionResponse};
use osis_snr::error::PredictError;
use osis_snr::physics::local_baseline_snr_db;
use osis_snr::report::regression_metrics;

/// Echoes the local physics baseline, with jittered latency.
struct BaselinePredictor;

impl Predictor for BaselinePredictor {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, PredictError> {
        let physics = local_baseline_snr_db(request.inputs(), request.derived());
        let jitter = (request.inputs().temperature_c.abs() as u64) % 7;
        tokio::time::sleep(Duration::from_millis(jitter)).await;
        Ok(PredictionResponse {
            predicted_snr_db: physics + 1.0,
            physics_snr_db: physics,
            ml_residual_db: 1.0,
        })
    }
}

struct DownPredictor;

impl Predictor for DownPredictor {
    async fn predict(&self, _request: &PredictionRequest) -> Result<PredictionResponse, PredictError> {
        Err(PredictError::Transport("connection refused".into()))
    }
}

#[tokio::test]
async fn scores_rows_in_dataset_order() {
    let rows = generate_dataset(40, 11).unwrap();
    let eval = run_evaluation(&BaselinePredictor, &rows, 4).await.unwrap();

    let observed: Vec<f64> = rows.iter().map(|r| r.measured_snr_db).collect();
    let predicted: Vec<f64> = rows
        .iter()
        .map(|r| {
            let req = PredictionRequest::from_inputs(r.inputs()).unwrap();
            local_baseline_snr_db(req.inputs(), req.derived()) + 1.0
        })
        .collect();
    let expected = regression_metrics(&observed, &predicted).unwrap();

    assert_eq!(eval.metrics.n, 40);
    assert!((eval.metrics.rmse - expected.rmse).abs() < 1e-12);
    assert!((eval.metrics.mae - expected.mae).abs() < 1e-12);
    assert!(eval.physics_gap_mae.abs() < 1e-12);
}

#[tokio::test]
async fn any_failed_row_fails_the_evaluation() {
    let rows = generate_dataset(5, 3).unwrap();
    let err = run_evaluation(&DownPredictor, &rows, 2).await.unwrap_err();
    assert!(err.is_remote());
}
