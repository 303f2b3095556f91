use std::sync::Mutex;
use std::time::Duration;

use osis_snr::app::pipeline::run_submission;
use osis_snr::client::Predictor;
use osis_snr::domain::{PhysicalInputs, PredictionRequest, PredictionResponse};
use osis_snr::error::PredictError;
use osis_snr::physics::spot_size_nm;
use osis_snr::sweep::{SweepAxis, SweepRange, sweep};

/// Answers `10 + 20·NA`, slower for lower NA so responses land in reverse order.
#[derive(Default)]
struct ReversePredictor {
    fail_at_na: Option<f64>,
    seen: Mutex<Vec<(f64, f64)>>,
    completed: Mutex<Vec<f64>>,
}

impl Predictor for ReversePredictor {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, PredictError> {
        let na = request.numerical_aperture();
        self.seen
            .lock()
            .unwrap()
            .push((na, request.derived().spot_size_nm));

        let delay_ms = ((1.0 - na) * 200.0).round() as u64;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        if let Some(bad) = self.fail_at_na {
            if (na - bad).abs() < 1e-9 {
                return Err(PredictError::Transport("status 503 Service Unavailable".into()));
            }
        }

        self.completed.lock().unwrap().push(na);
        let snr = 10.0 + 20.0 * na;
        Ok(PredictionResponse {
            predicted_snr_db: snr,
            physics_snr_db: snr - 1.0,
            ml_residual_db: 1.0,
        })
    }
}

fn base_request() -> PredictionRequest {
    PredictionRequest::from_inputs(PhysicalInputs::default()).unwrap()
}

#[tokio::test]
async fn reverse_arrival_still_yields_ascending_series() {
    let predictor = ReversePredictor::default();
    let series = sweep(
        &predictor,
        &base_request(),
        SweepAxis::NumericalAperture,
        &SweepRange::default(),
    )
    .await
    .unwrap();

    let completed = predictor.completed.lock().unwrap().clone();
    assert_eq!(completed.first().copied(), Some(0.95), "highest NA should finish first");

    let na: Vec<f64> = series.points().iter().map(|p| p.numerical_aperture).collect();
    assert_eq!(na, vec![0.60, 0.65, 0.70, 0.75, 0.80, 0.85, 0.90, 0.95]);
    for p in series.points() {
        assert!((p.predicted_snr_db - (10.0 + 20.0 * p.numerical_aperture)).abs() < 1e-12);
    }
}

#[tokio::test]
async fn each_leg_carries_rederived_features() {
    let predictor = ReversePredictor::default();
    sweep(
        &predictor,
        &base_request(),
        SweepAxis::NumericalAperture,
        &SweepRange::default(),
    )
    .await
    .unwrap();

    let seen = predictor.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 8);
    for (na, spot) in seen {
        assert_eq!(spot, spot_size_nm(405.0, na));
    }
}

#[tokio::test]
async fn one_failing_leg_fails_the_whole_sweep() {
    let predictor = ReversePredictor {
        fail_at_na: Some(0.75),
        ..ReversePredictor::default()
    };
    let err = sweep(
        &predictor,
        &base_request(),
        SweepAxis::NumericalAperture,
        &SweepRange::default(),
    )
    .await
    .unwrap_err();

    match err {
        PredictError::SweepFailure {
            numerical_aperture,
            source,
        } => {
            assert_eq!(numerical_aperture, 0.75);
            assert!(matches!(*source, PredictError::Transport(_)));
        }
        other => panic!("expected sweep failure, got {other:?}"),
    }
}

#[tokio::test]
async fn bad_range_is_rejected_before_sending() {
    let predictor = ReversePredictor::default();
    let range = SweepRange {
        min: 0.9,
        max: 0.6,
        step: 0.05,
    };
    let err = sweep(&predictor, &base_request(), SweepAxis::NumericalAperture, &range)
        .await
        .unwrap_err();
    assert!(matches!(err, PredictError::ValidationGap { .. }));
    assert!(predictor.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_sweep_keeps_the_single_prediction() {
    let predictor = ReversePredictor {
        fail_at_na: Some(0.60),
        ..ReversePredictor::default()
    };
    let run = run_submission(&predictor, PhysicalInputs::default(), &SweepRange::default())
        .await
        .unwrap();

    assert!((run.prediction.predicted_snr_db - 27.0).abs() < 1e-12);
    assert!(run.sweep.is_err());
}
