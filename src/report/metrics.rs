//! Regression metrics for evaluation runs.

/// Goodness of fit of predicted vs measured SNR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionMetrics {
    pub n: usize,
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
}

/// R², RMSE and MAE of `predicted` against `observed`.
///
/// Returns `None` for empty or mismatched inputs. R² is NaN when `observed`
/// has zero variance.
pub fn regression_metrics(observed: &[f64], predicted: &[f64]) -> Option<RegressionMetrics> {
    if observed.is_empty() || observed.len() != predicted.len() {
        return None;
    }
    let n = observed.len() as f64;
    let mean = observed.iter().sum::<f64>() / n;

    let mut sse = 0.0;
    let mut sst = 0.0;
    let mut abs = 0.0;
    for (&y, &y_hat) in observed.iter().zip(predicted) {
        let e = y - y_hat;
        sse += e * e;
        abs += e.abs();
        sst += (y - mean).powi(2);
    }

    let r2 = if sst > 0.0 { 1.0 - sse / sst } else { f64::NAN };
    Some(RegressionMetrics {
        n: observed.len(),
        r2,
        rmse: (sse / n).sqrt(),
        mae: abs / n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction() {
        let y = [10.0, 20.0, 30.0];
        let m = regression_metrics(&y, &y).unwrap();
        assert_eq!(m.n, 3);
        assert_eq!(m.r2, 1.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.mae, 0.0);
    }

    #[test]
    fn hand_computed_errors() {
        // errors: 1, -1, 2 -> sse=6, sst=200 (mean 20)
        let y = [10.0, 20.0, 30.0];
        let y_hat = [9.0, 21.0, 28.0];
        let m = regression_metrics(&y, &y_hat).unwrap();
        assert!((m.rmse - 2.0f64.sqrt()).abs() < 1e-12);
        assert!((m.mae - 4.0 / 3.0).abs() < 1e-12);
        assert!((m.r2 - (1.0 - 6.0 / 200.0)).abs() < 1e-12);
    }

    #[test]
    fn mismatched_or_empty_inputs() {
        assert!(regression_metrics(&[], &[]).is_none());
        assert!(regression_metrics(&[1.0], &[1.0, 2.0]).is_none());
        assert!(regression_metrics(&[5.0, 5.0], &[5.0, 4.0]).unwrap().r2.is_nan());
    }
}
