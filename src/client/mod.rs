//! Remote SNR predictor client.
//!
//! `Predictor` is the seam the sweep orchestrator is generic over; the HTTP
//! implementation lives in `http`. Clients send exactly one request per call:
//! no retries, no caching.

use std::future::Future;
use std::time::Duration;

use crate::domain::{PredictionRequest, PredictionResponse};
use crate::error::PredictError;

pub mod http;

pub use http::HttpPredictor;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Anything that can turn one request into one prediction.
pub trait Predictor {
    fn predict(
        &self,
        request: &PredictionRequest,
    ) -> impl Future<Output = Result<PredictionResponse, PredictError>> + Send;
}

/// Where the predictor lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PredictorConfig {
    /// Read `OSIS_API_URL` / `OSIS_TIMEOUT_SECS` (a `.env` file is honored).
    pub fn from_env() -> Result<Self, PredictError> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        if let Ok(url) = std::env::var("OSIS_API_URL") {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        if let Ok(raw) = std::env::var("OSIS_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                PredictError::validation("OSIS_TIMEOUT_SECS", format!("'{raw}' is not a number of seconds: {e}"))
            })?;
            config.timeout = Duration::from_secs(secs.max(1));
        }
        Ok(config)
    }

    /// Full URL of the prediction endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/predict_snr", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let config = PredictorConfig {
            base_url: "http://osis.local:8000/".into(),
            ..PredictorConfig::default()
        };
        assert_eq!(config.endpoint(), "http://osis.local:8000/predict_snr");
        assert_eq!(
            PredictorConfig::default().endpoint(),
            "http://127.0.0.1:8000/predict_snr"
        );
    }
}
