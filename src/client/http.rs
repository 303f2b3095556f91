//! HTTP implementation of [`Predictor`] (`POST /predict_snr`).

use log::{debug, warn};
use reqwest::Client;

use crate::client::{Predictor, PredictorConfig};
use crate::domain::{PredictionRequest, PredictionResponse};
use crate::error::PredictError;

/// Cheap to clone: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct HttpPredictor {
    client: Client,
    endpoint: String,
}

impl HttpPredictor {
    pub fn new(config: &PredictorConfig) -> Result<Self, PredictError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PredictError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
        })
    }

    pub fn from_env() -> Result<Self, PredictError> {
        Self::new(&PredictorConfig::from_env()?)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Predictor for HttpPredictor {
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, PredictError> {
        debug!(
            "POST {} (na={:.3}, spot={:.2}nm)",
            self.endpoint,
            request.numerical_aperture(),
            request.derived().spot_size_nm
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| PredictError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PredictError::Transport(format!("status {status}")));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| PredictError::Transport(format!("failed to read body: {e}")))?;
        let prediction: PredictionResponse =
            serde_json::from_str(&body).map_err(|e| PredictError::Decode(e.to_string()))?;

        if !prediction.is_consistent() {
            warn!(
                "predicted SNR {:.2} dB differs from physics + residual by {:.3} dB",
                prediction.predicted_snr_db,
                prediction.decomposition_gap()
            );
        }

        Ok(prediction)
    }
}
