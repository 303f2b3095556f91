//! Error types.
//!
//! Two layers:
//!
//! - [`PredictError`] is the library taxonomy (validation gaps, transport and
//!   decode failures, failed sweeps). Library code returns it and never retries.
//! - [`AppError`] is what the `osis` binary reports: a message plus the process
//!   exit code (2 = bad input/config, 4 = predictor or data failure).

/// Failures surfaced by the client, the sweep orchestrator and input checks.
#[derive(Debug, Clone)]
pub enum PredictError {
    /// A required generating field is missing, non-numeric or out of range.
    ///
    /// Derivation itself never reports this (it propagates NaN); callers check
    /// before building a request.
    ValidationGap { field: &'static str, reason: String },
    /// The HTTP call did not complete successfully (network error or non-2xx).
    Transport(String),
    /// The response body could not be parsed into a prediction.
    Decode(String),
    /// One leg of a sweep failed, so the whole sweep failed.
    SweepFailure {
        numerical_aperture: f64,
        source: Box<PredictError>,
    },
}

impl PredictError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::ValidationGap {
            field,
            reason: reason.into(),
        }
    }

    /// True when the failure came from the remote predictor rather than the inputs.
    pub fn is_remote(&self) -> bool {
        match self {
            PredictError::ValidationGap { .. } => false,
            PredictError::Transport(_) | PredictError::Decode(_) => true,
            PredictError::SweepFailure { source, .. } => source.is_remote(),
        }
    }
}

impl std::fmt::Display for PredictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictError::ValidationGap { field, reason } => {
                write!(f, "Invalid input '{field}': {reason}")
            }
            PredictError::Transport(msg) => write!(f, "SNR predictor request failed: {msg}"),
            PredictError::Decode(msg) => write!(f, "Failed to parse SNR predictor response: {msg}"),
            PredictError::SweepFailure {
                numerical_aperture,
                source,
            } => write!(f, "NA sweep failed at NA={numerical_aperture:.2}: {source}"),
        }
    }
}

impl std::error::Error for PredictError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PredictError::SweepFailure { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        let exit_code = if err.is_remote() { 4 } else { 2 };
        Self::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_failure_exit_code_follows_its_leg() {
        let remote = PredictError::SweepFailure {
            numerical_aperture: 0.7,
            source: Box::new(PredictError::Transport("connection refused".into())),
        };
        assert_eq!(AppError::from(remote).exit_code(), 4);

        let local = PredictError::validation("track_pitch_nm", "must be > 0");
        assert_eq!(AppError::from(local).exit_code(), 2);
    }

    #[test]
    fn sweep_failure_message_names_the_grid_value() {
        let err = PredictError::SweepFailure {
            numerical_aperture: 0.65,
            source: Box::new(PredictError::Decode("expected value".into())),
        };
        let msg = err.to_string();
        assert!(msg.contains("NA=0.65"), "{msg}");
        assert!(msg.contains("expected value"), "{msg}");
    }
}
