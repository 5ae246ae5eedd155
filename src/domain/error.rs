//! Domain error types.

/// Top-level error type for sellcast.
#[derive(Debug, thiserror::Error)]
pub enum SellcastError {
    #[error("data error in {source_name}: {reason}")]
    Data { source_name: String, reason: String },

    #[error("computation error: {reason}")]
    Computation { reason: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SellcastError {
    pub fn data(source_name: &str, reason: impl Into<String>) -> Self {
        SellcastError::Data {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        SellcastError::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Reject NaN/Infinity before a value leaves a compute stage.
pub fn ensure_finite(name: &str, value: f64) -> Result<f64, SellcastError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SellcastError::Computation {
            reason: format!("{name} is not finite ({value})"),
        })
    }
}

impl From<&SellcastError> for std::process::ExitCode {
    fn from(err: &SellcastError) -> Self {
        let code: u8 = match err {
            SellcastError::Io(_) => 1,
            SellcastError::ConfigParse { .. }
            | SellcastError::ConfigMissing { .. }
            | SellcastError::ConfigInvalid { .. } => 2,
            SellcastError::Data { .. } => 3,
            SellcastError::InvalidInput { .. } => 4,
            SellcastError::Computation { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
