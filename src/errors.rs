use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Model output was not in the expected format: {0}")]
    ExtractionFormatError(String),

    #[error("Failed to generate a completion: {0}")]
    GenerationFailed(String),

    #[error("Calendar authorization expired: {0}")]
    AuthExpired(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl BookingError {
    /// HTTP status code used when this error is returned from an endpoint.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) | Self::ValidationError(_) => 400,
            Self::AuthExpired(_) => 401,
            Self::ExtractionFormatError(_) | Self::GenerationFailed(_) | Self::HttpError(_) => 502,
            Self::ConfigError(_) => 500,
        }
    }

    /// Whether repeating the same call might succeed. Input problems and
    /// malformed model output are never transient.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::GenerationFailed(_) | Self::HttpError(_))
    }
}

impl From<reqwest::Error> for BookingError {
    fn from(error: reqwest::Error) -> Self {
        BookingError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for BookingError {
    fn from(error: serde_json::Error) -> Self {
        BookingError::InvalidRequest(error.to_string())
    }
}
