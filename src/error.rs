use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    // Network errors
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("Rate limited by upstream: {0}")]
    RateLimited(String),

    #[error("Retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    // Payload errors
    #[error("Unexpected payload shape: {0}")]
    UnexpectedPayload(String),

    // Input errors
    #[error("Holder export unreadable: {0}")]
    HolderExport(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Missing configuration key: {0}")]
    MissingConfigurationKey(String),

    // Output errors
    #[error("Report write failed: {0}")]
    ReportWrite(String),

    // System errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AnalyzerError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalyzerError::Request(_)
            | AnalyzerError::ConnectionTimeout
            | AnalyzerError::HttpStatus(_)
            | AnalyzerError::RateLimited(_) => true,
            _ => false,
        }
    }

    /// Get error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            AnalyzerError::Request(_)
            | AnalyzerError::ConnectionTimeout
            | AnalyzerError::HttpStatus(_)
            | AnalyzerError::RateLimited(_)
            | AnalyzerError::RetriesExhausted { .. } => "network",

            AnalyzerError::UnexpectedPayload(_) => "payload",

            AnalyzerError::HolderExport(_) => "input",

            AnalyzerError::InvalidConfiguration(_)
            | AnalyzerError::MissingConfigurationKey(_) => "configuration",

            AnalyzerError::ReportWrite(_) | AnalyzerError::IoError(_) => "io",
        }
    }
}

// Result type alias for convenience
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
