use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{service} responded with status {status}")]
    UpstreamStatus { service: String, status: u16 },

    #[error("Malformed response from {service}: {message}")]
    MalformedResponse { service: String, message: String },

    #[error("Practitioner store error: {message}")]
    StoreError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Coordinate out of range: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Upstream,
    Data,
    Config,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TriageError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TriageError::HttpError(_) => ErrorCategory::Network,
            TriageError::UpstreamStatus { .. } | TriageError::MalformedResponse { .. } => {
                ErrorCategory::Upstream
            }
            TriageError::IoError(_)
            | TriageError::SerializationError(_)
            | TriageError::StoreError { .. } => ErrorCategory::Data,
            TriageError::ConfigError { .. }
            | TriageError::ConfigValidationError { .. }
            | TriageError::InvalidConfigValueError { .. }
            | TriageError::MissingConfigError { .. } => ErrorCategory::Config,
            TriageError::InvalidCoordinate { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Config => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TriageError::HttpError(e) if e.is_timeout() => {
                "The service did not answer in time; raise timeout_seconds or try again later"
            }
            TriageError::HttpError(_) => "Check network connectivity and the configured endpoint URL",
            TriageError::UpstreamStatus { .. } => {
                "Verify the endpoint, model name and API key for the failing service"
            }
            TriageError::MalformedResponse { .. } => {
                "The service answered in an unexpected format; check that it is OpenAI/Overpass compatible"
            }
            TriageError::IoError(_) => "Check that the file exists and is readable",
            TriageError::SerializationError(_) => "Check that the JSON input is well formed",
            TriageError::StoreError { .. } => "Check the practitioner data source",
            TriageError::ConfigError { .. }
            | TriageError::ConfigValidationError { .. }
            | TriageError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and run again"
            }
            TriageError::MissingConfigError { .. } => {
                "Add the missing field to the configuration file or set its environment variable"
            }
            TriageError::InvalidCoordinate { .. } => {
                "Latitude must be within [-90, 90] and longitude within [-180, 180]"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach a remote service: {}", self),
            ErrorCategory::Upstream => format!("A remote service misbehaved: {}", self),
            ErrorCategory::Data => format!("Could not read input data: {}", self),
            ErrorCategory::Config => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Invalid request: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_critical() {
        let err = TriageError::MissingConfigError {
            field: "chat.hosted.api_key".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("chat.hosted.api_key"));
    }

    #[test]
    fn test_upstream_status_display() {
        let err = TriageError::UpstreamStatus {
            service: "overpass".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "overpass responded with status 503");
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }
}
