use thiserror::Error;

#[derive(Error, Debug)]
pub enum DistributorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },

    #[error("Rule key '{key}' in '{table}' must be exactly {expected_len} character(s)")]
    InvalidRuleKey {
        table: String,
        key: String,
        expected_len: usize,
    },

    #[error("Rule '{key}' in '{table}' assigns unknown handler '{handler}'")]
    UnknownHandler {
        table: String,
        key: String,
        handler: String,
    },

    #[error("No valid case records found in {source_name}")]
    NoRecords { source_name: String },

    #[error("Extraction failed: {message}")]
    ExtractionError { message: String },

    #[error("Extraction service denied access (HTTP {status})")]
    PermissionDenied { status: u16 },

    #[error("Extraction service quota exceeded (HTTP 429)")]
    QuotaExceeded,

    #[error("Extraction service unavailable (HTTP {status}) after {attempts} attempt(s)")]
    ServiceUnavailable { status: u16, attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Extraction,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DistributorError {
    pub fn config(message: impl Into<String>) -> Self {
        DistributorError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DistributorError::ConfigError { .. }
            | DistributorError::ConfigValidationError { .. }
            | DistributorError::InvalidConfigValueError { .. }
            | DistributorError::MissingConfigError { .. }
            | DistributorError::InvalidRuleKey { .. }
            | DistributorError::UnknownHandler { .. } => ErrorCategory::Configuration,
            DistributorError::CsvError(_)
            | DistributorError::SerializationError(_)
            | DistributorError::NoRecords { .. } => ErrorCategory::Input,
            DistributorError::HttpError(_)
            | DistributorError::ExtractionError { .. }
            | DistributorError::PermissionDenied { .. }
            | DistributorError::QuotaExceeded
            | DistributorError::ServiceUnavailable { .. } => ErrorCategory::Extraction,
            DistributorError::IoError(_) | DistributorError::ProcessingError { .. } => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DistributorError::QuotaExceeded | DistributorError::ServiceUnavailable { .. } => {
                ErrorSeverity::Medium
            }
            DistributorError::HttpError(e) if e.is_timeout() || e.is_connect() => {
                ErrorSeverity::Medium
            }
            DistributorError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Whether the same request may succeed if repeated later.
    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DistributorError::InvalidRuleKey { expected_len, .. } => format!(
                "Fix the rule document: keys of this table must have exactly {} character(s)",
                expected_len
            ),
            DistributorError::UnknownHandler { handler, .. } => format!(
                "Add '{}' to 'responsables' or run without strict handler validation",
                handler
            ),
            DistributorError::NoRecords { .. } => {
                "Check that the document contains a table with 'numero' and 'anio' columns".to_string()
            }
            DistributorError::PermissionDenied { .. } => {
                "Verify the extraction service credentials and their allowed origins".to_string()
            }
            DistributorError::QuotaExceeded => {
                "Too many requests were made today; try again later".to_string()
            }
            DistributorError::ServiceUnavailable { .. } | DistributorError::HttpError(_) => {
                "The extraction service is overloaded or unreachable; retry in a few seconds".to_string()
            }
            DistributorError::CsvError(_) | DistributorError::SerializationError(_) => {
                "Check the input file format (json, csv or text)".to_string()
            }
            DistributorError::IoError(_) => {
                "Check that the paths exist and are readable/writable".to_string()
            }
            DistributorError::ProcessingError { .. } => {
                "Re-run with --verbose and inspect the rejected records".to_string()
            }
            DistributorError::ExtractionError { .. } => {
                "The document may be unreadable; try a clearer scan".to_string()
            }
            DistributorError::ConfigError { .. }
            | DistributorError::ConfigValidationError { .. }
            | DistributorError::InvalidConfigValueError { .. }
            | DistributorError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags".to_string()
            }
        }
    }

    /// Process exit code for the binaries: 2 retry later, 1 fix input or
    /// configuration, 3 system problem.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Could not read the case list: {}", self),
            ErrorCategory::Extraction => format!("Case extraction failed: {}", self),
            ErrorCategory::Output => format!("Could not write the results: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, DistributorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_errors_are_configuration() {
        let err = DistributorError::InvalidRuleKey {
            table: "dosDigitos".to_string(),
            key: "123".to_string(),
            expected_len: 2,
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("'123'"));
        assert!(err.recovery_suggestion().contains("exactly 2"));
    }

    #[test]
    fn test_overload_is_retryable() {
        let err = DistributorError::ServiceUnavailable {
            status: 503,
            attempts: 3,
        };
        assert!(err.is_retryable());
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.category(), ErrorCategory::Extraction);

        assert!(!DistributorError::PermissionDenied { status: 403 }.is_retryable());
    }

    #[test]
    fn test_no_records_message() {
        let err = DistributorError::NoRecords {
            source_name: "file 'cases.json'".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(err
            .user_friendly_message()
            .starts_with("Could not read the case list"));
    }
}
