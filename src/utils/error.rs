use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Request signing failed: no credentials configured for '{profile}'")]
    MissingCredentials { profile: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Remote endpoint returned HTTP {status} for operation '{operation}'")]
    HttpStatus { operation: String, status: u16 },

    #[error("Mutation '{operation}' rejected by server: {message}")]
    MutationFailed { operation: String, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Credential,
    Transport,
    Mutation,
    Configuration,
    Processing,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::MissingCredentials { .. } => ErrorCategory::Credential,
            SyncError::ApiError(_) | SyncError::HttpStatus { .. } => ErrorCategory::Transport,
            SyncError::MutationFailed { .. } => ErrorCategory::Mutation,
            SyncError::ConfigValidationError { .. }
            | SyncError::InvalidConfigValueError { .. }
            | SyncError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SyncError::SerializationError(_) | SyncError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
            SyncError::IoError(_) | SyncError::CsvError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 沒有憑證或配置錯誤時不該送出任何請求
            ErrorCategory::Credential | ErrorCategory::Configuration => ErrorSeverity::Critical,
            // 網路錯誤可重試，已載入的資料仍保留
            ErrorCategory::Transport => ErrorSeverity::Medium,
            ErrorCategory::Mutation => ErrorSeverity::High,
            ErrorCategory::Processing | ErrorCategory::Io => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SyncError::MissingCredentials { .. } => {
                "Set the auth credentials in the profile TOML or via environment variables".into()
            }
            SyncError::ApiError(_) | SyncError::HttpStatus { .. } => {
                "Check network connectivity and retry; records loaded so far are kept".into()
            }
            SyncError::MutationFailed { .. } => {
                "Review the server message and resubmit; no local state was changed".into()
            }
            SyncError::ConfigValidationError { field, .. }
            | SyncError::InvalidConfigValueError { field, .. }
            | SyncError::MissingConfigError { field } => {
                format!("Fix the '{}' entry in the profile configuration", field)
            }
            SyncError::SerializationError(_) => {
                "Inspect the remote payload; the endpoint may have changed its response shape"
                    .into()
            }
            SyncError::ProcessingError { .. } => "Re-run with --verbose for details".into(),
            SyncError::IoError(_) | SyncError::CsvError(_) => {
                "Check the export path exists and is writable".into()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::MissingCredentials { .. } => {
                "Cannot reach the remote system: credentials are not configured".into()
            }
            SyncError::ApiError(_) | SyncError::HttpStatus { .. } => {
                "The remote system could not be reached".into()
            }
            SyncError::MutationFailed { message, .. } => {
                format!("The server rejected the change: {}", message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
