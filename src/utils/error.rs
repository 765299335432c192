use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoundError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid config value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required config field: {field}")]
    MissingConfigError { field: String },

    #[error("Persisting hole {hole} failed after {attempts} attempts")]
    TransientWriteError { hole: u8, attempts: u32 },

    #[error("Failed to load round {round_id}: {details}")]
    LoadError { round_id: String, details: String },

    #[error("Failed to write round totals: {details}")]
    AggregationError { details: String },

    #[error("Operation '{operation}' not allowed while round is {status}")]
    SessionStateError { operation: String, status: String },
}

pub type Result<T> = std::result::Result<T, RoundError>;

/// 錯誤分類，用於日誌與通知歸類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Persistence,
    Load,
    Aggregation,
    Session,
}

/// 錯誤嚴重程度，CLI 依此決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RoundError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RoundError::ApiError(_) => ErrorCategory::Network,
            RoundError::IoError(_) | RoundError::SerializationError(_) => ErrorCategory::Storage,
            RoundError::TomlError(_)
            | RoundError::ConfigError { .. }
            | RoundError::InvalidConfigValueError { .. }
            | RoundError::MissingConfigError { .. } => ErrorCategory::Configuration,
            RoundError::TransientWriteError { .. } => ErrorCategory::Persistence,
            RoundError::LoadError { .. } => ErrorCategory::Load,
            RoundError::AggregationError { .. } => ErrorCategory::Aggregation,
            RoundError::SessionStateError { .. } => ErrorCategory::Session,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 重試耗盡後本地資料仍完整，屬於可恢復錯誤
            RoundError::TransientWriteError { .. } | RoundError::AggregationError { .. } => {
                ErrorSeverity::Low
            }
            RoundError::ApiError(_)
            | RoundError::LoadError { .. }
            | RoundError::SessionStateError { .. } => ErrorSeverity::Medium,
            RoundError::IoError(_) | RoundError::SerializationError(_) => ErrorSeverity::High,
            RoundError::TomlError(_)
            | RoundError::ConfigError { .. }
            | RoundError::InvalidConfigValueError { .. }
            | RoundError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    /// 是否值得重試
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RoundError::ApiError(_)
                | RoundError::TransientWriteError { .. }
                | RoundError::LoadError { .. }
                | RoundError::AggregationError { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RoundError::ApiError(_) => {
                "Check your network connection and the API endpoint, then try again".to_string()
            }
            RoundError::IoError(_) => {
                "Check that the marker directory exists and is writable".to_string()
            }
            RoundError::SerializationError(_) => {
                "The stored data may be from an incompatible version; clear it and retry"
                    .to_string()
            }
            RoundError::TomlError(_) => {
                "Fix the TOML syntax in the config file and retry".to_string()
            }
            RoundError::ConfigError { .. }
            | RoundError::InvalidConfigValueError { .. }
            | RoundError::MissingConfigError { .. } => {
                "Review the configuration values and correct the reported field".to_string()
            }
            RoundError::TransientWriteError { hole, .. } => format!(
                "Scores for hole {} are kept locally; re-edit the hole or navigate to retry",
                hole
            ),
            RoundError::LoadError { .. } => {
                "The round could not be loaded; retry, or start a new round".to_string()
            }
            RoundError::AggregationError { .. } => {
                "Totals are shown from local data; finish again later to sync them".to_string()
            }
            RoundError::SessionStateError { .. } => {
                "Load a round first, or start a new one; finished rounds are read-only".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RoundError::ApiError(_) => "Could not reach the score server".to_string(),
            RoundError::IoError(_) => "Could not read or write local data".to_string(),
            RoundError::SerializationError(_) => "Stored data could not be understood".to_string(),
            RoundError::TomlError(_) => "The configuration file is not valid TOML".to_string(),
            RoundError::ConfigError { message } => message.clone(),
            RoundError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration '{}' is invalid: {}", field, reason)
            }
            RoundError::MissingConfigError { field } => {
                format!("Configuration '{}' is required", field)
            }
            RoundError::TransientWriteError { hole, .. } => {
                format!("Hole {} could not be saved online (kept on this device)", hole)
            }
            RoundError::LoadError { .. } => "The round could not be loaded".to_string(),
            RoundError::AggregationError { .. } => {
                "Round totals could not be saved online".to_string()
            }
            RoundError::SessionStateError { operation, status } => {
                format!("Cannot {} while the round is {}", operation, status)
            }
        }
    }
}
