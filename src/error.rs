use thiserror::Error;

/// Errors raised while configuring or computing flow metrics
#[derive(Error, Debug)]
pub enum FlowError {
    /// A required configuration key is absent or a referenced file cannot be opened
    #[error("Missing config item: {key}")]
    MissingConfigItem { key: String },

    /// A state seen in the data has no place in the canonical state ordering
    #[error("Missing state: {state}")]
    MissingState { state: String },

    /// A cycle definition mixes or omits boundary/set keys
    #[error("Invalid cycle '{name}': {reason}")]
    InvalidCycle { name: String, reason: String },

    /// A report names a type grouping absent from configuration
    #[error("Unknown type grouping: {0}")]
    UnknownTypeGrouping(String),

    /// A report names a cycle absent from configuration
    #[error("Unknown cycle: {0}")]
    UnknownCycle(String),

    /// Work item lookup by id failed
    #[error("Unknown work item: {0}")]
    UnknownWorkItem(String),

    /// Source type has no adapter in this crate
    #[error("Unsupported source type: {0}")]
    UnsupportedSource(String),

    /// Date window is inverted or otherwise unusable
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// Timestamp could not be parsed
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Histogram bucket edges are unusable
    #[error("Invalid buckets: {0}")]
    InvalidBuckets(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Export errors
    #[error("Export failed: {0}")]
    ExportFailed(String),
}

impl FlowError {
    pub fn missing_config(key: impl Into<String>) -> Self {
        FlowError::MissingConfigItem { key: key.into() }
    }

    pub fn missing_state(state: impl Into<String>) -> Self {
        FlowError::MissingState {
            state: state.into(),
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            FlowError::MissingConfigItem { .. } => "MISSING_CONFIG_ITEM",
            FlowError::MissingState { .. } => "MISSING_STATE",
            FlowError::InvalidCycle { .. } => "INVALID_CYCLE",
            FlowError::UnknownTypeGrouping(_) => "UNKNOWN_TYPE_GROUPING",
            FlowError::UnknownCycle(_) => "UNKNOWN_CYCLE",
            FlowError::UnknownWorkItem(_) => "UNKNOWN_WORK_ITEM",
            FlowError::UnsupportedSource(_) => "UNSUPPORTED_SOURCE",
            FlowError::InvalidDateRange(_) => "INVALID_DATE_RANGE",
            FlowError::InvalidTimestamp(_) => "INVALID_TIMESTAMP",
            FlowError::InvalidBuckets(_) => "INVALID_BUCKETS",
            FlowError::Configuration(_) => "CONFIGURATION_ERROR",
            FlowError::Io(_) => "IO_ERROR",
            FlowError::Serialization(_) => "SERIALIZATION_ERROR",
            FlowError::ExportFailed(_) => "EXPORT_FAILED",
        }
    }

    /// Configuration problems are fatal to the component being built; the rest
    /// are data-level and scoped to one item or one report.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FlowError::MissingConfigItem { .. }
                | FlowError::InvalidCycle { .. }
                | FlowError::UnknownTypeGrouping(_)
                | FlowError::UnknownCycle(_)
                | FlowError::UnsupportedSource(_)
                | FlowError::InvalidBuckets(_)
                | FlowError::Configuration(_)
        )
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::Serialization(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for FlowError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => FlowError::MissingConfigItem { key },
            other => FlowError::Configuration(other.to_string()),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, FlowError>;
