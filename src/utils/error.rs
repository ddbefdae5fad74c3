use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Dataset is missing required column '{column}'")]
    MissingColumnError { column: String },

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

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },

    #[error("Rendering error: {message}")]
    RenderError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SeriesError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SeriesError::CsvError(_) | SeriesError::MissingColumnError { .. } => {
                ErrorCategory::Input
            }
            SeriesError::ConfigError { .. }
            | SeriesError::ConfigValidationError { .. }
            | SeriesError::InvalidConfigValueError { .. }
            | SeriesError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SeriesError::SerializationError(_) | SeriesError::RenderError { .. } => {
                ErrorCategory::Output
            }
            SeriesError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SeriesError::RenderError { .. } => ErrorSeverity::Medium,
            SeriesError::CsvError(_)
            | SeriesError::MissingColumnError { .. }
            | SeriesError::ConfigError { .. }
            | SeriesError::ConfigValidationError { .. }
            | SeriesError::InvalidConfigValueError { .. }
            | SeriesError::MissingConfigError { .. } => ErrorSeverity::High,
            SeriesError::IoError(_) | SeriesError::SerializationError(_) => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SeriesError::CsvError(_) => {
                "Check that the dataset is a well-formed CSV file with a header row".to_string()
            }
            SeriesError::MissingColumnError { column } => format!(
                "Add a '{}' column to the dataset (required: Region, Category, Order Date, Profit, Sales)",
                column
            ),
            SeriesError::IoError(_) => {
                "Verify that the input file exists and the output directory is writable".to_string()
            }
            SeriesError::SerializationError(_) => {
                "Report this as a bug; derived series should always serialize".to_string()
            }
            SeriesError::ConfigError { .. } | SeriesError::ConfigValidationError { .. } => {
                "Review the configuration file syntax and field values".to_string()
            }
            SeriesError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' and try again", field)
            }
            SeriesError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            SeriesError::RenderError { .. } => {
                "Check the output formats and retry the render".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Could not read the dataset: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Output => format!("Could not write chart output: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// Process exit code for this error, `0` meaning "warn but succeed".
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, SeriesError>;
