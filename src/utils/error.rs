use thiserror::Error;

/// Failures while turning an input file into a table. Fatal to the run.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook parsing error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("Workbook has no readable sheet")]
    NoSheet,

    #[error("Input contains no header row")]
    Empty,

    #[error("Row {row} has {found} fields, but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported input format: {extension}")]
    UnsupportedFormat { extension: String },
}

/// Failures while serializing results for download.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Failed to load input: {0}")]
    Load(#[from] LoadError),

    #[error("Failed to export results: {0}")]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Target column '{target}' not found. Available columns: {available}")]
    UnknownTarget { target: String, available: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Model,
    Output,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ForecastError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ForecastError::Load(_) => ErrorCategory::Input,
            ForecastError::UnknownTarget { .. } => ErrorCategory::Model,
            ForecastError::Export(_) => ErrorCategory::Output,
            ForecastError::IoError(_) => ErrorCategory::System,
            ForecastError::ConfigError { .. }
            | ForecastError::InvalidConfigValueError { .. }
            | ForecastError::MissingConfigError { .. }
            | ForecastError::ValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // results were already shown when an export fails
            ForecastError::Export(_) => ErrorSeverity::Medium,
            ForecastError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ForecastError::Load(e) => format!("Could not read the data file: {}", e),
            ForecastError::Export(e) => format!("Could not write the results file: {}", e),
            ForecastError::IoError(e) => format!("File system error: {}", e),
            ForecastError::UnknownTarget { target, .. } => {
                format!("The dependent variable '{}' is not a column of the data", target)
            }
            ForecastError::ConfigError { message } | ForecastError::ValidationError { message } => {
                format!("Invalid configuration: {}", message)
            }
            ForecastError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid value for {}: {}", field, reason)
            }
            ForecastError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ForecastError::Load(LoadError::UnsupportedFormat { .. }) => {
                "Provide a .csv or .xlsx file".to_string()
            }
            ForecastError::Load(LoadError::Empty) => {
                "Make sure the first row of the file holds the column names".to_string()
            }
            ForecastError::Load(_) => {
                "Check that the file is a well-formed CSV or Excel workbook".to_string()
            }
            ForecastError::Export(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            ForecastError::IoError(_) => "Check file paths and permissions".to_string(),
            ForecastError::UnknownTarget { available, .. } => {
                format!("Choose one of: {}", available)
            }
            ForecastError::ConfigError { .. }
            | ForecastError::InvalidConfigValueError { .. }
            | ForecastError::MissingConfigError { .. }
            | ForecastError::ValidationError { .. } => {
                "Review the command line flags or the TOML configuration file".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
