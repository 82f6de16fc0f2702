use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the attendance dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A source file or directory does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A source file exists but could not be opened or decoded.
    #[error("Error loading {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// The file extension is not one of the supported spreadsheet formats.
    #[error("Unsupported file format: {0} (expected .xlsx, .xlsm, .xls, .xlsb, .ods or .csv)")]
    UnsupportedFormat(PathBuf),

    /// A required header is absent from the first row of a sheet.
    #[error("Missing required column \"{column}\" in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A cell could not be converted into the type its column requires.
    #[error("Invalid {column} value {value:?} in row {row} of {path}")]
    InvalidValue {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    /// Discovery found no file whose name matches the attendance pattern.
    #[error("No attendance files found in {0}")]
    NoAttendanceFiles(PathBuf),

    /// The discovery pattern is not a valid regular expression.
    #[error("Invalid file name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A detail view was requested without exactly one student selected.
    #[error("Select exactly one student to see the detailed breakdown ({selected} selected)")]
    InvalidSelection { selected: usize },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse error categories used by the presentation layer to decide how a
/// failure is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A source could not be located.
    FileNotFound,
    /// A source was found but is malformed or unreadable.
    LoadError,
    /// Guidance state: the user must change the selection.
    InvalidSelection,
    /// Bad settings or discovery pattern.
    Config,
}

impl DashboardError {
    /// Map this error onto its [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound(_) | Self::NoAttendanceFiles(_) => ErrorKind::FileNotFound,
            Self::Load { .. }
            | Self::UnsupportedFormat(_)
            | Self::MissingColumn { .. }
            | Self::InvalidValue { .. } => ErrorKind::LoadError,
            Self::InvalidSelection { .. } => ErrorKind::InvalidSelection,
            Self::InvalidPattern(_) | Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Shorthand for a [`DashboardError::Load`] with a displayable cause.
    pub fn load(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
