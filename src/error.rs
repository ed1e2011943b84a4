//! Error types for floor plan generation.
//!
//! Fatal conditions abort the run and are returned as [`PlanError`].
//! Recoverable conditions are recorded as [`Issue`]s on the affected storey
//! and end up in the manifest.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Error codes surfaced to callers and written to the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Model file unreadable or of an unsupported schema (-1)
    ModelOpenFailed = -1,
    /// Model has no storeys (-2)
    NoStoreysFound = -2,
    /// Configuration rejected by validation (-3)
    InvalidConfig = -3,
    /// Element shape could not be built (E100)
    ShapeConstructionFailed = 100,
    /// Plane intersection failed for an element (E101)
    SectionFailed = 101,
    /// Section produced no geometry (E200)
    EmptyCutResult = 200,
    /// Storey skipped because the run timed out (E201)
    RunTimedOut = 201,
    /// Output file could not be written (E300)
    WriteFailed = 300,
}

impl ErrorCode {
    /// Stable string form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ModelOpenFailed => "MODEL_OPEN_FAILED",
            ErrorCode::NoStoreysFound => "NO_STOREYS_FOUND",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::ShapeConstructionFailed => "SHAPE_CONSTRUCTION_FAILED",
            ErrorCode::SectionFailed => "SECTION_FAILED",
            ErrorCode::EmptyCutResult => "EMPTY_CUT_RESULT",
            ErrorCode::RunTimedOut => "RUN_TIMED_OUT",
            ErrorCode::WriteFailed => "WRITE_FAILED",
        }
    }

    /// Numeric code value.
    pub fn value(&self) -> i32 {
        *self as i32
    }

    /// Whether this code aborts the whole run.
    pub fn is_fatal(&self) -> bool {
        self.value() < 0
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal error type for a floor plan run.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Failed to open model {path}: {reason}")]
    ModelOpenFailed { path: PathBuf, reason: String },

    #[error("No storeys found in model {path}")]
    NoStoreysFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PlanError {
    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PlanError::ModelOpenFailed { .. } => ErrorCode::ModelOpenFailed,
            PlanError::NoStoreysFound { .. } => ErrorCode::NoStoreysFound,
            PlanError::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            PlanError::WriteFailed { .. } => ErrorCode::WriteFailed,
        }
    }

    /// Get the numeric error code value.
    pub fn code_value(&self) -> i32 {
        self.code().value()
    }
}

/// Severity of a recoverable issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A recoverable condition recorded against a storey or element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Issue {
    fn new(code: ErrorCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            element: None,
            storey: None,
            path: None,
        }
    }

    /// Shape construction failed for one element.
    pub fn shape_construction_failed(guid: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::ShapeConstructionFailed,
            Severity::Error,
            format!("Shape construction failed for {}: {}", guid, reason),
        )
        .with_element(guid)
    }

    /// Plane intersection failed for one element.
    pub fn section_failed(guid: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::SectionFailed,
            Severity::Error,
            format!("Section failed for {}: {}", guid, reason),
        )
        .with_element(guid)
    }

    /// A storey cut produced no edges.
    pub fn empty_cut(storey: &str, elevation: f64) -> Self {
        Self::new(
            ErrorCode::EmptyCutResult,
            Severity::Warning,
            format!("No geometry at cut elevation {:.3}", elevation),
        )
        .with_storey(storey)
    }

    /// A storey was not processed before the run deadline.
    pub fn timed_out(storey: &str) -> Self {
        Self::new(
            ErrorCode::RunTimedOut,
            Severity::Warning,
            "Run timeout reached before this storey was started",
        )
        .with_storey(storey)
    }

    /// An output file could not be written.
    pub fn write_failed(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        let path = path.into();
        let message = format!("Failed to write {}: {}", path.display(), reason);
        let mut issue = Self::new(ErrorCode::WriteFailed, Severity::Error, message);
        issue.path = Some(path);
        issue
    }

    pub fn with_element(mut self, guid: impl Into<String>) -> Self {
        self.element = Some(guid.into());
        self
    }

    pub fn with_storey(mut self, storey: impl Into<String>) -> Self {
        self.storey = Some(storey.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PlanError>;
