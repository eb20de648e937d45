//! Error types for reconstruction operations.
//!
//! Errors fall into three camps, mirroring how the pipeline can fail:
//!
//! - **Input errors**: the caller handed us something unusable (empty cloud,
//!   zero neighborhood size). Reported before any work is done.
//! - **Internal consistency errors**: the pipeline reached a state that the
//!   algorithm's invariants say is unreachable. These abort the whole run
//!   rather than emit a possibly-wrong field.
//! - **I/O errors**: reading or writing point-cloud and grid files.
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `CLOUD-XXXX`:
//! - `CLOUD-1xxx`: I/O errors (file reading, writing, parsing)
//! - `CLOUD-2xxx`: Input errors (bad cloud, bad parameters)
//! - `CLOUD-3xxx`: Internal errors (consistency violations, cancellation)
//! - `CLOUD-4xxx`: Format errors (unsupported or malformed files)

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for reconstruction operations.
pub type ReconResult<T> = Result<T, ReconError>;

/// Machine-readable error codes for reconstruction operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // I/O errors (1xxx)
    /// CLOUD-1001: Failed to read file
    IoRead = 1001,
    /// CLOUD-1002: Failed to write file
    IoWrite = 1002,
    /// CLOUD-1003: Failed to parse file format
    ParseError = 1003,

    // Input errors (2xxx)
    /// CLOUD-2001: Point cloud has no points
    EmptyCloud = 2001,
    /// CLOUD-2002: Invalid reconstruction parameter
    InvalidParameter = 2002,

    // Internal errors (3xxx)
    /// CLOUD-3001: Pipeline invariant violated
    InternalConsistency = 3001,
    /// CLOUD-3002: Operation cancelled via progress callback
    Cancelled = 3002,

    // Format errors (4xxx)
    /// CLOUD-4001: Unsupported file format
    UnsupportedFormat = 4001,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `CLOUD-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IoRead => "CLOUD-1001",
            ErrorCode::IoWrite => "CLOUD-1002",
            ErrorCode::ParseError => "CLOUD-1003",
            ErrorCode::EmptyCloud => "CLOUD-2001",
            ErrorCode::InvalidParameter => "CLOUD-2002",
            ErrorCode::InternalConsistency => "CLOUD-3001",
            ErrorCode::Cancelled => "CLOUD-3002",
            ErrorCode::UnsupportedFormat => "CLOUD-4001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur during point-cloud reconstruction.
#[derive(Debug, Error, Diagnostic)]
pub enum ReconError {
    /// Error reading from a file.
    #[error("failed to read point cloud from {path}")]
    #[diagnostic(
        code(cloud::io::read),
        help("Check that the file exists and is readable")
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write to {path}")]
    #[diagnostic(
        code(cloud::io::write),
        help("Check that the directory exists and is writable")
    )]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a point-cloud file.
    #[error("failed to parse point cloud from {path}: {details}")]
    #[diagnostic(
        code(cloud::parse::error),
        help("The file may be corrupted or in an unsupported format variant")
    )]
    ParseError { path: PathBuf, details: String },

    /// Unsupported file format.
    #[error("unsupported point cloud format: {extension:?}")]
    #[diagnostic(
        code(cloud::format::unsupported),
        help("Supported formats: PLY, XYZ")
    )]
    UnsupportedFormat { extension: Option<String> },

    /// Point cloud has no points.
    #[error("point cloud is empty: {details}")]
    #[diagnostic(
        code(cloud::input::empty),
        help("Reconstruction needs at least one input point")
    )]
    EmptyCloud { details: String },

    /// Invalid reconstruction parameter.
    #[error("invalid parameter {name}: {details}")]
    #[diagnostic(
        code(cloud::input::parameter),
        help("See ReconstructionParams for valid ranges")
    )]
    InvalidParameter { name: &'static str, details: String },

    /// A pipeline invariant was violated.
    ///
    /// These states should be provably unreachable; hitting one signals a bug
    /// rather than bad input, so the run aborts instead of emitting a field.
    #[error("internal consistency failure in {stage}: {details}")]
    #[diagnostic(
        code(cloud::internal::consistency),
        help("This is a bug in the reconstruction pipeline, not an input problem")
    )]
    InternalConsistency {
        stage: &'static str,
        details: String,
    },

    /// The operation was cancelled via its progress callback.
    #[error("reconstruction cancelled during {stage}")]
    #[diagnostic(code(cloud::internal::cancelled))]
    Cancelled { stage: &'static str },
}

impl ReconError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ReconError::IoRead { .. } => ErrorCode::IoRead,
            ReconError::IoWrite { .. } => ErrorCode::IoWrite,
            ReconError::ParseError { .. } => ErrorCode::ParseError,
            ReconError::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            ReconError::EmptyCloud { .. } => ErrorCode::EmptyCloud,
            ReconError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            ReconError::InternalConsistency { .. } => ErrorCode::InternalConsistency,
            ReconError::Cancelled { .. } => ErrorCode::Cancelled,
        }
    }

    // Constructor helpers for common error patterns

    /// Create an IoRead error.
    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReconError::IoRead {
            path: path.into(),
            source,
        }
    }

    /// Create an IoWrite error.
    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReconError::IoWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a ParseError.
    pub fn parse_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        ReconError::ParseError {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create an UnsupportedFormat error.
    pub fn unsupported_format(extension: Option<String>) -> Self {
        ReconError::UnsupportedFormat { extension }
    }

    /// Create an EmptyCloud error.
    pub fn empty_cloud(details: impl Into<String>) -> Self {
        ReconError::EmptyCloud {
            details: details.into(),
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(name: &'static str, details: impl Into<String>) -> Self {
        ReconError::InvalidParameter {
            name,
            details: details.into(),
        }
    }

    /// Create an InternalConsistency error.
    pub fn internal(stage: &'static str, details: impl Into<String>) -> Self {
        ReconError::InternalConsistency {
            stage,
            details: details.into(),
        }
    }

    /// Create a Cancelled error.
    pub fn cancelled(stage: &'static str) -> Self {
        ReconError::Cancelled { stage }
    }
}
