//! Error types emitted by the Quinze CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use quinze_core::{AnalysisError, RequestValidationError};
use quinze_data::{SourceBuildError, SqlitePoiSourceError};
use thiserror::Error;

/// Errors emitted by the Quinze CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Option name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// Both a local database and an Overpass endpoint were configured.
    #[error("--pois-db and --overpass-url are mutually exclusive")]
    ConflictingSources,
    /// A numeric option was out of range.
    #[error("{field} must be {expectation}, got {value}")]
    InvalidOption {
        /// Option name.
        field: &'static str,
        /// Accepted range.
        expectation: &'static str,
        /// Rejected value as supplied.
        value: String,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Option naming the path.
        field: &'static str,
        /// Missing path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the analysis request file failed.
    #[error("failed to open analysis request at {path:?}: {source}")]
    OpenRequest {
        /// Request path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Analysis request JSON could not be decoded.
    #[error("failed to parse analysis request JSON at {path:?}: {source}")]
    ParseRequest {
        /// Request path.
        path: Utf8PathBuf,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// The analysis request failed validation.
    #[error("analysis request in {path:?} failed validation: {source}")]
    InvalidRequest {
        /// Request path.
        path: Utf8PathBuf,
        /// Validation failure.
        #[source]
        source: RequestValidationError,
    },
    /// Opening the SQLite POI database failed.
    #[error(transparent)]
    OpenPoiDatabase(#[from] SqlitePoiSourceError),
    /// Constructing the Overpass source failed.
    #[error("failed to build Overpass source for {endpoint:?}: {source}")]
    BuildOverpassSource {
        /// Configured endpoint.
        endpoint: String,
        /// Construction failure.
        #[source]
        source: SourceBuildError,
    },
    /// The grid analysis failed.
    #[error("analysis failed: {0}")]
    Analysis(#[source] AnalysisError),
    /// Serializing the response failed.
    #[error("failed to serialize analysis response: {0}")]
    SerializeResponse(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
