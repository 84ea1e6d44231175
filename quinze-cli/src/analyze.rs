//! Analyze command implementation for the Quinze CLI.

use std::io::{BufReader, Write};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use quinze_core::wire::{AnalysisRequestBody, AnalysisResponseBody};
use quinze_core::{
    AnalysisConfig, AnalysisRequest, AnalysisResult, CategoryTable, GridScorer, PoiSource,
};
use quinze_data::overpass::DEFAULT_OVERPASS_URL;
use quinze_data::{OverpassPoiSource, OverpassPoiSourceConfig, SqlitePoiSource};
use serde::{Deserialize, Serialize};

use crate::fs::{file_is_file, open_utf8_file};
use crate::{
    ARG_OVERPASS_URL, ARG_POIS_DB, ARG_RADIUS_DEGREES, ARG_REQUEST, ARG_TIMEOUT_SECS, CliError,
    ENV_REQUEST,
};

/// CLI arguments for the `analyze` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Score a grid of candidate locations around the request's \
                 reference point. POIs come from a local SQLite database when \
                 --pois-db is set, otherwise from an Overpass API endpoint. \
                 The request is a JSON file using the analysis request \
                 format; the response is printed as JSON.",
    about = "Find the best locations for a weighted list of amenities"
)]
#[ortho_config(prefix = "QUINZE")]
pub(crate) struct AnalyzeArgs {
    /// Path to a JSON file containing an analysis request.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// SQLite POI database to query instead of Overpass.
    #[arg(long = ARG_POIS_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) pois_db: Option<Utf8PathBuf>,
    /// Overpass API interpreter URL.
    #[arg(long = ARG_OVERPASS_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) overpass_url: Option<String>,
    /// Half-width of the analysis box in degrees.
    #[arg(long = ARG_RADIUS_DEGREES, value_name = "degrees")]
    #[serde(default)]
    pub(crate) radius_degrees: Option<f64>,
    /// Abort the analysis after this many seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl AnalyzeArgs {
    pub(crate) fn into_config(self) -> Result<AnalyzeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AnalyzeConfig::try_from(merged)
    }
}

/// Where POIs are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PoiBackend {
    /// Local SQLite database.
    Sqlite(Utf8PathBuf),
    /// Overpass API endpoint.
    Overpass(String),
}

/// Resolved `analyze` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnalyzeConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// POI backend.
    pub(crate) backend: PoiBackend,
    /// Scorer settings.
    pub(crate) analysis: AnalysisConfig,
}

impl AnalyzeConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.request_path, ARG_REQUEST)?;
        if let PoiBackend::Sqlite(path) = &self.backend {
            Self::require_existing(path, ARG_POIS_DB)?;
        }
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<AnalyzeArgs> for AnalyzeConfig {
    type Error = CliError;

    fn try_from(args: AnalyzeArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_REQUEST,
        })?;

        let backend = match (args.pois_db, args.overpass_url) {
            (Some(_), Some(_)) => return Err(CliError::ConflictingSources),
            (Some(path), None) => PoiBackend::Sqlite(path),
            (None, url) => {
                PoiBackend::Overpass(url.unwrap_or_else(|| DEFAULT_OVERPASS_URL.to_owned()))
            }
        };

        let mut analysis = AnalysisConfig::default();
        if let Some(radius) = args.radius_degrees {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(CliError::InvalidOption {
                    field: ARG_RADIUS_DEGREES,
                    expectation: "a positive number of degrees",
                    value: radius.to_string(),
                });
            }
            analysis = analysis.with_radius_degrees(radius);
        }
        if let Some(secs) = args.timeout_secs {
            if secs == 0 {
                return Err(CliError::InvalidOption {
                    field: ARG_TIMEOUT_SECS,
                    expectation: "at least one second",
                    value: secs.to_string(),
                });
            }
            analysis = analysis.with_deadline(Duration::from_secs(secs));
        }

        Ok(Self {
            request_path,
            backend,
            analysis,
        })
    }
}

/// Builds the POI source for the current analyze invocation.
pub(crate) trait PoiSourceBuilder {
    fn build(&self, config: &AnalyzeConfig) -> Result<Box<dyn PoiSource>, CliError>;
}

pub(crate) struct DefaultPoiSourceBuilder;

impl PoiSourceBuilder for DefaultPoiSourceBuilder {
    fn build(&self, config: &AnalyzeConfig) -> Result<Box<dyn PoiSource>, CliError> {
        let categories = CategoryTable::default();
        match &config.backend {
            PoiBackend::Sqlite(path) => Ok(Box::new(SqlitePoiSource::open(path, categories)?)),
            PoiBackend::Overpass(endpoint) => {
                let mut overpass = OverpassPoiSourceConfig::new(endpoint.clone());
                if let Some(deadline) = config.analysis.deadline {
                    overpass = overpass.with_timeout(deadline);
                }
                let source = OverpassPoiSource::with_config(overpass, categories).map_err(
                    |source| CliError::BuildOverpassSource {
                        endpoint: endpoint.clone(),
                        source,
                    },
                )?;
                Ok(Box::new(source))
            }
        }
    }
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_analyze_with(args, &DefaultPoiSourceBuilder, &mut stdout)
}

pub(crate) fn run_analyze_with(
    args: AnalyzeArgs,
    builder: &dyn PoiSourceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let result = execute_analyze(args, builder)?;
    write_analysis_response(writer, &result)
}

fn execute_analyze(
    args: AnalyzeArgs,
    builder: &dyn PoiSourceBuilder,
) -> Result<AnalysisResult, CliError> {
    let config = resolve_analyze_config(args)?;
    let body = load_analysis_request(&config.request_path)?;
    let request =
        AnalysisRequest::try_from(body).map_err(|source| CliError::InvalidRequest {
            path: config.request_path.clone(),
            source,
        })?;
    let source = builder.build(&config)?;
    let result = GridScorer::new(source, config.analysis)
        .analyze(&request)
        .map_err(CliError::Analysis)?;
    log::info!(
        "analysed {} grid points for {} requirements: {} ranked locations, {} heatmap points",
        result.info.total_grid_points,
        result.info.poi_count,
        result.top_locations.len(),
        result.heatmap_points.len()
    );
    Ok(result)
}

fn resolve_analyze_config(args: AnalyzeArgs) -> Result<AnalyzeConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`AnalysisRequestBody`] from disk.
pub(crate) fn load_analysis_request(path: &Utf8Path) -> Result<AnalysisRequestBody, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseRequest {
        path: path.to_path_buf(),
        source,
    })
}

fn write_analysis_response(
    writer: &mut dyn Write,
    result: &AnalysisResult,
) -> Result<(), CliError> {
    let body = AnalysisResponseBody::from(result);
    let payload = serde_json::to_string_pretty(&body).map_err(CliError::SerializeResponse)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<AnalyzeConfig, CliError> {
    let merged = AnalyzeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    AnalyzeConfig::try_from(merged)
}
