//! Command-line interface for the Quinze location search engine.
#![forbid(unsafe_code)]

mod analyze;
mod categories;
mod error;
mod fs;

use clap::{Parser, Subcommand};

pub use error::CliError;

use analyze::{AnalyzeArgs, run_analyze};
use categories::run_categories;

pub(crate) const ARG_REQUEST: &str = "request";
pub(crate) const ARG_POIS_DB: &str = "pois-db";
pub(crate) const ARG_OVERPASS_URL: &str = "overpass-url";
pub(crate) const ARG_RADIUS_DEGREES: &str = "radius-degrees";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ENV_REQUEST: &str = "QUINZE_CMDS_ANALYZE_REQUEST_PATH";

/// Run the Quinze CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// request cannot be loaded, or the analysis fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Categories => run_categories(),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "quinze",
    about = "Find the best places to live within a short trip of everyday amenities",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a grid around a location and print the heatmap and best spots.
    Analyze(AnalyzeArgs),
    /// List the POI category keys accepted in requests.
    Categories,
}

#[cfg(test)]
mod tests;
