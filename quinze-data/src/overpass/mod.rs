//! `PoiSource` backed by an Overpass API endpoint.
//!
//! Each lookup translates the category into an Overpass QL union over its tag
//! predicates, restricted to the requested box, and decodes nodes by their
//! coordinates and ways or relations by their centre.
//!
//! # Architecture
//!
//! [`PoiSource`] is synchronous so the scorer stays embeddable in synchronous
//! contexts. This source bridges async HTTP calls to the sync interface by
//! blocking on a Tokio runtime it owns.
//!
//! # Example
//!
//! ```no_run
//! use quinze_core::{BoundingBox, CategoryTable, GeoPoint, PoiSource};
//! use quinze_data::overpass::OverpassPoiSource;
//!
//! let source = OverpassPoiSource::new(CategoryTable::default())?;
//! let bbox = BoundingBox::around(GeoPoint::new(40.640, -8.654), 0.18)?;
//! let pharmacies = source.lookup("pharmacies", &bbox).into_locations();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod dto;
mod query;

use std::time::Duration;

use quinze_core::{
    BoundingBox, CategoryDescriptor, CategoryTable, PoiLocation, PoiLookup, PoiSource,
};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use self::dto::OverpassResponseDto;
use self::query::category_query;

/// Public Overpass API interpreter.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Default user agent for Overpass requests.
pub const DEFAULT_USER_AGENT: &str = "quinze-overpass/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error type for [`OverpassPoiSource`] construction failures.
#[derive(Debug, Error)]
pub enum SourceBuildError {
    /// The endpoint was not an absolute HTTP(S) URL.
    #[error("invalid Overpass endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// Endpoint as configured.
        endpoint: String,
        /// Why the endpoint was rejected.
        reason: String,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Failures of a single Overpass lookup.
#[derive(Debug, Error)]
enum OverpassError {
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },
    #[error("Overpass returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("network error contacting {url}: {message}")]
    Network { url: String, message: String },
    #[error("failed to decode Overpass response: {message}")]
    Decode { message: String },
    #[error("Overpass reported {remark}")]
    Server { remark: String },
}

/// Configuration for [`OverpassPoiSource`].
#[derive(Debug, Clone)]
pub struct OverpassPoiSourceConfig {
    /// Interpreter endpoint (e.g., `"https://overpass-api.de/api/interpreter"`).
    pub endpoint: String,
    /// Request timeout, also sent to the server as the query timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OverpassPoiSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OVERPASS_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OverpassPoiSourceConfig {
    /// Create a configuration for the given endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// POI source querying an Overpass API endpoint.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the source blocks on its own current-thread
/// runtime. Inside a multi-threaded runtime it uses that runtime's handle with
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime it falls
/// back to its own runtime, which may deadlock if the caller's runtime drives
/// IO this request depends on.
///
/// Failures (network, HTTP status, decoding, server-side timeouts) degrade to
/// [`PoiLookup::Unavailable`] and are logged at `warn`.
pub struct OverpassPoiSource {
    client: Client,
    config: OverpassPoiSourceConfig,
    endpoint: Url,
    categories: CategoryTable,
    runtime: Runtime,
}

impl std::fmt::Debug for OverpassPoiSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverpassPoiSource")
            .field("config", &self.config)
            .field("categories", &self.categories.len())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl OverpassPoiSource {
    /// Create a source for the public endpoint with default settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(categories: CategoryTable) -> Result<Self, SourceBuildError> {
        Self::with_config(OverpassPoiSourceConfig::default(), categories)
    }

    /// Create a source with explicit configuration.
    ///
    /// # Errors
    /// Returns [`SourceBuildError::InvalidEndpoint`] when the endpoint is not
    /// an HTTP(S) URL, or an error if the HTTP client or Tokio runtime fails
    /// to build.
    pub fn with_config(
        config: OverpassPoiSourceConfig,
        categories: CategoryTable,
    ) -> Result<Self, SourceBuildError> {
        let endpoint = parse_endpoint(&config.endpoint)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(SourceBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SourceBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            endpoint,
            categories,
            runtime,
        })
    }

    /// Category table used to translate lookups.
    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    async fn fetch_async(
        &self,
        descriptor: &CategoryDescriptor,
        bbox: &BoundingBox,
    ) -> Result<Vec<PoiLocation>, OverpassError> {
        let query = category_query(descriptor, bbox, self.config.timeout);
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err))?;

        let body: OverpassResponseDto =
            response
                .json()
                .await
                .map_err(|err| OverpassError::Decode {
                    message: err.to_string(),
                })?;

        if let Some(remark) = body.runtime_error() {
            return Err(OverpassError::Server {
                remark: remark.to_owned(),
            });
        }
        Ok(body.into_locations(bbox))
    }

    fn fetch(
        &self,
        descriptor: &CategoryDescriptor,
        bbox: &BoundingBox,
    ) -> Result<Vec<PoiLocation>, OverpassError> {
        let future = self.fetch_async(descriptor, bbox);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error) -> OverpassError {
        let url = self.endpoint.to_string();
        if error.is_timeout() {
            return OverpassError::Timeout {
                url,
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return OverpassError::Http {
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        OverpassError::Network {
            url,
            message: error.to_string(),
        }
    }
}

impl PoiSource for OverpassPoiSource {
    fn lookup(&self, category: &str, bbox: &BoundingBox) -> PoiLookup {
        let Some(descriptor) = self.categories.get(category) else {
            return PoiLookup::UnknownCategory;
        };
        match self.fetch(descriptor, bbox) {
            Ok(locations) => {
                log::debug!(
                    "Overpass returned {} locations for '{category}'",
                    locations.len()
                );
                PoiLookup::Found(locations)
            }
            Err(err) => {
                log::warn!("Overpass lookup for '{category}' failed: {err}");
                PoiLookup::unavailable(err)
            }
        }
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, SourceBuildError> {
    let invalid = |reason: String| SourceBuildError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        reason,
    };
    let url = Url::parse(endpoint).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
