//! Core types and traits for the geocoding SDK

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Bounding box as `[[south, west], [north, east]]`
pub type BoundsTuple = [[f64; 2]; 2];

/// Named query parameters sent to a provider endpoint
pub type QueryParams = BTreeMap<String, String>;

/// A geocoding result normalized across providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult<R = serde_json::Value> {
    /// Longitude
    pub x: f64,
    /// Latitude
    pub y: f64,
    /// Human readable address
    pub label: String,
    /// Bounding box of the match, when the provider reports one
    pub bounds: Option<BoundsTuple>,
    /// The provider record this result was built from
    pub raw: R,
}

/// Debug options for the geocoding SDK
#[derive(Debug, Clone, Default)]
pub struct DebugOptions {
    /// Enable verbose logging
    pub enabled: bool,
    /// Log request details (URLs)
    pub log_requests: bool,
    /// Log response summaries
    pub log_responses: bool,
}

/// Kind of request a provider endpoint is built for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    /// Forward search: free text to coordinates
    #[default]
    Search,
    /// Reverse lookup: coordinates to nearest address
    Reverse,
}

/// Request parameters handed to [`GeoProvider::endpoint`]
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// A bare free-text query
    Text(String),
    /// Already named parameters
    Params(QueryParams),
}

impl From<&str> for Query {
    fn from(query: &str) -> Self {
        Query::Text(query.to_string())
    }
}

impl From<String> for Query {
    fn from(query: String) -> Self {
        Query::Text(query)
    }
}

impl From<QueryParams> for Query {
    fn from(params: QueryParams) -> Self {
        Query::Params(params)
    }
}

/// Options for a forward search
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// The address text to look up
    pub query: String,
    /// Debug options
    pub debug: Option<DebugOptions>,
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            debug: None,
        }
    }
}

/// Options for a reverse lookup
#[derive(Debug, Clone, Default)]
pub struct ReverseOptions {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// Debug options
    pub debug: Option<DebugOptions>,
}

impl ReverseOptions {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            debug: None,
        }
    }
}

/// Argument passed to [`GeoProvider::endpoint`]
#[derive(Debug, Clone, Copy)]
pub struct EndpointArgument<'a> {
    pub query: &'a Query,
    pub request_type: RequestType,
}

/// Decoded response body passed to [`GeoProvider::parse`]
#[derive(Debug, Clone)]
pub struct ParseArgument<T> {
    pub data: T,
}

/// Capability interface every geocoding provider implements.
///
/// `endpoint` and `parse` are the strategy hooks the shared
/// [`HttpSearch`](crate::engine::HttpSearch) engine calls; `search` is the
/// public entry point and usually delegates to that engine.
#[async_trait::async_trait]
pub trait GeoProvider: Send + Sync + fmt::Debug {
    /// Decoded shape of the provider's response body
    type Response: DeserializeOwned + Send;
    /// Provider record kept as [`SearchResult::raw`]
    type Raw: Send;

    /// Name of the provider
    fn name(&self) -> &str;

    /// Build the absolute request URL for a query
    fn endpoint(&self, args: EndpointArgument<'_>) -> Result<String>;

    /// Map a decoded response to normalized results
    fn parse(&self, result: ParseArgument<Self::Response>) -> Result<Vec<SearchResult<Self::Raw>>>;

    /// Forward search
    async fn search(&self, options: &SearchOptions) -> Result<Vec<SearchResult<Self::Raw>>>;

    /// Get provider configuration (for debugging/logging)
    fn config(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// Provider configuration trait for consistent configuration patterns
pub trait ProviderConfig {
    /// Validate the configuration
    fn validate(&self) -> Result<()>;
}
