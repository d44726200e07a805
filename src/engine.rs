//! Generic HTTP search engine shared by all providers
//!
//! Providers own URL construction and response mapping through
//! [`GeoProvider::endpoint`] and [`GeoProvider::parse`]; the engine owns the
//! request itself. Providers hold an [`HttpSearch`] and delegate to it.

use crate::{
    error::{Result, SearchError},
    types::{
        DebugOptions, EndpointArgument, GeoProvider, ParseArgument, Query, QueryParams,
        RequestType, ReverseOptions, SearchOptions, SearchResult,
    },
    utils::{debug, http::HttpClient},
};

/// Performs the request for a provider and hands the decoded body back to it
#[derive(Debug, Clone)]
pub struct HttpSearch {
    http_client: HttpClient,
}

impl HttpSearch {
    /// Create an engine with a custom HTTP timeout
    pub fn with_timeout(timeout_ms: u64) -> Result<Self> {
        Ok(Self {
            http_client: HttpClient::with_timeout(timeout_ms)?,
        })
    }

    /// Forward search: `options.query` is passed to the provider as a text query
    pub async fn search<P>(
        &self,
        provider: &P,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult<P::Raw>>>
    where
        P: GeoProvider + ?Sized,
    {
        let query = Query::Text(options.query.clone());
        let url = provider.endpoint(EndpointArgument {
            query: &query,
            request_type: RequestType::Search,
        })?;

        self.fetch(provider, &url, &options.debug).await
    }

    /// Reverse lookup: coordinates are passed as `lat`/`lon` parameters
    pub async fn reverse<P>(
        &self,
        provider: &P,
        options: &ReverseOptions,
    ) -> Result<Vec<SearchResult<P::Raw>>>
    where
        P: GeoProvider + ?Sized,
    {
        validate_coordinates(options.lat, options.lon)?;

        let mut params = QueryParams::new();
        params.insert("lat".to_string(), options.lat.to_string());
        params.insert("lon".to_string(), options.lon.to_string());
        let query = Query::Params(params);

        let url = provider.endpoint(EndpointArgument {
            query: &query,
            request_type: RequestType::Reverse,
        })?;

        self.fetch(provider, &url, &options.debug).await
    }

    async fn fetch<P>(
        &self,
        provider: &P,
        url: &str,
        debug_options: &Option<DebugOptions>,
    ) -> Result<Vec<SearchResult<P::Raw>>>
    where
        P: GeoProvider + ?Sized,
    {
        debug::log_request(debug_options, provider.name(), url);

        let data: P::Response = self.http_client.get_json(url).await?;
        let results = provider.parse(ParseArgument { data })?;

        debug::log_response(
            debug_options,
            provider.name(),
            &format!("{} results", results.len()),
        );

        Ok(results)
    }
}

/// Reject coordinates outside the WGS84 range
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(SearchError::InvalidInput(format!(
            "Latitude must be between -90 and 90, got {lat}"
        )));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(SearchError::InvalidInput(format!(
            "Longitude must be between -180 and 180, got {lon}"
        )));
    }
    Ok(())
}
