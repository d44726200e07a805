//! # geosearch
//!
//! Geocoding through a single provider interface: forward search (address to
//! coordinates) and reverse lookup (coordinates to address), with results
//! normalized to `x`, `y`, `label`, `bounds` and the provider's raw record.
//!
//! Modeled on the provider layout of [leaflet-geosearch](https://github.com/smeijer/leaflet-geosearch).
//! Ships a provider for the French national address API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use geosearch::{geo_search, providers::GeoApiFrProvider, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GeoApiFrProvider::new()?;
//!
//!     let results = geo_search(&provider, SearchOptions::new("8 bd du Port, Nanterre")).await?;
//!
//!     for result in results {
//!         println!("{} ({}, {})", result.label, result.y, result.x);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod error;
pub mod providers;
pub mod types;
pub mod utils;

// Re-export common types
pub use engine::HttpSearch;
pub use error::{Result, SearchError};
pub use types::{
    DebugOptions, GeoProvider, Query, RequestType, ReverseOptions, SearchOptions, SearchResult,
};

/// Run a forward search against a provider and log troubleshooting hints on failure
///
/// Errors are returned unchanged.
///
/// # Examples
///
/// ```rust,no_run
/// use geosearch::{geo_search, providers::GeoApiFrProvider, SearchOptions};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = GeoApiFrProvider::new()?;
/// let results = geo_search(&provider, SearchOptions::new("10 avenue des Champs")).await?;
/// # Ok(())
/// # }
/// ```
pub async fn geo_search<P>(provider: &P, options: SearchOptions) -> Result<Vec<SearchResult<P::Raw>>>
where
    P: GeoProvider + ?Sized,
{
    use utils::debug;

    debug::log(
        &options.debug,
        "Performing search",
        &format!("provider: {}, query: {}", provider.name(), options.query),
    );

    match provider.search(&options).await {
        Ok(results) => {
            debug::log(
                &options.debug,
                "Search finished",
                &format!("{} results", results.len()),
            );
            Ok(results)
        }
        Err(error) => {
            log::warn!(
                "Search with provider '{}' failed: {}. Troubleshooting: {}",
                provider.name(),
                error,
                get_troubleshooting_info(provider.name(), &error)
            );
            Err(error)
        }
    }
}

/// Get provider-specific troubleshooting information based on error
pub fn get_troubleshooting_info(provider_name: &str, error: &SearchError) -> String {
    let suggestion = match error {
        SearchError::HttpError {
            status_code: Some(400),
            ..
        } => Some("This is likely due to invalid request parameters. Queries must be between 3 and 200 characters and coordinates must be valid."),
        SearchError::HttpError {
            status_code: Some(404),
            ..
        } => Some("The endpoint was not found. Check the configured search and reverse URLs."),
        SearchError::RateLimit(_)
        | SearchError::HttpError {
            status_code: Some(429),
            ..
        } => Some("You've exceeded the rate limit for this API. Try again later or reduce your request frequency."),
        SearchError::HttpError {
            status_code: Some(500..=599),
            ..
        } => Some("The geocoding service is experiencing server issues. Try again later."),
        SearchError::Timeout { .. } => {
            Some("The request timed out. Increase the timeout or check your network connection.")
        }
        SearchError::ParseError(_) => {
            Some("The response did not match the expected format. Check that the URL points to a compatible API.")
        }
        _ => None,
    };

    match (suggestion, provider_name) {
        (Some(suggestion), _) => suggestion.to_string(),
        (None, "geoapifr") => "Check that api-adresse.data.gouv.fr is reachable and that your search and reverse URLs are correct.".to_string(),
        (None, _) => format!(
            "Check your {provider_name} configuration and make sure your request is valid."
        ),
    }
}
