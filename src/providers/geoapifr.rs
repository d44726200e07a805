//! French national address API provider (api-adresse.data.gouv.fr)
//!
//! The API answers with a GeoJSON `FeatureCollection`. It rejects queries
//! shorter than 3 or longer than 200 characters with a 400, so `search`
//! short-circuits the former and truncates the latter.

use crate::{
    engine::HttpSearch,
    error::{Result, SearchError, DEFAULT_TIMEOUT_MS},
    types::{
        EndpointArgument, GeoProvider, ParseArgument, ProviderConfig, Query, QueryParams,
        RequestType, ReverseOptions, SearchOptions, SearchResult,
    },
    utils::{debug, http::build_url},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use url::Url;

pub const DEFAULT_HOST: &str = "https://api-adresse.data.gouv.fr";

/// Shortest query the API accepts
pub const MIN_QUERY_LENGTH: usize = 3;
/// Longest query the API accepts
pub const MAX_QUERY_LENGTH: usize = 200;

/// Top-level response of both `/search` and `/reverse`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeoApiFrResponse {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    pub features: Vec<GeoApiFrFeature>,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default)]
    pub licence: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    /// Sent as a number by current deployments and as a string by older ones
    #[serde(default)]
    pub limit: Option<Value>,
}

/// One candidate address, kept exactly as the API sent it.
///
/// Accessors read the GeoJSON members without copying or normalizing them, so
/// serializing a feature gives back the received object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct GeoApiFrFeature(Map<String, Value>);

impl GeoApiFrFeature {
    /// The received JSON object
    pub fn as_json(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_json(self) -> Map<String, Value> {
        self.0
    }

    /// GeoJSON `type`, normally `Feature`
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// `[longitude, latitude]` from `geometry.coordinates`
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let coordinates = self.0.get("geometry")?.get("coordinates")?.as_array()?;
        match coordinates.as_slice() {
            [x, y, ..] => Some((x.as_f64()?, y.as_f64()?)),
            _ => None,
        }
    }

    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.0.get("properties").and_then(Value::as_object)
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties()?.get(key)
    }

    fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(Value::as_str)
    }

    pub fn label(&self) -> Option<&str> {
        self.property_str("label")
    }

    pub fn score(&self) -> Option<f64> {
        self.property("score").and_then(Value::as_f64)
    }

    /// Match kind: `housenumber`, `street`, `locality` or `municipality`
    pub fn result_type(&self) -> Option<&str> {
        self.property_str("type")
    }

    pub fn postcode(&self) -> Option<&str> {
        self.property_str("postcode")
    }

    pub fn city(&self) -> Option<&str> {
        self.property_str("city")
    }

    /// Department and region, e.g. `92, Hauts-de-Seine, Île-de-France`
    pub fn context(&self) -> Option<&str> {
        self.property_str("context")
    }
}

/// GeoApiFr configuration
#[derive(Debug, Clone)]
pub struct GeoApiFrConfig {
    /// Forward search endpoint
    pub search_url: String,
    /// Reverse lookup endpoint
    pub reverse_url: String,
    /// Parameters sent with every request, e.g. `limit` or `postcode`
    pub params: QueryParams,
    /// HTTP timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for GeoApiFrConfig {
    fn default() -> Self {
        Self {
            search_url: format!("{DEFAULT_HOST}/search"),
            reverse_url: format!("{DEFAULT_HOST}/reverse"),
            params: QueryParams::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl GeoApiFrConfig {
    pub fn with_search_url(mut self, search_url: &str) -> Self {
        self.search_url = search_url.to_string();
        self
    }

    pub fn with_reverse_url(mut self, reverse_url: &str) -> Self {
        self.reverse_url = reverse_url.to_string();
        self
    }

    /// Add a parameter sent with every request
    pub fn with_param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(SearchError::ConfigError(format!("GeoApiFr {name} is required")));
    }
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| SearchError::ConfigError(format!("GeoApiFr {name} is invalid: {e}")))
}

impl ProviderConfig for GeoApiFrConfig {
    fn validate(&self) -> Result<()> {
        validate_url("search URL", &self.search_url)?;
        validate_url("reverse URL", &self.reverse_url)?;
        if self.timeout_ms == 0 {
            return Err(SearchError::ConfigError(
                "GeoApiFr timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Apply the API's query length limits.
///
/// Returns `None` when the query is too short to send, otherwise the query
/// cut to at most [`MAX_QUERY_LENGTH`] characters.
pub fn guard_query(query: &str) -> Option<Cow<'_, str>> {
    let length = query.chars().count();

    if length < MIN_QUERY_LENGTH {
        None
    } else if length > MAX_QUERY_LENGTH {
        Some(Cow::Owned(query.chars().take(MAX_QUERY_LENGTH).collect()))
    } else {
        Some(Cow::Borrowed(query))
    }
}

/// api-adresse.data.gouv.fr provider
#[derive(Debug, Clone)]
pub struct GeoApiFrProvider {
    config: GeoApiFrConfig,
    engine: HttpSearch,
}

impl GeoApiFrProvider {
    /// Create a provider targeting the public API
    pub fn new() -> Result<Self> {
        Self::with_config(GeoApiFrConfig::default())
    }

    /// Create a provider with custom configuration
    pub fn with_config(config: GeoApiFrConfig) -> Result<Self> {
        config.validate()?;
        let engine = HttpSearch::with_timeout(config.timeout_ms)?;

        Ok(Self { config, engine })
    }

    pub fn search_url(&self) -> &str {
        &self.config.search_url
    }

    pub fn reverse_url(&self) -> &str {
        &self.config.reverse_url
    }

    /// Reverse lookup: nearest addresses to a point
    pub async fn reverse(
        &self,
        options: &ReverseOptions,
    ) -> Result<Vec<SearchResult<GeoApiFrFeature>>> {
        self.engine.reverse(self, options).await
    }
}

#[async_trait::async_trait]
impl GeoProvider for GeoApiFrProvider {
    type Response = GeoApiFrResponse;
    type Raw = GeoApiFrFeature;

    fn name(&self) -> &str {
        "geoapifr"
    }

    fn endpoint(&self, args: EndpointArgument<'_>) -> Result<String> {
        let mut params = self.config.params.clone();
        match args.query {
            Query::Text(q) => {
                params.insert("q".to_string(), q.clone());
            }
            Query::Params(query) => params.extend(query.clone()),
        }

        match args.request_type {
            RequestType::Reverse => build_url(&self.config.reverse_url, &params),
            RequestType::Search => build_url(&self.config.search_url, &params),
        }
    }

    fn parse(
        &self,
        result: ParseArgument<GeoApiFrResponse>,
    ) -> Result<Vec<SearchResult<GeoApiFrFeature>>> {
        result
            .data
            .features
            .into_iter()
            .map(|feature| {
                let label = feature
                    .label()
                    .ok_or_else(|| {
                        SearchError::ParseError("feature has no string properties.label".to_string())
                    })?
                    .to_string();
                let (x, y) = feature.coordinates().ok_or_else(|| {
                    SearchError::ParseError(format!(
                        "feature '{label}' needs at least 2 numeric geometry.coordinates"
                    ))
                })?;

                Ok(SearchResult {
                    x,
                    y,
                    label,
                    bounds: None,
                    raw: feature,
                })
            })
            .collect()
    }

    async fn search(
        &self,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult<GeoApiFrFeature>>> {
        let Some(query) = guard_query(&options.query) else {
            debug::log(
                &options.debug,
                "Query too short, skipping request",
                &options.query,
            );
            return Ok(Vec::new());
        };

        match query {
            Cow::Borrowed(_) => self.engine.search(self, options).await,
            Cow::Owned(truncated) => {
                debug::log(
                    &options.debug,
                    "Query truncated",
                    &format!("{MAX_QUERY_LENGTH} characters"),
                );
                let options = SearchOptions {
                    query: truncated,
                    ..options.clone()
                };
                self.engine.search(self, &options).await
            }
        }
    }

    fn config(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();
        config.insert("search_url".to_string(), self.config.search_url.clone());
        config.insert("reverse_url".to_string(), self.config.reverse_url.clone());
        config.insert("timeout_ms".to_string(), self.config.timeout_ms.to_string());
        for (key, value) in &self.config.params {
            config.insert(format!("params.{key}"), value.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::query_params;
    use serde_json::json;

    fn paris_response() -> GeoApiFrResponse {
        serde_json::from_value(json!({
            "type": "FeatureCollection",
            "version": "draft",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [2.35, 48.85] },
                "properties": {
                    "label": "Paris",
                    "score": 0.97,
                    "importance": 0.67,
                    "id": "75056",
                    "type": "municipality",
                    "name": "Paris",
                    "postcode": "75001",
                    "citycode": "75056",
                    "x": 652089.7,
                    "y": 6862305.26,
                    "population": 2133111,
                    "city": "Paris",
                    "context": "75, Paris, Île-de-France"
                }
            }],
            "attribution": "BAN",
            "licence": "ETALAB-2.0",
            "query": "paris",
            "limit": 5
        }))
        .unwrap()
    }

    fn minimal_feature<const N: usize>(label: &str, coordinates: [f64; N]) -> serde_json::Value {
        json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": coordinates.to_vec() },
            "properties": { "label": label }
        })
    }

    #[test]
    fn test_default_urls() {
        let provider = GeoApiFrProvider::new().unwrap();
        assert_eq!(provider.search_url(), "https://api-adresse.data.gouv.fr/search");
        assert_eq!(provider.reverse_url(), "https://api-adresse.data.gouv.fr/reverse");
    }

    #[test]
    fn test_endpoint_wraps_text_query() {
        let provider = GeoApiFrProvider::new().unwrap();
        let query = Query::from("10 avenue");
        let url = provider
            .endpoint(EndpointArgument {
                query: &query,
                request_type: RequestType::Search,
            })
            .unwrap();

        assert!(url.starts_with("https://api-adresse.data.gouv.fr/search?"));
        let mut expected = QueryParams::new();
        expected.insert("q".to_string(), "10 avenue".to_string());
        assert_eq!(query_params(&url).unwrap(), expected);
    }

    #[test]
    fn test_endpoint_switches_on_request_type() {
        let provider = GeoApiFrProvider::new().unwrap();
        let mut params = QueryParams::new();
        params.insert("lat".to_string(), "48.85".to_string());
        params.insert("lon".to_string(), "2.35".to_string());
        let query = Query::Params(params.clone());

        let reverse = provider
            .endpoint(EndpointArgument {
                query: &query,
                request_type: RequestType::Reverse,
            })
            .unwrap();
        assert!(reverse.starts_with("https://api-adresse.data.gouv.fr/reverse?"));
        assert_eq!(query_params(&reverse).unwrap(), params);

        let search = provider
            .endpoint(EndpointArgument {
                query: &query,
                request_type: RequestType::default(),
            })
            .unwrap();
        assert!(search.starts_with("https://api-adresse.data.gouv.fr/search?"));
    }

    #[test]
    fn test_endpoint_uses_overridden_urls() {
        let config = GeoApiFrConfig::default()
            .with_search_url("http://localhost:7878/geocode")
            .with_reverse_url("http://localhost:7878/rev");
        let provider = GeoApiFrProvider::with_config(config).unwrap();
        let query = Query::from("rue de la paix");

        let search = provider
            .endpoint(EndpointArgument {
                query: &query,
                request_type: RequestType::Search,
            })
            .unwrap();
        let reverse = provider
            .endpoint(EndpointArgument {
                query: &query,
                request_type: RequestType::Reverse,
            })
            .unwrap();

        assert!(search.starts_with("http://localhost:7878/geocode?"));
        assert!(reverse.starts_with("http://localhost:7878/rev?"));
    }

    #[test]
    fn test_endpoint_merges_default_params() {
        let config = GeoApiFrConfig::default()
            .with_param("limit", 5)
            .with_param("q", "ignored");
        let provider = GeoApiFrProvider::with_config(config).unwrap();
        let query = Query::from("8 bd du port");

        let url = provider
            .endpoint(EndpointArgument {
                query: &query,
                request_type: RequestType::Search,
            })
            .unwrap();
        let params = query_params(&url).unwrap();

        assert_eq!(params.get("limit").map(String::as_str), Some("5"));
        assert_eq!(params.get("q").map(String::as_str), Some("8 bd du port"));
    }

    #[test]
    fn test_parse_maps_feature() {
        let provider = GeoApiFrProvider::new().unwrap();
        let response = paris_response();
        let feature = response.features[0].clone();

        let results = provider.parse(ParseArgument { data: response }).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].x, 2.35);
        assert_eq!(results[0].y, 48.85);
        assert_eq!(results[0].label, "Paris");
        assert!(results[0].bounds.is_none());
        assert_eq!(results[0].raw, feature);
        assert_eq!(results[0].raw.property("population"), Some(&json!(2133111)));
        assert_eq!(results[0].raw.result_type(), Some("municipality"));
        assert_eq!(results[0].raw.score(), Some(0.97));
    }

    #[test]
    fn test_raw_is_received_feature_verbatim() {
        let provider = GeoApiFrProvider::new().unwrap();
        let received = json!({
            "type": "Feature",
            "bbox": [2.22, 48.81, 2.47, 48.9],
            "id": "75056",
            "geometry": { "type": "Point", "coordinates": [2, 48], "crs": "EPSG:4326" },
            "properties": {
                "label": "Paris",
                "x": 652089,
                "housenumber": null,
                "importance": 0.67
            }
        });
        let response: GeoApiFrResponse =
            serde_json::from_value(json!({ "features": [received.clone()] })).unwrap();

        let results = provider.parse(ParseArgument { data: response }).unwrap();

        assert_eq!((results[0].x, results[0].y), (2.0, 48.0));
        assert_eq!(serde_json::to_value(&results[0].raw).unwrap(), received);
        assert_eq!(
            serde_json::to_string(&results[0].raw).unwrap(),
            serde_json::to_string(&received).unwrap()
        );
    }

    #[test]
    fn test_parse_empty_features() {
        let provider = GeoApiFrProvider::new().unwrap();
        let response: GeoApiFrResponse =
            serde_json::from_value(json!({ "type": "FeatureCollection", "features": [] }))
                .unwrap();

        let results = provider.parse(ParseArgument { data: response }).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_parse_keeps_order() {
        let provider = GeoApiFrProvider::new().unwrap();
        let response: GeoApiFrResponse = serde_json::from_value(json!({
            "features": [
                minimal_feature("Paris", [2.35, 48.85]),
                minimal_feature("Paris 2e Arrondissement", [2.34, 48.87])
            ]
        }))
        .unwrap();

        let results = provider.parse(ParseArgument { data: response }).unwrap();
        let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["Paris", "Paris 2e Arrondissement"]);
        assert_eq!(results[1].x, 2.34);
    }

    #[test]
    fn test_decoding_tolerates_missing_type_members() {
        let provider = GeoApiFrProvider::new().unwrap();
        let response: GeoApiFrResponse = serde_json::from_value(json!({
            "features": [{
                "geometry": { "coordinates": [2.35, 48.85] },
                "properties": { "label": "Paris" }
            }]
        }))
        .unwrap();
        assert!(response.kind.is_none());

        let results = provider.parse(ParseArgument { data: response }).unwrap();
        assert_eq!(results[0].label, "Paris");
        assert!(results[0].raw.kind().is_none());
    }

    #[test]
    fn test_decoding_accepts_limit_as_string_or_number() {
        let text: GeoApiFrResponse =
            serde_json::from_value(json!({ "limit": "5", "features": [] })).unwrap();
        assert_eq!(text.limit, Some(json!("5")));

        let number: GeoApiFrResponse =
            serde_json::from_value(json!({ "limit": 5, "features": [] })).unwrap();
        assert_eq!(number.limit, Some(json!(5)));
    }

    #[test]
    fn test_parse_rejects_short_coordinates() {
        let provider = GeoApiFrProvider::new().unwrap();
        let response: GeoApiFrResponse = serde_json::from_value(json!({
            "features": [minimal_feature("Paris", [2.35])]
        }))
        .unwrap();

        let result = provider.parse(ParseArgument { data: response });
        assert!(matches!(result, Err(SearchError::ParseError(_))));
    }

    #[test]
    fn test_parse_rejects_missing_label() {
        let provider = GeoApiFrProvider::new().unwrap();
        let response: GeoApiFrResponse = serde_json::from_value(json!({
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [2.35, 48.85] },
                "properties": { "city": "Paris" }
            }]
        }))
        .unwrap();

        let result = provider.parse(ParseArgument { data: response });
        assert!(matches!(result, Err(SearchError::ParseError(msg)) if msg.contains("label")));
    }

    #[test]
    fn test_guard_query() {
        assert!(guard_query("").is_none());
        assert!(guard_query("ab").is_none());
        assert!(matches!(guard_query("abc"), Some(Cow::Borrowed("abc"))));

        let exact = "a".repeat(MAX_QUERY_LENGTH);
        assert!(matches!(guard_query(&exact), Some(Cow::Borrowed(_))));

        let long = format!("{}{}", "b".repeat(MAX_QUERY_LENGTH), "tail");
        let guarded = guard_query(&long).unwrap();
        assert_eq!(guarded, "b".repeat(MAX_QUERY_LENGTH));
    }

    #[test]
    fn test_guard_query_counts_characters() {
        // Two characters, four bytes
        assert!(guard_query("éé").is_none());

        let long = "é".repeat(MAX_QUERY_LENGTH + 1);
        let guarded = guard_query(&long).unwrap();
        assert_eq!(guarded.chars().count(), MAX_QUERY_LENGTH);
    }

    #[tokio::test]
    async fn test_short_query_returns_empty() {
        let provider = GeoApiFrProvider::new().unwrap();
        for query in ["", "a", "ab"] {
            let results = provider.search(&SearchOptions::new(query)).await.unwrap();
            assert!(results.is_empty());
        }
    }

    #[test]
    fn test_config_validation() {
        let empty = GeoApiFrConfig::default().with_search_url("");
        assert!(matches!(
            GeoApiFrProvider::with_config(empty),
            Err(SearchError::ConfigError(_))
        ));

        let relative = GeoApiFrConfig::default().with_reverse_url("/reverse");
        assert!(matches!(
            GeoApiFrProvider::with_config(relative),
            Err(SearchError::ConfigError(_))
        ));

        let zero_timeout = GeoApiFrConfig::default().with_timeout(0);
        assert!(GeoApiFrProvider::with_config(zero_timeout).is_err());
    }

    #[test]
    fn test_config_map() {
        let provider =
            GeoApiFrProvider::with_config(GeoApiFrConfig::default().with_param("limit", 3))
                .unwrap();
        let config = provider.config();
        assert_eq!(
            config.get("search_url").map(String::as_str),
            Some("https://api-adresse.data.gouv.fr/search")
        );
        assert_eq!(config.get("params.limit").map(String::as_str), Some("3"));
        assert_eq!(provider.name(), "geoapifr");
    }
}
