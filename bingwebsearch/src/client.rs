//! Blocking client for the Bing Web Search v7 endpoint.
//!
//! One call is one GET: parameters and headers are built first (so a missing
//! key fails before anything touches the network), the body is optionally
//! dumped to disk, then parsed. Nothing is retried.
use crate::dump::{self, DumpFormat};
use crate::error::{Result, SearchError};
use crate::params::{RequestHeaders, SearchParams};
use crate::types::SearchResponse;
use bingwebsearch_common::DEFAULT_ENDPOINT;
use bingwebsearch_config::{ParamDefaults, SearchConfig};
use bingwebsearch_http::{HttpClient, RawResponse, RequestOpts};
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;

/// Per-call knobs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    /// Write the raw response here before parsing.
    pub save_json: Option<PathBuf>,
    pub dump_format: DumpFormat,
    /// Overrides the client's total request timeout for this call.
    pub timeout: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct BingWebSearch {
    http: HttpClient,
    endpoint: Url,
    headers: RequestHeaders,
    defaults: ParamDefaults,
    options: SearchOptions,
}

impl BingWebSearch {
    /// Client for the public endpoint with default timeouts. The key is read
    /// from `BING_SEARCH_V7_SUBSCRIPTION_KEY` at call time unless set with
    /// [`Self::with_subscription_key`].
    pub fn new() -> Result<Self> {
        let http = HttpClient::new()?;
        Ok(Self {
            http,
            endpoint: parse_endpoint(DEFAULT_ENDPOINT)?,
            headers: RequestHeaders::default(),
            defaults: ParamDefaults::default(),
            options: SearchOptions::default(),
        })
    }

    /// Build a client from loaded configuration.
    ///
    /// ```
    /// use bingwebsearch::BingWebSearch;
    /// use bingwebsearch_config::SearchConfigLoader;
    ///
    /// let cfg = SearchConfigLoader::new()
    ///     .with_yaml_str("endpoint: http://localhost:9/v7.0/search\ntimeout_secs: 2")
    ///     .load()
    ///     .unwrap();
    /// let client = BingWebSearch::from_config(&cfg).unwrap();
    /// assert_eq!(client.endpoint().as_str(), "http://localhost:9/v7.0/search");
    /// assert_eq!(client.timeout().as_secs(), 2);
    /// ```
    pub fn from_config(cfg: &SearchConfig) -> Result<Self> {
        let http = HttpClient::with_connect_timeout(cfg.connect_timeout())?.with_timeout(cfg.timeout());
        let mut headers = RequestHeaders::from(&cfg.headers);
        headers.subscription_key = cfg.subscription_key.clone();
        Ok(Self {
            http,
            endpoint: parse_endpoint(&cfg.endpoint)?,
            headers,
            defaults: cfg.defaults.clone(),
            options: SearchOptions {
                save_json: cfg.save_json.clone(),
                ..SearchOptions::default()
            },
        })
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }

    pub fn with_subscription_key(mut self, key: impl Into<String>) -> Self {
        self.headers.subscription_key = Some(key.into());
        self
    }

    pub fn with_headers(mut self, headers: RequestHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    /// Options used by [`Self::search`].
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.http.default_timeout
    }

    /// Search with the client's default options.
    pub fn search(&self, params: &SearchParams) -> Result<SearchResponse> {
        self.search_with(params, &self.options)
    }

    /// Search, optionally dumping the raw body, then parse it.
    ///
    /// If the dump cannot be written the call fails with
    /// [`SearchError::Dump`], which still carries the received body.
    pub fn search_with(&self, params: &SearchParams, opts: &SearchOptions) -> Result<SearchResponse> {
        let raw = self.search_raw(params, opts.timeout)?;

        if let Some(path) = &opts.save_json {
            if let Err(source) = dump::write_json(path, &raw.body, opts.dump_format) {
                return Err(SearchError::Dump {
                    path: path.clone(),
                    source,
                    body: raw.body,
                });
            }
        }

        let parsed = SearchResponse::from_slice(&raw.body).inspect_err(|e| {
            tracing::debug!(error=%e, request_id=?raw.request_id, "bing.search.schema_mismatch");
        })?;
        tracing::debug!(
            results = parsed.web_results().len(),
            total_estimated = ?parsed.web_pages.as_ref().and_then(|w| w.total_estimated_matches),
            "bing.search.parsed"
        );
        Ok(parsed)
    }

    /// Issue the request and return the unparsed 2xx response.
    pub fn search_raw(&self, params: &SearchParams, timeout: Option<Duration>) -> Result<RawResponse> {
        let params = params.clone().with_defaults(&self.defaults)?;
        let query = params.to_query()?;
        let headers = self.headers.to_header_map()?;

        tracing::debug!(
            endpoint=%self.endpoint,
            query=%params.query,
            params=query.len(),
            "bing.search.start"
        );

        let raw = self.http.get(
            &self.endpoint,
            RequestOpts {
                timeout,
                headers: Some(headers),
                query: Some(query),
            },
        )?;
        Ok(raw)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| SearchError::Configuration(format!("invalid endpoint `{raw}`: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SearchError::Configuration(format!(
            "endpoint must be http(s), got `{other}`"
        ))),
    }
}
