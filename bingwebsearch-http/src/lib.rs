//! Blocking HTTP transport with safe logging for the Bing Web Search client.
//!
//! - Request options: headers, query params, per-request timeout
//! - Never logs the subscription key or other secret headers/query params
//! - Single attempt per call: failures are returned to the caller untouched
//! - Optional *raw* request/response logging via `BINGWEBSEARCH_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```no_run
//! # fn demo() -> Result<(), bingwebsearch_http::HttpError> {
//! use bingwebsearch_http::{HttpClient, RequestOpts};
//!
//! let client = HttpClient::new()?;
//! let url = reqwest::Url::parse("https://api.example.com/v1/items").unwrap();
//! let raw = client.get(&url, RequestOpts::default())?;
//! assert!(raw.status.is_success());
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and (optionally)
//! raw request/response lines on target `http.raw`.

use bingwebsearch_common::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use std::borrow::Cow;
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "BINGWEBSEARCH_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

const SECRET_HEADERS: &[&str] = &["ocp-apim-subscription-key", "authorization"];
const SECRET_QUERY_KEYS: &[&str] = &[
    "access_token",
    "authorization",
    "key",
    "api_key",
    "subscription-key",
    "token",
    "secret",
];
const REQUEST_ID_HEADERS: &[&str] = &["bingapis-traceid", "apim-request-id", "x-request-id"];

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_header(name: &str) -> bool {
    SECRET_HEADERS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(name))
}

fn is_secret_query(key: &str) -> bool {
    SECRET_QUERY_KEYS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(key))
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{method}")];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    let mut shown = url.clone();
    let pairs = redact_query(url);
    if pairs.is_empty() {
        shown.set_query(None);
    } else {
        shown.query_pairs_mut().clear().extend_pairs(pairs);
    }
    parts.push(format!("'{}'", shown.as_str()));
    parts.join(" ")
}

fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if is_secret_header(&key) {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("<binary>").to_string()
            };
            (key, val)
        })
        .collect()
}

fn redact_query(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .map(|(k, v)| {
            let val = if is_secret_query(&k) {
                "<redacted>".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Request options & response
// ==============================

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use bingwebsearch_http::RequestOpts;
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     query: Some(vec![("q", Cow::Borrowed("rust"))]),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.headers.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

/// A successful (2xx) response, body fully read.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// Server-side trace id, when the API sent one.
    pub request_id: Option<String>,
    pub elapsed: Duration,
}


// ==============================
// Client
// ==============================

#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client with the default connect timeout.
    ///
    /// ```no_run
    /// use bingwebsearch_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new()?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new() -> Result<Self, HttpError> {
        Self::with_connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
    }

    pub fn with_connect_timeout(connect: Duration) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(connect)
            .user_agent(default_user_agent())
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Override the total request timeout used when [`RequestOpts::timeout`] is unset.
    ///
    /// ```no_run
    /// use bingwebsearch_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new()?.with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Issue one blocking GET and read the whole body.
    ///
    /// Non-2xx statuses become [`HttpError::Api`] with the best message we can
    /// pull out of the error body.
    pub fn get(&self, url: &Url, opts: RequestOpts<'_>) -> Result<RawResponse, HttpError> {
        self.execute(Method::GET, url, opts)
    }

    fn execute(
        &self,
        method: Method,
        url: &Url,
        opts: RequestOpts<'_>,
    ) -> Result<RawResponse, HttpError> {
        let timeout = opts.timeout.unwrap_or(self.default_timeout);

        // Resolve the final URL up front so logs show exactly what is sent.
        let mut full_url = url.clone();
        if let Some(q) = &opts.query {
            if !q.is_empty() {
                full_url
                    .query_pairs_mut()
                    .extend_pairs(q.iter().map(|(k, v)| (*k, v.as_ref())));
            }
        }

        let mut rb = self
            .inner
            .request(method.clone(), full_url.clone())
            .timeout(timeout);
        let headers = opts.headers.unwrap_or_default();
        rb = rb.headers(headers.clone());

        tracing::debug!(
            method=%method,
            host_path=%format!("{}{}", full_url.host_str().unwrap_or("-"), full_url.path()),
            query=?redact_query(&full_url),
            headers=?redact_headers(&headers),
            timeout_ms=timeout.as_millis() as u64,
            "http.request.start"
        );
        if raw_enabled() {
            let curl = make_curl(&method, &full_url, &headers);
            tracing::debug!(target: "http.raw", %curl, "request");
        }

        // ----- Send -----
        let t0 = Instant::now();
        let resp = rb.send().map_err(|err| classify(err, timeout, "send"))?;
        let status = resp.status();
        let resp_headers = resp.headers().clone();
        let body = resp
            .bytes()
            .map_err(|err| classify(err, timeout, "body"))?
            .to_vec();
        let elapsed = t0.elapsed();

        let request_id = find_request_id(&resp_headers);
        tracing::debug!(
            %status,
            duration_ms=elapsed.as_millis() as u64,
            body_len=body.len(),
            request_id=%request_id.as_deref().unwrap_or("-"),
            "http.response.headers"
        );

        if raw_enabled() {
            let truncated = body.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&body[..body.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target: "http.raw",
                status=%status,
                duration_ms=elapsed.as_millis() as u64,
                headers=?redact_headers(&resp_headers),
                body=%text,
                truncated
            );
        }

        let snippet = snip_body(&body);
        tracing::trace!(body_snippet=%snippet, "http.response.body_snippet");

        if status.is_success() {
            return Ok(RawResponse {
                status,
                headers: resp_headers,
                body,
                request_id,
                elapsed,
            });
        }

        let message = extract_error_message(&body);
        let request_id = request_id.unwrap_or_else(|| "-".to_string());
        tracing::debug!(
            %status,
            message=%message,
            request_id=%request_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id,
        })
    }
}

// ==============================
// Helpers
// ==============================

fn default_user_agent() -> String {
    format!("bingwebsearch/{}", env!("CARGO_PKG_VERSION"))
}

fn classify(err: reqwest::Error, timeout: Duration, stage: &'static str) -> HttpError {
    if err.is_timeout() {
        tracing::debug!(stage, timeout_ms = timeout.as_millis() as u64, "http.timeout");
        return HttpError::Timeout(timeout);
    }
    let message = err.to_string();
    tracing::debug!(stage, message = %message, "http.network_error");
    if err.is_builder() {
        HttpError::Build(message)
    } else {
        HttpError::Network(message)
    }
}

fn find_request_id(h: &HeaderMap) -> Option<String> {
    REQUEST_ID_HEADERS
        .iter()
        .find_map(|name| h.get(*name))
        .and_then(|v: &HeaderValue| v.to_str().ok())
        .map(str::to_string)
}

/// Pull a human-readable message out of an error body.
///
/// Understands the Bing error envelope, the API-management gateway envelope,
/// and plain `{"message": ...}` bodies; anything else is returned as a snippet.
fn extract_error_message(body: &[u8]) -> String {
    // Bing: {"_type":"ErrorResponse","errors":[{"code":..,"subCode":..,"message":..,"parameter":..}]}
    #[derive(Deserialize)]
    struct BingErrors {
        errors: Vec<BingError>,
    }
    #[derive(Deserialize)]
    struct BingError {
        #[serde(default)]
        code: String,
        #[serde(default)]
        message: String,
        #[serde(default)]
        parameter: Option<String>,
    }

    // Gateway: {"error":{"code":"401","message":"Access denied ..."}}
    #[derive(Deserialize)]
    struct GatewayEnv {
        error: GatewayDetail,
    }
    #[derive(Deserialize)]
    struct GatewayDetail {
        #[serde(default)]
        code: String,
        #[serde(default)]
        message: String,
    }

    #[derive(Deserialize)]
    struct Msg {
        message: String,
    }

    if let Ok(env) = serde_json::from_slice::<BingErrors>(body) {
        if let Some(first) = env.errors.into_iter().next() {
            let mut out = match (first.code.is_empty(), first.message.is_empty()) {
                (false, false) => format!("{}: {}", first.code, first.message),
                (true, false) => first.message,
                (false, true) => first.code,
                (true, true) => String::new(),
            };
            if let Some(param) = first.parameter.filter(|p| !p.is_empty()) {
                out.push_str(&format!(" (parameter: {param})"));
            }
            if !out.is_empty() {
                return out;
            }
        }
    }
    if let Ok(env) = serde_json::from_slice::<GatewayEnv>(body) {
        if !env.error.message.is_empty() {
            return if env.error.code.is_empty() {
                env.error.message
            } else {
                format!("{}: {}", env.error.code, env.error.message)
            };
        }
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.message.is_empty() {
            return m.message;
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}
