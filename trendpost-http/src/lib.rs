//! Thin reqwest wrapper shared by the trend scraper and the provider clients.
//!
//! - per-request headers, query params, timeout and one [`Auth`] mechanism
//! - text (HTML) and JSON response helpers
//! - structured `http.*` debug events that never carry secret values
//! - optional raw request/response lines on target `http.raw` when
//!   `TRENDPOST_HTTP_RAW=1`
//!
//! Requests are sent exactly once. A failed call surfaces as an [`HttpError`]
//! and the caller decides what that means for its stage.
//!
//! ```no_run
//! # async fn demo() -> Result<(), trendpost_http::HttpError> {
//! use trendpost_http::{HttpClient, RequestOpts};
//!
//! let client = HttpClient::new("https://trends24.in/united-states/")?;
//! let html = client.get_text("", RequestOpts::default()).await?;
//! # let _ = html;
//! # Ok(()) }
//! ```

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::time::{Duration, Instant};
use thiserror::Error;

const RAW_ENV: &str = "TRENDPOST_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;

/// Query parameter names whose values never reach the logs.
const SECRET_PARAMS: &[&str] = &["key", "api_key", "access_token", "token", "secret"];

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// HTTP status for provider-side failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// How a request proves who it is.
///
/// ```
/// use std::borrow::Cow;
/// use trendpost_http::Auth;
///
/// let gemini = Auth::Query { name: "key", value: Cow::Borrowed("demo") };
/// assert!(matches!(gemini, Auth::Query { name: "key", .. }));
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// A precomputed header, e.g. a signed OAuth `Authorization` value.
    Header { name: HeaderName, value: HeaderValue },
    /// A query parameter, e.g. Gemini `?key=`.
    Query { name: &'a str, value: Cow<'a, str> },
}

impl Auth<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Auth::Header { .. } => "header",
            Auth::Query { .. } => "query",
        }
    }
}

/// Per-request options. Everything defaults to "not set".
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    /// Used when a request does not set its own timeout.
    pub default_timeout: Duration,
}

struct Received {
    bytes: Vec<u8>,
    request_id: String,
}

impl HttpClient {
    /// Client rooted at `base`; relative request paths are joined onto it.
    ///
    /// ```
    /// use std::time::Duration;
    /// use trendpost_http::HttpClient;
    ///
    /// let client = HttpClient::new("https://api.twitter.com/").unwrap();
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.url_for("2/tweets").unwrap().as_str(), "https://api.twitter.com/2/tweets");
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve `path` against the base URL the same way requests do.
    ///
    /// Needed by callers that sign the full request URL.
    pub fn url_for(&self, path: &str) -> Result<Url, HttpError> {
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    /// GET a text body (HTML pages and the like).
    pub async fn get_text(&self, path: &str, opts: RequestOpts<'_>) -> Result<String, HttpError> {
        let got = self.send::<()>(Method::GET, path, None, opts).await?;
        Ok(String::from_utf8_lossy(&got.bytes).into_owned())
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post_json_opts<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let got = self.send(Method::POST, path, Some(body), opts).await?;
        serde_json::from_slice(&got.bytes).map_err(|e| {
            let snippet = snip_body(&got.bytes);
            tracing::warn!(
                req_id = %got.request_id,
                serde_err = %e,
                body_snippet = %snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<Received, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url_for(path)?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(timeout);

        if let Some(headers) = opts.headers {
            rb = rb.headers(headers);
        }

        let mut query = opts.query.unwrap_or_default();
        let auth_kind = opts.auth.as_ref().map_or("none", |a| a.kind());
        match opts.auth {
            Some(Auth::Header { name, value }) => rb = rb.header(name, value),
            Some(Auth::Query { name, value }) => query.push((name, value)),
            None => {}
        }
        if !query.is_empty() {
            let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }

        let body_bytes = match body {
            Some(b) => {
                let bytes = serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?;
                rb = rb
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(bytes.clone());
                Some(bytes)
            }
            None => None,
        };

        let request = rb.build().map_err(|e| HttpError::Build(e.to_string()))?;
        let req_id = local_request_id();
        tracing::debug!(
            req_id = %req_id,
            method = %method,
            url = %redact_url(request.url()),
            timeout_ms = timeout.as_millis() as u64,
            auth_kind,
            has_body = body_bytes.is_some(),
            "http.request.start"
        );
        if raw_enabled() {
            tracing::debug!(
                target: "http.raw",
                %req_id,
                method = %method,
                url = %redact_url(request.url()),
                headers = ?redact_headers(request.headers()),
                body = %body_bytes.as_deref().map(raw_body).unwrap_or_default(),
                "request"
            );
        }

        let started = Instant::now();
        let resp = self.inner.execute(request).await.map_err(|e| {
            tracing::warn!(req_id = %req_id, error = %e, "http.network_error.send");
            HttpError::Network(e.to_string())
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|e| {
            tracing::warn!(req_id = %req_id, error = %e, "http.network_error.body");
            HttpError::Network(e.to_string())
        })?;
        let duration_ms = started.elapsed().as_millis() as u64;

        let provider_id = provider_request_id(&headers);
        tracing::debug!(
            req_id = %req_id,
            %status,
            duration_ms,
            body_len = bytes.len(),
            provider_request_id = %provider_id,
            "http.response"
        );
        if raw_enabled() {
            tracing::debug!(
                target: "http.raw",
                %req_id,
                %status,
                headers = ?redact_headers(&headers),
                body = %raw_body(&bytes),
                "response"
            );
        }

        if status.is_success() {
            return Ok(Received {
                bytes: bytes.to_vec(),
                request_id: req_id,
            });
        }

        let message = error_message(&bytes);
        tracing::warn!(
            req_id = %req_id,
            %status,
            message = %message,
            provider_request_id = %provider_id,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id: provider_id,
        })
    }
}

fn raw_enabled() -> bool {
    matches!(
        std::env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn local_request_id() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("r{nanos:x}")
}

fn provider_request_id(headers: &HeaderMap) -> String {
    ["x-request-id", "x-transaction-id", "x-correlation-id"]
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .unwrap_or("-")
        .to_string()
}

fn is_secret_param(name: &str) -> bool {
    SECRET_PARAMS.contains(&name.to_ascii_lowercase().as_str())
}

/// The URL as it may appear in logs: secret query values replaced.
fn redact_url(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if is_secret_param(&k) {
                "<redacted>".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    let mut shown = url.clone();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(k, v)| {
            let value = if *k == reqwest::header::AUTHORIZATION {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("<binary>").to_string()
            };
            (k.as_str().to_string(), value)
        })
        .collect()
}

/// Best human-readable message in a provider error body.
///
/// Google nests it under `error.message`; X uses `errors[0]` or a top-level
/// `detail`/`title`.
fn error_message(body: &[u8]) -> String {
    const POINTERS: &[&str] = &[
        "/error/message",
        "/errors/0/detail",
        "/errors/0/message",
        "/errors/0/title",
        "/detail",
        "/message",
        "/title",
    ];
    if let Ok(v) = serde_json::from_slice::<Value>(body) {
        for pointer in POINTERS {
            if let Some(msg) = v.pointer(pointer).and_then(Value::as_str) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    snip_body(body)
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn truncated(body: &[u8], max: usize, marker: &str) -> String {
    let mut text = String::from_utf8_lossy(body).into_owned();
    if text.len() > max {
        text.truncate(floor_char_boundary(&text, max));
        text.push_str(marker);
    }
    text
}

fn snip_body(body: &[u8]) -> String {
    truncated(body, SNIPPET_MAX, "...")
}

fn raw_body(body: &[u8]) -> String {
    truncated(body, RAW_MAX_BODY, "…")
}
