//! HTTP transport for cloud REST API calls
//!
//! [`Transport`] is the only thing the resource layer knows about the
//! network. [`HttpTransport`] is the reqwest-backed implementation.

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Header carrying a pre-issued token
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Request body variants
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Raw(Vec<u8>),
}

/// A request as handed to a [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// JSON body of the request, if it has one
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// A response as returned by a [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Decode the body as JSON; an empty body decodes to `None`
    pub fn json(&self) -> Result<Option<Value>> {
        if self.body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&self.body)?))
    }

    /// Body as lossy UTF-8 text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The network collaborator: one request in, one response out
///
/// Implementations must not interpret status codes; a 404 is a successful
/// transport round trip.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Options for [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub token: Option<String>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            token: None,
        }
    }
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    token: Option<String>,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(options: TransportOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("stacksdk/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .build()?;

        Ok(Self {
            client,
            token: options.token,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!("{} {}", request.method, request.url);

        let mut headers = request.headers;
        if matches!(request.body, RequestBody::Raw(_)) && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
        }

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(headers);

        if let Some(token) = &self.token {
            builder = builder.header(AUTH_TOKEN_HEADER, token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Raw(bytes) => builder.body(bytes),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Format an SDK error for display
/// Security: keeps raw server bodies out of user-facing messages
pub fn format_error(error: &Error) -> String {
    match error {
        Error::ResourceNotFound { .. } => "Resource not found.".to_string(),
        Error::HttpException { status: 401, .. } => {
            "Authentication failed. Check the configured token.".to_string()
        }
        Error::HttpException { status: 403, .. } => "Permission denied.".to_string(),
        Error::HttpException { status: 409, .. } => {
            "Resource conflict. The resource may already exist or be in use.".to_string()
        }
        Error::HttpException { status: 429, .. } => {
            "Rate limit exceeded. Please try again later.".to_string()
        }
        Error::HttpException { status, .. } if *status >= 500 => {
            "Service temporarily unavailable. Please try again.".to_string()
        }
        Error::HttpException { status, .. } => format!("Request failed with HTTP {status}."),
        Error::Transport(_) => {
            "Request failed. Check your network connection and try again.".to_string()
        }
        other => {
            let error_str = other.to_string();
            let sanitized = error_str
                .chars()
                .filter(|c| c.is_ascii_graphic() || *c == ' ')
                .take(80)
                .collect::<String>();

            if sanitized.len() < error_str.len() {
                format!("{}...", sanitized)
            } else {
                sanitized
            }
        }
    }
}
