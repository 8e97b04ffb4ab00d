//! Reqwest-backed remote API adapter.
//!
//! This adapter owns transport details only: URL construction, bearer
//! headers, timeouts, status mapping and decoding of the envelope. Judging
//! the logical status inside the envelope is left to the domain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::domain::RemoteEnvelope;
use crate::domain::ports::{ApiReply, ApiRequest, ErrorBody, Method, RemoteApi, RemoteApiError};

const USER_AGENT: &str = concat!("travel-portal-client/", env!("CARGO_PKG_VERSION"));

/// Remote API adapter rooted at one base URL, e.g. `http://host/api`.
pub struct HttpRemoteApi {
    client: Client,
    base: Url,
}

impl HttpRemoteApi {
    /// Build an adapter, optionally bounding every request by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let builder = Client::builder().user_agent(USER_AGENT);
        let builder = match timeout {
            Some(limit) => builder.timeout(limit),
            None => builder,
        };
        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    /// Base URL requests are resolved against.
    pub const fn base(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn send(&self, request: ApiRequest) -> Result<ApiReply, RemoteApiError> {
        let url = endpoint(&self.base, request.path())?;
        let method = match request.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(token) = request.bearer() {
            builder = builder.bearer_auth(token.expose());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(
            method = request.method().as_str(),
            path = request.path(),
            status = status.as_u16(),
            bytes = body.len(),
            "remote reply received"
        );
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_envelope(status, body.as_ref())
            .map(|envelope| ApiReply::new(status.as_u16(), envelope))
    }
}

/// Join `path` onto the base URL, keeping the base path prefix.
fn endpoint(base: &Url, path: &str) -> Result<Url, RemoteApiError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined)
        .map_err(|error| RemoteApiError::unreachable(format!("invalid URL {joined}: {error}")))
}

fn parse_envelope(
    status: StatusCode,
    body: &[u8],
) -> Result<RemoteEnvelope<Value>, RemoteApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RemoteEnvelope {
            status: status.as_u16(),
            message: String::new(),
            data: None,
        });
    }
    serde_json::from_slice(body).map_err(|error| {
        RemoteApiError::decode(format!(
            "expected a status envelope ({error}): {}",
            body_preview(body)
        ))
    })
}

fn map_transport_error(error: reqwest::Error) -> RemoteApiError {
    if error.is_timeout() {
        RemoteApiError::unreachable(format!("request timed out: {error}"))
    } else {
        RemoteApiError::unreachable(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RemoteApiError {
    RemoteApiError::Rejected {
        status: status.as_u16(),
        body: error_body(body),
    }
}

fn error_body(body: &[u8]) -> Option<ErrorBody> {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        serde_json::from_str::<Value>(trimmed)
            .map_or_else(|_| ErrorBody::Text(trimmed.to_owned()), ErrorBody::Json),
    )
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 120;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
        format!("{preview}...")
    } else {
        compact
    }
}
