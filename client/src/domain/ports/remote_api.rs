//! Driven port for the remote REST service.
//!
//! Adapters own the transport: URL joining, bearer headers, status handling
//! and JSON decoding. The domain only sees [`ApiRequest`] going out and
//! either an [`ApiReply`] wrapping the response envelope or a
//! [`RemoteApiError`] describing what went wrong on the wire.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::define_port_error;
use crate::domain::envelope::RemoteEnvelope;
use crate::domain::session::AuthToken;

/// HTTP verb used by a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read a collection or a single resource.
    Get,
    /// Create a resource or trigger an action.
    Post,
    /// Replace a resource.
    Put,
    /// Remove a resource.
    Delete,
}

impl Method {
    /// Upper-case verb name as sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// A request against the remote service, relative to its base URL.
///
/// # Examples
/// ```
/// use client::domain::ports::{ApiRequest, Method};
///
/// let request = ApiRequest::get("/statistics/revenue")
///     .with_query("year", 2025)
///     .with_optional_query("month", Some(4));
/// assert_eq!(request.method(), Method::Get);
/// assert_eq!(request.query().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    bearer: Option<AuthToken>,
}

impl ApiRequest {
    /// Start a request with the given verb and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Shorthand for a `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Shorthand for a `PUT` request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// Shorthand for a `DELETE` request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Append a query parameter only when a value is present.
    #[must_use]
    pub fn with_optional_query(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(present) => self.with_query(key, present),
            None => self,
        }
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the serialisation error when the payload cannot be encoded.
    pub fn with_json<T>(mut self, payload: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        self.body = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Attach (or clear) the bearer token.
    #[must_use]
    pub fn with_bearer(mut self, token: Option<AuthToken>) -> Self {
        self.bearer = token;
        self
    }

    /// HTTP verb.
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Path relative to the service base URL, starting with `/`.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Query parameters in insertion order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// JSON body, if any.
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Bearer token attached to the request.
    pub const fn bearer(&self) -> Option<&AuthToken> {
        self.bearer.as_ref()
    }
}

/// A decoded reply from a request the transport considered successful.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    /// Transport status code (2xx).
    pub http_status: u16,
    /// The logical envelope carried in the body.
    pub envelope: RemoteEnvelope<Value>,
}

impl ApiReply {
    /// Wrap an envelope received with the given transport status.
    pub const fn new(http_status: u16, envelope: RemoteEnvelope<Value>) -> Self {
        Self {
            http_status,
            envelope,
        }
    }
}

/// Body of a rejected response, kept for message extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    /// The body was not JSON.
    Text(String),
    /// The body parsed as JSON (object, string or otherwise).
    Json(Value),
}

define_port_error! {
    /// Transport-level failures raised by [`RemoteApi`] adapters.
    pub enum RemoteApiError {
        /// The service answered with a non-2xx status.
        Rejected { status: u16, body: Option<ErrorBody> } =>
            "remote service rejected the request with status {status}",
        /// No response was received.
        Unreachable { message: String } => "remote service unreachable: {message}",
        /// A 2xx response carried a body that is not a valid envelope.
        Decode { message: String } => "remote response could not be decoded: {message}",
    }
}

/// Port for issuing requests against the remote REST service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Send one request and return the decoded envelope.
    async fn send(&self, request: ApiRequest) -> Result<ApiReply, RemoteApiError>;
}
