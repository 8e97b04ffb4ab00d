//! Remote response envelope and the rules that turn replies into verdicts.
//!
//! Every response from the remote service carries `{status, message, data}`.
//! The transport status and the logical status are independent: a 200 reply
//! may still report a logical failure. The helpers here decide which one
//! happened and pick the message shown to the user.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::{DomainError, ErrorCode};
use super::ports::{ApiReply, ErrorBody, Notice, RemoteApiError};

/// Text used whenever no usable message can be extracted.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Logical statuses treated as success.
const SUCCESS_STATUSES: [u16; 2] = [200, 201];

/// The `{status, message, data}` wrapper returned by the remote service.
///
/// # Examples
/// ```
/// use client::domain::RemoteEnvelope;
///
/// let envelope: RemoteEnvelope<serde_json::Value> =
///     serde_json::from_str(r#"{"status":200,"message":"ok"}"#).unwrap();
/// assert!(envelope.is_logical_success());
/// assert!(envelope.data.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEnvelope<T> {
    /// Logical status code.
    pub status: u16,
    /// Human-readable outcome text; may be empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    /// Payload, absent on most failures.
    pub data: Option<T>,
}

impl<T> RemoteEnvelope<T> {
    /// Whether the logical status reports success.
    pub fn is_logical_success(&self) -> bool {
        SUCCESS_STATUSES.contains(&self.status)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Outcome of a reply the transport accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeVerdict {
    /// The service reported success.
    Success {
        /// Message to show; never blank.
        message: String,
    },
    /// The transport succeeded but the envelope reported a failure.
    SoftFailure {
        /// Logical status from the envelope.
        status: u16,
        /// Message to show; never blank.
        message: String,
    },
}

impl EnvelopeVerdict {
    /// Judge a reply.
    ///
    /// `accept_created` treats a transport 201 as success regardless of the
    /// envelope status, which is how create endpoints behave. Blank success
    /// messages fall back to `fallback_success`.
    pub fn judge(reply: &ApiReply, accept_created: bool, fallback_success: &str) -> Self {
        let envelope = &reply.envelope;
        let created = accept_created && reply.http_status == 201;
        if envelope.is_logical_success() || created {
            Self::Success {
                message: non_blank(&envelope.message).unwrap_or(fallback_success).to_owned(),
            }
        } else {
            Self::SoftFailure {
                status: envelope.status,
                message: non_blank(&envelope.message)
                    .unwrap_or(GENERIC_FAILURE_MESSAGE)
                    .to_owned(),
            }
        }
    }

    /// Whether this verdict is a success.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The notice shown to the user: the message on success, `"{status}:
    /// {message}"` on a soft failure.
    pub fn notice(&self) -> Notice {
        match self {
            Self::Success { message } => Notice::success(message.clone()),
            Self::SoftFailure { status, message } => Notice::error(format!("{status}: {message}")),
        }
    }

    /// Convert a soft failure into the error reported when soft failures are
    /// rejected. Successes yield `None`.
    pub fn into_error(self) -> Option<DomainError> {
        match self {
            Self::Success { .. } => None,
            Self::SoftFailure { status, message } => Some(soft_failure_error(status, &message)),
        }
    }
}

/// The error reported for a logical failure: classified by its status and
/// carrying the `"{status}: {message}"` text.
pub fn soft_failure_error(status: u16, message: &str) -> DomainError {
    DomainError::new(
        ErrorCode::from_http_status(status),
        format!("{status}: {message}"),
    )
    .with_status(status)
}

/// Extract a message from a rejected response body.
///
/// A non-blank plain string body wins, then a non-blank `message` field, then
/// a non-blank `error` field.
pub fn message_from_body(body: &ErrorBody) -> Option<String> {
    match body {
        ErrorBody::Text(text) => non_blank(text).map(str::to_owned),
        ErrorBody::Json(Value::String(text)) => non_blank(text).map(str::to_owned),
        ErrorBody::Json(Value::Object(fields)) => ["message", "error"]
            .into_iter()
            .filter_map(|key| fields.get(key).and_then(Value::as_str))
            .find_map(non_blank)
            .map(str::to_owned),
        ErrorBody::Json(_) => None,
    }
}

/// Best available user-facing text for a transport failure.
pub fn failure_message(error: &RemoteApiError) -> String {
    match error {
        RemoteApiError::Rejected { body, .. } => body
            .as_ref()
            .and_then(message_from_body)
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_owned()),
        RemoteApiError::Unreachable { message } | RemoteApiError::Decode { message } => {
            non_blank(message)
                .unwrap_or(GENERIC_FAILURE_MESSAGE)
                .to_owned()
        }
    }
}

/// Classify a transport failure and attach its user-facing message.
///
/// # Examples
/// ```
/// use client::domain::{ErrorCode, error_from_transport};
/// use client::domain::ports::{ErrorBody, RemoteApiError};
/// use serde_json::json;
///
/// let failure = RemoteApiError::Rejected {
///     status: 404,
///     body: Some(ErrorBody::Json(json!({"error": "Not Found"}))),
/// };
/// let error = error_from_transport(&failure);
/// assert_eq!(error.code(), ErrorCode::NotFound);
/// assert_eq!(error.message(), "Not Found");
/// ```
pub fn error_from_transport(error: &RemoteApiError) -> DomainError {
    let message = failure_message(error);
    match error {
        RemoteApiError::Rejected { status, .. } => {
            DomainError::new(ErrorCode::from_http_status(*status), message).with_status(*status)
        }
        RemoteApiError::Unreachable { .. } => DomainError::service_unavailable(message),
        RemoteApiError::Decode { .. } => DomainError::invalid_response(message),
    }
}

fn non_blank(text: &str) -> Option<&str> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
