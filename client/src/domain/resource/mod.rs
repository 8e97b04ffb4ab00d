//! Generic cached resource store.
//!
//! One [`ResourceStore`] exists per entity kind. The kind plugs in through
//! the [`Resource`] trait: its payload types, its display label and the
//! requests for the five generic operations. Stores share their remote port,
//! session and notifier through a [`StoreContext`].

mod context;
mod policy;
mod store;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ports::ApiRequest;
use super::session::RawId;

pub use context::StoreContext;
pub(crate) use context::{Action, Verb};
pub use policy::{AuthFailurePolicy, SoftFailurePolicy, StorePolicy};
pub(crate) use store::prepare;
pub use store::{ResourceCache, ResourceStore};

/// Validation errors for identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityIdError {
    /// The id was blank.
    #[error("identifier must not be empty")]
    Empty,
    /// The id contains characters that cannot appear in a path segment.
    #[error("identifier must not contain '/', '?', '#' or whitespace")]
    InvalidCharacters,
}

/// Opaque identifier of a remote entity.
///
/// Ids are interpolated into request paths, so separators and whitespace are
/// rejected. Integer ids on the wire are accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawId", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Validate and construct an [`EntityId`].
    ///
    /// # Examples
    /// ```
    /// use client::domain::EntityId;
    ///
    /// assert!(EntityId::new("act-1").is_ok());
    /// assert!(EntityId::new("a/b").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, EntityIdError> {
        let raw = id.into();
        if raw.trim().is_empty() {
            return Err(EntityIdError::Empty);
        }
        if raw
            .chars()
            .any(|ch| matches!(ch, '/' | '?' | '#') || ch.is_whitespace())
        {
            return Err(EntityIdError::InvalidCharacters);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl TryFrom<RawId> for EntityId {
    type Error = EntityIdError;

    fn try_from(value: RawId) -> Result<Self, Self::Error> {
        Self::new(value.into_string())
    }
}

/// Client-side payload validation failures, raised before any request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayloadError {
    /// A required text field was blank.
    #[error("{field} must not be empty")]
    Blank {
        /// Field name.
        field: &'static str,
    },
    /// A numeric field was negative or not finite.
    #[error("{field} must be a non-negative number")]
    Negative {
        /// Field name.
        field: &'static str,
    },
    /// A count was zero.
    #[error("{field} must be greater than zero")]
    NotPositive {
        /// Field name.
        field: &'static str,
    },
    /// A value fell outside its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// A start came after its end.
    #[error("{start} must not be after {end}")]
    Inverted {
        /// Name of the start field.
        start: &'static str,
        /// Name of the end field.
        end: &'static str,
    },
}

/// Payloads that can be checked before they are sent.
pub trait Validate {
    /// Check the payload.
    ///
    /// # Errors
    ///
    /// Returns the first [`PayloadError`] found.
    fn validate(&self) -> Result<(), PayloadError>;
}

/// Payload type for operations an entity kind does not support.
///
/// It has no values, so the corresponding store method cannot be called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unsupported {}

impl Validate for Unsupported {
    fn validate(&self) -> Result<(), PayloadError> {
        match *self {}
    }
}

/// An entity kind managed by a [`ResourceStore`].
pub trait Resource: Clone + DeserializeOwned + Send + Sync + 'static {
    /// Payload for creating an entity.
    type Create: Serialize + Validate + Send + Sync;
    /// Payload for updating an entity.
    type Update: Serialize + Validate + Send + Sync;

    /// Short machine name used in logs.
    const KIND: &'static str;
    /// Display label used in fallback notices.
    const LABEL: &'static str;
    /// Collection path relative to the API base URL.
    const COLLECTION: &'static str;

    /// Identifier of this entity.
    fn id(&self) -> &EntityId;

    /// Request listing the collection.
    fn list_request() -> ApiRequest {
        ApiRequest::get(Self::COLLECTION)
    }

    /// Request fetching one entity.
    fn get_request(id: &EntityId) -> ApiRequest {
        ApiRequest::get(member_path(Self::COLLECTION, id))
    }

    /// Request creating an entity.
    ///
    /// # Errors
    ///
    /// Returns the serialisation error when the payload cannot be encoded.
    fn create_request(payload: &Self::Create) -> Result<ApiRequest, serde_json::Error> {
        ApiRequest::post(Self::COLLECTION).with_json(payload)
    }

    /// Request updating an entity.
    ///
    /// # Errors
    ///
    /// Returns the serialisation error when the payload cannot be encoded.
    fn update_request(
        id: &EntityId,
        payload: &Self::Update,
    ) -> Result<ApiRequest, serde_json::Error> {
        ApiRequest::put(member_path(Self::COLLECTION, id)).with_json(payload)
    }

    /// Request deleting an entity.
    fn delete_request(id: &EntityId) -> ApiRequest {
        ApiRequest::delete(member_path(Self::COLLECTION, id))
    }
}

/// `{collection}/{id}`.
pub fn member_path(collection: &str, id: &EntityId) -> String {
    format!("{collection}/{id}")
}

/// Shared validation helpers for payload types.
pub(crate) mod checks {
    use chrono::NaiveDateTime;

    use super::PayloadError;

    pub(crate) fn non_blank(field: &'static str, value: &str) -> Result<(), PayloadError> {
        if value.trim().is_empty() {
            Err(PayloadError::Blank { field })
        } else {
            Ok(())
        }
    }

    pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), PayloadError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(PayloadError::Negative { field })
        }
    }

    pub(crate) const fn positive(field: &'static str, value: u32) -> Result<(), PayloadError> {
        if value > 0 {
            Ok(())
        } else {
            Err(PayloadError::NotPositive { field })
        }
    }

    pub(crate) fn within(
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), PayloadError> {
        if value.is_finite() && (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(PayloadError::OutOfRange { field, min, max })
        }
    }

    pub(crate) fn ordered(
        (start, start_value): (&'static str, NaiveDateTime),
        (end, end_value): (&'static str, NaiveDateTime),
    ) -> Result<(), PayloadError> {
        if start_value <= end_value {
            Ok(())
        } else {
            Err(PayloadError::Inverted { start, end })
        }
    }
}
