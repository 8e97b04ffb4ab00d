//! Authenticated identity, its identifier and the bearer token.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::role::{Role, normalize_role_name};

/// Number of digest bytes kept in a token fingerprint.
const FINGERPRINT_BYTES: usize = 8;

/// Validation errors for session primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionValidationError {
    /// A user id was blank.
    #[error("user id must not be empty")]
    EmptyUserId,
    /// A token was blank.
    #[error("session token must not be empty")]
    EmptyToken,
}

/// Identifier of an authenticated user, as issued by the remote service.
///
/// The remote service sends ids either as strings or as integers; both are
/// accepted and kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawId", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(id: impl Into<String>) -> Result<Self, SessionValidationError> {
        let raw = id.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SessionValidationError::EmptyUserId);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<RawId> for UserId {
    type Error = SessionValidationError;

    fn try_from(value: RawId) -> Result<Self, Self::Error> {
        Self::new(value.into_string())
    }
}

/// Identifier as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    Text(String),
    Number(u64),
}

impl RawId {
    pub(crate) fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

/// The authenticated user as described by the remote service.
///
/// Serialised in camelCase; this is also the shape kept in durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    id: UserId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    role_name: String,
    #[serde(default)]
    nickname: String,
}

impl Identity {
    /// Build an identity from its parts.
    pub fn new(id: UserId, role_name: impl Into<String>) -> Self {
        Self {
            id,
            name: String::new(),
            username: String::new(),
            email: String::new(),
            role_name: role_name.into(),
            nickname: String::new(),
        }
    }

    /// Attach display fields.
    #[must_use]
    pub fn with_profile(
        mut self,
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        self.name = name.into();
        self.username = username.into();
        self.email = email.into();
        self
    }

    /// Stable user identifier.
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Login name.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Contact email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Nickname, possibly empty.
    pub fn nickname(&self) -> &str {
        self.nickname.as_str()
    }

    /// Role name as issued by the service.
    pub fn role_name(&self) -> &str {
        self.role_name.as_str()
    }

    /// Normalised role name.
    pub fn role_key(&self) -> String {
        normalize_role_name(&self.role_name)
    }

    /// The known role, if the role name maps to one.
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role_name)
    }

    /// Whether the identity carries the bypass role.
    pub fn is_superadmin(&self) -> bool {
        self.role() == Some(Role::Superadmin)
    }
}

/// Opaque bearer token.
///
/// The raw value is zeroed on drop and never printed; [`fmt::Debug`] shows a
/// fingerprint instead.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(Zeroizing<String>);

impl AuthToken {
    /// Validate and wrap a raw token.
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionValidationError> {
        let raw = Zeroizing::new(raw.into());
        if raw.trim().is_empty() {
            return Err(SessionValidationError::EmptyToken);
        }
        Ok(Self(raw))
    }

    /// Raw token for the `Authorization` header and durable storage.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Short, non-reversible identifier safe to log.
    ///
    /// # Examples
    /// ```
    /// use client::domain::AuthToken;
    ///
    /// let token = AuthToken::new("abc").unwrap();
    /// assert_eq!(token.fingerprint().len(), 16);
    /// ```
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        let digest = hasher.finalize();
        hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthToken").field(&self.fingerprint()).finish()
    }
}
