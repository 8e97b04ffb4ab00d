//! In-memory session value.

use super::identity::{AuthToken, Identity};

/// Either anonymous, or a token together with the identity it belongs to.
///
/// A token never exists without its identity and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    credentials: Option<(AuthToken, Identity)>,
}

impl Session {
    /// The anonymous session.
    pub const fn anonymous() -> Self {
        Self { credentials: None }
    }

    /// An authenticated session.
    pub const fn authenticated(token: AuthToken, identity: Identity) -> Self {
        Self {
            credentials: Some((token, identity)),
        }
    }

    /// Whether a token and identity are present.
    pub const fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Bearer token, when authenticated.
    pub fn token(&self) -> Option<&AuthToken> {
        self.credentials.as_ref().map(|(token, _)| token)
    }

    /// Current user, when authenticated.
    pub fn identity(&self) -> Option<&Identity> {
        self.credentials.as_ref().map(|(_, identity)| identity)
    }
}
