//! Access policies and the navigation decision engine.
//!
//! Routes declare an [`AccessPolicy`]. [`decide`] is a pure function of the
//! policy, the session and the route parameters; [`AccessGuard`] wraps it and
//! emits the notice that goes with a refusal.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use super::ports::{Notice, Notifier};
use super::session::{Role, SESSION_EXPIRED_MESSAGE, Session};

/// Named route parameters, e.g. `{"id": "u1"}` for `/profile/:id`.
pub type RouteParams = BTreeMap<String, String>;

/// Access requirements attached to a route.
///
/// # Examples
/// ```
/// use client::domain::{AccessPolicy, Role};
///
/// let policy = AccessPolicy::authenticated()
///     .with_roles([Role::TourPackageVendor])
///     .with_ownership_param("id");
/// assert!(policy.requires_session());
/// assert_eq!(policy.ownership_param(), Some("id"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessPolicy {
    requires_session: bool,
    guest_only: bool,
    allowed_roles: Option<BTreeSet<Role>>,
    ownership_param: Option<String>,
}

impl AccessPolicy {
    /// Open to everyone.
    pub fn public() -> Self {
        Self::default()
    }

    /// Open to anonymous visitors only; signed-in users are sent home.
    pub fn guest_only() -> Self {
        Self {
            guest_only: true,
            ..Self::default()
        }
    }

    /// Requires a session.
    pub fn authenticated() -> Self {
        Self {
            requires_session: true,
            ..Self::default()
        }
    }

    /// Restrict to the given roles. Implies a session.
    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.requires_session = true;
        self.allowed_roles = Some(roles.into_iter().collect());
        self
    }

    /// Require the named route parameter to equal the current user's id.
    /// Implies a session.
    #[must_use]
    pub fn with_ownership_param(mut self, name: impl Into<String>) -> Self {
        self.requires_session = true;
        self.ownership_param = Some(name.into());
        self
    }

    /// Whether a session is required.
    pub const fn requires_session(&self) -> bool {
        self.requires_session
    }

    /// Whether signed-in users are turned away.
    pub const fn is_guest_only(&self) -> bool {
        self.guest_only
    }

    /// Roles allowed through, if restricted.
    pub const fn allowed_roles(&self) -> Option<&BTreeSet<Role>> {
        self.allowed_roles.as_ref()
    }

    /// Route parameter that must match the current user's id.
    pub fn ownership_param(&self) -> Option<&str> {
        self.ownership_param.as_deref()
    }
}

/// Where a refused navigation is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedirectTarget {
    /// The landing page.
    Home,
    /// The login page.
    Login,
    /// The current user's own profile.
    Profile,
}

/// Why a navigation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialReason {
    /// A signed-in user tried to open a guest-only page.
    AlreadyAuthenticated,
    /// The route needs a session and there is none.
    SessionMissing,
    /// The user's role is not among the allowed roles.
    RoleNotAllowed,
    /// The route parameter names another user.
    ForeignProfile,
}

impl DenialReason {
    /// Notice shown for this refusal, if any.
    pub fn notice(self) -> Option<Notice> {
        match self {
            Self::AlreadyAuthenticated => None,
            Self::SessionMissing => Some(Notice::error(SESSION_EXPIRED_MESSAGE)),
            Self::RoleNotAllowed => Some(Notice::error(
                "You are not authorized to access this page",
            )),
            Self::ForeignProfile => Some(Notice::error(
                "You can only view your own profile",
            )),
        }
    }
}

/// Outcome of a navigation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationDecision {
    /// Let the navigation through.
    Allow,
    /// Send the user elsewhere.
    Redirect {
        /// Destination.
        target: RedirectTarget,
        /// Cause, used to pick the notice.
        reason: DenialReason,
    },
}

impl NavigationDecision {
    const fn redirect(target: RedirectTarget, reason: DenialReason) -> Self {
        Self::Redirect { target, reason }
    }
}

/// Decide whether `session` may open a route guarded by `policy`.
///
/// Checks run in order: guest-only pages, session presence, role membership
/// (bypassed by superadmin), then ownership (also bypassed by superadmin). A
/// missing ownership parameter counts as a mismatch.
pub fn decide(
    session: &Session,
    policy: &AccessPolicy,
    params: &RouteParams,
) -> NavigationDecision {
    let identity = session.identity();
    if !policy.requires_session() {
        return if policy.is_guest_only() && identity.is_some() {
            NavigationDecision::redirect(RedirectTarget::Home, DenialReason::AlreadyAuthenticated)
        } else {
            NavigationDecision::Allow
        };
    }

    let Some(identity) = identity else {
        return NavigationDecision::redirect(RedirectTarget::Login, DenialReason::SessionMissing);
    };
    if identity.is_superadmin() {
        return NavigationDecision::Allow;
    }

    if let Some(allowed) = policy.allowed_roles() {
        let permitted = identity.role().is_some_and(|role| allowed.contains(&role));
        if !permitted {
            return NavigationDecision::redirect(RedirectTarget::Home, DenialReason::RoleNotAllowed);
        }
    }

    if let Some(param) = policy.ownership_param() {
        let owns = params
            .get(param)
            .is_some_and(|value| value == identity.id().as_ref());
        if !owns {
            return NavigationDecision::redirect(
                RedirectTarget::Profile,
                DenialReason::ForeignProfile,
            );
        }
    }

    NavigationDecision::Allow
}

/// Runs [`decide`] and surfaces refusals to the user.
#[derive(Clone)]
pub struct AccessGuard {
    notifier: Arc<dyn Notifier>,
}

impl AccessGuard {
    /// Guard emitting notices through `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Decide and, on refusal, notify.
    pub fn check(
        &self,
        session: &Session,
        policy: &AccessPolicy,
        params: &RouteParams,
    ) -> NavigationDecision {
        let decision = decide(session, policy, params);
        if let NavigationDecision::Redirect { target, reason } = decision {
            debug!(?target, ?reason, "navigation refused");
            if let Some(notice) = reason.notice() {
                self.notifier.notify(notice);
            }
        }
        decision
    }
}
