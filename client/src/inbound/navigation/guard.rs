//! The pre-navigation hook.

use std::sync::Arc;

use tracing::debug;

use super::routes::RouteTable;
use crate::domain::{AccessGuard, NavigationDecision, RedirectTarget, SessionStore};

/// Concrete paths behind each [`RedirectTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPaths {
    /// Landing page.
    pub home: String,
    /// Login page.
    pub login: String,
    /// Own profile page.
    pub profile: String,
}

impl Default for RedirectPaths {
    fn default() -> Self {
        Self {
            home: "/".to_owned(),
            login: "/login".to_owned(),
            profile: "/profile".to_owned(),
        }
    }
}

impl RedirectPaths {
    fn path_for(&self, target: RedirectTarget) -> &str {
        match target {
            RedirectTarget::Home => &self.home,
            RedirectTarget::Login => &self.login,
            RedirectTarget::Profile => &self.profile,
        }
    }
}

/// What the router should do with a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Continue to the requested path.
    Proceed,
    /// Go to this path instead.
    RedirectTo(String),
}

/// Checks every navigation against the route table and the live session.
pub struct NavigationGuard {
    table: RouteTable,
    access: AccessGuard,
    session: Arc<SessionStore>,
    paths: RedirectPaths,
}

impl NavigationGuard {
    /// Guard over `table`, reading the session at each navigation.
    pub fn new(
        table: RouteTable,
        access: AccessGuard,
        session: Arc<SessionStore>,
        paths: RedirectPaths,
    ) -> Self {
        Self {
            table,
            access,
            session,
            paths,
        }
    }

    /// Routes being guarded.
    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Decide a navigation to `path`. Paths outside the table proceed.
    pub fn before_each(&self, path: &str) -> Navigation {
        let Some(resolved) = self.table.resolve(path) else {
            debug!(path, "no route declared; proceeding");
            return Navigation::Proceed;
        };
        let session = self.session.snapshot();
        match self
            .access
            .check(&session, resolved.route.policy(), &resolved.params)
        {
            NavigationDecision::Allow => Navigation::Proceed,
            NavigationDecision::Redirect { target, .. } => {
                let destination = self.paths.path_for(target);
                debug!(path, route = resolved.route.name(), destination, "navigation redirected");
                Navigation::RedirectTo(destination.to_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::NoticeLevel;
    use crate::domain::{AccessPolicy, Role};
    use crate::test_support::{Harness, identity};
    use rstest::rstest;

    fn table() -> RouteTable {
        RouteTable::new()
            .route("login", "/login", AccessPolicy::guest_only())
            .and_then(|table| {
                table.route(
                    "statistics",
                    "/statistics",
                    AccessPolicy::authenticated().with_roles([Role::Superadmin]),
                )
            })
            .and_then(|table| {
                table.route(
                    "profile",
                    "/profile/:id",
                    AccessPolicy::authenticated().with_ownership_param("id"),
                )
            })
            .expect("valid routes")
    }

    fn guard(harness: &Harness) -> NavigationGuard {
        NavigationGuard::new(
            table(),
            AccessGuard::new(harness.notifier.clone()),
            harness.session.clone(),
            RedirectPaths::default(),
        )
    }

    #[rstest]
    #[case("/statistics", Navigation::RedirectTo("/login".to_owned()))]
    #[case("/login", Navigation::Proceed)]
    #[case("/somewhere-else", Navigation::Proceed)]
    fn anonymous_navigation(#[case] path: &str, #[case] expected: Navigation) {
        let harness = Harness::anonymous();
        assert_eq!(guard(&harness).before_each(path), expected);
    }

    #[rstest]
    #[case("/statistics", Navigation::RedirectTo("/".to_owned()))]
    #[case("/login", Navigation::RedirectTo("/".to_owned()))]
    #[case("/profile/c1", Navigation::Proceed)]
    #[case("/profile/c2", Navigation::RedirectTo("/profile".to_owned()))]
    fn customer_navigation(#[case] path: &str, #[case] expected: Navigation) {
        let harness = Harness::signed_in("tok", &identity("c1", "Customer"));
        assert_eq!(guard(&harness).before_each(path), expected);
    }

    #[rstest]
    fn guard_reads_the_session_at_navigation_time() {
        let harness = Harness::signed_in("tok", &identity("c1", "Customer"));
        let guard = guard(&harness);
        assert_eq!(guard.before_each("/profile/c1"), Navigation::Proceed);

        harness.session.logout();

        assert_eq!(
            guard.before_each("/profile/c1"),
            Navigation::RedirectTo("/login".to_owned())
        );
        assert!(harness
            .notifier
            .messages(NoticeLevel::Error)
            .contains(&crate::domain::session::SESSION_EXPIRED_MESSAGE.to_owned()));
    }
}
