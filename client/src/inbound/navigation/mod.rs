//! Route table and pre-navigation guard.
//!
//! Routes are declared as `/segment/:param` patterns with an
//! [`crate::domain::AccessPolicy`]. Before each navigation the
//! [`NavigationGuard`] resolves the target path, runs the access engine
//! against the current session and answers with a concrete path to proceed
//! to or redirect to.

mod guard;
mod routes;

pub use guard::{Navigation, NavigationGuard, RedirectPaths};
pub use routes::{ResolvedRoute, Route, RoutePattern, RoutePatternError, RouteTable};
