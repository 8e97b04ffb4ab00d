//! Path patterns and the route table.

use std::fmt;

use crate::domain::{AccessPolicy, RouteParams};

/// Errors raised while parsing a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutePatternError {
    /// Patterns must be absolute.
    #[error("route pattern `{0}` must start with '/'")]
    NotAbsolute(String),
    /// A `:` segment had no name.
    #[error("route pattern `{0}` has an unnamed parameter")]
    UnnamedParameter(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed `/segment/:param` pattern.
///
/// # Examples
/// ```
/// use client::inbound::navigation::RoutePattern;
///
/// let pattern = RoutePattern::parse("/profile/:id").expect("valid pattern");
/// let params = pattern.matches("/profile/u1").expect("path matches");
/// assert_eq!(params.get("id").map(String::as_str), Some("u1"));
/// assert!(pattern.matches("/profile").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`RoutePatternError`] for relative patterns or unnamed
    /// parameters.
    pub fn parse(raw: &str) -> Result<Self, RoutePatternError> {
        if !raw.starts_with('/') {
            return Err(RoutePatternError::NotAbsolute(raw.to_owned()));
        }
        let segments = split(raw)
            .map(|segment| match segment.strip_prefix(':') {
                Some("") => Err(RoutePatternError::UnnamedParameter(raw.to_owned())),
                Some(name) => Ok(Segment::Param(name.to_owned())),
                None => Ok(Segment::Literal(segment.to_owned())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    /// Match `path` (query and fragment ignored) and extract parameters.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let parts: Vec<&str> = split(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = RouteParams::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_owned());
                }
            }
        }
        Some(params)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// A named route with its access policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    name: String,
    pattern: RoutePattern,
    policy: AccessPolicy,
}

impl Route {
    /// Route name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path pattern.
    pub const fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Access policy.
    pub const fn policy(&self) -> &AccessPolicy {
        &self.policy
    }
}

/// A route matched against a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute<'a> {
    /// The matching route.
    pub route: &'a Route,
    /// Parameters extracted from the path.
    pub params: RouteParams,
}

/// Ordered set of routes; the first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route.
    ///
    /// # Errors
    ///
    /// Returns [`RoutePatternError`] when `pattern` does not parse.
    pub fn route(
        mut self,
        name: impl Into<String>,
        pattern: &str,
        policy: AccessPolicy,
    ) -> Result<Self, RoutePatternError> {
        self.routes.push(Route {
            name: name.into(),
            pattern: RoutePattern::parse(pattern)?,
            policy,
        });
        Ok(self)
    }

    /// Declared routes in match order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route matching `path`.
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute<'_>> {
        self.routes.iter().find_map(|route| {
            route
                .pattern
                .matches(path)
                .map(|params| ResolvedRoute { route, params })
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("profile", RoutePatternError::NotAbsolute("profile".to_owned()))]
    #[case("/profile/:", RoutePatternError::UnnamedParameter("/profile/:".to_owned()))]
    fn malformed_patterns_are_rejected(#[case] raw: &str, #[case] expected: RoutePatternError) {
        assert_eq!(RoutePattern::parse(raw), Err(expected));
    }

    #[rstest]
    #[case("/", "/", true)]
    #[case("/activities", "/activities/", true)]
    #[case("/activities", "/activities?page=2", true)]
    #[case("/activities/:id", "/activities", false)]
    #[case("/activities/:id/edit", "/activities/7/view", false)]
    fn literal_segments_must_align(#[case] pattern: &str, #[case] path: &str, #[case] hit: bool) {
        let pattern = RoutePattern::parse(pattern).expect("valid pattern");
        assert_eq!(pattern.matches(path).is_some(), hit);
    }

    #[rstest]
    fn first_matching_route_wins() {
        let table = RouteTable::new()
            .route("new-activity", "/activities/new", AccessPolicy::authenticated())
            .and_then(|table| table.route("activity", "/activities/:id", AccessPolicy::public()))
            .expect("valid routes");

        let resolved = table.resolve("/activities/new").expect("route found");
        assert_eq!(resolved.route.name(), "new-activity");
        assert!(resolved.params.is_empty());

        let resolved = table.resolve("/activities/42").expect("route found");
        assert_eq!(resolved.route.name(), "activity");
        assert_eq!(resolved.params.get("id").map(String::as_str), Some("42"));
        assert!(table.resolve("/unknown").is_none());
    }
}
