//! Store-wide failure policies.

/// What happens to the session when the service rejects its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthFailurePolicy {
    /// Keep the session; only the failing action reports an error.
    #[default]
    Retain,
    /// Expire the session on any unauthorized failure.
    ForceLogout,
}

/// How a reply with a failing logical status is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoftFailurePolicy {
    /// Show `"{status}: {message}"` and still apply any returned data.
    #[default]
    Notify,
    /// Treat it as a failed action: nothing is cached and an error is
    /// returned.
    Reject,
}

/// Failure policies applied by every store sharing a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorePolicy {
    /// Unauthorized failures.
    pub auth_failure: AuthFailurePolicy,
    /// Logical failures inside successful transports.
    pub soft_failure: SoftFailurePolicy,
}
