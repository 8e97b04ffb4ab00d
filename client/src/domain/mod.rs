//! Domain primitives, stores and ports.
//!
//! Purpose: hold everything that is independent of transport and storage.
//! Stores talk to the outside world only through [`ports`].
//!
//! Public surface:
//! - `SessionStore`: the authenticated session and its persistence.
//! - `decide` / `AccessGuard`: the navigation decision engine.
//! - `RemoteEnvelope` / `EnvelopeVerdict`: normalisation of remote replies.
//! - `ResourceStore<R>`: the cached CRUD store, instantiated per entity kind
//!   in [`catalogue`], plus the read-only `StatisticsStore` and `LocationStore`.

pub mod access;
pub mod catalogue;
pub mod envelope;
pub mod error;
pub mod location;
pub mod ports;
pub mod resource;
pub mod session;
pub mod statistics;
pub(crate) mod tracking;

pub use self::access::{
    AccessGuard, AccessPolicy, DenialReason, NavigationDecision, RedirectTarget, RouteParams,
    decide,
};
pub use self::catalogue::{
    Activity, ActivityDraft, ActivityFilter, ActivityPatch, Coupon, CouponDraft, CouponPurchase,
    LoyaltyBalance, LoyaltyDashboard, NewUserProfile, OrderedQuantity, OrderedQuantityDraft,
    PackageDraft, Plan, PlanDetails, PlanDraft, PurchasedCoupon, QuotaChange, TopUp, TourPackage,
    UserProfile, UserProfileUpdate,
};
pub use self::envelope::{
    EnvelopeVerdict, GENERIC_FAILURE_MESSAGE, RemoteEnvelope, error_from_transport,
    failure_message, message_from_body, soft_failure_error,
};
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::location::LocationStore;
pub use self::resource::{
    AuthFailurePolicy, EntityId, EntityIdError, PayloadError, Resource, ResourceCache,
    ResourceStore, SoftFailurePolicy, StoreContext, StorePolicy, Unsupported, Validate,
};
pub use self::session::{
    AuthToken, CredentialsValidationError, Identity, LoginCredentials, RegistrationDraft,
    RegistrationRequest, Role, Session, SessionStore, SessionValidationError, UnknownRole, UserId,
};
pub use self::statistics::{MonthlyRevenue, RevenueByType, StatisticsSnapshot, StatisticsStore};

/// Result alias used by store operations.
///
/// # Examples
/// ```
/// use client::domain::{DomainError, DomainResult};
///
/// fn refuse() -> DomainResult<()> {
///     Err(DomainError::forbidden("nope"))
/// }
/// assert!(refuse().is_err());
/// ```
pub type DomainResult<T> = Result<T, DomainError>;
