//! Entity kinds served by the travel portal API.
//!
//! Each kind implements [`crate::domain::Resource`] so that a
//! [`crate::domain::ResourceStore`] can cache it. Kind-specific queries live
//! in `impl ResourceStore<Kind>` blocks next to the entity.

mod activity;
mod coupon;
mod ordered_quantity;
mod package;
mod plan;
mod user;

pub use activity::{Activity, ActivityDraft, ActivityFilter, ActivityPatch};
pub use coupon::{
    Coupon, CouponDraft, CouponPurchase, LoyaltyBalance, LoyaltyDashboard, PurchasedCoupon,
};
pub use ordered_quantity::{OrderedQuantity, OrderedQuantityDraft, QuotaChange};
pub use package::{PackageDraft, TourPackage};
pub use plan::{Plan, PlanDetails, PlanDraft};
pub use user::{NewUserProfile, TopUp, UserProfile, UserProfileUpdate};
