//! Loyalty coupons and the coupons customers bought with their points.

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::ports::ApiRequest;
use crate::domain::resource::{
    EntityId, PayloadError, Resource, ResourceStore, Unsupported, Validate, Verb, checks, prepare,
};
use crate::domain::session::UserId;

/// A coupon that can be bought with loyalty points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Terms shown to customers.
    #[serde(default)]
    pub description: String,
    /// Price in points.
    pub points: u32,
    /// Discount in percent.
    pub percent_off: f64,
    /// Soft-deletion flag.
    #[serde(default)]
    pub is_deleted: bool,
}

/// Payload for creating or updating a coupon.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponDraft {
    /// Display name.
    pub name: String,
    /// Terms shown to customers.
    pub description: String,
    /// Price in points.
    pub points: u32,
    /// Discount in percent, 0 to 100.
    pub percent_off: f64,
}

impl Validate for CouponDraft {
    fn validate(&self) -> Result<(), PayloadError> {
        checks::non_blank("name", &self.name)?;
        checks::within("percentOff", self.percent_off, 0.0, 100.0)
    }
}

impl Resource for Coupon {
    type Create = CouponDraft;
    type Update = CouponDraft;

    const KIND: &'static str = "coupon";
    const LABEL: &'static str = "Coupon";
    const COLLECTION: &'static str = "/loyalty/coupons";

    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// Loyalty point balance of a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyBalance {
    /// Owner of the balance.
    pub customer_id: UserId,
    /// Points available.
    pub points: u64,
}

/// Summary of a customer's loyalty account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyDashboard {
    /// Customer summarised.
    pub customer_id: UserId,
    /// Point balance.
    pub balance: LoyaltyBalance,
    /// Coupons the customer owns.
    #[serde(default)]
    pub purchased_coupons: Vec<PurchasedCoupon>,
    /// Coupons the customer can still buy.
    #[serde(default)]
    pub available_coupons: Vec<Coupon>,
    /// Number of coupons ever bought.
    #[serde(default)]
    pub total_purchased_coupons: u32,
    /// Bought and not yet redeemed.
    #[serde(default)]
    pub active_coupons: u32,
    /// Bought and redeemed.
    #[serde(default)]
    pub redeemed_coupons: u32,
    /// Coupons on offer.
    #[serde(default)]
    pub available_coupon_count: u32,
}

impl ResourceStore<Coupon> {
    /// Loyalty summary of `customer`. The cache is not touched.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure.
    pub async fn dashboard(
        &self,
        customer: &UserId,
    ) -> Result<Option<LoyaltyDashboard>, DomainError> {
        let request = ApiRequest::get(format!("/loyalty/dashboard/{customer}"));
        self.run_detached(Verb::Loaded, Ok(request)).await
    }
}

/// A coupon bought by a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedCoupon {
    /// Identifier.
    pub id: EntityId,
    /// Redemption code.
    #[serde(alias = "uniqueCode")]
    pub code: String,
    /// Coupon bought.
    #[serde(default)]
    pub coupon_id: Option<EntityId>,
    /// Name of the coupon bought.
    #[serde(default)]
    pub coupon_name: String,
    /// Points paid.
    #[serde(default)]
    pub points: u32,
    /// Discount in percent.
    #[serde(default)]
    pub percent_off: f64,
    /// Buyer.
    #[serde(default)]
    pub customer_id: Option<UserId>,
    /// When it was bought, as sent by the server.
    #[serde(default, alias = "purchaseDate")]
    pub purchased_date: Option<String>,
    /// When it was redeemed, as sent by the server.
    #[serde(default)]
    pub used_date: Option<String>,
}

impl PurchasedCoupon {
    /// Whether the coupon has been redeemed.
    pub const fn is_used(&self) -> bool {
        self.used_date.is_some()
    }
}

/// Payload for buying a coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponPurchase {
    /// Buyer.
    pub customer_id: UserId,
    /// Coupon to buy.
    pub coupon_id: EntityId,
}

impl Validate for CouponPurchase {
    fn validate(&self) -> Result<(), PayloadError> {
        Ok(())
    }
}

impl Resource for PurchasedCoupon {
    type Create = CouponPurchase;
    type Update = Unsupported;

    const KIND: &'static str = "purchased_coupon";
    const LABEL: &'static str = "Coupon";
    const COLLECTION: &'static str = "/loyalty/coupons/purchased";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn create_request(payload: &CouponPurchase) -> Result<ApiRequest, serde_json::Error> {
        ApiRequest::post("/loyalty/coupons/purchase").with_json(payload)
    }
}

impl ResourceStore<PurchasedCoupon> {
    /// Buy a coupon and add it to the cache.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure; the cache is left untouched.
    pub async fn purchase(
        &self,
        purchase: &CouponPurchase,
    ) -> Result<Option<PurchasedCoupon>, DomainError> {
        let request = prepare(purchase, PurchasedCoupon::create_request);
        self.insert_from(Verb::Purchased, request).await
    }

    /// Replace the cache with the coupons bought by `customer`.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure; the cache is left untouched.
    pub async fn list_for_customer(
        &self,
        customer: &UserId,
    ) -> Result<Vec<PurchasedCoupon>, DomainError> {
        let request = ApiRequest::get(format!("{}/{customer}", PurchasedCoupon::COLLECTION));
        self.replace_items(Ok(request)).await
    }
}
