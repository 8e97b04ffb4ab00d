//! Ordered quantities: how many units of an activity a plan reserves.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::domain::ports::ApiRequest;
use crate::domain::resource::{
    EntityId, PayloadError, Resource, Validate, checks, member_path,
};

/// Units of one activity reserved by a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedQuantity {
    /// Identifier.
    pub id: EntityId,
    /// Owning plan.
    #[serde(default)]
    pub plan_id: Option<EntityId>,
    /// Reserved activity.
    pub activity_id: EntityId,
    /// Name of the reserved activity.
    #[serde(default)]
    pub activity_name: String,
    /// Item of the reserved activity.
    #[serde(default)]
    pub activity_item: String,
    /// Units reserved.
    pub ordered_quota: u32,
    /// Units still free on the activity, when reported.
    #[serde(default)]
    pub available_quota: Option<u32>,
    /// Price of the reservation.
    #[serde(default)]
    pub price: f64,
    /// Start time of the activity.
    #[serde(default)]
    pub start_date: Option<NaiveDateTime>,
    /// End time of the activity.
    #[serde(default)]
    pub end_date: Option<NaiveDateTime>,
}

/// Payload for reserving an activity under a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedQuantityDraft {
    /// Plan receiving the reservation; sent in the path.
    #[serde(skip)]
    pub plan_id: EntityId,
    /// Activity to reserve.
    pub activity_id: EntityId,
    /// Units to reserve.
    pub ordered_quota: u32,
}

impl Validate for OrderedQuantityDraft {
    fn validate(&self) -> Result<(), PayloadError> {
        checks::positive("orderedQuota", self.ordered_quota)
    }
}

/// New quota for an existing reservation, sent as `?newQuota=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaChange {
    /// Units to hold after the change.
    pub new_quota: u32,
}

impl Validate for QuotaChange {
    fn validate(&self) -> Result<(), PayloadError> {
        checks::positive("newQuota", self.new_quota)
    }
}

impl Resource for OrderedQuantity {
    type Create = OrderedQuantityDraft;
    type Update = QuotaChange;

    const KIND: &'static str = "ordered_quantity";
    const LABEL: &'static str = "Ordered quantity";
    const COLLECTION: &'static str = "/ordered-quantities";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn create_request(payload: &OrderedQuantityDraft) -> Result<ApiRequest, serde_json::Error> {
        ApiRequest::post(format!(
            "{}/ordered-quantities",
            member_path("/plans", &payload.plan_id)
        ))
        .with_json(payload)
    }

    fn update_request(
        id: &EntityId,
        payload: &QuotaChange,
    ) -> Result<ApiRequest, serde_json::Error> {
        ApiRequest::put(member_path(Self::COLLECTION, id))
            .with_query("newQuota", payload.new_quota)
            .with_json(&Map::new())
    }
}
