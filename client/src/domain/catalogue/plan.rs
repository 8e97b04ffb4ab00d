//! Plans: one leg of a package, grouping ordered activities of a single type.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ordered_quantity::OrderedQuantity;
use crate::domain::error::DomainError;
use crate::domain::ports::ApiRequest;
use crate::domain::resource::{
    EntityId, PayloadError, Resource, ResourceStore, Validate, checks, member_path,
};

/// A plan inside a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Identifier.
    pub id: EntityId,
    /// Owning package.
    #[serde(default)]
    pub package_id: Option<EntityId>,
    /// Display name.
    pub plan_name: String,
    /// Activity category this plan books.
    pub activity_type: String,
    /// Workflow status reported by the server.
    #[serde(default)]
    pub status: String,
    /// Total price of the ordered activities.
    #[serde(default)]
    pub price: f64,
    /// Where the plan starts.
    pub start_location: String,
    /// Where the plan ends.
    pub end_location: String,
    /// Start time.
    pub start_date: NaiveDateTime,
    /// End time.
    pub end_date: NaiveDateTime,
    /// Activities booked under this plan.
    #[serde(default)]
    pub ordered_activities: Vec<OrderedQuantity>,
}

/// Editable fields of a plan; also the update payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetails {
    /// Display name.
    pub plan_name: String,
    /// Activity category.
    pub activity_type: String,
    /// Start time.
    pub start_date: NaiveDateTime,
    /// End time.
    pub end_date: NaiveDateTime,
    /// Where the plan starts.
    pub start_location: String,
    /// Where the plan ends.
    pub end_location: String,
    /// Price override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Validate for PlanDetails {
    fn validate(&self) -> Result<(), PayloadError> {
        checks::non_blank("planName", &self.plan_name)?;
        checks::non_blank("activityType", &self.activity_type)?;
        checks::non_blank("startLocation", &self.start_location)?;
        checks::non_blank("endLocation", &self.end_location)?;
        if let Some(price) = self.price {
            checks::non_negative("price", price)?;
        }
        checks::ordered(("startDate", self.start_date), ("endDate", self.end_date))
    }
}

/// Payload for adding a plan to a package. The package id goes in the path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanDraft {
    /// Package receiving the plan.
    #[serde(skip)]
    pub package_id: EntityId,
    /// Plan fields.
    #[serde(flatten)]
    pub details: PlanDetails,
}

impl Validate for PlanDraft {
    fn validate(&self) -> Result<(), PayloadError> {
        self.details.validate()
    }
}

impl Resource for Plan {
    type Create = PlanDraft;
    type Update = PlanDetails;

    const KIND: &'static str = "plan";
    const LABEL: &'static str = "Plan";
    const COLLECTION: &'static str = "/plans";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn create_request(payload: &PlanDraft) -> Result<ApiRequest, serde_json::Error> {
        ApiRequest::post(format!("{}/plans", member_path("/packages", &payload.package_id)))
            .with_json(payload)
    }
}

impl ResourceStore<Plan> {
    /// Replace the cache with the plans of one package.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure; the cache is left untouched.
    pub async fn list_for_package(&self, package: &EntityId) -> Result<Vec<Plan>, DomainError> {
        let request = ApiRequest::get(member_path("/plans/package", package));
        self.replace_items(Ok(request)).await
    }
}
