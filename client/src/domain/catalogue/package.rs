//! Tour packages bundling plans for a customer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::plan::Plan;
use crate::domain::error::DomainError;
use crate::domain::ports::ApiRequest;
use crate::domain::resource::{
    EntityId, PayloadError, Resource, ResourceStore, Validate, Verb, checks, member_path,
};
use crate::domain::session::UserId;

/// A tour package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourPackage {
    /// Identifier.
    pub id: EntityId,
    /// Display name.
    pub package_name: String,
    /// Customer the package is built for.
    pub user_id: UserId,
    /// Workflow status reported by the server.
    #[serde(default)]
    pub status: String,
    /// Number of travellers.
    pub quota: u32,
    /// Total price.
    pub price: f64,
    /// First day of the trip.
    pub start_date: NaiveDateTime,
    /// Last day of the trip.
    pub end_date: NaiveDateTime,
    /// Plans inside the package.
    #[serde(default)]
    pub plans: Vec<Plan>,
}

/// Payload for creating or updating a package.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDraft {
    /// Display name.
    pub package_name: String,
    /// Customer the package is built for.
    pub user_id: UserId,
    /// Number of travellers.
    pub quota: u32,
    /// Total price.
    pub price: f64,
    /// First day of the trip.
    pub start_date: NaiveDateTime,
    /// Last day of the trip.
    pub end_date: NaiveDateTime,
    /// Activities to seed the package with.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub activity_id_list: Vec<EntityId>,
}

impl Validate for PackageDraft {
    fn validate(&self) -> Result<(), PayloadError> {
        checks::non_blank("packageName", &self.package_name)?;
        checks::positive("quota", self.quota)?;
        checks::non_negative("price", self.price)?;
        checks::ordered(("startDate", self.start_date), ("endDate", self.end_date))
    }
}

impl Resource for TourPackage {
    type Create = PackageDraft;
    type Update = PackageDraft;

    const KIND: &'static str = "package";
    const LABEL: &'static str = "Package";
    const COLLECTION: &'static str = "/packages";

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl ResourceStore<TourPackage> {
    /// Ask the server to process (confirm and bill) a package.
    ///
    /// The outcome is reported through the notifier; refresh the package to
    /// see its new status.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure.
    pub async fn process(&self, id: &EntityId) -> Result<(), DomainError> {
        let path = format!("{}/process", member_path(TourPackage::COLLECTION, id));
        let request = ApiRequest::post(path)
            .with_json(&Map::new())
            .map_err(|error| DomainError::internal(format!("failed to encode payload: {error}")));
        self.run_detached::<Value>(Verb::Processed, request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{Method, NoticeLevel};
    use crate::test_support::{Harness, identity};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn decodes_nested_plans() {
        let package: TourPackage = serde_json::from_value(json!({
            "id": 7,
            "packageName": "Bali getaway",
            "userId": "c1",
            "status": "PENDING",
            "quota": 2,
            "price": 4_000_000.0,
            "startDate": "2025-03-01T00:00:00",
            "endDate": "2025-03-05T00:00:00",
            "plans": [{
                "id": "p1",
                "packageId": "7",
                "planName": "Flights",
                "activityType": "FLIGHT",
                "startLocation": "Jakarta",
                "endLocation": "Denpasar",
                "startDate": "2025-03-01T08:00:00",
                "endDate": "2025-03-01T10:00:00"
            }]
        }))
        .expect("package decodes");

        assert_eq!(package.id.as_ref(), "7");
        assert_eq!(package.plans.len(), 1);
        assert!(package.plans.iter().all(|plan| plan.ordered_activities.is_empty()));
    }

    #[rstest]
    #[tokio::test]
    async fn process_posts_an_empty_object_and_notifies() {
        let harness = Harness::signed_in("tok", &identity("v1", "TourPackageVendor"));
        let store = ResourceStore::<TourPackage>::new(harness.context());
        harness.api.push_ok(200, "Package processed", None);
        let id = EntityId::new("pkg-1").expect("valid id");

        store.process(&id).await.expect("processing succeeds");

        let sent = harness.api.last_request().expect("request recorded");
        assert_eq!(sent.method(), Method::Post);
        assert_eq!(sent.path(), "/packages/pkg-1/process");
        assert_eq!(sent.body(), Some(&json!({})));
        assert_eq!(harness.notifier.messages(NoticeLevel::Success), ["Package processed"]);
    }

    #[rstest]
    #[tokio::test]
    async fn process_without_message_uses_fallback() {
        let harness = Harness::signed_in("tok", &identity("v1", "TourPackageVendor"));
        let store = ResourceStore::<TourPackage>::new(harness.context());
        harness.api.push_ok(200, "", None);
        let id = EntityId::new("pkg-1").expect("valid id");

        store.process(&id).await.expect("processing succeeds");

        assert_eq!(
            harness.notifier.messages(NoticeLevel::Success),
            ["Package processed successfully."]
        );
    }
}
