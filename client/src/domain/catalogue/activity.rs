//! Bookable activities: flights, stays, tours, rentals and so on.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::ports::ApiRequest;
use crate::domain::resource::{
    EntityId, PayloadError, Resource, ResourceStore, Validate, Verb, checks, member_path,
};

/// An activity offered by a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Identifier.
    pub id: EntityId,
    /// Display name.
    pub activity_name: String,
    /// Category, e.g. `FLIGHT` or `ACCOMMODATION`.
    pub activity_type: String,
    /// Concrete item booked, such as a seat class or room type.
    #[serde(default)]
    pub activity_item: String,
    /// Unit price.
    pub price: f64,
    /// Total seats or units.
    pub capacity: u32,
    /// Where the activity starts.
    pub start_location: String,
    /// Where the activity ends.
    pub end_location: String,
    /// Start time.
    pub start_date: NaiveDateTime,
    /// End time.
    pub end_date: NaiveDateTime,
    /// Soft-deletion flag.
    #[serde(default)]
    pub is_deleted: bool,
}

/// Payload for creating an activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDraft {
    /// Display name.
    pub activity_name: String,
    /// Category.
    pub activity_type: String,
    /// Concrete item booked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_item: Option<String>,
    /// Unit price.
    pub price: f64,
    /// Total seats or units.
    pub capacity: u32,
    /// Start time.
    pub start_date: NaiveDateTime,
    /// End time.
    pub end_date: NaiveDateTime,
    /// Where the activity starts.
    pub start_location: String,
    /// Where the activity ends.
    pub end_location: String,
}

impl Validate for ActivityDraft {
    fn validate(&self) -> Result<(), PayloadError> {
        checks::non_blank("activityName", &self.activity_name)?;
        checks::non_blank("activityType", &self.activity_type)?;
        checks::non_blank("startLocation", &self.start_location)?;
        checks::non_blank("endLocation", &self.end_location)?;
        checks::non_negative("price", self.price)?;
        checks::positive("capacity", self.capacity)?;
        checks::ordered(("startDate", self.start_date), ("endDate", self.end_date))
    }
}

/// Partial update of an activity; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPatch {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_name: Option<String>,
    /// New category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    /// New item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_item: Option<String>,
    /// New unit price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New capacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    /// New start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDateTime>,
    /// New end time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDateTime>,
    /// New start location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_location: Option<String>,
    /// New end location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_location: Option<String>,
}

impl Validate for ActivityPatch {
    fn validate(&self) -> Result<(), PayloadError> {
        let texts = [
            ("activityName", &self.activity_name),
            ("activityType", &self.activity_type),
            ("startLocation", &self.start_location),
            ("endLocation", &self.end_location),
        ];
        for (field, value) in texts {
            if let Some(text) = value {
                checks::non_blank(field, text)?;
            }
        }
        if let Some(price) = self.price {
            checks::non_negative("price", price)?;
        }
        if let Some(capacity) = self.capacity {
            checks::positive("capacity", capacity)?;
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            checks::ordered(("startDate", start), ("endDate", end))?;
        }
        Ok(())
    }
}

/// Search criteria for `GET /activities/filter`. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    /// Name fragment.
    pub name: Option<String>,
    /// Category.
    pub activity_type: Option<String>,
    /// Start location.
    pub start_location: Option<String>,
    /// End location.
    pub end_location: Option<String>,
    /// Earliest start day.
    pub start_date_from: Option<NaiveDate>,
    /// Latest start day.
    pub start_date_to: Option<NaiveDate>,
    /// Earliest end day.
    pub end_date_from: Option<NaiveDate>,
    /// Latest end day.
    pub end_date_to: Option<NaiveDate>,
    /// Include soft-deleted activities.
    pub include_deleted: bool,
}

impl ActivityFilter {
    fn request(&self) -> ApiRequest {
        let non_blank =
            |value: &Option<String>| value.clone().filter(|text| !text.trim().is_empty());
        ApiRequest::get(format!("{}/filter", Activity::COLLECTION))
            .with_optional_query("name", non_blank(&self.name))
            .with_optional_query("activityType", non_blank(&self.activity_type))
            .with_optional_query("startLocation", non_blank(&self.start_location))
            .with_optional_query("endLocation", non_blank(&self.end_location))
            .with_optional_query("startDateFrom", self.start_date_from)
            .with_optional_query("startDateTo", self.start_date_to)
            .with_optional_query("endDateFrom", self.end_date_from)
            .with_optional_query("endDateTo", self.end_date_to)
            .with_query("includeDeleted", self.include_deleted)
    }
}

impl Resource for Activity {
    type Create = ActivityDraft;
    type Update = ActivityPatch;

    const KIND: &'static str = "activity";
    const LABEL: &'static str = "Activity";
    const COLLECTION: &'static str = "/activities";

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl ResourceStore<Activity> {
    /// Replace the cache with the activities matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure; the cache is left untouched.
    pub async fn filter(&self, filter: &ActivityFilter) -> Result<Vec<Activity>, DomainError> {
        self.replace_items(Ok(filter.request())).await
    }

    /// Replace the cache with every activity, soft-deleted ones included.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure; the cache is left untouched.
    pub async fn list_including_deleted(&self) -> Result<Vec<Activity>, DomainError> {
        let request = Activity::list_request().with_query("includeDeleted", true);
        self.replace_items(Ok(request)).await
    }

    /// Activities that can still be added to `plan`. The cache is not touched.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure.
    pub async fn available_for_plan(&self, plan: &EntityId) -> Result<Vec<Activity>, DomainError> {
        let request = ApiRequest::get(member_path("/activities/available", plan));
        let found = self.run_detached::<Vec<Activity>>(Verb::Listed, Ok(request)).await?;
        Ok(found.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::Method;
    use crate::test_support::{Harness, identity};
    use rstest::{fixture, rstest};
    use serde_json::json;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    fn draft() -> ActivityDraft {
        ActivityDraft {
            activity_name: "Bali flight".to_owned(),
            activity_type: "FLIGHT".to_owned(),
            activity_item: Some("Economy".to_owned()),
            price: 1_250_000.0,
            capacity: 180,
            start_date: at(1, 8),
            end_date: at(1, 10),
            start_location: "Jakarta".to_owned(),
            end_location: "Denpasar".to_owned(),
        }
    }

    fn activity_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "activityName": "Bali flight",
            "activityType": "FLIGHT",
            "activityItem": "Economy",
            "price": 1_250_000.0,
            "capacity": 180,
            "startLocation": "Jakarta",
            "endLocation": "Denpasar",
            "startDate": "2025-03-01T08:00:00",
            "endDate": "2025-03-01T10:00:00"
        })
    }

    #[fixture]
    fn harness() -> Harness {
        Harness::signed_in("tok", &identity("v1", "FlightAirline"))
    }

    #[rstest]
    fn decodes_wire_shape() {
        let activity: Activity =
            serde_json::from_value(activity_json("act-1")).expect("activity decodes");
        assert_eq!(activity.id.as_ref(), "act-1");
        assert_eq!(activity.start_date, at(1, 8));
        assert!(!activity.is_deleted);
    }

    #[rstest]
    #[case::blank_name(
        ActivityDraft { activity_name: " ".to_owned(), ..draft() },
        "activityName must not be empty"
    )]
    #[case::negative_price(
        ActivityDraft { price: -1.0, ..draft() },
        "price must be a non-negative number"
    )]
    #[case::zero_capacity(
        ActivityDraft { capacity: 0, ..draft() },
        "capacity must be greater than zero"
    )]
    #[case::inverted(
        ActivityDraft { start_date: at(2, 8), ..draft() },
        "startDate must not be after endDate"
    )]
    fn drafts_are_checked(#[case] payload: ActivityDraft, #[case] message: &str) {
        let error = payload.validate().expect_err("draft is invalid");
        assert_eq!(error.to_string(), message);
    }

    #[rstest]
    fn patches_only_check_present_fields() {
        assert!(ActivityPatch::default().validate().is_ok());
        let patch = ActivityPatch {
            capacity: Some(0),
            ..ActivityPatch::default()
        };
        assert!(patch.validate().is_err());
    }

    #[rstest]
    fn patches_omit_absent_fields() {
        let patch = ActivityPatch {
            price: Some(99.0),
            ..ActivityPatch::default()
        };
        assert_eq!(serde_json::to_value(&patch).expect("serialises"), json!({ "price": 99.0 }));
    }

    #[rstest]
    fn filter_sends_only_set_criteria() {
        let filter = ActivityFilter {
            activity_type: Some("FLIGHT".to_owned()),
            name: Some("  ".to_owned()),
            start_date_from: NaiveDate::from_ymd_opt(2025, 3, 1),
            include_deleted: true,
            ..ActivityFilter::default()
        };
        let request = filter.request();
        assert_eq!(request.path(), "/activities/filter");
        assert_eq!(
            request.query(),
            [
                ("activityType".to_owned(), "FLIGHT".to_owned()),
                ("startDateFrom".to_owned(), "2025-03-01".to_owned()),
                ("includeDeleted".to_owned(), "true".to_owned()),
            ]
        );
    }

    #[rstest]
    fn filter_always_states_whether_deleted_rows_are_wanted() {
        let request = ActivityFilter::default().request();
        assert_eq!(request.query(), [("includeDeleted".to_owned(), "false".to_owned())]);
    }

    #[rstest]
    #[tokio::test]
    async fn filter_replaces_cache(harness: Harness) {
        let store = ResourceStore::<Activity>::new(harness.context());
        harness
            .api
            .push_ok(200, "ok", Some(json!([activity_json("a1"), activity_json("a2")])));

        let found = store
            .filter(&ActivityFilter::default())
            .await
            .expect("filter succeeds");

        assert_eq!(found.len(), 2);
        assert_eq!(store.items(), found);
    }

    #[rstest]
    #[tokio::test]
    async fn available_activities_leave_cache_alone(harness: Harness) {
        let store = ResourceStore::<Activity>::new(harness.context());
        harness.api.push_ok(200, "ok", Some(json!([activity_json("a9")])));
        let plan = EntityId::new("plan-1").expect("valid id");

        let found = store.available_for_plan(&plan).await.expect("query succeeds");

        assert_eq!(found.len(), 1);
        assert!(store.items().is_empty());
        let sent = harness.api.last_request().expect("request recorded");
        assert_eq!(sent.method(), Method::Get);
        assert_eq!(sent.path(), "/activities/available/plan-1");
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_draft_is_rejected_locally(harness: Harness) {
        let store = ResourceStore::<Activity>::new(harness.context());
        let payload = ActivityDraft {
            capacity: 0,
            ..draft()
        };

        let error = store.create(&payload).await.expect_err("draft is invalid");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(harness.api.request_count(), 0);
        assert_eq!(store.last_error().as_deref(), Some("capacity must be greater than zero"));
    }
}
