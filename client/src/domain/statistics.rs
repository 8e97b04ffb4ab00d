//! Read-only revenue statistics.
//!
//! Three independent series are cached, one per endpoint. Each carries its
//! own generation so that a slow reply for an older query never overwrites
//! the series requested last.

use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::DomainError;
use super::ports::ApiRequest;
use super::resource::{Action, StoreContext, Verb, checks};
use super::tracking::{Bookkeeping, Generation, InFlight, Tracked, lock_state};

const LABEL: &str = "Revenue statistics";
const REVENUE_PATH: &str = "/statistics/revenue";

/// Revenue of one activity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueByType {
    /// Activity category.
    pub activity_type: String,
    /// Revenue earned.
    pub total_revenue: f64,
}

/// Revenue of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    /// Month number, 1 to 12.
    pub month: u32,
    /// Revenue earned.
    pub total_revenue: f64,
}

/// Point-in-time copy of the statistics cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsSnapshot {
    /// Result of the last [`StatisticsStore::revenue`] call.
    pub revenue: Vec<RevenueByType>,
    /// Result of the last [`StatisticsStore::yearly`] call.
    pub yearly: Vec<MonthlyRevenue>,
    /// Result of the last [`StatisticsStore::monthly`] call.
    pub monthly: Vec<RevenueByType>,
    /// Whether any query is running.
    pub loading: bool,
    /// Message of the most recent failure.
    pub last_error: Option<String>,
}

#[derive(Default)]
struct StatisticsState {
    revenue: Vec<RevenueByType>,
    yearly: Vec<MonthlyRevenue>,
    monthly: Vec<RevenueByType>,
    revenue_generation: Generation,
    yearly_generation: Generation,
    monthly_generation: Generation,
    book: Bookkeeping,
}

impl Tracked for StatisticsState {
    fn bookkeeping(&mut self) -> &mut Bookkeeping {
        &mut self.book
    }
}

#[derive(Clone, Copy)]
enum Series {
    Revenue,
    Yearly,
    Monthly,
}

impl Series {
    const fn name(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Yearly => "yearly",
            Self::Monthly => "monthly",
        }
    }

    fn generation(self, state: &mut StatisticsState) -> &mut Generation {
        match self {
            Self::Revenue => &mut state.revenue_generation,
            Self::Yearly => &mut state.yearly_generation,
            Self::Monthly => &mut state.monthly_generation,
        }
    }
}

/// Cached revenue statistics.
pub struct StatisticsStore {
    context: StoreContext,
    state: Mutex<StatisticsState>,
}

impl StatisticsStore {
    /// Empty store.
    pub fn new(context: StoreContext) -> Self {
        Self {
            context,
            state: Mutex::new(StatisticsState::default()),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> StatisticsSnapshot {
        let state = lock_state(&self.state);
        StatisticsSnapshot {
            revenue: state.revenue.clone(),
            yearly: state.yearly.clone(),
            monthly: state.monthly.clone(),
            loading: state.book.is_loading(),
            last_error: state.book.last_error().map(str::to_owned),
        }
    }

    /// Whether any query is running.
    pub fn is_loading(&self) -> bool {
        lock_state(&self.state).book.is_loading()
    }

    /// Message of the most recent failure.
    pub fn last_error(&self) -> Option<String> {
        lock_state(&self.state).book.last_error().map(str::to_owned)
    }

    /// Forget the last failure.
    pub fn reset_error(&self) {
        lock_state(&self.state).book.clear_error();
    }

    /// Revenue per activity type for a year, or for one month of it.
    ///
    /// # Errors
    ///
    /// Returns an invalid-request error for a month outside 1..=12, or the
    /// normalised remote failure.
    pub async fn revenue(
        &self,
        year: i32,
        month: Option<u32>,
    ) -> Result<Vec<RevenueByType>, DomainError> {
        let request = match month {
            Some(month) => check_month(month).map(|()| {
                ApiRequest::get(REVENUE_PATH)
                    .with_query("year", year)
                    .with_query("month", month)
            }),
            None => Ok(ApiRequest::get(REVENUE_PATH).with_query("year", year)),
        };
        self.fetch(Series::Revenue, request, |state, rows| state.revenue = rows)
            .await
    }

    /// Revenue per month of `year`.
    ///
    /// # Errors
    ///
    /// Returns the normalised remote failure.
    pub async fn yearly(&self, year: i32) -> Result<Vec<MonthlyRevenue>, DomainError> {
        let request = ApiRequest::get(format!("{REVENUE_PATH}/yearly/{year}"));
        self.fetch(Series::Yearly, Ok(request), |state, rows| state.yearly = rows)
            .await
    }

    /// Revenue per activity type for one month.
    ///
    /// # Errors
    ///
    /// Returns an invalid-request error for a month outside 1..=12, or the
    /// normalised remote failure.
    pub async fn monthly(&self, year: i32, month: u32) -> Result<Vec<RevenueByType>, DomainError> {
        let request = check_month(month)
            .map(|()| ApiRequest::get(format!("{REVENUE_PATH}/monthly/{year}/{month}")));
        self.fetch(Series::Monthly, request, |state, rows| state.monthly = rows)
            .await
    }

    async fn fetch<T: DeserializeOwned + Clone>(
        &self,
        series: Series,
        request: Result<ApiRequest, DomainError>,
        apply: impl FnOnce(&mut StatisticsState, Vec<T>),
    ) -> Result<Vec<T>, DomainError> {
        let _flight = InFlight::begin(&self.state);
        let ticket = series.generation(&mut lock_state(&self.state)).advance();
        let outcome = match request {
            Ok(request) => {
                self.context
                    .exchange::<Vec<T>>(Action::new(LABEL, Verb::Loaded), request)
                    .await
            }
            Err(error) => Err(error),
        };
        match outcome {
            Ok(rows) => {
                let rows = rows.unwrap_or_default();
                let mut state = lock_state(&self.state);
                if series.generation(&mut state).is_current(ticket) {
                    apply(&mut state, rows.clone());
                } else {
                    debug!(series = series.name(), ticket, "discarding superseded statistics");
                }
                Ok(rows)
            }
            Err(error) => {
                lock_state(&self.state).book.record_error(error.message());
                self.context.report_failure(&error);
                Err(error)
            }
        }
    }
}

fn check_month(month: u32) -> Result<(), DomainError> {
    checks::within("month", f64::from(month), 1.0, 12.0)
        .map_err(|error| DomainError::invalid_request(error.to_string()))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::NoticeLevel;
    use crate::test_support::{Harness, identity};
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn harness() -> Harness {
        Harness::signed_in("tok", &identity("admin", "Superadmin"))
    }

    #[rstest]
    #[tokio::test]
    async fn revenue_includes_month_when_given(harness: Harness) {
        let store = StatisticsStore::new(harness.context());
        harness.api.push_ok(
            200,
            "ok",
            Some(json!([{ "activityType": "FLIGHT", "totalRevenue": 1500.0 }])),
        );

        let rows = store.revenue(2025, Some(3)).await.expect("query succeeds");

        assert_eq!(rows.len(), 1);
        assert_eq!(store.snapshot().revenue, rows);
        let sent = harness.api.last_request().expect("request recorded");
        assert_eq!(sent.path(), "/statistics/revenue");
        assert_eq!(
            sent.query(),
            [
                ("year".to_owned(), "2025".to_owned()),
                ("month".to_owned(), "3".to_owned()),
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn series_are_cached_independently(harness: Harness) {
        let store = StatisticsStore::new(harness.context());
        harness
            .api
            .push_ok(200, "ok", Some(json!([{ "month": 1, "totalRevenue": 10.0 }])));
        harness
            .api
            .push_ok(200, "ok", Some(json!([{ "activityType": "TOUR", "totalRevenue": 4.0 }])));

        store.yearly(2025).await.expect("yearly succeeds");
        store.monthly(2025, 1).await.expect("monthly succeeds");

        let snapshot = store.snapshot();
        assert_eq!(snapshot.yearly.len(), 1);
        assert_eq!(snapshot.monthly.len(), 1);
        assert!(snapshot.revenue.is_empty());
        assert_eq!(
            harness.api.last_request().expect("request recorded").path(),
            "/statistics/revenue/monthly/2025/1"
        );
    }

    #[rstest]
    #[case(0)]
    #[case(13)]
    #[tokio::test]
    async fn out_of_range_months_fail_locally(harness: Harness, #[case] month: u32) {
        let store = StatisticsStore::new(harness.context());

        let error = store.monthly(2025, month).await.expect_err("month is invalid");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(harness.api.request_count(), 0);
        assert_eq!(store.last_error().as_deref(), Some("month must be between 1 and 12"));
        assert_eq!(
            harness.notifier.messages(NoticeLevel::Error),
            ["month must be between 1 and 12"]
        );
        assert!(!store.is_loading());
    }

    #[rstest]
    #[tokio::test]
    async fn stale_reply_does_not_overwrite_newer_series(harness: Harness) {
        let store = std::sync::Arc::new(StatisticsStore::new(harness.context()));
        let gate = harness.api.push_gated(Ok(crate::test_support::envelope(
            200,
            "ok",
            Some(json!([{ "month": 1, "totalRevenue": 1.0 }])),
        )));
        harness
            .api
            .push_ok(200, "ok", Some(json!([{ "month": 2, "totalRevenue": 2.0 }])));

        let slow = tokio::spawn({
            let store = store.clone();
            async move { store.yearly(2024).await }
        });
        while harness.api.request_count() < 1 {
            tokio::task::yield_now().await;
        }
        store.yearly(2025).await.expect("newer query succeeds");
        gate.send(()).expect("gate open");
        slow.await.expect("task joins").expect("older query succeeds");

        let yearly = store.snapshot().yearly;
        assert_eq!(yearly.first().map(|row| row.month), Some(2));
    }
}
