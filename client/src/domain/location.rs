//! Location names offered when describing where activities start and end.

use std::sync::Mutex;

use tracing::debug;

use super::error::DomainError;
use super::ports::ApiRequest;
use super::resource::{Action, StoreContext, Verb};
use super::tracking::{Bookkeeping, Generation, InFlight, Tracked, lock_state};

const LABEL: &str = "Location";
const LOCATIONS_PATH: &str = "/locations";

#[derive(Default)]
struct LocationState {
    locations: Vec<String>,
    generation: Generation,
    book: Bookkeeping,
}

impl Tracked for LocationState {
    fn bookkeeping(&mut self) -> &mut Bookkeeping {
        &mut self.book
    }
}

/// Cached list of location names such as `"Bali - Kabupaten Badung"`.
pub struct LocationStore {
    context: StoreContext,
    state: Mutex<LocationState>,
}

impl LocationStore {
    /// Empty store.
    pub fn new(context: StoreContext) -> Self {
        Self {
            context,
            state: Mutex::new(LocationState::default()),
        }
    }

    /// Names from the last successful load.
    pub fn locations(&self) -> Vec<String> {
        lock_state(&self.state).locations.clone()
    }

    /// Whether a load is running.
    pub fn is_loading(&self) -> bool {
        lock_state(&self.state).book.is_loading()
    }

    /// Message of the most recent failure.
    pub fn last_error(&self) -> Option<String> {
        lock_state(&self.state).book.last_error().map(str::to_owned)
    }

    /// Load every location name and cache the result.
    ///
    /// # Errors
    ///
    /// Returns the normalised failure; the cache is left untouched.
    pub async fn load(&self) -> Result<Vec<String>, DomainError> {
        let _flight = InFlight::begin(&self.state);
        let ticket = lock_state(&self.state).generation.advance();
        let request = ApiRequest::get(LOCATIONS_PATH);
        match self
            .context
            .exchange::<Vec<String>>(Action::new(LABEL, Verb::Listed), request)
            .await
        {
            Ok(names) => {
                let names = names.unwrap_or_default();
                let mut state = lock_state(&self.state);
                if state.generation.is_current(ticket) {
                    state.locations.clone_from(&names);
                } else {
                    debug!(ticket, "discarding superseded location list");
                }
                Ok(names)
            }
            Err(error) => {
                lock_state(&self.state).book.record_error(error.message());
                self.context.report_failure(&error);
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{ErrorBody, Method, NoticeLevel, RemoteApiError};
    use crate::test_support::Harness;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[tokio::test]
    async fn names_are_loaded_and_cached() {
        let harness = Harness::anonymous();
        let store = LocationStore::new(harness.context());
        harness.api.push_ok(
            200,
            "",
            Some(json!(["Aceh - Kabupaten Aceh Barat", "Bali - Kabupaten Badung"])),
        );

        let names = store.load().await.expect("load succeeds");

        assert_eq!(names.len(), 2);
        assert_eq!(store.locations(), names);
        let sent = harness.api.last_request().expect("request recorded");
        assert_eq!(sent.method(), Method::Get);
        assert_eq!(sent.path(), "/locations");
        assert_eq!(
            harness.notifier.messages(NoticeLevel::Success),
            ["Location list loaded successfully."]
        );
        assert!(!store.is_loading());
    }

    #[rstest]
    #[tokio::test]
    async fn failed_load_keeps_previous_names() {
        let harness = Harness::anonymous();
        let store = LocationStore::new(harness.context());
        harness.api.push_ok(200, "ok", Some(json!(["Ubud"])));
        harness.api.push_err(RemoteApiError::Rejected {
            status: 500,
            body: Some(ErrorBody::Json(json!({ "error": "Internal Server Error" }))),
        });
        store.load().await.expect("first load succeeds");

        let error = store.load().await.expect_err("second load fails");

        assert_eq!(error.code(), ErrorCode::RemoteFailure);
        assert_eq!(store.locations(), ["Ubud"]);
        assert_eq!(store.last_error().as_deref(), Some("Internal Server Error"));
    }
}
