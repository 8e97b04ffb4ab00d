//! Behaviour tests for the cached resource stores.
//!
//! Scenarios drive the activity store against a scripted remote API so the
//! failure policies and listing bookkeeping can be observed step by step.

use std::cell::RefCell;

use client::domain::ports::{ErrorBody, NoticeLevel, RemoteApiError};
use client::domain::{
    Activity, AuthFailurePolicy, DomainError, ErrorCode, ResourceStore, SoftFailurePolicy,
    StorePolicy,
};
use client::test_support::{Harness, envelope, identity};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use tokio::runtime::Runtime;

struct CacheWorld {
    runtime: Runtime,
    harness: RefCell<Harness>,
    policy: RefCell<StorePolicy>,
    outcome: RefCell<Option<Result<Vec<Activity>, DomainError>>>,
    store: RefCell<Option<ResourceStore<Activity>>>,
}

impl CacheWorld {
    fn new() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        Self {
            runtime,
            harness: RefCell::new(Harness::anonymous()),
            policy: RefCell::new(StorePolicy::default()),
            outcome: RefCell::new(None),
            store: RefCell::new(None),
        }
    }

    /// The store under test, built on first use with the configured policy.
    fn with_store<T>(&self, f: impl FnOnce(&ResourceStore<Activity>) -> T) -> T {
        let mut slot = self.store.borrow_mut();
        let store = slot.get_or_insert_with(|| {
            let context = self.harness.borrow().context().with_policy(*self.policy.borrow());
            ResourceStore::new(context)
        });
        f(store)
    }

    fn outcome(&self) -> Result<Vec<Activity>, DomainError> {
        self.outcome
            .borrow()
            .clone()
            .expect("a load should have been attempted")
    }
}

fn activity(id: &str) -> Value {
    json!({
        "id": id,
        "activityName": format!("Activity {id}"),
        "activityType": "TOUR",
        "price": 100.0,
        "capacity": 10,
        "startLocation": "Ubud",
        "endLocation": "Ubud",
        "startDate": "2025-05-01T09:00:00",
        "endDate": "2025-05-01T12:00:00"
    })
}

fn id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect()
}

fn code_named(name: &str) -> ErrorCode {
    match name {
        "Unauthorized" => ErrorCode::Unauthorized,
        "Conflict" => ErrorCode::Conflict,
        "NotFound" => ErrorCode::NotFound,
        "InvalidRequest" => ErrorCode::InvalidRequest,
        other => panic!("unsupported error code in scenario: {other}"),
    }
}

#[fixture]
fn world() -> CacheWorld {
    CacheWorld::new()
}

#[given("a signed-in vendor")]
fn a_signed_in_vendor(world: &CacheWorld) {
    *world.harness.borrow_mut() = Harness::signed_in("tok", &identity("v1", "TourPackageVendor"));
}

#[given("soft failures are rejected")]
fn soft_failures_are_rejected(world: &CacheWorld) {
    world.policy.borrow_mut().soft_failure = SoftFailurePolicy::Reject;
}

#[given("forced logout on rejected tokens")]
fn forced_logout_on_rejected_tokens(world: &CacheWorld) {
    world.policy.borrow_mut().auth_failure = AuthFailurePolicy::ForceLogout;
}

#[given("the service lists activities {ids}")]
fn the_service_lists_activities(world: &CacheWorld, ids: String) {
    let data: Vec<Value> = id_list(&ids).iter().map(|id| activity(id)).collect();
    world
        .harness
        .borrow()
        .api
        .push_ok(200, "Activities fetched", Some(Value::Array(data)));
}

#[given("the service reports status {status} with message {message}")]
fn the_service_reports_status(world: &CacheWorld, status: u16, message: String) {
    world.harness.borrow().api.push_ok(status, &message, None);
}

#[given("the service rejects the token")]
fn the_service_rejects_the_token(world: &CacheWorld) {
    world.harness.borrow().api.push_err(RemoteApiError::Rejected {
        status: 401,
        body: Some(ErrorBody::Json(json!({ "message": "Token expired" }))),
    });
}

#[when("the activity list is loaded")]
fn the_activity_list_is_loaded(world: &CacheWorld) {
    let outcome = world.with_store(|store| world.runtime.block_on(store.list()));
    *world.outcome.borrow_mut() = Some(outcome);
}

#[when("two listings overlap and the older one resolves last")]
fn two_listings_overlap(world: &CacheWorld) {
    let (release_older, release_newer) = {
        let harness = world.harness.borrow();
        let older = harness.api.push_gated(Ok(envelope(
            200,
            "older",
            Some(json!([activity("older")])),
        )));
        let newer = harness.api.push_gated(Ok(envelope(
            200,
            "newer",
            Some(json!([activity("newer")])),
        )));
        (older, newer)
    };
    world.with_store(|store| {
        world.runtime.block_on(async {
            let releases = async move {
                let _ = release_newer.send(());
                tokio::task::yield_now().await;
                let _ = release_older.send(());
            };
            let (older, newer, ()) = tokio::join!(store.list(), store.list(), releases);
            older.expect("older listing resolves");
            newer.expect("newer listing resolves");
        });
    });
}

#[then("the load succeeds")]
fn the_load_succeeds(world: &CacheWorld) {
    assert!(world.outcome().is_ok(), "expected success, got {:?}", world.outcome());
}

#[then("the load fails with code {code}")]
fn the_load_fails_with_code(world: &CacheWorld, code: String) {
    let error = world.outcome().expect_err("load should fail");
    assert_eq!(error.code(), code_named(&code));
    world.with_store(|store| {
        assert_eq!(store.last_error().as_deref(), Some(error.message()));
        assert!(!store.is_loading());
    });
}

#[then("the cache holds activities {ids}")]
fn the_cache_holds_activities(world: &CacheWorld, ids: String) {
    let cached: Vec<String> = world.with_store(|store| {
        store
            .items()
            .iter()
            .map(|item| item.id.as_ref().to_owned())
            .collect()
    });
    assert_eq!(cached, id_list(&ids));
}

#[then("the cache holds no activities")]
fn the_cache_holds_no_activities(world: &CacheWorld) {
    assert!(world.with_store(ResourceStore::items).is_empty());
}

#[then("the error notice reads {message}")]
fn the_error_notice_reads(world: &CacheWorld, message: String) {
    let notices = world.harness.borrow().notifier.messages(NoticeLevel::Error);
    assert_eq!(notices, [message]);
}

#[then("the session is still active")]
fn the_session_is_still_active(world: &CacheWorld) {
    assert!(world.harness.borrow().session.is_authenticated());
}

#[then("the session has ended")]
fn the_session_has_ended(world: &CacheWorld) {
    let harness = world.harness.borrow();
    assert!(!harness.session.is_authenticated());
    assert!(harness.storage.entries().is_empty());
}

#[scenario(path = "tests/features/resource_cache.feature")]
fn resource_cache_scenarios(world: CacheWorld) {
    drop(world);
}
