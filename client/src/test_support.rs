//! Test doubles shared by unit and integration tests.
//!
//! [`ScriptedApi`] answers requests from a queue of canned replies and records
//! what it was asked. A reply can be gated so the test decides when it
//! resolves, which is how out-of-order completion is reproduced.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::oneshot;

use crate::domain::ports::{
    ApiReply, ApiRequest, KeyValueStorage, Notice, NoticeLevel, Notifier, RemoteApi,
    RemoteApiError, StorageError,
};
use crate::domain::tracking::lock_state;
use crate::domain::{Identity, RemoteEnvelope, SessionStore, StoreContext, UserId};
use crate::outbound::storage::{FileStorage, MemoryStorage};

/// Build an envelope reply with transport status 200.
pub fn envelope(status: u16, message: &str, data: Option<Value>) -> ApiReply {
    envelope_with_http(200, status, message, data)
}

/// Build an envelope reply with an explicit transport status.
pub fn envelope_with_http(
    http_status: u16,
    status: u16,
    message: &str,
    data: Option<Value>,
) -> ApiReply {
    ApiReply::new(
        http_status,
        RemoteEnvelope {
            status,
            message: message.to_owned(),
            data,
        },
    )
}

struct ScriptedReply {
    outcome: Result<ApiReply, RemoteApiError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Remote API double answering from a queue.
#[derive(Default)]
pub struct ScriptedApi {
    script: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedApi {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an immediate reply.
    pub fn push(&self, outcome: Result<ApiReply, RemoteApiError>) {
        lock_state(&self.script).push_back(ScriptedReply {
            outcome,
            gate: None,
        });
    }

    /// Queue a successful envelope.
    pub fn push_ok(&self, status: u16, message: &str, data: Option<Value>) {
        self.push(Ok(envelope(status, message, data)));
    }

    /// Queue a transport failure.
    pub fn push_err(&self, error: RemoteApiError) {
        self.push(Err(error));
    }

    /// Queue a reply that resolves only once the returned sender fires (or is
    /// dropped).
    pub fn push_gated(&self, outcome: Result<ApiReply, RemoteApiError>) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        lock_state(&self.script).push_back(ScriptedReply {
            outcome,
            gate: Some(gate),
        });
        release
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock_state(&self.requests).clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<ApiRequest> {
        lock_state(&self.requests).last().cloned()
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        lock_state(&self.requests).len()
    }
}

#[async_trait]
impl RemoteApi for ScriptedApi {
    async fn send(&self, request: ApiRequest) -> Result<ApiReply, RemoteApiError> {
        lock_state(&self.requests).push(request);
        let next = lock_state(&self.script).pop_front();
        let Some(ScriptedReply { outcome, gate }) = next else {
            return Err(RemoteApiError::unreachable("no scripted reply left"));
        };
        if let Some(receiver) = gate {
            let _released = receiver.await;
        }
        outcome
    }
}

/// Notifier double that keeps every notice.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notice so far.
    pub fn notices(&self) -> Vec<Notice> {
        lock_state(&self.notices).clone()
    }

    /// Messages of notices with the given level.
    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        lock_state(&self.notices)
            .iter()
            .filter(|notice| notice.level == level)
            .map(|notice| notice.message.clone())
            .collect()
    }

    /// Forget recorded notices.
    pub fn clear(&self) {
        lock_state(&self.notices).clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        lock_state(&self.notices).push(notice);
    }
}

/// Storage double whose writes always fail; reads and clears succeed.
#[derive(Debug, Default)]
pub struct ReadOnlyStorage {
    inner: MemoryStorage,
}

impl ReadOnlyStorage {
    /// Empty read-only storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only storage already holding `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            inner: MemoryStorage::with_entries(entries),
        }
    }
}

impl KeyValueStorage for ReadOnlyStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set_many(&self, _entries: Vec<(String, String)>) -> Result<(), StorageError> {
        Err(StorageError::io("storage is read-only"))
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear()
    }
}

/// File storage in a fresh temporary directory. Keep the directory alive for
/// as long as the storage is used.
///
/// # Panics
///
/// Panics when the temporary directory cannot be created.
#[expect(clippy::expect_used, reason = "test fixtures fail fast")]
pub fn temp_file_storage() -> (TempDir, FileStorage) {
    let dir = TempDir::new().expect("temp dir");
    let storage = FileStorage::open(dir.path()).expect("open file storage");
    (dir, storage)
}

/// Identity fixture.
///
/// # Panics
///
/// Panics when `id` is blank.
#[expect(clippy::expect_used, reason = "test fixtures fail fast")]
pub fn identity(id: &str, role_name: &str) -> Identity {
    Identity::new(UserId::new(id).expect("fixture ids are non-blank"), role_name)
        .with_profile(format!("User {id}"), id, format!("{id}@example.com"))
}

/// The JSON payload a successful login returns for `identity`.
///
/// # Panics
///
/// Panics when the identity cannot be serialised.
#[expect(clippy::expect_used, reason = "test fixtures fail fast")]
pub fn login_payload(token: &str, identity: &Identity) -> Value {
    let mut payload = serde_json::to_value(identity).expect("identity serialises");
    if let Value::Object(fields) = &mut payload {
        fields.insert("token".to_owned(), Value::String(token.to_owned()));
    }
    payload
}

/// Everything a store test needs, wired around doubles.
pub struct Harness {
    /// Scripted resource API.
    pub api: Arc<ScriptedApi>,
    /// Scripted authentication API.
    pub auth_api: Arc<ScriptedApi>,
    /// In-memory session storage.
    pub storage: Arc<MemoryStorage>,
    /// Notice recorder.
    pub notifier: Arc<RecordingNotifier>,
    /// Session store using the doubles above.
    pub session: Arc<SessionStore>,
}

impl Harness {
    /// Anonymous harness.
    pub fn anonymous() -> Self {
        Self::with_storage(MemoryStorage::new())
    }

    /// Harness whose session is rehydrated from `storage`.
    pub fn with_storage(storage: MemoryStorage) -> Self {
        let api = Arc::new(ScriptedApi::new());
        let auth_api = Arc::new(ScriptedApi::new());
        let storage = Arc::new(storage);
        let notifier = Arc::new(RecordingNotifier::new());
        let session = Arc::new(SessionStore::restore(
            auth_api.clone(),
            storage.clone(),
            notifier.clone(),
        ));
        Self {
            api,
            auth_api,
            storage,
            notifier,
            session,
        }
    }

    /// Store context over the scripted resource API with default policies.
    pub fn context(&self) -> StoreContext {
        StoreContext::new(self.api.clone(), self.session.clone(), self.notifier.clone())
    }

    /// Harness already signed in as `identity` with `token`.
    ///
    /// # Panics
    ///
    /// Panics when the identity cannot be serialised.
    #[expect(clippy::expect_used, reason = "test fixtures fail fast")]
    pub fn signed_in(token: &str, identity: &Identity) -> Self {
        let user = serde_json::to_string(identity).expect("identity serialises");
        Self::with_storage(MemoryStorage::with_entries([
            ("token", token.to_owned()),
            ("user", user),
        ]))
    }
}
