//! Session store: login, registration, logout, expiry and restore.
//!
//! The in-memory session and durable storage are kept in step. Storage is
//! written before memory on login, and cleared before memory on logout, so a
//! crash between the two can only lose a session, never resurrect one.

use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::credentials::{LoginCredentials, RegistrationRequest};
use super::identity::{AuthToken, Identity};
use super::state::Session;
use crate::domain::envelope::{EnvelopeVerdict, error_from_transport, soft_failure_error};
use crate::domain::error::{DomainError, ErrorCode};
use crate::domain::ports::{
    ApiRequest, KeyValueStorage, Notice, Notifier, RemoteApi, RemoteApiError,
};
use crate::domain::tracking::{Bookkeeping, InFlight, Tracked, lock_state};

/// Storage key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the serialised identity.
pub const USER_KEY: &str = "user";
/// Login endpoint, relative to the auth service base URL.
pub const LOGIN_PATH: &str = "/auth/login";
/// Registration endpoint, relative to the auth service base URL.
pub const REGISTER_PATH: &str = "/auth/register";
/// Notice shown when an authenticated session is dropped by the client.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired, please log in again";

const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";
const REGISTER_SUCCESS_MESSAGE: &str = "Registration successful";
const LOGOUT_MESSAGE: &str = "Logout successful";
const INCOMPLETE_GRANT_MESSAGE: &str = "Login response did not include a session";

/// Login payload: the token plus the identity fields, flattened.
#[derive(Deserialize)]
struct LoginGrant {
    token: String,
    #[serde(flatten)]
    identity: Identity,
}

#[derive(Default)]
struct SessionState {
    session: Session,
    book: Bookkeeping,
}

impl Tracked for SessionState {
    fn bookkeeping(&mut self) -> &mut Bookkeeping {
        &mut self.book
    }
}

/// Owns the current session and its durable copy.
pub struct SessionStore {
    state: Mutex<SessionState>,
    auth_api: Arc<dyn RemoteApi>,
    storage: Arc<dyn KeyValueStorage>,
    notifier: Arc<dyn Notifier>,
}

impl SessionStore {
    /// Create an anonymous store without reading storage.
    pub fn new(
        auth_api: Arc<dyn RemoteApi>,
        storage: Arc<dyn KeyValueStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            auth_api,
            storage,
            notifier,
        }
    }

    /// Create a store and rehydrate it from durable storage.
    pub fn restore(
        auth_api: Arc<dyn RemoteApi>,
        storage: Arc<dyn KeyValueStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store = Self::new(auth_api, storage, notifier);
        store.rehydrate();
        store
    }

    /// Reload the session from durable storage.
    ///
    /// A token without an identity (or the reverse), or an identity that does
    /// not parse, is discarded and storage is cleared. Storage read failures
    /// leave the session anonymous.
    pub fn rehydrate(&self) -> Session {
        let session = match self.read_stored() {
            Ok(Some(session)) => session,
            Ok(None) => Session::anonymous(),
            Err(reason) => {
                warn!(%reason, "discarding unusable stored session");
                self.clear_storage();
                Session::anonymous()
            }
        };
        if let Some(token) = session.token() {
            debug!(token = %token.fingerprint(), "session restored from storage");
        }
        lock_state(&self.state).session = session.clone();
        session
    }

    fn read_stored(&self) -> Result<Option<Session>, String> {
        let token = self.read_key(TOKEN_KEY);
        let user = self.read_key(USER_KEY);
        match (token, user) {
            (None, None) => Ok(None),
            (Some(raw_token), Some(raw_user)) => {
                let token = AuthToken::new(raw_token).map_err(|error| error.to_string())?;
                let identity = serde_json::from_str::<Identity>(&raw_user)
                    .map_err(|error| format!("stored identity is invalid: {error}"))?;
                Ok(Some(Session::authenticated(token, identity)))
            }
            (Some(_), None) => Err("token stored without an identity".to_owned()),
            (None, Some(_)) => Err("identity stored without a token".to_owned()),
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        self.storage.get(key).unwrap_or_else(|error| {
            warn!(key, %error, "failed to read session storage");
            None
        })
    }

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session {
        lock_state(&self.state).session.clone()
    }

    /// Whether a session is established.
    pub fn is_authenticated(&self) -> bool {
        lock_state(&self.state).session.is_authenticated()
    }

    /// The current user, if any.
    pub fn current_user(&self) -> Option<Identity> {
        lock_state(&self.state).session.identity().cloned()
    }

    /// The current bearer token, read at call time.
    pub fn token(&self) -> Option<AuthToken> {
        lock_state(&self.state).session.token().cloned()
    }

    /// Whether a login or registration is running.
    pub fn is_loading(&self) -> bool {
        lock_state(&self.state).book.is_loading()
    }

    /// Message of the last failed login or registration.
    pub fn last_error(&self) -> Option<String> {
        lock_state(&self.state).book.last_error().map(str::to_owned)
    }

    /// Exchange credentials for a session.
    ///
    /// On success the token and identity are written to storage first and
    /// then to memory, and a success notice is emitted. On any failure the
    /// previous session is left untouched and an error notice carries the
    /// server's message.
    ///
    /// # Errors
    ///
    /// - [`ErrorCode::Unauthorized`] when the service rejects the
    ///   credentials, reports a logical failure, or omits the token or
    ///   identity.
    /// - [`ErrorCode::ServiceUnavailable`] when the service is unreachable.
    /// - [`ErrorCode::Storage`] when the session cannot be persisted.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Session, DomainError> {
        let _flight = InFlight::begin(&self.state);
        match self.authenticate(credentials).await {
            Ok((session, message)) => {
                self.notifier.notify(Notice::success(message));
                Ok(session)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<(Session, String), DomainError> {
        let request = ApiRequest::post(LOGIN_PATH)
            .with_json(&credentials.payload())
            .map_err(|error| DomainError::internal(format!("failed to encode login: {error}")))?;
        let reply = self
            .auth_api
            .send(request)
            .await
            .map_err(|failure| auth_failure(&failure))?;

        let message = match EnvelopeVerdict::judge(&reply, false, LOGIN_SUCCESS_MESSAGE) {
            EnvelopeVerdict::Success { message } => message,
            EnvelopeVerdict::SoftFailure { status, message } => {
                return Err(DomainError::unauthorized(message).with_status(status));
            }
        };

        let grant = decode_grant(reply.envelope.data)?;
        let token = AuthToken::new(grant.token)
            .map_err(|_| DomainError::unauthorized(INCOMPLETE_GRANT_MESSAGE))?;
        self.persist(&token, &grant.identity)?;

        info!(
            user_id = %grant.identity.id(),
            token = %token.fingerprint(),
            "session established"
        );
        let session = Session::authenticated(token, grant.identity);
        lock_state(&self.state).session = session.clone();
        Ok((session, message))
    }

    fn persist(&self, token: &AuthToken, identity: &Identity) -> Result<(), DomainError> {
        let user = serde_json::to_string(identity)
            .map_err(|error| DomainError::internal(format!("failed to encode identity: {error}")))?;
        let entries = vec![
            (TOKEN_KEY.to_owned(), token.expose().to_owned()),
            (USER_KEY.to_owned(), user),
        ];
        self.storage.set_many(entries).map_err(|error| {
            warn!(%error, "failed to persist session; stored session left as it was");
            DomainError::storage(format!("Could not save the session: {error}"))
        })
    }

    /// Create an account. The current session is not changed.
    ///
    /// # Errors
    ///
    /// Returns the normalised remote failure, or the envelope message when
    /// the service reports a logical failure.
    pub async fn register(&self, request: &RegistrationRequest) -> Result<String, DomainError> {
        let _flight = InFlight::begin(&self.state);
        match self.submit_registration(request).await {
            Ok(message) => {
                self.notifier.notify(Notice::success(message.clone()));
                Ok(message)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    async fn submit_registration(
        &self,
        request: &RegistrationRequest,
    ) -> Result<String, DomainError> {
        let api_request = ApiRequest::post(REGISTER_PATH)
            .with_json(&request.payload())
            .map_err(|error| {
                DomainError::internal(format!("failed to encode registration: {error}"))
            })?;
        let reply = self
            .auth_api
            .send(api_request)
            .await
            .map_err(|failure| error_from_transport(&failure))?;
        match EnvelopeVerdict::judge(&reply, true, REGISTER_SUCCESS_MESSAGE) {
            EnvelopeVerdict::Success { message } => {
                info!(email = request.email(), "account registered");
                Ok(message)
            }
            EnvelopeVerdict::SoftFailure { status, message } => {
                Err(soft_failure_error(status, &message))
            }
        }
    }

    /// End the session. Never fails; storage errors are logged.
    pub fn logout(&self) {
        self.drop_session();
        info!("session closed");
        self.notifier.notify(Notice::success(LOGOUT_MESSAGE));
    }

    /// Drop an authenticated session after the service rejected its token.
    ///
    /// Does nothing when already anonymous, so concurrent failures produce a
    /// single notice.
    pub fn expire(&self) {
        if !self.is_authenticated() {
            return;
        }
        self.drop_session();
        warn!("session expired");
        self.notifier.notify(Notice::error(SESSION_EXPIRED_MESSAGE));
    }

    fn drop_session(&self) {
        self.clear_storage();
        lock_state(&self.state).session = Session::anonymous();
    }

    fn clear_storage(&self) {
        if let Err(error) = self.storage.clear() {
            warn!(%error, "failed to clear session storage");
        }
    }

    fn fail(&self, error: DomainError) -> DomainError {
        lock_state(&self.state).book.record_error(error.message());
        self.notifier.notify(Notice::error(error.message()));
        error
    }
}

fn auth_failure(failure: &RemoteApiError) -> DomainError {
    let error = error_from_transport(failure);
    match failure {
        RemoteApiError::Rejected { status, .. } => {
            DomainError::new(ErrorCode::Unauthorized, error.message()).with_status(*status)
        }
        RemoteApiError::Unreachable { .. } | RemoteApiError::Decode { .. } => error,
    }
}

fn decode_grant(data: Option<Value>) -> Result<LoginGrant, DomainError> {
    data.filter(|value| !value.is_null())
        .ok_or_else(|| DomainError::unauthorized(INCOMPLETE_GRANT_MESSAGE))
        .and_then(|value| {
            serde_json::from_value(value).map_err(|error| {
                debug!(%error, "login payload did not decode");
                DomainError::unauthorized(INCOMPLETE_GRANT_MESSAGE)
            })
        })
}
