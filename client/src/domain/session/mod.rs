//! Session lifecycle: credentials, identity, roles and the session store.

mod credentials;
mod identity;
mod role;
mod state;
mod store;

pub use credentials::{
    CredentialsValidationError, LoginCredentials, RegistrationDraft, RegistrationRequest,
};
pub(crate) use identity::RawId;
pub use identity::{AuthToken, Identity, SessionValidationError, UserId};
pub use role::{Role, UnknownRole, normalize_role_name};
pub use state::Session;
pub use store::{
    LOGIN_PATH, REGISTER_PATH, SESSION_EXPIRED_MESSAGE, SessionStore, TOKEN_KEY, USER_KEY,
};
