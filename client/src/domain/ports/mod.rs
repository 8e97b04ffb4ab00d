//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod key_value_storage;
mod notifier;
mod remote_api;

pub use key_value_storage::{KeyValueStorage, StorageError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{Notice, NoticeLevel, Notifier};
#[cfg(test)]
pub use remote_api::MockRemoteApi;
pub use remote_api::{ApiReply, ApiRequest, ErrorBody, Method, RemoteApi, RemoteApiError};
