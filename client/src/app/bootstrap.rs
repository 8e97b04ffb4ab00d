//! Build an [`AppContext`] from settings with the production adapters.

use std::sync::Arc;

use tracing::info;

use super::{AppContext, ClientPorts};
use crate::config::{ClientSettings, SettingsError};
use crate::domain::ports::StorageError;
use crate::inbound::navigation::RouteTable;
use crate::outbound::http::HttpRemoteApi;
use crate::outbound::notify::TracingNotifier;
use crate::outbound::storage::FileStorage;

/// Failures while wiring the production adapters.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Settings could not be interpreted.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    /// The session directory could not be opened.
    #[error("failed to open session storage: {0}")]
    Storage(#[from] StorageError),
}

/// Assemble the context with reqwest, file storage and the tracing notifier.
///
/// # Errors
///
/// Returns [`BootstrapError`] when a URL is invalid, the HTTP client cannot
/// be built or the storage directory cannot be opened.
pub fn build_context(
    settings: &ClientSettings,
    routes: RouteTable,
) -> Result<AppContext, BootstrapError> {
    let timeout = settings.request_timeout();
    let api_url = settings.api_url()?;
    let auth_url = settings.auth_url()?;
    let storage_dir = settings.storage_dir();
    info!(
        api_url = %api_url,
        auth_url = %auth_url,
        storage_dir = %storage_dir.display(),
        "bootstrapping portal client"
    );
    let ports = ClientPorts {
        api: Arc::new(HttpRemoteApi::new(api_url, timeout)?),
        auth_api: Arc::new(HttpRemoteApi::new(auth_url, timeout)?),
        storage: Arc::new(FileStorage::open(&storage_dir)?),
        notifier: Arc::new(TracingNotifier::new()),
    };
    Ok(AppContext::assemble(
        ports,
        settings.store_policy(),
        routes,
        settings.redirect_paths(),
    ))
}
