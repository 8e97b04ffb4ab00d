//! Client settings loaded via OrthoConfig.
//!
//! Every value can come from `PORTAL_*` environment variables or a
//! configuration file; unset values fall back to the defaults below.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{AuthFailurePolicy, SoftFailurePolicy, StorePolicy};
use crate::inbound::navigation::RedirectPaths;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_AUTH_URL: &str = "http://localhost:8082/api";
const DEFAULT_STORAGE_DIR: &str = ".portal";

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A URL setting did not parse.
    #[error("{field} is not a valid URL: {source}")]
    InvalidUrl {
        /// Setting name.
        field: &'static str,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
}

/// Configuration for the portal client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct ClientSettings {
    /// Base URL of the resource API.
    pub api_url: Option<String>,
    /// Base URL of the authentication API.
    pub auth_url: Option<String>,
    /// Directory holding the persisted session.
    pub storage_dir: Option<PathBuf>,
    /// Per-request timeout in seconds; unset means no timeout.
    pub request_timeout_secs: Option<u64>,
    /// Drop the session when any action is rejected with 401.
    #[ortho_config(default = false)]
    pub force_logout_on_auth_failure: bool,
    /// Treat logical failures in 2xx replies as errors.
    #[ortho_config(default = false)]
    pub reject_soft_failures: bool,
    /// Path of the login page.
    pub login_path: Option<String>,
    /// Path of the landing page.
    pub home_path: Option<String>,
    /// Path of the own-profile page.
    pub profile_path: Option<String>,
}

impl ClientSettings {
    /// Resource API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the value does not parse.
    pub fn api_url(&self) -> Result<Url, SettingsError> {
        parse_url("api_url", self.api_url.as_deref().unwrap_or(DEFAULT_API_URL))
    }

    /// Authentication API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUrl`] when the value does not parse.
    pub fn auth_url(&self) -> Result<Url, SettingsError> {
        parse_url("auth_url", self.auth_url.as_deref().unwrap_or(DEFAULT_AUTH_URL))
    }

    /// Session storage directory.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
    }

    /// Request timeout, if any. Zero counts as unset.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Failure policies for the resource stores.
    pub const fn store_policy(&self) -> StorePolicy {
        StorePolicy {
            auth_failure: if self.force_logout_on_auth_failure {
                AuthFailurePolicy::ForceLogout
            } else {
                AuthFailurePolicy::Retain
            },
            soft_failure: if self.reject_soft_failures {
                SoftFailurePolicy::Reject
            } else {
                SoftFailurePolicy::Notify
            },
        }
    }

    /// Paths used for navigation redirects.
    pub fn redirect_paths(&self) -> RedirectPaths {
        let defaults = RedirectPaths::default();
        RedirectPaths {
            home: self.home_path.clone().unwrap_or(defaults.home),
            login: self.login_path.clone().unwrap_or(defaults.login),
            profile: self.profile_path.clone().unwrap_or(defaults.profile),
        }
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw).map_err(|source| SettingsError::InvalidUrl { field, source })
}
