//! HTTP adapter for the remote REST service.

mod remote_api;

pub use remote_api::HttpRemoteApi;
