//! Client-side session, authorization and resource-cache layer for the
//! travel package booking portal.
//!
//! The crate follows a hexagonal layout:
//! - [`domain`] holds the session store, the access engine, the envelope
//!   normalizer and the cached resource stores, all written against ports.
//! - [`outbound`] provides the reqwest, cap-std and tracing adapters.
//! - [`inbound`] translates navigation attempts into guard decisions.
//! - [`app`] wires adapters into one context per process.

pub mod app;
pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
