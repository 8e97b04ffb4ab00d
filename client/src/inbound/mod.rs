//! Inbound adapters: translate requests from the driving side into domain
//! calls.

pub mod navigation;
