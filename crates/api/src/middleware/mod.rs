//! Request middleware.
//!
//! - [`metrics::track_requests`] -- counts requests by status class and tracks in-flight requests.

pub mod metrics;
