//! Admin push-notification dispatch.
//!
//! Builds provider-neutral envelopes for new orders and new users and delivers
//! them through an optional transport, reporting every delivery outcome as data.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
