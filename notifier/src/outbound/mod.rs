//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **fcm**: Firebase Cloud Messaging transport and its credential wiring
//! - **metrics**: Prometheus-backed dispatch counters (feature-gated)
//!
//! Adapters are thin translators between domain types and provider-specific
//! representations. They contain no dispatch policy.

pub mod fcm;
#[cfg(feature = "metrics")]
pub mod metrics;
