//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod dispatch_metrics;
mod transport;

#[cfg(test)]
pub use dispatch_metrics::MockDispatchMetrics;
pub use dispatch_metrics::{
    DispatchMetrics, DispatchMetricsError, DispatchOutcomeLabel, DispatchRecord,
    NoOpDispatchMetrics,
};
#[cfg(test)]
pub use transport::MockTransport;
pub use transport::{Transport, TransportError};
