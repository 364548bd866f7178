// Domain models: normalized records handed to the HTTP layer

mod envelope;
mod node;
mod service;

pub use envelope::{AggregationResult, Source};
pub use node::NodeResourceSample;
pub use service::{
    Incident, MonitoredService, ResponseTimePoint, ServiceStatus, UptimeRatios,
};
