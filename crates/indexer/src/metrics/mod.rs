pub mod middleware;
pub mod registry;
pub mod sink;

pub use middleware::metrics_middleware;
pub use registry::{GatherError, gather_metric_families, gather_metrics, init};
pub use sink::PrometheusSink;
