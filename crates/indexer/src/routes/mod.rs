pub mod events;
pub mod health;
pub mod metrics;
pub mod registry;
pub mod root;
pub mod vaults;

pub use registry::{API_VERSION, RegisterRoute, RouteInfo, RouteRegistry};
