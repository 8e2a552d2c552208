//! Remote call plumbing: the endpoint seam, the reqwest-backed HTTP client,
//! its options and metrics, and the call unit that adds the fixed processing
//! cost on top of each response.

pub mod call_unit;
pub mod endpoint;
pub mod metrics;
pub mod options;

pub use call_unit::{CallResult, CallUnit};
pub use endpoint::{EndpointFactory, HttpEndpoint, HttpEndpointFactory, RemoteEndpoint};
pub use metrics::EndpointMetricsSnapshot;
pub use options::HttpEndpointOptions;
