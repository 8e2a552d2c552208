pub mod fanout;
pub mod pool;
pub mod relay;
pub mod remote;
pub mod runtime;

pub use fanout::{partition, BatchResult, DirectFanout, DistributedFanout};
pub use pool::{
    WorkerEvent, WorkerHandle, WorkerPool, WorkerPoolParams, WorkerTaskRequest,
    WorkerTaskResponse,
};
pub use relay::RelayServer;
pub use remote::{
    CallResult, CallUnit, EndpointFactory, EndpointMetricsSnapshot, HttpEndpoint,
    HttpEndpointFactory, HttpEndpointOptions, RemoteEndpoint,
};
pub use runtime::config::{BenchConfig, BenchConfigBuilder, BenchConfigParams};
pub use runtime::error::BenchError;
pub use runtime::report::{Comparison, Strategy, StrategyRun};
pub use runtime::runner::Benchmark;
pub use runtime::telemetry::{init_tracing, Telemetry, TelemetrySnapshot};
