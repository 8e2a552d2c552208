//! Worker pool split across focused submodules:
//! - `protocol`: task request/response contract and its wire shape
//! - `worker`: the isolated worker thread and its caller-side handle
//! - `manager`: pool lifecycle (create, resize, terminate)
//! - `tests`: pool and worker tests

mod manager;
mod protocol;
mod worker;


pub use manager::{
    clamp_pool_size, WorkerPool, WorkerPoolParams, DEFAULT_POOL_SIZE, MAX_POOL_SIZE,
    MIN_POOL_SIZE,
};
pub use protocol::{WorkerTaskRequest, WorkerTaskResponse};
pub use worker::{WorkerEvent, WorkerHandle};
