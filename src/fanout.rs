//! Fan-out strategies: direct concurrent calls on the caller's context and
//! the distributed orchestrator that spreads calls over the worker pool.

pub mod batch;
pub mod direct;
pub mod distributed;
pub mod partition;

pub use batch::BatchResult;
pub use direct::DirectFanout;
pub use distributed::DistributedFanout;
pub use partition::partition;
