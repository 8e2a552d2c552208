//! Runtime glue: configuration, the error taxonomy, telemetry, timing reports,
//! and the `Benchmark` facade callers drive.

pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod telemetry;
