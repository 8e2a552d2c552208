#[path = "../support/mod.rs"]
mod support;

mod benchmark;
mod relay;
