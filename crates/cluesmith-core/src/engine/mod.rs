//! Concurrent execution of planned work.

pub mod runner;

pub use runner::Orchestrator;
