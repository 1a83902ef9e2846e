//! Render job execution.
//!
//! This crate provides:
//! - The job executor driving one job through its lifecycle states
//! - Retry and delete guards
//! - The synchronous run-now operation over a set of jobs
//! - Structured job logging
//!
//! There is no internal polling loop or worker pool: each execution is an
//! externally triggered unit of work, and the host decides when and how
//! concurrently to run queued jobs.

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use logging::JobLogger;
