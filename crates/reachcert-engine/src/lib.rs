#![doc = include_str!("../README.md")]

pub mod batch;
pub mod counterexample;
pub mod decompose;
pub mod pool;
pub mod rebuild;
pub mod worker;

pub use batch::{check_batch_in_process, BatchResult};
pub use counterexample::parse_counterexample;
pub use decompose::{prepare_constraint_batch, BatchConfig, ConfigError};
pub use pool::{sibling_worker_command, CancelPolicy, WorkerPool};
pub use rebuild::{rebuild_constraint, RebuildError};
pub use worker::{check_task, declare_variables, WorkerRequest};
