//! Batch aggregation.
//!
//! The engine never decides that a batch failed; it reports one result per
//! dispatched task plus aggregate timing, and exposes the certification
//! predicate (every task unsat) for the caller to apply.

use std::fmt::Write as _;
use std::time::Instant;

use tracing::info;

use reachcert_ir::{ConstraintTask, SolverResult, SymbolicExpressions};
use reachcert_smt::BackendRegistry;

use crate::pool::CancelPolicy;
use crate::worker::{check_task, WorkerRequest};

/// Outcome of one verification batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    /// One result per dispatched task, ordered by task id.
    pub results: Vec<SolverResult>,
    /// Wall-clock duration of the whole batch, in seconds.
    pub total_secs: f64,
    /// Task id that triggered early cancellation, when the policy allowed
    /// short-circuiting.
    pub triggered_by: Option<u32>,
}

impl BatchResult {
    /// The certification predicate: every dispatched task came back unsat
    /// and nothing was cancelled early.
    pub fn is_certified(&self) -> bool {
        self.triggered_by.is_none()
            && !self.results.is_empty()
            && self.results.iter().all(|r| r.verdict == reachcert_ir::Verdict::Unsat)
    }

    pub fn violations(&self) -> impl Iterator<Item = &SolverResult> {
        self.results.iter().filter(|r| r.verdict.is_violation())
    }

    pub fn errors(&self) -> impl Iterator<Item = &SolverResult> {
        self.results.iter().filter(|r| r.verdict.is_error())
    }

    /// Per-task verdict table, one line per result.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            let _ = writeln!(
                out,
                "task {:>3}  {:<24}  {:.3}s",
                result.task_id, result.verdict, result.elapsed_secs
            );
        }
        let _ = writeln!(
            out,
            "total {:.3}s  certified: {}",
            self.total_secs,
            self.is_certified()
        );
        out
    }
}

/// Run a batch sequentially inside the current process.
///
/// Same per-task routine as the worker pool, without the process boundary;
/// used by tests and single-process callers.
pub fn check_batch_in_process(
    registry: &BackendRegistry,
    backend: &str,
    tasks: &[ConstraintTask],
    expressions: &SymbolicExpressions,
    cancel_policy: CancelPolicy,
) -> BatchResult {
    let started = Instant::now();
    let mut results = Vec::with_capacity(tasks.len());
    let mut triggered_by = None;
    for task in tasks {
        let request = WorkerRequest {
            backend: backend.to_string(),
            task: task.clone(),
            expressions: expressions.clone(),
        };
        let result = check_task(registry, &request);
        let violated = result.verdict.is_violation();
        results.push(result);
        if violated && cancel_policy == CancelPolicy::StopOnFirstViolation {
            triggered_by = Some(task.id);
            break;
        }
    }
    let batch = BatchResult {
        results,
        total_secs: started.elapsed().as_secs_f64(),
        triggered_by,
    };
    info!(
        tasks = tasks.len(),
        results = batch.results.len(),
        certified = batch.is_certified(),
        total_secs = batch.total_secs,
        "batch finished"
    );
    batch
}
