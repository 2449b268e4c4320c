//! Process worker pool.
//!
//! Native solver libraries are not safely shared across threads and their
//! expression objects do not survive a process boundary, so each task runs
//! in its own OS process: a fixed-size set of dispatcher threads drains the
//! task queue, spawning one worker process per task and exchanging only
//! JSON. Results arrive in any order and are reindexed by task id.

use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Instant;

use tracing::{debug, warn};

use reachcert_ir::{ConstraintTask, SolverResult, SymbolicExpressions};

use crate::batch::BatchResult;
use crate::worker::WorkerRequest;

/// What to do when a task reports a violation.
///
/// Certification requires every task to come back `unsat`, so
/// `RunToCompletion` is the only sound default. `StopOnFirstViolation` is
/// for callers that only need existence of a violation; undispatched tasks
/// are dropped and the triggering task id is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelPolicy {
    #[default]
    RunToCompletion,
    StopOnFirstViolation,
}

pub struct WorkerPool {
    worker_command: PathBuf,
    workers: usize,
    cancel_policy: CancelPolicy,
}

impl WorkerPool {
    pub fn new(worker_command: impl Into<PathBuf>, workers: usize) -> Self {
        Self {
            worker_command: worker_command.into(),
            workers: workers.max(1),
            cancel_policy: CancelPolicy::default(),
        }
    }

    pub fn with_cancel_policy(mut self, cancel_policy: CancelPolicy) -> Self {
        self.cancel_policy = cancel_policy;
        self
    }

    /// Dispatch every task to a worker process and gather one result per
    /// dispatched task, reindexed by id.
    pub fn check_batch(
        &self,
        backend: &str,
        tasks: &[ConstraintTask],
        expressions: &SymbolicExpressions,
    ) -> BatchResult {
        let started = Instant::now();
        let queue: Mutex<VecDeque<ConstraintTask>> = Mutex::new(tasks.to_vec().into());
        let stop = AtomicBool::new(false);
        let triggered: Mutex<Option<u32>> = Mutex::new(None);
        let (sender, receiver) = mpsc::channel::<SolverResult>();

        std::thread::scope(|scope| {
            for _ in 0..self.workers {
                let sender = sender.clone();
                let queue = &queue;
                let stop = &stop;
                let triggered = &triggered;
                scope.spawn(move || loop {
                    if stop.load(Ordering::SeqCst) {
                        break;
                    }
                    let task = match queue.lock() {
                        Ok(mut queue) => queue.pop_front(),
                        Err(_) => break,
                    };
                    let Some(task) = task else { break };

                    let request = WorkerRequest {
                        backend: backend.to_string(),
                        task,
                        expressions: expressions.clone(),
                    };
                    let result = run_worker_process(&self.worker_command, &request);
                    if result.verdict.is_violation()
                        && self.cancel_policy == CancelPolicy::StopOnFirstViolation
                    {
                        stop.store(true, Ordering::SeqCst);
                        if let Ok(mut triggered) = triggered.lock() {
                            triggered.get_or_insert(result.task_id);
                        }
                    }
                    if sender.send(result).is_err() {
                        break;
                    }
                });
            }
        });
        drop(sender);

        let mut results: Vec<SolverResult> = receiver.iter().collect();
        results.sort_by_key(|r| r.task_id);
        let triggered_by = triggered.lock().map(|t| *t).unwrap_or(None);
        BatchResult {
            results,
            total_secs: started.elapsed().as_secs_f64(),
            triggered_by,
        }
    }
}

/// Run one worker process: request JSON on stdin, result JSON on stdout.
/// Any process or protocol failure becomes an error result for the task.
fn run_worker_process(worker_command: &PathBuf, request: &WorkerRequest) -> SolverResult {
    let task_id = request.task.id;
    debug!(task = task_id, worker = %worker_command.display(), "spawning worker process");

    let spawned = Command::new(worker_command)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(err) => {
            warn!(task = task_id, error = %err, "failed to spawn worker");
            return SolverResult::error(task_id, format!("failed to spawn worker: {err}"));
        }
    };

    let payload = match serde_json::to_vec(request) {
        Ok(payload) => payload,
        Err(err) => return SolverResult::error(task_id, format!("request encoding failed: {err}")),
    };
    if let Some(stdin) = child.stdin.as_mut() {
        if let Err(err) = stdin.write_all(&payload) {
            let _ = child.kill();
            return SolverResult::error(task_id, format!("failed to write to worker: {err}"));
        }
    }
    drop(child.stdin.take());

    let output = match child.wait_with_output() {
        Ok(output) => output,
        Err(err) => return SolverResult::error(task_id, format!("worker wait failed: {err}")),
    };
    match serde_json::from_slice::<SolverResult>(&output.stdout) {
        Ok(result) => result,
        Err(err) => {
            warn!(task = task_id, error = %err, "malformed worker output");
            SolverResult::error(task_id, format!("malformed worker output: {err}"))
        }
    }
}

/// Path of the worker binary installed next to the current executable.
///
/// Test binaries live one level down in `deps/`, so that segment is
/// stripped when present.
pub fn sibling_worker_command() -> std::io::Result<PathBuf> {
    let mut path = std::env::current_exe()?;
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("reachcert-worker");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use reachcert_ir::{ConstraintType, ReachMode, SetType, TIME_PARTIAL};

    fn one_task() -> ConstraintTask {
        ConstraintTask::new(
            1,
            ConstraintType::Boundary1,
            true,
            1,
            0.1,
            0.001,
            ReachMode::Forward,
            SetType::Set,
            (0.0, 0.0),
        )
    }

    fn expressions() -> SymbolicExpressions {
        let mut partials = IndexMap::new();
        partials.insert(TIME_PARTIAL.to_string(), "0".to_string());
        SymbolicExpressions {
            value_fn: "x_1_2".into(),
            boundary_fn: "0".into(),
            hamiltonian: "0".into(),
            partials,
        }
    }

    #[test]
    fn missing_worker_binary_yields_error_results_not_panics() {
        let pool = WorkerPool::new("/nonexistent/reachcert-worker", 2);
        let batch = pool.check_batch("dreal", &[one_task()], &expressions());
        assert_eq!(batch.results.len(), 1);
        assert!(batch.results[0].verdict.is_error());
        assert!(batch.results[0]
            .verdict
            .to_string()
            .contains("failed to spawn worker"));
        assert_eq!(batch.triggered_by, None);
    }

    #[test]
    fn worker_count_is_clamped_to_one() {
        let pool = WorkerPool::new("/nonexistent/reachcert-worker", 0);
        let batch = pool.check_batch("dreal", &[one_task()], &expressions());
        assert_eq!(batch.results.len(), 1);
    }
}
