//! Per-task checking routine and the wire protocol for worker processes.
//!
//! Everything a worker needs arrives as plain data: the task descriptor,
//! the backend name, and the serialized expressions. The worker constructs
//! fresh variables, rebuilds the constraint, runs the backend's check, and
//! reports exactly one result. Every failure class becomes an error result
//! tagged with the task id; nothing here panics or aborts siblings.

use std::time::Instant;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use reachcert_expr::Expr;
use reachcert_ir::{
    partial_var, state_var, ConstraintTask, SolverResult, SymbolicExpressions, Verdict, TIME_PARTIAL,
    TIME_VAR,
};
use reachcert_smt::{BackendRegistry, SolverCapability};

use crate::counterexample::parse_counterexample;
use crate::rebuild::rebuild_constraint;

/// One unit of work as it crosses the process boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRequest {
    pub backend: String,
    pub task: ConstraintTask,
    pub expressions: SymbolicExpressions,
}

/// Fresh variable objects for one task: the time variable, one per state
/// dimension, and one per declared partial-derivative name.
pub fn declare_variables(
    cap: &dyn SolverCapability,
    state_dim: usize,
    expressions: &SymbolicExpressions,
) -> IndexMap<String, Expr> {
    let mut variables = IndexMap::new();
    variables.insert(TIME_VAR.to_string(), cap.variable(TIME_VAR));
    variables.insert(TIME_PARTIAL.to_string(), cap.variable(TIME_PARTIAL));
    for i in 0..state_dim {
        let x = state_var(i);
        variables.insert(x.clone(), cap.variable(&x));
        let p = partial_var(i);
        variables.insert(p.clone(), cap.variable(&p));
    }
    for name in expressions.partials.keys() {
        if !variables.contains_key(name) {
            variables.insert(name.clone(), cap.variable(name));
        }
    }
    variables
}

/// Check one task end to end: resolve the backend, rebuild, run, time.
pub fn check_task(registry: &BackendRegistry, request: &WorkerRequest) -> SolverResult {
    let task = &request.task;
    let started = Instant::now();
    debug!(
        task = task.id,
        backend = %request.backend,
        family = %task.constraint_type,
        "checking constraint task"
    );

    let cap = match registry.get(&request.backend) {
        Ok(cap) => cap,
        Err(err) => {
            warn!(task = task.id, error = %err, "backend lookup failed");
            return SolverResult::error(task.id, err.to_string());
        }
    };

    let variables = declare_variables(cap.as_ref(), task.state_dim(), &request.expressions);
    let formula = match rebuild_constraint(cap.as_ref(), task, &variables, &request.expressions) {
        Ok(formula) => formula,
        Err(err) => {
            warn!(task = task.id, error = %err, "constraint rebuild failed");
            return SolverResult::error(task.id, err.to_string());
        }
    };

    let outcome = cap.check_task(task, &request.expressions, &formula);
    let elapsed_secs = started.elapsed().as_secs_f64();
    let result = match outcome {
        Ok(None) => SolverResult::unsat(task.id, elapsed_secs),
        Ok(Some(witness)) => SolverResult {
            task_id: task.id,
            verdict: Verdict::Sat,
            counterexample: parse_counterexample(&witness),
            witness: Some(witness),
            elapsed_secs,
        },
        Err(err) => SolverResult {
            task_id: task.id,
            verdict: Verdict::Error(err.to_string()),
            witness: None,
            counterexample: None,
            elapsed_secs,
        },
    };
    info!(
        task = task.id,
        verdict = %result.verdict,
        elapsed_secs,
        "constraint task finished"
    );
    result
}
