//! Marabou shim backend.
//!
//! Marabou shares dReal's expression algebra: formulas are built and
//! printed through the host capability, and boundary-style constraint
//! families fall through to the host's satisfiability check. What Marabou
//! owns is the derivative-family queries, which it answers through its own
//! external query command; that command replies either `unsat` or with an
//! unlabeled numeric vector (`[v1, v2, ...]`) as the witness.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::debug;

use reachcert_ir::{ConstraintTask, ConstraintType, SymbolicExpressions};

use crate::capability::{SolverCapability, SolverError};
use crate::formula::Formula;

pub struct MarabouBackend {
    command: String,
    host: Arc<dyn SolverCapability>,
}

impl MarabouBackend {
    pub const DEFAULT_COMMAND: &'static str = "marabou";

    pub fn new(host: Arc<dyn SolverCapability>) -> Self {
        Self::with_command(Self::DEFAULT_COMMAND, host)
    }

    pub fn with_command(command: impl Into<String>, host: Arc<dyn SolverCapability>) -> Self {
        Self {
            command: command.into(),
            host,
        }
    }

    /// Whether the query command answers `--version` successfully.
    pub fn probe(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_or(false, |status| status.success())
    }

    /// The constraint families answered by Marabou itself; everything else
    /// goes through the host checker.
    pub fn handles(constraint_type: ConstraintType) -> bool {
        !matches!(
            constraint_type,
            ConstraintType::Boundary1
                | ConstraintType::Boundary2
                | ConstraintType::Target1
                | ConstraintType::Target3
                | ConstraintType::Unknown
        )
    }

    fn network_query(
        &self,
        task: &ConstraintTask,
        expressions: &SymbolicExpressions,
    ) -> Result<Option<String>, SolverError> {
        let payload = serde_json::json!({
            "task": task,
            "hamiltonian": expressions.hamiltonian,
            "partials": expressions.partials,
        });
        debug!(solver = "marabou", task = task.id, "running network query");

        let mut child = Command::new(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(payload.to_string().as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SolverError::Solver(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let answer = stdout.trim();
        if answer == "unsat" {
            Ok(None)
        } else if answer.starts_with('[') && answer.ends_with(']') {
            Ok(Some(answer.to_string()))
        } else {
            Err(SolverError::Parse(answer.to_string()))
        }
    }
}

impl SolverCapability for MarabouBackend {
    fn solver_name(&self) -> &'static str {
        "marabou"
    }

    fn check(&self, formula: &Formula, precision: f64) -> Result<Option<String>, SolverError> {
        self.host.check(formula, precision)
    }

    fn check_task(
        &self,
        task: &ConstraintTask,
        expressions: &SymbolicExpressions,
        formula: &Formula,
    ) -> Result<Option<String>, SolverError> {
        if Self::handles(task.constraint_type) {
            self.network_query(task, expressions)
        } else {
            self.host.check(formula, task.delta)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use reachcert_expr::Expr;
    use reachcert_ir::{ReachMode, SetType};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHost {
        checks: AtomicUsize,
    }

    impl SolverCapability for CountingHost {
        fn solver_name(&self) -> &'static str {
            "counting"
        }

        fn check(&self, _: &Formula, _: f64) -> Result<Option<String>, SolverError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    fn task(constraint_type: ConstraintType) -> ConstraintTask {
        ConstraintTask::new(
            1,
            constraint_type,
            false,
            1,
            0.1,
            0.001,
            ReachMode::Forward,
            SetType::Set,
            (0.0, 1.0),
        )
    }

    fn expressions() -> SymbolicExpressions {
        SymbolicExpressions {
            value_fn: "x_1_2".into(),
            boundary_fn: "0".into(),
            hamiltonian: "abs(partial_x_1_2)".into(),
            partials: IndexMap::from([("partial_x_1_1".to_string(), "0".to_string())]),
        }
    }

    #[test]
    fn boundary_families_fall_through_to_the_host() {
        let host = Arc::new(CountingHost {
            checks: AtomicUsize::new(0),
        });
        let shim = MarabouBackend::with_command("reachcert-no-such-solver", host.clone());
        let f = Formula::gt(Expr::var("x_1_2"), Expr::num(0.1));

        let result = shim.check_task(&task(ConstraintType::Boundary1), &expressions(), &f);
        assert!(result.unwrap().is_none());
        assert_eq!(host.checks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn derivative_families_dispatch_to_the_query_command() {
        let host = Arc::new(CountingHost {
            checks: AtomicUsize::new(0),
        });
        let shim = MarabouBackend::with_command("reachcert-no-such-solver", host.clone());
        let f = Formula::gt(Expr::var("x_1_2"), Expr::num(0.1));

        // The command does not exist, so the shim's own routine fails with
        // an I/O error instead of reaching the host.
        let result = shim.check_task(&task(ConstraintType::Derivative1), &expressions(), &f);
        assert!(matches!(result, Err(SolverError::Io(_))));
        assert_eq!(host.checks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn probe_fails_when_the_command_exits_nonzero() {
        let host = Arc::new(CountingHost {
            checks: AtomicUsize::new(0),
        });
        // `false` spawns fine but exits 1, like a broken install.
        let shim = MarabouBackend::with_command("false", host);
        assert!(!shim.probe());
    }

    #[test]
    fn supported_subset_matches_the_shimming_contract() {
        for ty in [
            ConstraintType::Boundary,
            ConstraintType::Derivative,
            ConstraintType::Derivative1,
            ConstraintType::Derivative2,
            ConstraintType::DerivativeBoundary,
            ConstraintType::Target2,
        ] {
            assert!(MarabouBackend::handles(ty), "{ty} should be shimmed");
        }
        for ty in [
            ConstraintType::Boundary1,
            ConstraintType::Boundary2,
            ConstraintType::Target1,
            ConstraintType::Target3,
            ConstraintType::Unknown,
        ] {
            assert!(!MarabouBackend::handles(ty), "{ty} should use the host");
        }
    }
}
