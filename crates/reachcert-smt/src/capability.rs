use thiserror::Error;

use reachcert_expr::Expr;
use reachcert_ir::{ConstraintTask, SymbolicExpressions};

use crate::formula::Formula;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("solver I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{solver} does not support {what}")]
    Unsupported { solver: &'static str, what: String },
    #[error("solver error: {0}")]
    Solver(String),
    #[error("failed to parse solver output: {0}")]
    Parse(String),
}

/// Uniform operator table over one solver backend.
///
/// The constructors (`variable`, `and`, `or`, `abs`) build the shared
/// solver-agnostic algebra and have default bodies; what distinguishes a
/// backend is how `check` lowers a formula into its native representation
/// and runs the satisfiability query.
///
/// `check` returns `Ok(Some(witness))` with the backend's raw witness text
/// when a falsifying assignment exists, `Ok(None)` when none does.
pub trait SolverCapability: Send + Sync {
    fn solver_name(&self) -> &'static str;

    fn variable(&self, name: &str) -> Expr {
        Expr::var(name)
    }

    fn and(&self, terms: Vec<Formula>) -> Formula {
        Formula::And(terms)
    }

    fn or(&self, terms: Vec<Formula>) -> Formula {
        Formula::Or(terms)
    }

    fn abs(&self, term: Expr) -> Expr {
        term.abs()
    }

    /// Run one satisfiability query at the given numerical precision.
    fn check(&self, formula: &Formula, precision: f64) -> Result<Option<String>, SolverError>;

    /// Task-aware entry point used by workers.
    ///
    /// The default forwards to [`SolverCapability::check`] with the task's
    /// `delta`. A shimmed backend overrides this to dispatch constraint
    /// types in its supported subset to its own routine while leaving the
    /// rest to its host algebra's checker.
    fn check_task(
        &self,
        task: &ConstraintTask,
        expressions: &SymbolicExpressions,
        formula: &Formula,
    ) -> Result<Option<String>, SolverError> {
        let _ = expressions;
        self.check(formula, task.delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reachcert_expr::Expr;

    struct NullBackend;

    impl SolverCapability for NullBackend {
        fn solver_name(&self) -> &'static str {
            "null"
        }

        fn check(&self, _: &Formula, _: f64) -> Result<Option<String>, SolverError> {
            Ok(None)
        }
    }

    #[test]
    fn default_operator_table_builds_the_shared_algebra() {
        let backend = NullBackend;
        let x = backend.variable("x_1_2");
        assert_eq!(x, Expr::var("x_1_2"));
        assert_eq!(backend.abs(x.clone()), Expr::var("x_1_2").abs());

        let f = backend.and(vec![
            Formula::gt(x.clone(), Expr::num(0.0)),
            backend.or(vec![Formula::lt(x, Expr::num(1.0))]),
        ]);
        match f {
            Formula::And(terms) => assert_eq!(terms.len(), 2),
            other => panic!("expected conjunction, got {other:?}"),
        }
    }

    #[test]
    fn default_check_task_uses_the_task_delta() {
        use reachcert_ir::{ConstraintType, ReachMode, SetType};

        let backend = NullBackend;
        let task = ConstraintTask::new(
            1,
            ConstraintType::Boundary1,
            true,
            1,
            0.1,
            0.001,
            ReachMode::Forward,
            SetType::Set,
            (0.0, 1.0),
        );
        let exprs = SymbolicExpressions {
            value_fn: "x_1_2".into(),
            boundary_fn: "0".into(),
            hamiltonian: "0".into(),
            partials: Default::default(),
        };
        let f = Formula::gt(Expr::var("x_1_2"), Expr::num(0.1));
        let result = backend.check_task(&task, &exprs, &f).unwrap();
        assert!(result.is_none());
    }
}
