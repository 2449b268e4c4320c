//! Constraint rebuilding.
//!
//! A worker receives a task descriptor plus the four serialized expressions
//! and must reconstruct the concrete logical formula for the task's
//! constraint family. Rebuilding is a pure function of the task, the
//! variable dictionary, and the expression strings; all backend
//! specificity stays behind the capability's operator table.

use indexmap::IndexMap;
use thiserror::Error;

use reachcert_expr::{parse, Expr, ParseError};
use reachcert_ir::{ConstraintTask, ConstraintType, SymbolicExpressions, TIME_PARTIAL, TIME_VAR};
use reachcert_smt::{Formula, SolverCapability};

#[derive(Debug, Error)]
pub enum RebuildError {
    #[error("unknown constraint type `{0}`")]
    UnknownConstraintType(String),
    #[error("failed to parse {which} expression: {source}")]
    Parse {
        which: &'static str,
        source: ParseError,
    },
    #[error("expression references undeclared variable `{0}`")]
    UnknownVariable(String),
    #[error("no serialized expression for the time partial `{0}`")]
    MissingTimePartial(&'static str),
}

fn parse_checked(
    which: &'static str,
    text: &str,
    variables: &IndexMap<String, Expr>,
) -> Result<Expr, RebuildError> {
    let expr = parse(text).map_err(|source| RebuildError::Parse { which, source })?;
    for name in expr.free_vars() {
        if !variables.contains_key(name) {
            return Err(RebuildError::UnknownVariable(name.to_string()));
        }
    }
    Ok(expr)
}

/// Conjunction of the task's time and space bounds.
fn region_constraints(cap: &dyn SolverCapability, task: &ConstraintTask) -> Vec<Formula> {
    let t = cap.variable(TIME_VAR);
    let mut region = Vec::new();
    if task.is_initial_time {
        region.push(Formula::eq(t, Expr::num(0.0)));
    } else {
        let (lower, upper) = task.time_range;
        region.push(Formula::ge(t.clone(), Expr::num(lower)));
        region.push(Formula::le(t, Expr::num(upper)));
    }
    for (i, (lower, upper)) in task.space_constraints.iter().enumerate() {
        let x = cap.variable(&reachcert_ir::state_var(i));
        region.push(Formula::ge(x.clone(), Expr::num(*lower)));
        region.push(Formula::le(x, Expr::num(*upper)));
    }
    region
}

/// Rebuild the one concrete formula encoding this task's constraint family.
///
/// When the Hamiltonian references partial-derivative variables, every
/// declared partial, the time partial included, is bound to its parsed
/// expression by an equality and the residual reads `dv/dt` through its
/// bound variable. Otherwise `dv/dt` is substituted directly from the
/// serialized time partial and no linkage constraints are emitted.
pub fn rebuild_constraint(
    cap: &dyn SolverCapability,
    task: &ConstraintTask,
    variables: &IndexMap<String, Expr>,
    expressions: &SymbolicExpressions,
) -> Result<Formula, RebuildError> {
    let value_fn = parse_checked("value function", &expressions.value_fn, variables)?;
    let boundary_fn = parse_checked("boundary function", &expressions.boundary_fn, variables)?;
    let epsilon = task.epsilon;
    let mismatch = value_fn.sub(boundary_fn);

    // Boundary families compare only V - B; they never touch the
    // Hamiltonian or the partials.
    let boundary_only = matches!(
        task.constraint_type,
        ConstraintType::Boundary | ConstraintType::Boundary1 | ConstraintType::Boundary2
    );

    let mut linkage = Vec::new();
    let residual = if boundary_only {
        Expr::num(0.0)
    } else {
        let hamiltonian = parse_checked("hamiltonian", &expressions.hamiltonian, variables)?;
        let dv_dt = if expressions.hamiltonian_references_partials() {
            for (name, text) in &expressions.partials {
                let parsed = parse_checked("partial derivative", text, variables)?;
                linkage.push(Formula::eq(cap.variable(name), parsed));
            }
            cap.variable(TIME_PARTIAL)
        } else {
            let text = expressions
                .partials
                .get(TIME_PARTIAL)
                .ok_or(RebuildError::MissingTimePartial(TIME_PARTIAL))?;
            parse_checked("time partial", text, variables)?
        };
        dv_dt.add(hamiltonian)
    };

    let (core, with_linkage) = match task.constraint_type {
        ConstraintType::Boundary | ConstraintType::Boundary1 => {
            (Formula::gt(mismatch, Expr::num(epsilon)), false)
        }
        ConstraintType::Boundary2 => (Formula::lt(mismatch, Expr::num(-epsilon)), false),
        ConstraintType::Derivative | ConstraintType::Derivative1 => {
            (Formula::lt(residual, Expr::num(-epsilon)), true)
        }
        ConstraintType::Derivative2 => (Formula::gt(residual, Expr::num(epsilon)), true),
        ConstraintType::DerivativeBoundary => {
            let residual_violation = Formula::gt(cap.abs(residual), Expr::num(epsilon));
            let boundary_violation = Formula::and(vec![
                Formula::gt(cap.abs(mismatch), Expr::num(epsilon)),
                Formula::eq(cap.variable(TIME_VAR), Expr::num(0.0)),
            ]);
            (cap.or(vec![residual_violation, boundary_violation]), true)
        }
        ConstraintType::Target1 => (
            Formula::and(vec![
                Formula::lt(residual, Expr::num(-epsilon)),
                Formula::lt(mismatch, Expr::num(-epsilon)),
            ]),
            true,
        ),
        ConstraintType::Target2 => (Formula::gt(residual, Expr::num(epsilon)), true),
        ConstraintType::Target3 => (Formula::gt(mismatch, Expr::num(epsilon)), true),
        ConstraintType::Unknown => {
            return Err(RebuildError::UnknownConstraintType(
                task.constraint_type.to_string(),
            ))
        }
    };

    let mut terms = region_constraints(cap, task);
    terms.push(core);
    if with_linkage {
        terms.extend(linkage);
    }
    Ok(cap.and(terms))
}
