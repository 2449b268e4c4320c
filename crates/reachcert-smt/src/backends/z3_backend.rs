//! Z3 backend over nonlinear real arithmetic.
//!
//! Z3 handles the polynomial fragment natively; transcendental functions
//! (`sin`, `cos`, `exp`, `tanh`) are reported as unsupported so callers can
//! route those queries to a delta-complete solver instead. A sat answer is
//! serialized as a single-line JSON object mapping variable names to
//! rational model values.

use std::collections::HashMap;

use tracing::debug;

use reachcert_expr::{Expr, Func};

use crate::capability::{SolverCapability, SolverError};
use crate::formula::{CmpOp, Formula};

pub struct Z3Backend;

impl Z3Backend {
    pub fn new() -> Self {
        Self
    }

    fn translate_expr(
        &self,
        expr: &Expr,
        vars: &HashMap<String, z3::ast::Real>,
    ) -> Result<z3::ast::Real, SolverError> {
        match expr {
            Expr::Num(n) => rational_of(*n),
            Expr::Var(name) => vars
                .get(name)
                .cloned()
                .ok_or_else(|| SolverError::Solver(format!("undeclared variable {name}"))),
            Expr::Neg(inner) => {
                let i = self.translate_expr(inner, vars)?;
                Ok(-&i)
            }
            Expr::Add(l, r) => {
                let l = self.translate_expr(l, vars)?;
                let r = self.translate_expr(r, vars)?;
                Ok(&l + &r)
            }
            Expr::Sub(l, r) => {
                let l = self.translate_expr(l, vars)?;
                let r = self.translate_expr(r, vars)?;
                Ok(&l - &r)
            }
            Expr::Mul(l, r) => {
                let l = self.translate_expr(l, vars)?;
                let r = self.translate_expr(r, vars)?;
                Ok(&l * &r)
            }
            Expr::Div(l, r) => {
                let l = self.translate_expr(l, vars)?;
                let r = self.translate_expr(r, vars)?;
                Ok(&l / &r)
            }
            Expr::Pow(base, exponent) => {
                // Only small non-negative integer exponents stay inside the
                // polynomial fragment; expand them as repeated products.
                let n = match **exponent {
                    Expr::Num(n) if n.fract() == 0.0 && (0.0..=16.0).contains(&n) => n as u32,
                    _ => {
                        return Err(SolverError::Unsupported {
                            solver: self.solver_name(),
                            what: "non-integer exponent".to_string(),
                        })
                    }
                };
                let b = self.translate_expr(base, vars)?;
                let mut acc = rational_of(1.0)?;
                for _ in 0..n {
                    acc = &acc * &b;
                }
                Ok(acc)
            }
            Expr::Call(func, args) => self.translate_call(*func, args, vars),
        }
    }

    fn translate_call(
        &self,
        func: Func,
        args: &[Expr],
        vars: &HashMap<String, z3::ast::Real>,
    ) -> Result<z3::ast::Real, SolverError> {
        match func {
            Func::Abs => {
                let a = self.translate_expr(&args[0], vars)?;
                let zero = rational_of(0.0)?;
                Ok(a.lt(&zero).ite(&(-&a), &a))
            }
            Func::Min => {
                let a = self.translate_expr(&args[0], vars)?;
                let b = self.translate_expr(&args[1], vars)?;
                Ok(a.le(&b).ite(&a, &b))
            }
            Func::Max => {
                let a = self.translate_expr(&args[0], vars)?;
                let b = self.translate_expr(&args[1], vars)?;
                Ok(a.ge(&b).ite(&a, &b))
            }
            Func::Sin | Func::Cos | Func::Exp | Func::Tanh => Err(SolverError::Unsupported {
                solver: self.solver_name(),
                what: format!("transcendental function {}", func.name()),
            }),
        }
    }

    fn translate_formula(
        &self,
        formula: &Formula,
        vars: &HashMap<String, z3::ast::Real>,
    ) -> Result<z3::ast::Bool, SolverError> {
        match formula {
            Formula::Cmp(op, lhs, rhs) => {
                let l = self.translate_expr(lhs, vars)?;
                let r = self.translate_expr(rhs, vars)?;
                Ok(match op {
                    CmpOp::Eq => l.eq(&r),
                    CmpOp::Lt => l.lt(&r),
                    CmpOp::Le => l.le(&r),
                    CmpOp::Gt => l.gt(&r),
                    CmpOp::Ge => l.ge(&r),
                })
            }
            Formula::And(terms) => {
                let bools: Result<Vec<_>, _> = terms
                    .iter()
                    .map(|t| self.translate_formula(t, vars))
                    .collect();
                let bools = bools?;
                let refs: Vec<&z3::ast::Bool> = bools.iter().collect();
                Ok(z3::ast::Bool::and(&refs))
            }
            Formula::Or(terms) => {
                let bools: Result<Vec<_>, _> = terms
                    .iter()
                    .map(|t| self.translate_formula(t, vars))
                    .collect();
                let bools = bools?;
                let refs: Vec<&z3::ast::Bool> = bools.iter().collect();
                Ok(z3::ast::Bool::or(&refs))
            }
        }
    }
}

impl Default for Z3Backend {
    fn default() -> Self {
        Self::new()
    }
}

/// Exact rational for a finite f64.
///
/// Rust's shortest round-trip decimal for the value becomes a numerator /
/// power-of-ten denominator pair passed to Z3 as strings, so constants
/// with long expansions (derived tolerances like `0.2 * 0.75`) survive
/// without truncation or integer overflow.
fn rational_of(n: f64) -> Result<z3::ast::Real, SolverError> {
    if !n.is_finite() {
        return Err(SolverError::Solver(format!("non-finite constant {n}")));
    }
    let text = n.to_string();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (num, den) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (
            format!("{sign}{int_part}{frac_part}"),
            format!("1{}", "0".repeat(frac_part.len())),
        ),
        None => (format!("{sign}{digits}"), "1".to_string()),
    };
    z3::ast::Real::from_real_str(&num, &den)
        .ok_or_else(|| SolverError::Solver(format!("unrepresentable constant {n}")))
}

impl SolverCapability for Z3Backend {
    fn solver_name(&self) -> &'static str {
        "z3"
    }

    fn check(&self, formula: &Formula, _precision: f64) -> Result<Option<String>, SolverError> {
        let mut vars = HashMap::new();
        for name in formula.free_vars() {
            vars.insert(name.to_string(), z3::ast::Real::new_const(name));
        }
        let assertion = self.translate_formula(formula, &vars)?;

        debug!(solver = "z3", "running satisfiability query");
        let solver = z3::Solver::new();
        solver.assert(&assertion);
        match solver.check() {
            z3::SatResult::Unsat => Ok(None),
            z3::SatResult::Sat => {
                let model = solver
                    .get_model()
                    .ok_or_else(|| SolverError::Solver("sat but no model available".into()))?;
                let mut witness = serde_json::Map::new();
                for (name, var) in &vars {
                    if let Some(value) = model.eval::<z3::ast::Real>(var, true) {
                        if let Some((num, den)) = value.as_real() {
                            let approx = num as f64 / den as f64;
                            witness.insert(name.clone(), serde_json::json!(approx));
                        }
                    }
                }
                Ok(Some(serde_json::Value::Object(witness).to_string()))
            }
            z3::SatResult::Unknown => Err(SolverError::Solver("z3 returned unknown".into())),
        }
    }
}
