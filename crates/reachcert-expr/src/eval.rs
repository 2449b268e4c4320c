//! Concrete `f64` evaluation of expressions.
//!
//! Used for sanity-checking rebuilt constraints against sampled points and
//! for the logical-equivalence half of the serialize/parse round-trip
//! property.

use std::collections::HashMap;

use thiserror::Error;

use crate::ast::{Expr, Func};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unbound variable `{0}`")]
    UnboundVariable(String),
}

/// Evaluate `expr` under the given variable assignment.
pub fn eval(expr: &Expr, vars: &HashMap<String, f64>) -> Result<f64, EvalError> {
    match expr {
        Expr::Num(n) => Ok(*n),
        Expr::Var(name) => vars
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UnboundVariable(name.clone())),
        Expr::Neg(inner) => Ok(-eval(inner, vars)?),
        Expr::Add(l, r) => Ok(eval(l, vars)? + eval(r, vars)?),
        Expr::Sub(l, r) => Ok(eval(l, vars)? - eval(r, vars)?),
        Expr::Mul(l, r) => Ok(eval(l, vars)? * eval(r, vars)?),
        Expr::Div(l, r) => Ok(eval(l, vars)? / eval(r, vars)?),
        Expr::Pow(l, r) => Ok(eval(l, vars)?.powf(eval(r, vars)?)),
        Expr::Call(func, args) => {
            let a = eval(&args[0], vars)?;
            match func {
                Func::Sin => Ok(a.sin()),
                Func::Cos => Ok(a.cos()),
                Func::Exp => Ok(a.exp()),
                Func::Tanh => Ok(a.tanh()),
                Func::Abs => Ok(a.abs()),
                Func::Min => Ok(a.min(eval(&args[1], vars)?)),
                Func::Max => Ok(a.max(eval(&args[1], vars)?)),
            }
        }
    }
}
