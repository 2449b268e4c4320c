use std::collections::{BTreeSet, HashMap};

use reachcert_expr::{eval, EvalError, Expr};

/// Comparison operators admitted in constraint formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A quantifier-free constraint formula, solver-agnostic.
///
/// This is the only logical form that travels between the rebuilder and a
/// backend; each backend lowers it into its native representation (or into
/// SMT-LIB2 text) at check time.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    Cmp(CmpOp, Expr, Expr),
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

impl Formula {
    pub fn and(terms: Vec<Formula>) -> Self {
        Formula::And(terms)
    }

    pub fn or(terms: Vec<Formula>) -> Self {
        Formula::Or(terms)
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Formula::Cmp(CmpOp::Eq, lhs, rhs)
    }

    pub fn lt(lhs: Expr, rhs: Expr) -> Self {
        Formula::Cmp(CmpOp::Lt, lhs, rhs)
    }

    pub fn le(lhs: Expr, rhs: Expr) -> Self {
        Formula::Cmp(CmpOp::Le, lhs, rhs)
    }

    pub fn gt(lhs: Expr, rhs: Expr) -> Self {
        Formula::Cmp(CmpOp::Gt, lhs, rhs)
    }

    pub fn ge(lhs: Expr, rhs: Expr) -> Self {
        Formula::Cmp(CmpOp::Ge, lhs, rhs)
    }

    /// All variable names referenced anywhere in the formula.
    pub fn free_vars(&self) -> BTreeSet<&str> {
        let mut vars = BTreeSet::new();
        self.collect_vars(&mut vars);
        vars
    }

    fn collect_vars<'a>(&'a self, vars: &mut BTreeSet<&'a str>) {
        match self {
            Formula::Cmp(_, lhs, rhs) => {
                vars.extend(lhs.free_vars());
                vars.extend(rhs.free_vars());
            }
            Formula::And(terms) | Formula::Or(terms) => {
                for term in terms {
                    term.collect_vars(vars);
                }
            }
        }
    }

    /// Evaluate the formula at a concrete point.
    ///
    /// Not a decision procedure; used for sampling-based sanity checks of
    /// rebuilt constraints.
    pub fn eval(&self, vars: &HashMap<String, f64>) -> Result<bool, EvalError> {
        match self {
            Formula::Cmp(op, lhs, rhs) => {
                let l = eval(lhs, vars)?;
                let r = eval(rhs, vars)?;
                Ok(match op {
                    CmpOp::Eq => l == r,
                    CmpOp::Lt => l < r,
                    CmpOp::Le => l <= r,
                    CmpOp::Gt => l > r,
                    CmpOp::Ge => l >= r,
                })
            }
            Formula::And(terms) => {
                for term in terms {
                    if !term.eval(vars)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Formula::Or(terms) => {
                for term in terms {
                    if term.eval(vars)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}
