//! SMT-LIB2 printing for expressions and formulas.
//!
//! The dReal backend speaks QF_NRA over files; dReal's SMT-LIB dialect
//! carries `sin`, `cos`, `exp`, `tanh`, `min`, `max`, `abs`, and `^`.

use reachcert_expr::{Expr, Func};

use crate::formula::{CmpOp, Formula};

/// Print an expression as an SMT-LIB2 term.
pub fn expr_to_smtlib(expr: &Expr) -> String {
    match expr {
        Expr::Num(n) => num_to_smtlib(*n),
        Expr::Var(name) => name.clone(),
        Expr::Neg(inner) => format!("(- {})", expr_to_smtlib(inner)),
        Expr::Add(l, r) => format!("(+ {} {})", expr_to_smtlib(l), expr_to_smtlib(r)),
        Expr::Sub(l, r) => format!("(- {} {})", expr_to_smtlib(l), expr_to_smtlib(r)),
        Expr::Mul(l, r) => format!("(* {} {})", expr_to_smtlib(l), expr_to_smtlib(r)),
        Expr::Div(l, r) => format!("(/ {} {})", expr_to_smtlib(l), expr_to_smtlib(r)),
        Expr::Pow(l, r) => format!("(^ {} {})", expr_to_smtlib(l), expr_to_smtlib(r)),
        Expr::Call(func, args) => {
            let name = match func {
                Func::Sin => "sin",
                Func::Cos => "cos",
                Func::Exp => "exp",
                Func::Tanh => "tanh",
                Func::Abs => "abs",
                Func::Min => "min",
                Func::Max => "max",
            };
            let rendered: Vec<String> = args.iter().map(expr_to_smtlib).collect();
            format!("({name} {})", rendered.join(" "))
        }
    }
}

fn num_to_smtlib(n: f64) -> String {
    if n < 0.0 {
        format!("(- {})", -n)
    } else {
        n.to_string()
    }
}

/// Print a formula as an SMT-LIB2 boolean term.
pub fn formula_to_smtlib(formula: &Formula) -> String {
    match formula {
        Formula::Cmp(op, lhs, rhs) => {
            let sym = match op {
                CmpOp::Eq => "=",
                CmpOp::Lt => "<",
                CmpOp::Le => "<=",
                CmpOp::Gt => ">",
                CmpOp::Ge => ">=",
            };
            format!("({sym} {} {})", expr_to_smtlib(lhs), expr_to_smtlib(rhs))
        }
        Formula::And(terms) => nary("and", "true", terms),
        Formula::Or(terms) => nary("or", "false", terms),
    }
}

fn nary(op: &str, identity: &str, terms: &[Formula]) -> String {
    match terms {
        [] => identity.to_string(),
        [single] => formula_to_smtlib(single),
        _ => {
            let inner: Vec<String> = terms.iter().map(formula_to_smtlib).collect();
            format!("({op} {})", inner.join(" "))
        }
    }
}
