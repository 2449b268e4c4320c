//! Precedence-aware printer; the inverse of [`crate::parser::parse`].
//!
//! Printing is the serialization step for shipping a backend-agnostic
//! expression across a process boundary: `parse(expr.to_string())`
//! reconstructs the same tree.

use std::fmt;

use crate::ast::Expr;

impl Expr {
    /// Effective precedence for parenthesization. Negative literals bind
    /// like a unary minus so `(-1.5) ^ 2` keeps its parentheses.
    fn prec(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Neg(..) => 3,
            Expr::Num(n) if *n < 0.0 => 3,
            Expr::Pow(..) => 4,
            _ => 5,
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.prec() < min {
            f.write_str("(")?;
            self.fmt_prec(f, 0)?;
            return f.write_str(")");
        }
        match self {
            Expr::Num(n) => write!(f, "{n}"),
            Expr::Var(name) => f.write_str(name),
            Expr::Neg(inner) => {
                f.write_str("-")?;
                inner.fmt_prec(f, 3)
            }
            Expr::Add(l, r) => {
                l.fmt_prec(f, 1)?;
                f.write_str(" + ")?;
                r.fmt_prec(f, 2)
            }
            Expr::Sub(l, r) => {
                l.fmt_prec(f, 1)?;
                f.write_str(" - ")?;
                r.fmt_prec(f, 2)
            }
            Expr::Mul(l, r) => {
                l.fmt_prec(f, 2)?;
                f.write_str(" * ")?;
                r.fmt_prec(f, 3)
            }
            Expr::Div(l, r) => {
                l.fmt_prec(f, 2)?;
                f.write_str(" / ")?;
                r.fmt_prec(f, 3)
            }
            Expr::Pow(l, r) => {
                l.fmt_prec(f, 5)?;
                f.write_str(" ^ ")?;
                r.fmt_prec(f, 4)
            }
            Expr::Call(func, args) => {
                f.write_str(func.name())?;
                f.write_str("(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.fmt_prec(f, 0)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Expr, Func};
    use crate::parser::parse;

    #[test]
    fn prints_with_minimal_parentheses() {
        let e = Expr::num(1.0)
            .add(Expr::num(2.0).mul(Expr::var("x_1_2")))
            .sub(Expr::num(3.0));
        assert_eq!(e.to_string(), "1 + 2 * x_1_2 - 3");
    }

    #[test]
    fn parenthesizes_where_precedence_demands() {
        let e = Expr::var("a").add(Expr::var("b")).mul(Expr::var("c"));
        assert_eq!(e.to_string(), "(a + b) * c");

        let e = Expr::var("a").sub(Expr::var("b").sub(Expr::var("c")));
        assert_eq!(e.to_string(), "a - (b - c)");

        let e = Expr::var("x").neg().pow(Expr::num(2.0));
        assert_eq!(e.to_string(), "(-x) ^ 2");

        let e = Expr::Num(-1.5).pow(Expr::num(2.0));
        assert_eq!(e.to_string(), "(-1.5) ^ 2");
    }

    #[test]
    fn prints_function_calls() {
        let e = Expr::Call(
            Func::Max,
            vec![Expr::var("x_1_2").abs(), Expr::num(0.25)],
        );
        assert_eq!(e.to_string(), "max(abs(x_1_2), 0.25)");
    }

    #[test]
    fn structural_round_trip() {
        let cases = [
            "x_1_1 + x_1_2 * 2 - 0.5",
            "(a + b) * c",
            "a - (b - c)",
            "sin(x_1_2) * cos(x_1_3) + tanh(x_1_1)",
            "abs(x_1_2 - 0.25) ^ 2",
            "max(min(a, b), -c)",
            "x_1_2 / (1 + exp(-x_1_1))",
        ];
        for src in cases {
            let e = parse(src).unwrap();
            let printed = e.to_string();
            let reparsed = parse(&printed).unwrap();
            assert_eq!(reparsed, e, "round-trip failed for `{src}` -> `{printed}`");
        }
    }
}
