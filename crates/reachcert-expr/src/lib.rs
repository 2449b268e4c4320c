#![doc = include_str!("../README.md")]

pub mod ast;
pub mod eval;
pub mod parser;
mod printer;

pub use ast::{Expr, Func};
pub use eval::{eval, EvalError};
pub use parser::{parse, ParseError};
