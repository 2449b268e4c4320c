#![doc = include_str!("../README.md")]

//! Task descriptors, symbolic expression bundles, and solver results.
//!
//! Tasks are created once per verification batch by the decomposer and are
//! read-only afterwards; results are created once per task by exactly one
//! worker and never mutated.

pub mod expressions;
pub mod result;
pub mod task;

pub use expressions::{partial_var, state_var, SymbolicExpressions, TIME_PARTIAL, TIME_VAR};
pub use result::{Counterexample, SolverResult, Verdict};
pub use task::{ConstraintTask, ConstraintType, MinWith, ReachMode, SetType};
