use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one satisfiability check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The solver found a falsifying witness; the PDE residual bound is
    /// violated somewhere in the task's region.
    Sat,
    /// No witness exists: this task's constraint family holds.
    Unsat,
    /// The check could not be carried out; the message is human-readable.
    Error(String),
}

impl Verdict {
    pub fn is_violation(&self) -> bool {
        matches!(self, Verdict::Sat)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Verdict::Error(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Sat => f.write_str("sat-with-counterexample"),
            Verdict::Unsat => f.write_str("unsat"),
            Verdict::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// A normalized counterexample extracted from a solver's witness text.
///
/// Backends that label their output produce a box (variable name to its
/// bounding interval); backends that answer with a bare numeric vector
/// produce the positional form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counterexample {
    Box(IndexMap<String, (f64, f64)>),
    Vector(Vec<f64>),
}

/// Result of checking one constraint task, produced by exactly one worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    pub task_id: u32,
    pub verdict: Verdict,
    /// Raw witness text exactly as the backend emitted it.
    pub witness: Option<String>,
    /// Normalized witness, when the raw text could be parsed.
    pub counterexample: Option<Counterexample>,
    /// Wall-clock duration of the check, in seconds.
    pub elapsed_secs: f64,
}

impl SolverResult {
    pub fn unsat(task_id: u32, elapsed_secs: f64) -> Self {
        Self {
            task_id,
            verdict: Verdict::Unsat,
            witness: None,
            counterexample: None,
            elapsed_secs,
        }
    }

    pub fn error(task_id: u32, message: impl Into<String>) -> Self {
        Self {
            task_id,
            verdict: Verdict::Error(message.into()),
            witness: None,
            counterexample: None,
            elapsed_secs: 0.0,
        }
    }
}
