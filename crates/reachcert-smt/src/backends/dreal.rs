//! dReal backend: delta-complete decision procedure for QF_NRA.
//!
//! dReal ships no Rust bindings, so the adapter drives the `dreal` binary
//! over SMT-LIB2 query files. A `delta-sat` answer comes with a box
//! (one `name : [lo, up]` line per variable) which is passed through as
//! the raw witness text.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::capability::{SolverCapability, SolverError};
use crate::formula::Formula;
use crate::smtlib::formula_to_smtlib;

pub struct DrealBackend {
    command: String,
}

impl DrealBackend {
    pub const DEFAULT_COMMAND: &'static str = "dreal";

    pub fn new() -> Self {
        Self::with_command(Self::DEFAULT_COMMAND)
    }

    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Whether the solver binary answers `--version` successfully.
    pub fn probe(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_or(false, |status| status.success())
    }

    fn render_query(formula: &Formula) -> String {
        let mut query = String::from("(set-logic QF_NRA)\n");
        for var in formula.free_vars() {
            query.push_str(&format!("(declare-fun {var} () Real)\n"));
        }
        query.push_str(&format!("(assert {})\n", formula_to_smtlib(formula)));
        query.push_str("(check-sat)\n(exit)\n");
        query
    }
}

impl Default for DrealBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverCapability for DrealBackend {
    fn solver_name(&self) -> &'static str {
        "dreal"
    }

    fn check(&self, formula: &Formula, precision: f64) -> Result<Option<String>, SolverError> {
        let query = Self::render_query(formula);
        debug!(solver = "dreal", precision, "running satisfiability query");

        let mut file = tempfile::Builder::new()
            .prefix("reachcert-")
            .suffix(".smt2")
            .tempfile()?;
        file.write_all(query.as_bytes())?;
        file.flush()?;

        let output = Command::new(&self.command)
            .arg(format!("--precision={precision}"))
            .arg("--model")
            .arg(file.path())
            .stdin(Stdio::null())
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_dreal_output(&stdout) {
            Err(_) if !output.status.success() => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(SolverError::Solver(stderr.trim().to_string()))
            }
            other => other,
        }
    }
}

/// Parse dReal's stdout: `unsat`, or `delta-sat` followed by box lines.
fn parse_dreal_output(stdout: &str) -> Result<Option<String>, SolverError> {
    let trimmed = stdout.trim();
    if trimmed.starts_with("unsat") {
        return Ok(None);
    }
    let mut lines = trimmed.lines();
    match lines.next() {
        Some(first) if first.contains("delta-sat") => {
            let the_box: Vec<&str> = lines.map(str::trim).filter(|l| !l.is_empty()).collect();
            Ok(Some(the_box.join("\n")))
        }
        _ => Err(SolverError::Parse(trimmed.to_string())),
    }
}
