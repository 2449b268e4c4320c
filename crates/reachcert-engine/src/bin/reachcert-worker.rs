//! Worker process entry point.
//!
//! Protocol: one JSON [`WorkerRequest`] on stdin, one JSON `SolverResult`
//! on stdout. Logging goes to stderr so stdout stays a clean JSON channel.
//! The process always exits 0; every failure, including a malformed
//! request, is reported as an error result so the dispatcher never has to
//! interpret exit codes.

use std::io::Read;

use tracing_subscriber::EnvFilter;

use reachcert_engine::{check_task, WorkerRequest};
use reachcert_ir::SolverResult;
use reachcert_smt::{BackendConfig, BackendRegistry};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let result = run();
    match serde_json::to_string(&result) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            // Should not happen for a SolverResult; last-resort plain text.
            eprintln!("failed to encode result: {err}");
        }
    }
}

fn run() -> SolverResult {
    let mut input = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut input) {
        return SolverResult::error(0, format!("failed to read request: {err}"));
    }
    let request: WorkerRequest = match serde_json::from_str(&input) {
        Ok(request) => request,
        Err(err) => return SolverResult::error(0, format!("malformed request: {err}")),
    };

    let registry = BackendRegistry::probe(&BackendConfig::default());
    check_task(&registry, &request)
}
