use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name of the time variable in the upstream naming convention.
pub const TIME_VAR: &str = "x_1_1";

/// Name of the time partial `dv/dt` in the upstream naming convention.
pub const TIME_PARTIAL: &str = "partial_x_1_1";

/// Variable name for state dimension `i` (0-based).
pub fn state_var(i: usize) -> String {
    format!("x_1_{}", i + 2)
}

/// Variable name for the partial derivative along state dimension `i`
/// (0-based).
pub fn partial_var(i: usize) -> String {
    format!("partial_x_1_{}", i + 2)
}

/// Textual forms of the extracted symbolic model, produced by the upstream
/// symbolic-extraction collaborator and consumed read-only.
///
/// The strings are solver-agnostic at the decomposition layer; a worker
/// parses them against its backend once the task reaches it. Variable
/// references must follow the `x_1_k` / `partial_x_1_k` convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolicExpressions {
    /// The learned value function `V(t, x)`.
    pub value_fn: String,
    /// The boundary / initial-value function `B(x)`.
    pub boundary_fn: String,
    /// The Hamiltonian, already carrying the reach-mode sign convention.
    pub hamiltonian: String,
    /// Partial-derivative variable name to its textual expression.
    pub partials: IndexMap<String, String>,
}

impl SymbolicExpressions {
    /// Whether the Hamiltonian textually references partial-derivative
    /// variables. Decides between partial-linkage constraints and direct
    /// substitution of `dv/dt` when rebuilding.
    pub fn hamiltonian_references_partials(&self) -> bool {
        self.hamiltonian.contains("partial")
    }
}
