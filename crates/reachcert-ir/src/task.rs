use serde::{Deserialize, Serialize};
use std::fmt;

/// Time direction of the reachability computation. Flips the sign
/// convention inside the Hamiltonian upstream; carried here as metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachMode {
    Forward,
    Backward,
}

/// `Set` leaves the value-function sign unconstrained, `Tube` enforces
/// non-positivity. Baked into the serialized expressions upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetType {
    Set,
    Tube,
}

/// Which constraint family the decomposer emits for the PDE residual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinWith {
    None,
    Target,
}

/// The constraint family encoded by one task.
///
/// `Unknown` absorbs unrecognized wire values so that a malformed task
/// degrades to a per-task error result instead of failing the whole batch
/// at deserialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    #[serde(rename = "boundary")]
    Boundary,
    #[serde(rename = "boundary_1")]
    Boundary1,
    #[serde(rename = "boundary_2")]
    Boundary2,
    #[serde(rename = "derivative")]
    Derivative,
    #[serde(rename = "derivative_1")]
    Derivative1,
    #[serde(rename = "derivative_2")]
    Derivative2,
    #[serde(rename = "derivative_boundary")]
    DerivativeBoundary,
    #[serde(rename = "target_1")]
    Target1,
    #[serde(rename = "target_2")]
    Target2,
    #[serde(rename = "target_3")]
    Target3,
    #[serde(other, rename = "unknown")]
    Unknown,
}

impl ConstraintType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintType::Boundary => "boundary",
            ConstraintType::Boundary1 => "boundary_1",
            ConstraintType::Boundary2 => "boundary_2",
            ConstraintType::Derivative => "derivative",
            ConstraintType::Derivative1 => "derivative_1",
            ConstraintType::Derivative2 => "derivative_2",
            ConstraintType::DerivativeBoundary => "derivative_boundary",
            ConstraintType::Target1 => "target_1",
            ConstraintType::Target2 => "target_2",
            ConstraintType::Target3 => "target_3",
            ConstraintType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One self-contained, solver-agnostic satisfiability query.
///
/// Immutable descriptor: created by the decomposer, shipped to a worker as
/// plain data, never shared mutably. Invariants: `time_range` lies within
/// `[0, 1]`, and `is_initial_time` forces `time_range == (0.0, 0.0)` (the
/// constructor enforces both).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintTask {
    /// Unique within a batch; contiguous from 1, assigned by the decomposer.
    pub id: u32,
    pub constraint_type: ConstraintType,
    /// `(lower, upper)` bounds on the time variable.
    pub time_range: (f64, f64),
    /// One `(lower, upper)` pair per state dimension.
    pub space_constraints: Vec<(f64, f64)>,
    /// Soundness tolerance for this task (already split by `epsilon_ratio`).
    pub epsilon: f64,
    /// Solver numerical precision.
    pub delta: f64,
    /// Forces the time variable fixed at 0 instead of ranged.
    pub is_initial_time: bool,
    pub reach_mode: ReachMode,
    pub set_type: SetType,
}

impl ConstraintTask {
    /// Default per-dimension state bounds.
    pub const SPACE_RANGE: (f64, f64) = (-1.0, 1.0);

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        constraint_type: ConstraintType,
        is_initial_time: bool,
        state_dim: usize,
        epsilon: f64,
        delta: f64,
        reach_mode: ReachMode,
        set_type: SetType,
        time_range: (f64, f64),
    ) -> Self {
        let time_range = if is_initial_time {
            (0.0, 0.0)
        } else {
            (time_range.0.clamp(0.0, 1.0), time_range.1.clamp(0.0, 1.0))
        };
        Self {
            id,
            constraint_type,
            time_range,
            space_constraints: vec![Self::SPACE_RANGE; state_dim],
            epsilon,
            delta,
            is_initial_time,
            reach_mode,
            set_type,
        }
    }

    /// Number of state dimensions this task quantifies over.
    pub fn state_dim(&self) -> usize {
        self.space_constraints.len()
    }
}
