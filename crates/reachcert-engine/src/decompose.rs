//! Constraint decomposition.
//!
//! Splits the global soundness claim over the time horizon `[0, 1]` into a
//! finite batch of independent constraint tasks. Which families are emitted
//! depends on the `min_with` mode; tolerance budgets follow the
//! `epsilon_ratio` split between boundary and derivative checks.

use thiserror::Error;
use tracing::debug;

use reachcert_ir::{ConstraintTask, ConstraintType, MinWith, ReachMode, SetType};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("state dimension must be at least 1")]
    ZeroStateDim,
    #[error("epsilon must be positive, got {0}")]
    NonPositiveEpsilon(f64),
    #[error("delta must be positive, got {0}")]
    NonPositiveDelta(f64),
    #[error("epsilon_ratio must lie in [0, 1], got {0}")]
    EpsilonRatioOutOfRange(f64),
}

/// Caller-supplied verification configuration for one batch.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub state_dim: usize,
    /// Global soundness tolerance, split across families by `epsilon_ratio`.
    pub epsilon: f64,
    /// Fraction of the tolerance budget allotted to boundary checks.
    pub epsilon_ratio: f64,
    /// Solver numerical precision.
    pub delta: f64,
    pub min_with: MinWith,
    pub reach_mode: ReachMode,
    pub set_type: SetType,
    /// Number of equal time subintervals; clamped to at least 1.
    pub time_subdivisions: usize,
}

impl BatchConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.state_dim == 0 {
            return Err(ConfigError::ZeroStateDim);
        }
        if self.epsilon <= 0.0 {
            return Err(ConfigError::NonPositiveEpsilon(self.epsilon));
        }
        if self.delta <= 0.0 {
            return Err(ConfigError::NonPositiveDelta(self.delta));
        }
        if !(0.0..=1.0).contains(&self.epsilon_ratio) {
            return Err(ConfigError::EpsilonRatioOutOfRange(self.epsilon_ratio));
        }
        Ok(())
    }
}

/// Produce the ordered task list for one verification batch.
///
/// Ids are assigned sequentially from 1 with no gaps. In `none` mode the
/// batch has `2 * subdivisions + 2` tasks, in `target` mode
/// `3 * subdivisions + 1`.
pub fn prepare_constraint_batch(config: &BatchConfig) -> Result<Vec<ConstraintTask>, ConfigError> {
    config.validate()?;
    let subdivisions = config.time_subdivisions.max(1);
    let derivative_epsilon = config.epsilon * (1.0 - config.epsilon_ratio);
    let boundary_epsilon = config.epsilon * config.epsilon_ratio;

    let mut tasks = Vec::new();
    let mut next_id = 1u32;
    let mut push = |tasks: &mut Vec<ConstraintTask>,
                    constraint_type: ConstraintType,
                    is_initial_time: bool,
                    epsilon: f64,
                    time_range: (f64, f64)| {
        tasks.push(ConstraintTask::new(
            next_id,
            constraint_type,
            is_initial_time,
            config.state_dim,
            epsilon,
            config.delta,
            config.reach_mode,
            config.set_type,
            time_range,
        ));
        next_id += 1;
    };

    for i in 0..subdivisions {
        let lower = i as f64 / subdivisions as f64;
        let upper = (i + 1) as f64 / subdivisions as f64;
        match config.min_with {
            MinWith::None => {
                push(&mut tasks, ConstraintType::Derivative1, false, derivative_epsilon, (lower, upper));
                push(&mut tasks, ConstraintType::Derivative2, false, derivative_epsilon, (lower, upper));
            }
            MinWith::Target => {
                push(&mut tasks, ConstraintType::Target1, false, config.epsilon, (lower, upper));
                push(&mut tasks, ConstraintType::Target2, false, config.epsilon, (lower, upper));
                push(&mut tasks, ConstraintType::Target3, false, config.epsilon, (lower, upper));
            }
        }
    }

    match config.min_with {
        MinWith::None => {
            push(&mut tasks, ConstraintType::Boundary1, true, boundary_epsilon, (0.0, 0.0));
            push(&mut tasks, ConstraintType::Boundary2, true, boundary_epsilon, (0.0, 0.0));
        }
        MinWith::Target => {
            push(&mut tasks, ConstraintType::Boundary2, true, boundary_epsilon, (0.0, 0.0));
        }
    }

    debug!(
        tasks = tasks.len(),
        subdivisions,
        mode = ?config.min_with,
        "decomposed verification batch"
    );
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_with: MinWith, subdivisions: usize) -> BatchConfig {
        BatchConfig {
            state_dim: 2,
            epsilon: 0.2,
            epsilon_ratio: 0.25,
            delta: 0.001,
            min_with,
            reach_mode: ReachMode::Backward,
            set_type: SetType::Set,
            time_subdivisions: subdivisions,
        }
    }

    #[test]
    fn none_mode_emits_two_per_subinterval_plus_two_boundary() {
        for n in 1..=5 {
            let tasks = prepare_constraint_batch(&config(MinWith::None, n)).unwrap();
            assert_eq!(tasks.len(), 2 * n + 2);
            let ids: Vec<u32> = tasks.iter().map(|t| t.id).collect();
            assert_eq!(ids, (1..=tasks.len() as u32).collect::<Vec<_>>());
        }
    }

    #[test]
    fn target_mode_emits_three_per_subinterval_plus_one_boundary() {
        for n in 1..=5 {
            let tasks = prepare_constraint_batch(&config(MinWith::Target, n)).unwrap();
            assert_eq!(tasks.len(), 3 * n + 1);
            let ids: Vec<u32> = tasks.iter().map(|t| t.id).collect();
            assert_eq!(ids, (1..=tasks.len() as u32).collect::<Vec<_>>());
        }
    }

    #[test]
    fn subdivision_count_is_clamped_to_one() {
        let tasks = prepare_constraint_batch(&config(MinWith::None, 0)).unwrap();
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0].time_range, (0.0, 1.0));
    }

    #[test]
    fn tolerance_budget_is_split_by_the_ratio() {
        let tasks = prepare_constraint_batch(&config(MinWith::None, 2)).unwrap();
        for task in &tasks {
            match task.constraint_type {
                ConstraintType::Derivative1 | ConstraintType::Derivative2 => {
                    assert!((task.epsilon - 0.15).abs() < 1e-12);
                    assert!(!task.is_initial_time);
                }
                ConstraintType::Boundary1 | ConstraintType::Boundary2 => {
                    assert!((task.epsilon - 0.05).abs() < 1e-12);
                    assert!(task.is_initial_time);
                    assert_eq!(task.time_range, (0.0, 0.0));
                }
                other => panic!("unexpected family {other}"),
            }
        }
    }

    #[test]
    fn target_mode_runs_at_full_tolerance() {
        let tasks = prepare_constraint_batch(&config(MinWith::Target, 1)).unwrap();
        assert_eq!(tasks[0].constraint_type, ConstraintType::Target1);
        assert_eq!(tasks[0].epsilon, 0.2);
        assert_eq!(tasks[3].constraint_type, ConstraintType::Boundary2);
        assert!((tasks[3].epsilon - 0.05).abs() < 1e-12);
    }

    #[test]
    fn subintervals_tile_the_horizon() {
        let tasks = prepare_constraint_batch(&config(MinWith::None, 4)).unwrap();
        let ranges: Vec<(f64, f64)> = tasks
            .iter()
            .filter(|t| t.constraint_type == ConstraintType::Derivative1)
            .map(|t| t.time_range)
            .collect();
        assert_eq!(ranges, vec![(0.0, 0.25), (0.25, 0.5), (0.5, 0.75), (0.75, 1.0)]);
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        let mut c = config(MinWith::None, 1);
        c.state_dim = 0;
        assert_eq!(prepare_constraint_batch(&c), Err(ConfigError::ZeroStateDim));

        let mut c = config(MinWith::None, 1);
        c.epsilon = 0.0;
        assert!(matches!(
            prepare_constraint_batch(&c),
            Err(ConfigError::NonPositiveEpsilon(_))
        ));

        let mut c = config(MinWith::None, 1);
        c.epsilon_ratio = 1.5;
        assert!(matches!(
            prepare_constraint_batch(&c),
            Err(ConfigError::EpsilonRatioOutOfRange(_))
        ));

        let mut c = config(MinWith::None, 1);
        c.delta = -0.001;
        assert!(matches!(
            prepare_constraint_batch(&c),
            Err(ConfigError::NonPositiveDelta(_))
        ));
    }
}
