//! Backend discovery and lookup.
//!
//! Every backend name the engine knows about has a registry slot; the slot
//! holds `Some` handle when the backend probed as usable and `None` when it
//! did not. Keeping unavailable backends in the table lets lookups
//! distinguish "unknown name" from "known but not installed", which become
//! different per-task errors downstream.

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::info;

use crate::backends::{DrealBackend, MarabouBackend};
use crate::capability::SolverCapability;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown solver backend `{0}`")]
    Unknown(String),
    #[error("solver backend `{0}` is not available")]
    Unavailable(String),
}

/// External commands used when probing subprocess backends.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub dreal_command: String,
    pub marabou_command: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            dreal_command: DrealBackend::DEFAULT_COMMAND.to_string(),
            marabou_command: MarabouBackend::DEFAULT_COMMAND.to_string(),
        }
    }
}

#[derive(Default)]
pub struct BackendRegistry {
    backends: IndexMap<String, Option<Arc<dyn SolverCapability>>>,
}

impl BackendRegistry {
    /// Registry with no slots at all; callers add their own.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Probe the standard backends once and record what answered.
    ///
    /// Marabou is a shim over dReal's algebra, so its slot is populated
    /// only when both its own query command and dReal are usable.
    pub fn probe(config: &BackendConfig) -> Self {
        let mut registry = Self::empty();

        let dreal = DrealBackend::with_command(&config.dreal_command);
        let dreal: Option<Arc<dyn SolverCapability>> = if dreal.probe() {
            Some(Arc::new(dreal))
        } else {
            None
        };
        registry.register("dreal", dreal.clone());

        #[cfg(feature = "z3")]
        registry.register(
            "z3",
            Some(Arc::new(crate::backends::Z3Backend::new()) as Arc<dyn SolverCapability>),
        );
        #[cfg(not(feature = "z3"))]
        registry.register("z3", None);

        let marabou = dreal.and_then(|host| {
            let shim = MarabouBackend::with_command(&config.marabou_command, host);
            if shim.probe() {
                Some(Arc::new(shim) as Arc<dyn SolverCapability>)
            } else {
                None
            }
        });
        registry.register("marabou", marabou);

        info!(available = ?registry.available(), "probed solver backends");
        registry
    }

    pub fn register(&mut self, name: &str, backend: Option<Arc<dyn SolverCapability>>) {
        self.backends.insert(name.to_string(), backend);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn SolverCapability>, RegistryError> {
        match self.backends.get(name) {
            None => Err(RegistryError::Unknown(name.to_string())),
            Some(None) => Err(RegistryError::Unavailable(name.to_string())),
            Some(Some(backend)) => Ok(backend.clone()),
        }
    }

    /// Names of the backends that answered their probe.
    pub fn available(&self) -> Vec<&str> {
        self.backends
            .iter()
            .filter(|(_, slot)| slot.is_some())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
