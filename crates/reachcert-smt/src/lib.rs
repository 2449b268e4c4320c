#![doc = include_str!("../README.md")]

pub mod backends;
pub mod capability;
pub mod formula;
pub mod registry;
pub mod smtlib;

pub use capability::{SolverCapability, SolverError};
pub use formula::{CmpOp, Formula};
pub use registry::{BackendConfig, BackendRegistry, RegistryError};
