pub mod dreal;
pub mod marabou;
#[cfg(feature = "z3")]
pub mod z3_backend;

pub use dreal::DrealBackend;
pub use marabou::MarabouBackend;
#[cfg(feature = "z3")]
pub use z3_backend::Z3Backend;
