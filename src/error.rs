//! Error types for the NDM section solver

use thiserror::Error;

/// Main error type for section analysis
#[derive(Error, Debug)]
pub enum NdmError {
    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    #[error("Degenerate section geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Degenerate section stiffness - the stiffness matrix is singular or near-singular")]
    SingularStiffness,

    #[error("No convergence after {iterations} iterations (largest residual {residual:.3e})")]
    NonConvergence { iterations: usize, residual: f64 },

    #[error("Strain {strain:e} at {fiber} is below the numerical floor")]
    DivisionByNearZeroStrain { fiber: FiberRef, strain: f64 },

    #[error("Unknown material class '{0}'")]
    UnknownClass(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Identifies a single fiber in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiberRef {
    Concrete(usize),
    Rebar(usize),
}

impl std::fmt::Display for FiberRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FiberRef::Concrete(i) => write!(f, "concrete fiber {}", i),
            FiberRef::Rebar(i) => write!(f, "rebar {}", i),
        }
    }
}

/// Result type for section analysis
pub type NdmResult<T> = Result<T, NdmError>;
