//! Solver options

use serde::{Deserialize, Serialize};

/// What to do when a fiber's strain is too small to form a secant ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroStrainPolicy {
    /// Use the initial-modulus ratio 1.0 for that fiber
    Clamp,
    /// Fail with `NdmError::DivisionByNearZeroStrain`
    Strict,
}

impl Default for ZeroStrainPolicy {
    fn default() -> Self {
        Self::Clamp
    }
}

/// Options for the nonlinear deformation model iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Relative residual below which a load component is in equilibrium
    pub tolerance: f64,
    /// Maximum number of secant iterations
    pub max_iterations: usize,
    /// Strain magnitude below which the secant ratio is not formed
    pub strain_floor: f64,
    /// Behaviour for fibers below `strain_floor`
    pub zero_strain: ZeroStrainPolicy,
    /// Keep the per-iteration history in the solution
    pub record_history: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            max_iterations: 100,
            strain_floor: 1e-12,
            zero_strain: ZeroStrainPolicy::Clamp,
            record_history: true,
        }
    }
}

impl SolverOptions {
    /// Set convergence tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Set the strain floor
    pub fn with_strain_floor(mut self, floor: f64) -> Self {
        self.strain_floor = floor;
        self
    }

    /// Fail instead of clamping on near-zero strains
    pub fn strict(mut self) -> Self {
        self.zero_strain = ZeroStrainPolicy::Strict;
        self
    }

    /// Drop the per-iteration history
    pub fn without_history(mut self) -> Self {
        self.record_history = false;
        self
    }
}
