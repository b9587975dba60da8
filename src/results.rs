//! Result types for section analysis

use serde::{Deserialize, Serialize};

use crate::loads::EquilibriumMode;

/// Internal forces integrated over the section (MN, MN·m)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Resultants {
    pub nz: f64,
    pub mx: f64,
    pub my: f64,
}

impl Resultants {
    pub fn new(nz: f64, mx: f64, my: f64) -> Self {
        Self { nz, mx, my }
    }

    /// Component-wise sum of two resultants
    pub fn add(&self, other: &Resultants) -> Self {
        Self::new(self.nz + other.nz, self.mx + other.mx, self.my + other.my)
    }
}

/// Relative residuals of the equilibrium equations
///
/// Components with a zero target are reported as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Residuals {
    pub nz: f64,
    pub mx: f64,
    pub my: f64,
}

impl Residuals {
    /// Largest residual component
    pub fn max(&self) -> f64 {
        self.nz.max(self.mx).max(self.my)
    }

    /// True if every component is below `tolerance`
    pub fn below(&self, tolerance: f64) -> bool {
        self.nz < tolerance && self.mx < tolerance && self.my < tolerance
    }
}

/// State of one secant iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based iteration number
    pub iteration: usize,
    /// Strain at the reference point
    pub eps0: f64,
    /// Curvature 1/rx
    pub curvature_x: f64,
    /// Curvature 1/ry
    pub curvature_y: f64,
    pub resultants: Resultants,
    pub residuals: Residuals,
    /// Fibers whose secant ratio was clamped in this iteration
    pub clamped_fibers: usize,
}

/// Stress and strain for every fiber of one material
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiberResults {
    /// Stress (MPa), compression negative
    pub stress: Vec<f64>,
    /// Strain, shortening negative
    pub strain: Vec<f64>,
}

impl FiberResults {
    /// Most compressive stress (0.0 if none is compressive)
    pub fn min_stress(&self) -> f64 {
        self.stress.iter().cloned().fold(0.0, f64::min)
    }

    /// Most tensile stress (0.0 if none is tensile)
    pub fn max_stress(&self) -> f64 {
        self.stress.iter().cloned().fold(0.0, f64::max)
    }

    pub fn min_strain(&self) -> f64 {
        self.strain.iter().cloned().fold(0.0, f64::min)
    }

    pub fn max_strain(&self) -> f64 {
        self.strain.iter().cloned().fold(0.0, f64::max)
    }

    /// Largest stress magnitude
    pub fn max_abs_stress(&self) -> f64 {
        self.stress.iter().fold(0.0_f64, |m, s| m.max(s.abs()))
    }
}

/// Converged strain and stress field of a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdmSolution {
    pub concrete: FiberResults,
    pub rebar: FiberResults,
    /// Strain at the reference point
    pub eps0: f64,
    /// Curvature 1/rx (0.0 when the Mx equation is not enforced)
    pub curvature_x: f64,
    /// Curvature 1/ry (0.0 when the My equation is not enforced)
    pub curvature_y: f64,
    /// Number of iterations performed
    pub iterations: usize,
    pub mode: EquilibriumMode,
    pub resultants: Resultants,
    pub residuals: Residuals,
    /// Per-iteration states, empty unless history recording is on
    pub history: Vec<IterationRecord>,
}

impl NdmSolution {
    /// Flat arrays (concrete stress, concrete strain, rebar stress, rebar strain)
    pub fn into_arrays(self) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        (
            self.concrete.stress,
            self.concrete.strain,
            self.rebar.stress,
            self.rebar.strain,
        )
    }

    /// Peak values and utilisation against the given strengths (MPa)
    pub fn summary(&self, concrete_strength: f64, rebar_strength: f64) -> SectionSummary {
        let concrete_compression = self.concrete.min_stress();
        let rebar_peak = self.rebar.max_abs_stress();
        SectionSummary {
            max_concrete_compression: concrete_compression,
            max_concrete_tension: self.concrete.max_stress(),
            min_concrete_strain: self.concrete.min_strain(),
            max_concrete_strain: self.concrete.max_strain(),
            max_rebar_stress: rebar_peak,
            min_rebar_strain: self.rebar.min_strain(),
            max_rebar_strain: self.rebar.max_strain(),
            concrete_utilisation: ratio(-concrete_compression, concrete_strength),
            rebar_utilisation: ratio(rebar_peak, rebar_strength),
            iterations: self.iterations,
        }
    }
}

fn ratio(value: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        value / capacity
    } else {
        0.0
    }
}

/// Summary of a solved section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    /// Most compressive concrete stress
    pub max_concrete_compression: f64,
    /// Most tensile concrete stress
    pub max_concrete_tension: f64,
    pub min_concrete_strain: f64,
    pub max_concrete_strain: f64,
    /// Largest rebar stress magnitude
    pub max_rebar_stress: f64,
    pub min_rebar_strain: f64,
    pub max_rebar_strain: f64,
    /// Peak concrete compression over compressive strength
    pub concrete_utilisation: f64,
    /// Peak rebar stress over yield strength
    pub rebar_utilisation: f64,
    pub iterations: usize,
}
