//! Section loads and the equilibrium equations they activate

use serde::{Deserialize, Serialize};

/// Target internal forces for a section (MN, MN·m)
///
/// Compression is negative. A zero moment component drops the matching
/// equilibrium equation from the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadTarget {
    /// Axial force
    #[serde(default)]
    pub nz: f64,
    /// Bending moment about the x axis
    #[serde(default)]
    pub mx: f64,
    /// Bending moment about the y axis
    #[serde(default)]
    pub my: f64,
}

impl LoadTarget {
    pub fn new(nz: f64, mx: f64, my: f64) -> Self {
        Self { nz, mx, my }
    }

    /// Pure axial force
    pub fn axial(nz: f64) -> Self {
        Self::new(nz, 0.0, 0.0)
    }

    /// Equilibrium equations enforced for this target
    pub fn mode(&self) -> EquilibriumMode {
        EquilibriumMode::for_target(self)
    }

    /// Components as `[Mx, My, Nz]`, the order of the stiffness rows
    pub fn as_array(&self) -> [f64; 3] {
        [self.mx, self.my, self.nz]
    }

    pub fn is_finite(&self) -> bool {
        self.nz.is_finite() && self.mx.is_finite() && self.my.is_finite()
    }
}

/// Unknowns of the section deformation, in stiffness row order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unknown {
    /// Curvature 1/rx, paired with Mx
    CurvatureX,
    /// Curvature 1/ry, paired with My
    CurvatureY,
    /// Strain at the reference point, paired with Nz
    CentroidStrain,
}

impl Unknown {
    /// Row/column in the full 3x3 stiffness matrix
    pub fn index(self) -> usize {
        match self {
            Unknown::CurvatureX => 0,
            Unknown::CurvatureY => 1,
            Unknown::CentroidStrain => 2,
        }
    }
}

/// Which equilibrium equations the solver enforces
///
/// The axial equation always stays in the linear system. Its residual is
/// only checked when the axial target is non-zero, so after a pure bending
/// solve the net axial force is small but not bounded by the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquilibriumMode {
    /// Nz only (1x1)
    Axial,
    /// Nz and Mx (2x2)
    UniaxialX,
    /// Nz and My (2x2)
    UniaxialY,
    /// Nz, Mx and My (3x3)
    Biaxial,
}

impl EquilibriumMode {
    pub fn for_target(target: &LoadTarget) -> Self {
        match (target.mx != 0.0, target.my != 0.0) {
            (false, false) => Self::Axial,
            (true, false) => Self::UniaxialX,
            (false, true) => Self::UniaxialY,
            (true, true) => Self::Biaxial,
        }
    }

    pub fn unknowns(&self) -> &'static [Unknown] {
        match self {
            Self::Axial => &[Unknown::CentroidStrain],
            Self::UniaxialX => &[Unknown::CurvatureX, Unknown::CentroidStrain],
            Self::UniaxialY => &[Unknown::CurvatureY, Unknown::CentroidStrain],
            Self::Biaxial => &[
                Unknown::CurvatureX,
                Unknown::CurvatureY,
                Unknown::CentroidStrain,
            ],
        }
    }

    /// Dimension of the reduced linear system
    pub fn dimension(&self) -> usize {
        self.unknowns().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_selection() {
        assert_eq!(LoadTarget::axial(-1.0).mode(), EquilibriumMode::Axial);
        assert_eq!(LoadTarget::new(0.0, 0.1, 0.0).mode(), EquilibriumMode::UniaxialX);
        assert_eq!(LoadTarget::new(-1.0, 0.0, 0.1).mode(), EquilibriumMode::UniaxialY);
        assert_eq!(LoadTarget::new(-2.6, -0.25, 0.2).mode(), EquilibriumMode::Biaxial);
        assert_eq!(LoadTarget::default().mode(), EquilibriumMode::Axial);
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(EquilibriumMode::Axial.dimension(), 1);
        assert_eq!(EquilibriumMode::UniaxialY.dimension(), 2);
        assert_eq!(EquilibriumMode::Biaxial.dimension(), 3);
        assert!(!EquilibriumMode::UniaxialX.unknowns().contains(&Unknown::CurvatureY));
    }
}
