//! Piecewise-linear stress-strain curves

use serde::{Deserialize, Serialize};

use crate::error::{NdmError, NdmResult};
use crate::math::lerp;

/// A strain to stress mapping defined over the whole real line
pub trait StressStrain {
    /// Stress for the given strain
    fn stress(&self, strain: f64) -> f64;
}

impl<F> StressStrain for F
where
    F: Fn(f64) -> f64,
{
    fn stress(&self, strain: f64) -> f64 {
        self(strain)
    }
}

/// Immutable breakpoint table with linear interpolation between breakpoints
/// and linear extrapolation (boundary segment slope) outside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveData")]
pub struct StressStrainCurve {
    strains: Vec<f64>,
    stresses: Vec<f64>,
}

/// Serialized breakpoint table, rebuilt through `from_points`
#[derive(Deserialize)]
struct CurveData {
    strains: Vec<f64>,
    stresses: Vec<f64>,
}

impl TryFrom<CurveData> for StressStrainCurve {
    type Error = NdmError;

    fn try_from(data: CurveData) -> NdmResult<Self> {
        if data.strains.len() != data.stresses.len() {
            return Err(NdmError::InvalidMaterial(format!(
                "{} strains but {} stresses",
                data.strains.len(),
                data.stresses.len()
            )));
        }
        Self::from_points(data.strains.into_iter().zip(data.stresses).collect())
    }
}

impl StressStrainCurve {
    /// Build a curve from (strain, stress) pairs.
    ///
    /// Pairs are sorted by strain; repeated strains keep the first pair.
    /// At least two distinct finite strains are required.
    pub fn from_points(mut points: Vec<(f64, f64)>) -> NdmResult<Self> {
        if points.iter().any(|(e, s)| !e.is_finite() || !s.is_finite()) {
            return Err(NdmError::InvalidMaterial(
                "stress-strain breakpoints must be finite".to_string(),
            ));
        }

        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points.dedup_by(|next, prev| next.0 == prev.0);

        if points.len() < 2 {
            return Err(NdmError::InvalidMaterial(format!(
                "stress-strain curve needs at least 2 distinct strains, got {}",
                points.len()
            )));
        }

        let (strains, stresses) = points.into_iter().unzip();
        Ok(Self { strains, stresses })
    }

    /// Sorted strain breakpoints
    pub fn strains(&self) -> &[f64] {
        &self.strains
    }

    /// Stresses matching [`Self::strains`]
    pub fn stresses(&self) -> &[f64] {
        &self.stresses
    }

    /// Number of breakpoints
    pub fn len(&self) -> usize {
        self.strains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strains.is_empty()
    }

    /// Strain range covered by the breakpoints
    pub fn strain_range(&self) -> (f64, f64) {
        (self.strains[0], self.strains[self.strains.len() - 1])
    }

    /// Evaluate the curve: binary search for the segment, then interpolate
    pub fn evaluate(&self, strain: f64) -> f64 {
        let n = self.strains.len();
        // Index of the segment's right end, clamped so the boundary
        // segments are used for extrapolation.
        let right = self.strains.partition_point(|&e| e < strain).clamp(1, n - 1);
        let left = right - 1;
        lerp(
            self.strains[left],
            self.stresses[left],
            self.strains[right],
            self.stresses[right],
            strain,
        )
    }
}

impl StressStrain for StressStrainCurve {
    fn stress(&self, strain: f64) -> f64 {
        self.evaluate(strain)
    }
}
