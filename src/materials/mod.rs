//! Material stress-strain laws

mod concrete;
mod curve;
mod rebar;

use serde::{Deserialize, Serialize};

use crate::error::{NdmError, NdmResult};

pub use concrete::{ConcreteClass, ConcretePeaks, KarpenkoDiagram, TemperatureFactors, REFERENCE_TEMPERATURE};
pub use curve::{StressStrain, StressStrainCurve};
pub use rebar::{PrandtlDiagram, RebarClass, PLATEAU_STRAIN};

/// Which strength values a diagram is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialBasis {
    /// Characteristic strengths (serviceability checks)
    Normative,
    /// Design strengths (ultimate limit state checks)
    Design,
}

impl Default for MaterialBasis {
    fn default() -> Self {
        Self::Design
    }
}

pub(crate) fn ensure_positive(what: &str, value: f64) -> NdmResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(NdmError::InvalidMaterial(format!(
            "{} must be positive and finite (received {})",
            what, value
        )))
    }
}
