//! Reinforcement classes and the bilinear Prandtl diagram

use serde::{Deserialize, Serialize};

use super::curve::StressStrainCurve;
use super::{ensure_positive, MaterialBasis};
use crate::error::{NdmError, NdmResult};

/// Strain at which the plastic plateau breakpoint is placed (5 x 0.025)
pub const PLATEAU_STRAIN: f64 = 0.125;

/// Physical and mechanical properties of a reinforcement class (MPa)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebarClass {
    /// Modulus of elasticity
    pub es: f64,
    /// Normative yield strength
    pub rsn: f64,
    /// Design tensile strength
    pub rs: f64,
    /// Design compressive strength
    pub rsc: f64,
    /// Design compressive strength under long-term loading
    pub rsc_long: f64,
}

impl RebarClass {
    pub const A240: Self = Self::new(2e5, 240.0, 210.0, 210.0, 210.0);
    pub const A400: Self = Self::new(2e5, 390.0, 340.0, 340.0, 340.0);
    pub const A500: Self = Self::new(2e5, 500.0, 435.0, 435.0, 400.0);

    pub const fn new(es: f64, rsn: f64, rs: f64, rsc: f64, rsc_long: f64) -> Self {
        Self {
            es,
            rsn,
            rs,
            rsc,
            rsc_long,
        }
    }

    /// Look up a catalogue class by name ("A400", case-insensitive)
    pub fn by_name(name: &str) -> NdmResult<Self> {
        match name.trim().to_uppercase().as_str() {
            "A240" => Ok(Self::A240),
            "A400" => Ok(Self::A400),
            "A500" => Ok(Self::A500),
            _ => Err(NdmError::UnknownClass(name.to_string())),
        }
    }

    pub fn validate(&self) -> NdmResult<()> {
        ensure_positive("rebar modulus Es", self.es)?;
        ensure_positive("rebar strength Rsn", self.rsn)?;
        ensure_positive("rebar strength Rs", self.rs)?;
        ensure_positive("rebar strength Rsc", self.rsc)?;
        ensure_positive("rebar strength Rsc (long-term)", self.rsc_long)?;
        Ok(())
    }

    /// Yield strength for the given basis
    pub fn strength(&self, basis: MaterialBasis) -> f64 {
        match basis {
            MaterialBasis::Normative => self.rsn,
            MaterialBasis::Design => self.rs,
        }
    }
}

/// Elastic-perfectly-plastic diagram, symmetric in tension and compression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrandtlDiagram {
    pub class: RebarClass,
}

impl PrandtlDiagram {
    pub fn new(class: RebarClass) -> Self {
        Self { class }
    }

    pub fn normative(&self) -> NdmResult<StressStrainCurve> {
        self.build(MaterialBasis::Normative)
    }

    pub fn design(&self) -> NdmResult<StressStrainCurve> {
        self.build(MaterialBasis::Design)
    }

    /// Yield strain for the given basis
    pub fn yield_strain(&self, basis: MaterialBasis) -> f64 {
        self.class.strength(basis) / self.class.es
    }

    fn build(&self, basis: MaterialBasis) -> NdmResult<StressStrainCurve> {
        self.class.validate()?;
        let r = self.class.strength(basis);
        let eps0 = r / self.class.es;
        if eps0 >= PLATEAU_STRAIN {
            return Err(NdmError::InvalidMaterial(format!(
                "yield strain {} exceeds the plateau strain {}",
                eps0, PLATEAU_STRAIN
            )));
        }

        StressStrainCurve::from_points(vec![
            (-PLATEAU_STRAIN, -r),
            (-eps0, -r),
            (0.0, 0.0),
            (eps0, r),
            (PLATEAU_STRAIN, r),
        ])
    }
}
