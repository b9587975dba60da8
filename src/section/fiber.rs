//! Fiber arrays and the mutable secant-ratio state

use serde::{Deserialize, Serialize};

use crate::error::{NdmError, NdmResult};

/// A set of fibers sharing one material: concrete triangles or rebar points
///
/// Coordinates and areas are fixed once built. The secant modulus ratio of
/// each fiber is the only state the solver mutates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FiberSetData")]
pub struct FiberSet {
    x: Vec<f64>,
    y: Vec<f64>,
    area: Vec<f64>,
    secant_ratio: Vec<f64>,
    /// Initial elastic modulus of the material (MPa)
    modulus: f64,
}

impl FiberSet {
    /// Build a fiber set from flat arrays of equal length
    pub fn new(x: Vec<f64>, y: Vec<f64>, area: Vec<f64>, modulus: f64) -> NdmResult<Self> {
        if x.len() != area.len() || y.len() != area.len() {
            return Err(NdmError::DegenerateGeometry(format!(
                "fiber arrays differ in length (x: {}, y: {}, area: {})",
                x.len(),
                y.len(),
                area.len()
            )));
        }
        if let Some(i) = area.iter().position(|a| !a.is_finite() || *a <= 0.0) {
            return Err(NdmError::DegenerateGeometry(format!(
                "fiber {} has non-positive area {}",
                i, area[i]
            )));
        }
        if x.iter().chain(y.iter()).any(|c| !c.is_finite()) {
            return Err(NdmError::DegenerateGeometry(
                "fiber coordinates must be finite".to_string(),
            ));
        }
        if !modulus.is_finite() || modulus <= 0.0 {
            return Err(NdmError::InvalidMaterial(format!(
                "elastic modulus must be positive (received {})",
                modulus
            )));
        }

        let n = area.len();
        Ok(Self {
            x,
            y,
            area,
            secant_ratio: vec![1.0; n],
            modulus,
        })
    }

    /// An empty set, e.g. a plain concrete section without reinforcement
    pub fn empty(modulus: f64) -> NdmResult<Self> {
        Self::new(Vec::new(), Vec::new(), Vec::new(), modulus)
    }

    pub fn len(&self) -> usize {
        self.area.len()
    }

    pub fn is_empty(&self) -> bool {
        self.area.is_empty()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn area(&self) -> &[f64] {
        &self.area
    }

    pub fn modulus(&self) -> f64 {
        self.modulus
    }

    pub fn secant_ratios(&self) -> &[f64] {
        &self.secant_ratio
    }

    pub(crate) fn secant_ratios_mut(&mut self) -> &mut [f64] {
        &mut self.secant_ratio
    }

    /// Return every fiber to the linear-elastic state (ratio 1.0)
    pub fn reset_secant_ratios(&mut self) {
        self.secant_ratio.iter_mut().for_each(|nu| *nu = 1.0);
    }

    pub fn total_area(&self) -> f64 {
        self.area.iter().sum()
    }

    /// Strain at every fiber for a plane strain field
    pub fn strains(&self, eps0: f64, kx: f64, ky: f64) -> Vec<f64> {
        self.x
            .iter()
            .zip(&self.y)
            .map(|(x, y)| eps0 + kx * x + ky * y)
            .collect()
    }

    /// Resultants (Nz, Mx, My) of a stress field over this set
    pub fn resultants(&self, stress: &[f64]) -> (f64, f64, f64) {
        let mut n = 0.0;
        let mut mx = 0.0;
        let mut my = 0.0;
        for i in 0..self.len() {
            let f = stress[i] * self.area[i];
            n += f;
            mx += f * self.x[i];
            my += f * self.y[i];
        }
        (n, mx, my)
    }
}

/// Serialized form of a `FiberSet`, checked on the way in
#[derive(Deserialize)]
struct FiberSetData {
    x: Vec<f64>,
    y: Vec<f64>,
    area: Vec<f64>,
    modulus: f64,
    #[serde(default)]
    secant_ratio: Option<Vec<f64>>,
}

impl TryFrom<FiberSetData> for FiberSet {
    type Error = NdmError;

    fn try_from(data: FiberSetData) -> NdmResult<Self> {
        let mut set = FiberSet::new(data.x, data.y, data.area, data.modulus)?;
        if let Some(ratios) = data.secant_ratio {
            if ratios.len() != set.len() {
                return Err(NdmError::DegenerateGeometry(format!(
                    "{} secant ratios for {} fibers",
                    ratios.len(),
                    set.len()
                )));
            }
            if let Some(i) = ratios.iter().position(|nu| !nu.is_finite() || *nu < 0.0) {
                return Err(NdmError::InvalidInput(format!(
                    "fiber {} has invalid secant ratio {}",
                    i, ratios[i]
                )));
            }
            set.secant_ratio = ratios;
        }
        Ok(set)
    }
}

/// Concrete and rebar fibers of one cross-section in a common frame
///
/// The two sets are kept apart; each carries its own elastic modulus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SectionData")]
pub struct Section {
    pub concrete: FiberSet,
    pub rebar: FiberSet,
}

#[derive(Deserialize)]
struct SectionData {
    concrete: FiberSet,
    rebar: FiberSet,
}

impl TryFrom<SectionData> for Section {
    type Error = NdmError;

    fn try_from(data: SectionData) -> NdmResult<Self> {
        Section::new(data.concrete, data.rebar)
    }
}

impl Section {
    pub fn new(concrete: FiberSet, rebar: FiberSet) -> NdmResult<Self> {
        if concrete.total_area() + rebar.total_area() <= 0.0 {
            return Err(NdmError::DegenerateGeometry(
                "section has zero total area".to_string(),
            ));
        }
        Ok(Self { concrete, rebar })
    }

    pub fn reset_secant_ratios(&mut self) {
        self.concrete.reset_secant_ratios();
        self.rebar.reset_secant_ratios();
    }

    /// Axial stiffness sum(area * E) with all ratios at 1.0
    pub fn elastic_axial_stiffness(&self) -> f64 {
        self.concrete.total_area() * self.concrete.modulus()
            + self.rebar.total_area() * self.rebar.modulus()
    }
}
