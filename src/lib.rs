//! NDM Section - nonlinear deformation model for reinforced-concrete sections
//!
//! Finds the plane strain field (reference strain and two curvatures) under
//! which a cross-section carries a given axial force and biaxial bending:
//! - Karpenko concrete diagram with temperature and load-duration effects
//! - Bilinear Prandtl diagram for reinforcement
//! - Triangulated concrete regions and point rebars
//! - Secant-stiffness iteration with reduced systems for uniaxial loading
//!
//! ## Example
//! ```rust
//! use ndm_section::prelude::*;
//!
//! // 0.4 x 0.6 m column with four 32 mm corner bars
//! let mesh = TriangleMesh::rectangle(0.4, 0.6, 8, 12);
//! let rebars = [
//!     RebarPoint::new(0.05, 0.05, 0.032),
//!     RebarPoint::new(0.35, 0.05, 0.032),
//!     RebarPoint::new(0.05, 0.55, 0.032),
//!     RebarPoint::new(0.35, 0.55, 0.032),
//! ];
//!
//! let concrete = KarpenkoDiagram::standard(ConcreteClass::B25);
//! let rebar = PrandtlDiagram::new(RebarClass::A400);
//!
//! let mut section = SectionGeometry::from_mesh(&mesh, &rebars, Centering::Concrete)
//!     .unwrap()
//!     .into_section(concrete.modulus(), RebarClass::A400.es)
//!     .unwrap();
//!
//! let solver = NdmSolver::new(SolverOptions::default());
//! let solution = solver
//!     .solve(
//!         &mut section,
//!         &LoadTarget::new(-1.5, 0.1, 0.0),
//!         &concrete.design().unwrap(),
//!         &rebar.design().unwrap(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(solution.curvature_y, 0.0);
//! ```

pub mod analysis;
pub mod error;
pub mod loads;
pub mod materials;
pub mod math;
pub mod request;
pub mod results;
pub mod section;
pub mod solver;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{SolverOptions, ZeroStrainPolicy};
    pub use crate::error::{FiberRef, NdmError, NdmResult};
    pub use crate::loads::{EquilibriumMode, LoadTarget, Unknown};
    pub use crate::materials::{
        ConcreteClass, KarpenkoDiagram, MaterialBasis, PrandtlDiagram, RebarClass, StressStrain,
        StressStrainCurve, TemperatureFactors,
    };
    pub use crate::results::{FiberResults, NdmSolution, Resultants, SectionSummary};
    pub use crate::section::{Centering, FiberSet, RebarPoint, Section, SectionGeometry, TriangleMesh};
    pub use crate::solver::{assemble_stiffness, solve_section, NdmSolver};
}

#[cfg(feature = "wasm")]
pub mod wasm;
