//! Cross-section fibers and geometry

mod fiber;
mod geometry;

pub use fiber::{FiberSet, Section};
pub use geometry::{Centering, RebarPoint, SectionGeometry, TriangleMesh};
