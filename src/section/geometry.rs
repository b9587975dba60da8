//! Section geometry: triangulated concrete region and rebar points
//!
//! Converts an externally produced mesh into the flat fiber arrays the
//! solver consumes. Coordinates are returned relative to the center of
//! area, optionally shifted to another reference point.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::fiber::{FiberSet, Section};
use crate::error::{NdmError, NdmResult};

/// Planar triangle mesh of the concrete region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Node coordinates [x, y] in metres
    pub nodes: Vec<[f64; 2]>,
    /// Node indices of each triangle
    pub triangles: Vec<[usize; 3]>,
}

impl TriangleMesh {
    pub fn new(nodes: Vec<[f64; 2]>, triangles: Vec<[usize; 3]>) -> Self {
        Self { nodes, triangles }
    }

    /// Structured triangulation of a `width` x `height` rectangle with its
    /// lower-left corner at the origin, each of the `nx` x `ny` cells split
    /// into two triangles
    pub fn rectangle(width: f64, height: f64, nx: usize, ny: usize) -> Self {
        let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            let y = height * j as f64 / ny as f64;
            for i in 0..=nx {
                let x = width * i as f64 / nx as f64;
                nodes.push([x, y]);
            }
        }

        let id = |i: usize, j: usize| j * (nx + 1) + i;
        let mut triangles = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let (bl, br) = (id(i, j), id(i + 1, j));
                let (tl, tr) = (id(i, j + 1), id(i + 1, j + 1));
                triangles.push([bl, br, tr]);
                triangles.push([bl, tr, tl]);
            }
        }

        Self { nodes, triangles }
    }

    /// Centroid and area of each triangle
    pub fn elements(&self) -> NdmResult<Vec<([f64; 2], f64)>> {
        self.triangles
            .iter()
            .enumerate()
            .map(|(t, tri)| {
                let mut p = [[0.0; 2]; 3];
                for (k, &n) in tri.iter().enumerate() {
                    p[k] = *self.nodes.get(n).ok_or_else(|| {
                        NdmError::DegenerateGeometry(format!(
                            "triangle {} references missing node {}",
                            t, n
                        ))
                    })?;
                }
                let area = 0.5
                    * ((p[1][0] - p[0][0]) * (p[2][1] - p[0][1])
                        - (p[2][0] - p[0][0]) * (p[1][1] - p[0][1]))
                        .abs();
                let centroid = [
                    (p[0][0] + p[1][0] + p[2][0]) / 3.0,
                    (p[0][1] + p[1][1] + p[2][1]) / 3.0,
                ];
                Ok((centroid, area))
            })
            .collect()
    }
}

/// A reinforcement bar modelled as a point fiber
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebarPoint {
    pub x: f64,
    pub y: f64,
    /// Bar diameter in metres
    pub diameter: f64,
}

impl RebarPoint {
    pub fn new(x: f64, y: f64, diameter: f64) -> Self {
        Self { x, y, diameter }
    }

    /// Build from a mesh group name carrying the diameter in millimetres,
    /// e.g. "Rebar32", "Rebar_20" or "Rebar 12"
    pub fn from_tag(name: &str, x: f64, y: f64) -> NdmResult<Self> {
        let digits = name
            .strip_prefix("Rebar")
            .map(|rest| rest.trim_start_matches(|c: char| c == '_' || c == ' ' || c == '-'))
            .ok_or_else(|| NdmError::InvalidInput(format!("'{}' is not a rebar tag", name)))?;
        let mm: f64 = digits
            .parse()
            .map_err(|_| NdmError::InvalidInput(format!("no diameter in rebar tag '{}'", name)))?;
        Ok(Self::new(x, y, mm / 1000.0))
    }

    /// Cross-sectional area pi d² / 4
    pub fn area(&self) -> f64 {
        PI * self.diameter * self.diameter / 4.0
    }
}

/// Reference point the fiber coordinates are measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Centering {
    /// Center of area of the concrete region (gross section)
    Concrete,
    /// Center of area of concrete and rebar areas together
    Combined,
}

impl Default for Centering {
    fn default() -> Self {
        Self::Concrete
    }
}

/// Flat fiber arrays for one cross-section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionGeometry {
    pub concrete_x: Vec<f64>,
    pub concrete_y: Vec<f64>,
    pub concrete_area: Vec<f64>,
    pub rebar_x: Vec<f64>,
    pub rebar_y: Vec<f64>,
    pub rebar_area: Vec<f64>,
    /// Center of area in the mesh frame, before any offset
    pub centroid: [f64; 2],
}

impl SectionGeometry {
    /// Geometry from a concrete mesh and rebar points, centered per `centering`
    pub fn from_mesh(mesh: &TriangleMesh, rebars: &[RebarPoint], centering: Centering) -> NdmResult<Self> {
        let elements = mesh.elements()?;
        if elements.is_empty() {
            return Err(NdmError::DegenerateGeometry(
                "concrete mesh has no triangles".to_string(),
            ));
        }
        if let Some(i) = rebars.iter().position(|r| !r.diameter.is_finite() || r.diameter <= 0.0) {
            return Err(NdmError::DegenerateGeometry(format!(
                "rebar {} has non-positive diameter {}",
                i, rebars[i].diameter
            )));
        }

        let mut geometry = Self {
            concrete_x: elements.iter().map(|(c, _)| c[0]).collect(),
            concrete_y: elements.iter().map(|(c, _)| c[1]).collect(),
            concrete_area: elements.iter().map(|(_, a)| *a).collect(),
            rebar_x: rebars.iter().map(|r| r.x).collect(),
            rebar_y: rebars.iter().map(|r| r.y).collect(),
            rebar_area: rebars.iter().map(RebarPoint::area).collect(),
            centroid: [0.0, 0.0],
        };

        let centroid = geometry.center_of_area(centering)?;
        geometry = geometry.with_offset(centroid[0], centroid[1]);
        geometry.centroid = centroid;
        Ok(geometry)
    }

    /// Geometry from flat arrays already expressed in the desired frame
    pub fn from_arrays(
        concrete_x: Vec<f64>,
        concrete_y: Vec<f64>,
        concrete_area: Vec<f64>,
        rebar_x: Vec<f64>,
        rebar_y: Vec<f64>,
        rebar_area: Vec<f64>,
    ) -> Self {
        Self {
            concrete_x,
            concrete_y,
            concrete_area,
            rebar_x,
            rebar_y,
            rebar_area,
            centroid: [0.0, 0.0],
        }
    }

    /// Area-weighted center of the concrete region, or of concrete and rebar
    pub fn center_of_area(&self, centering: Centering) -> NdmResult<[f64; 2]> {
        let mut a = 0.0_f64;
        let mut sx = 0.0_f64;
        let mut sy = 0.0_f64;
        for ((x, y), da) in self.concrete_x.iter().zip(&self.concrete_y).zip(&self.concrete_area) {
            a += da;
            sx += da * x;
            sy += da * y;
        }
        if centering == Centering::Combined {
            for ((x, y), da) in self.rebar_x.iter().zip(&self.rebar_y).zip(&self.rebar_area) {
                a += da;
                sx += da * x;
                sy += da * y;
            }
        }
        if a.is_nan() || a <= 0.0 {
            return Err(NdmError::DegenerateGeometry(
                "section has zero total area".to_string(),
            ));
        }
        Ok([sx / a, sy / a])
    }

    /// Express every coordinate relative to the point (x0, y0)
    pub fn with_offset(mut self, x0: f64, y0: f64) -> Self {
        for x in self.concrete_x.iter_mut().chain(self.rebar_x.iter_mut()) {
            *x -= x0;
        }
        for y in self.concrete_y.iter_mut().chain(self.rebar_y.iter_mut()) {
            *y -= y0;
        }
        self
    }

    /// Rotate the axes by 90 degrees: x' = -y, y' = x
    pub fn rotated_quarter_turn(mut self) -> Self {
        let rotate = |xs: &mut Vec<f64>, ys: &mut Vec<f64>| {
            for (x, y) in xs.iter_mut().zip(ys.iter_mut()) {
                let old_x = *x;
                *x = -*y;
                *y = old_x;
            }
        };
        rotate(&mut self.concrete_x, &mut self.concrete_y);
        rotate(&mut self.rebar_x, &mut self.rebar_y);
        self
    }

    /// Build the solver's fiber sets with the given moduli (MPa)
    pub fn into_section(self, eb: f64, es: f64) -> NdmResult<Section> {
        let concrete = FiberSet::new(self.concrete_x, self.concrete_y, self.concrete_area, eb)?;
        let rebar = FiberSet::new(self.rebar_x, self.rebar_y, self.rebar_area, es)?;
        Section::new(concrete, rebar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangle_mesh_area() {
        let mesh = TriangleMesh::rectangle(0.4, 0.6, 4, 6);
        assert_eq!(mesh.nodes.len(), 35);
        assert_eq!(mesh.triangles.len(), 48);
        let total: f64 = mesh.elements().unwrap().iter().map(|(_, a)| a).sum();
        assert_relative_eq!(total, 0.24, epsilon = 1e-12);
    }

    #[test]
    fn test_default_centering_is_gross_concrete() {
        assert_eq!(Centering::default(), Centering::Concrete);
        let parsed: Centering = serde_json::from_str(r#""combined""#).unwrap();
        assert_eq!(parsed, Centering::Combined);
    }

    #[test]
    fn test_geometry_is_centered() {
        let mesh = TriangleMesh::rectangle(0.4, 0.6, 8, 12);
        let g = SectionGeometry::from_mesh(&mesh, &[], Centering::Concrete).unwrap();
        assert_relative_eq!(g.centroid[0], 0.2, epsilon = 1e-12);
        assert_relative_eq!(g.centroid[1], 0.3, epsilon = 1e-12);
        let c = g.center_of_area(Centering::Concrete).unwrap();
        assert_relative_eq!(c[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(c[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rebar_area_from_diameter() {
        let r = RebarPoint::new(0.0, 0.0, 0.032);
        assert_relative_eq!(r.area(), 8.0425e-4, epsilon = 1e-7);
    }

    #[test]
    fn test_rebar_tag_parsing() {
        let r = RebarPoint::from_tag("Rebar_32", 0.1, 0.2).unwrap();
        assert_relative_eq!(r.diameter, 0.032);
        assert_relative_eq!(RebarPoint::from_tag("Rebar20", 0.0, 0.0).unwrap().diameter, 0.02);
        assert!(RebarPoint::from_tag("Concrete", 0.0, 0.0).is_err());
        assert!(RebarPoint::from_tag("Rebar_xx", 0.0, 0.0).is_err());
    }

    #[test]
    fn test_offset_and_rotation() {
        let g = SectionGeometry::from_arrays(vec![1.0], vec![2.0], vec![1.0], vec![3.0], vec![4.0], vec![0.1]);
        let g = g.with_offset(1.0, 1.0).rotated_quarter_turn();
        assert_eq!(g.concrete_x, vec![-1.0]);
        assert_eq!(g.concrete_y, vec![0.0]);
        assert_eq!(g.rebar_x, vec![-3.0]);
        assert_eq!(g.rebar_y, vec![2.0]);
    }

    #[test]
    fn test_missing_node_is_degenerate() {
        let mesh = TriangleMesh::new(vec![[0.0, 0.0], [1.0, 0.0]], vec![[0, 1, 2]]);
        assert!(matches!(
            SectionGeometry::from_mesh(&mesh, &[], Centering::Concrete),
            Err(NdmError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_combined_centering_shifts_toward_rebar() {
        let mesh = TriangleMesh::rectangle(0.4, 0.6, 4, 6);
        let rebars = [RebarPoint::new(0.2, 0.55, 0.032)];
        let g = SectionGeometry::from_mesh(&mesh, &rebars, Centering::Combined).unwrap();
        assert!(g.centroid[1] > 0.3);
    }
}
