//! JSON request/response contract shared by the HTTP server and WASM bindings

use serde::{Deserialize, Serialize};

use crate::analysis::SolverOptions;
use crate::error::{NdmError, NdmResult};
use crate::loads::LoadTarget;
use crate::materials::{
    ConcreteClass, ConcretePeaks, KarpenkoDiagram, MaterialBasis, PrandtlDiagram, RebarClass,
    StressStrainCurve, REFERENCE_TEMPERATURE,
};
use crate::results::{NdmSolution, SectionSummary};
use crate::section::{Centering, RebarPoint, Section, SectionGeometry, TriangleMesh};
use crate::solver::NdmSolver;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    pub section: SectionData,
    #[serde(default = "default_concrete")]
    pub concrete: ConcreteData,
    #[serde(default = "default_rebar")]
    pub rebar: RebarData,
    #[serde(default)]
    pub basis: MaterialBasis,
    /// Concrete temperature in °C
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Load-duration coefficient of the concrete diagram
    #[serde(default = "default_lambda")]
    pub lambda: f64,
    /// Load cases, each solved independently from the elastic state
    pub loads: Vec<LoadTarget>,
    #[serde(default)]
    pub options: SolverOptions,
}

fn default_concrete() -> ConcreteData {
    ConcreteData::Class("B25".to_string())
}

fn default_rebar() -> RebarData {
    RebarData::Class("A400".to_string())
}

fn default_temperature() -> f64 {
    REFERENCE_TEMPERATURE
}

fn default_lambda() -> f64 {
    1.0
}

/// Concrete given by catalogue name ("B25") or by explicit constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConcreteData {
    Class(String),
    Custom(ConcreteClass),
}

impl ConcreteData {
    pub fn resolve(&self) -> NdmResult<ConcreteClass> {
        match self {
            ConcreteData::Class(name) => ConcreteClass::by_name(name),
            ConcreteData::Custom(class) => Ok(*class),
        }
    }
}

/// Reinforcement given by catalogue name ("A400") or by explicit constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RebarData {
    Class(String),
    Custom(RebarClass),
}

impl RebarData {
    pub fn resolve(&self) -> NdmResult<RebarClass> {
        match self {
            RebarData::Class(name) => RebarClass::by_name(name),
            RebarData::Custom(class) => Ok(*class),
        }
    }
}

/// Cross-section as a triangulated concrete region with rebar points, or
/// as flat fiber arrays already expressed in the solver frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionData {
    Mesh {
        mesh: TriangleMesh,
        #[serde(default)]
        rebars: Vec<RebarPointData>,
        #[serde(default)]
        centering: Centering,
        /// Swap the axes (x' = -y, y' = x) after centering
        #[serde(default)]
        rotate: bool,
    },
    Fibers {
        concrete_x: Vec<f64>,
        concrete_y: Vec<f64>,
        concrete_area: Vec<f64>,
        #[serde(default)]
        rebar_x: Vec<f64>,
        #[serde(default)]
        rebar_y: Vec<f64>,
        #[serde(default)]
        rebar_area: Vec<f64>,
    },
}

/// A rebar point with either a diameter (m) or a group tag such as "Rebar32"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebarPointData {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl RebarPointData {
    pub fn to_point(&self) -> NdmResult<RebarPoint> {
        match (self.diameter, &self.tag) {
            (Some(d), _) => Ok(RebarPoint::new(self.x, self.y, d)),
            (None, Some(tag)) => RebarPoint::from_tag(tag, self.x, self.y),
            (None, None) => Err(NdmError::InvalidInput(format!(
                "rebar at ({}, {}) needs a diameter or a tag",
                self.x, self.y
            ))),
        }
    }
}

impl SectionData {
    pub fn to_geometry(&self) -> NdmResult<SectionGeometry> {
        match self {
            SectionData::Mesh {
                mesh,
                rebars,
                centering,
                rotate,
            } => {
                let points = rebars
                    .iter()
                    .map(RebarPointData::to_point)
                    .collect::<NdmResult<Vec<_>>>()?;
                let geometry = SectionGeometry::from_mesh(mesh, &points, *centering)?;
                Ok(if *rotate {
                    geometry.rotated_quarter_turn()
                } else {
                    geometry
                })
            }
            SectionData::Fibers {
                concrete_x,
                concrete_y,
                concrete_area,
                rebar_x,
                rebar_y,
                rebar_area,
            } => Ok(SectionGeometry::from_arrays(
                concrete_x.clone(),
                concrete_y.clone(),
                concrete_area.clone(),
                rebar_x.clone(),
                rebar_y.clone(),
                rebar_area.clone(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<SolveResults>,
}

impl SolveResponse {
    pub fn ok(results: SolveResults) -> Self {
        Self {
            success: true,
            error: None,
            results: Some(results),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            results: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResults {
    pub cases: Vec<LoadCaseResult>,
    /// Peaks of the concrete diagram the cases were solved with
    pub concrete_peaks: ConcretePeaks,
    pub num_concrete_fibers: usize,
    pub num_rebars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadCaseResult {
    pub load: LoadTarget,
    pub solution: NdmSolution,
    pub summary: SectionSummary,
}

/// Material curves resolved from a request
struct Materials {
    concrete: StressStrainCurve,
    rebar: StressStrainCurve,
    concrete_peaks: ConcretePeaks,
    eb: f64,
    es: f64,
    concrete_strength: f64,
    rebar_strength: f64,
}

fn build_materials(request: &SolveRequest) -> NdmResult<Materials> {
    let concrete_class = request.concrete.resolve()?;
    let rebar_class = request.rebar.resolve()?;
    let karpenko = KarpenkoDiagram::new(concrete_class, request.temperature, request.lambda);
    let prandtl = PrandtlDiagram::new(rebar_class);

    let (concrete, rebar) = match request.basis {
        MaterialBasis::Normative => (karpenko.normative()?, prandtl.normative()?),
        MaterialBasis::Design => (karpenko.design()?, prandtl.design()?),
    };
    let concrete_peaks = karpenko.peaks(request.basis)?;

    Ok(Materials {
        concrete,
        rebar,
        concrete_peaks,
        eb: karpenko.modulus(),
        es: rebar_class.es,
        concrete_strength: -concrete_peaks.compression.1,
        rebar_strength: rebar_class.strength(request.basis),
    })
}

/// Solve every load case of a request
pub fn run_request(request: &SolveRequest) -> NdmResult<SolveResults> {
    if request.loads.is_empty() {
        return Err(NdmError::InvalidInput("request has no load cases".to_string()));
    }

    let materials = build_materials(request)?;
    let mut section: Section = request
        .section
        .to_geometry()?
        .into_section(materials.eb, materials.es)?;
    let solver = NdmSolver::new(request.options.clone());

    let mut cases = Vec::with_capacity(request.loads.len());
    for load in &request.loads {
        let solution = solver.solve(&mut section, load, &materials.concrete, &materials.rebar)?;
        let summary = solution.summary(materials.concrete_strength, materials.rebar_strength);
        cases.push(LoadCaseResult {
            load: *load,
            solution,
            summary,
        });
    }

    Ok(SolveResults {
        cases,
        concrete_peaks: materials.concrete_peaks,
        num_concrete_fibers: section.concrete.len(),
        num_rebars: section.rebar.len(),
    })
}

/// Parse, solve and serialize in one step
pub fn run_json(request_json: &str) -> String {
    let response = match serde_json::from_str::<SolveRequest>(request_json) {
        Ok(request) => match run_request(&request) {
            Ok(results) => SolveResponse::ok(results),
            Err(e) => SolveResponse::failed(e.to_string()),
        },
        Err(e) => SolveResponse::failed(format!("Failed to parse request: {}", e)),
    };

    serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(r#"{{"success":false,"error":"Serialization failed: {}"}}"#, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_request() -> SolveRequest {
        let json = r#"{
            "section": {
                "type": "mesh",
                "mesh": { "nodes": [[0.0, 0.0], [0.4, 0.0], [0.4, 0.6], [0.0, 0.6]],
                          "triangles": [[0, 1, 2], [0, 2, 3]] },
                "rebars": [
                    { "x": 0.05, "y": 0.05, "tag": "Rebar32" },
                    { "x": 0.35, "y": 0.05, "tag": "Rebar32" },
                    { "x": 0.05, "y": 0.55, "diameter": 0.032 },
                    { "x": 0.35, "y": 0.55, "diameter": 0.032 }
                ]
            },
            "concrete": "B25",
            "rebar": "A400",
            "loads": [ { "nz": -1.0 } ]
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let req = column_request();
        assert_eq!(req.temperature, 20.0);
        assert_eq!(req.lambda, 1.0);
        assert_eq!(req.basis, MaterialBasis::Design);
        assert_eq!(req.options.max_iterations, 100);
    }

    #[test]
    fn test_tag_and_diameter_give_same_bar() {
        let req = column_request();
        let geometry = req.section.to_geometry().unwrap();
        assert_eq!(geometry.rebar_area.len(), 4);
        assert_eq!(geometry.rebar_area[0], geometry.rebar_area[2]);
    }

    #[test]
    fn test_rebar_without_size_rejected() {
        let bar = RebarPointData {
            x: 0.0,
            y: 0.0,
            diameter: None,
            tag: None,
        };
        assert!(matches!(bar.to_point(), Err(NdmError::InvalidInput(_))));
    }

    #[test]
    fn test_custom_concrete_constants() {
        let json = r#"{ "b": 25.0, "eb": 30000.0, "rbn": 18.5, "rbtn": 1.55, "rb": 14.5, "rbt": 1.05 }"#;
        let data: ConcreteData = serde_json::from_str(json).unwrap();
        assert_eq!(data.resolve().unwrap(), ConcreteClass::B25);
    }

    #[test]
    fn test_unknown_class_reported() {
        let mut req = column_request();
        req.concrete = ConcreteData::Class("B99".to_string());
        assert!(matches!(run_request(&req), Err(NdmError::UnknownClass(_))));
    }

    #[test]
    fn test_no_loads_rejected() {
        let mut req = column_request();
        req.loads.clear();
        assert!(matches!(run_request(&req), Err(NdmError::InvalidInput(_))));
    }

    #[test]
    fn test_run_json_reports_parse_errors() {
        let out = run_json("{ not json");
        let response: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(response["success"], false);
        assert!(response["error"].as_str().unwrap().starts_with("Failed to parse request"));
    }
}
