//! Nonlinear deformation model solver
//!
//! Secant-stiffness iteration: material nonlinearity enters only through a
//! scalar secant modulus ratio per fiber, so every pass solves a dense
//! system of at most 3x3 regardless of how many fibers the section has.

use crate::analysis::{SolverOptions, ZeroStrainPolicy};
use crate::error::{FiberRef, NdmError, NdmResult};
use crate::loads::{EquilibriumMode, LoadTarget, Unknown};
use crate::materials::StressStrain;
use crate::math::{self, Mat, Vec as NdmVec};
use crate::results::{FiberResults, IterationRecord, NdmSolution, Residuals, Resultants};
use crate::section::{FiberSet, Section};

/// Full symmetric stiffness matrix in row order [1/rx, 1/ry, eps0]
///
/// Entries are sums over concrete and rebar fibers of
/// `area * nu * E` times `x²`, `y²`, `xy`, `x`, `y` or 1.
pub fn full_stiffness(section: &Section) -> Mat {
    let mut d = Mat::zeros(3, 3);
    for set in [&section.concrete, &section.rebar] {
        accumulate_stiffness(&mut d, set);
    }
    d
}

fn accumulate_stiffness(d: &mut Mat, set: &FiberSet) {
    let e = set.modulus();
    let nu = set.secant_ratios();
    for i in 0..set.len() {
        let (x, y) = (set.x()[i], set.y()[i]);
        let w = set.area()[i] * nu[i] * e;
        d[(0, 0)] += w * x * x;
        d[(1, 1)] += w * y * y;
        d[(0, 1)] += w * x * y;
        d[(0, 2)] += w * x;
        d[(1, 2)] += w * y;
        d[(2, 2)] += w;
    }
    d[(1, 0)] = d[(0, 1)];
    d[(2, 0)] = d[(0, 2)];
    d[(2, 1)] = d[(1, 2)];
}

/// Stiffness matrix reduced to the equations enforced by `mode`
pub fn assemble_stiffness(section: &Section, mode: EquilibriumMode) -> Mat {
    let full = full_stiffness(section);
    let unknowns = mode.unknowns();
    Mat::from_fn(unknowns.len(), unknowns.len(), |r, c| {
        full[(unknowns[r].index(), unknowns[c].index())]
    })
}

fn reduced_load_vector(target: &LoadTarget, mode: EquilibriumMode) -> NdmVec {
    let full = target.as_array();
    NdmVec::from_iterator(
        mode.dimension(),
        mode.unknowns().iter().map(|u| full[u.index()]),
    )
}

fn relative_residual(target: f64, actual: f64) -> f64 {
    if target == 0.0 {
        0.0
    } else {
        ((target - actual) / target).abs()
    }
}

/// Nonlinear deformation model solver for reinforced-concrete sections
#[derive(Debug, Clone, Default)]
pub struct NdmSolver {
    pub options: SolverOptions,
}

impl NdmSolver {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    /// Solve for the strain field that carries `target`, starting from the
    /// linear-elastic state (all secant ratios 1.0)
    pub fn solve(
        &self,
        section: &mut Section,
        target: &LoadTarget,
        concrete_law: &dyn StressStrain,
        rebar_law: &dyn StressStrain,
    ) -> NdmResult<NdmSolution> {
        section.reset_secant_ratios();
        self.resume(section, target, concrete_law, rebar_law)
    }

    /// Solve starting from the secant ratios currently stored in `section`
    pub fn resume(
        &self,
        section: &mut Section,
        target: &LoadTarget,
        concrete_law: &dyn StressStrain,
        rebar_law: &dyn StressStrain,
    ) -> NdmResult<NdmSolution> {
        self.validate(target)?;

        let opts = &self.options;
        let mode = target.mode();
        let rhs = reduced_load_vector(target, mode);
        let mut history = Vec::new();
        let mut last_residual = f64::INFINITY;

        log::debug!(
            "NDM solve: {:?} with {} concrete fibers, {} rebars, target {:?}",
            mode,
            section.concrete.len(),
            section.rebar.len(),
            target
        );

        for iteration in 1..=opts.max_iterations {
            let d = assemble_stiffness(section, mode);
            let x = math::solve_guarded(&d, &rhs).ok_or(NdmError::SingularStiffness)?;

            let (mut kx, mut ky, mut eps0) = (0.0, 0.0, 0.0);
            for (value, unknown) in x.iter().zip(mode.unknowns()) {
                match unknown {
                    Unknown::CurvatureX => kx = *value,
                    Unknown::CurvatureY => ky = *value,
                    Unknown::CentroidStrain => eps0 = *value,
                }
            }

            let concrete = evaluate(&section.concrete, concrete_law, eps0, kx, ky);
            let rebar = evaluate(&section.rebar, rebar_law, eps0, kx, ky);

            let (cn, cmx, cmy) = section.concrete.resultants(&concrete.stress);
            let (sn, smx, smy) = section.rebar.resultants(&rebar.stress);
            let resultants = Resultants::new(cn, cmx, cmy).add(&Resultants::new(sn, smx, smy));

            let residuals = Residuals {
                nz: relative_residual(target.nz, resultants.nz),
                mx: relative_residual(target.mx, resultants.mx),
                my: relative_residual(target.my, resultants.my),
            };

            let policy = opts.zero_strain;
            let floor = opts.strain_floor;
            let clamped = update_secant_ratios(&mut section.concrete, &concrete, floor, policy, FiberRef::Concrete)?
                + update_secant_ratios(&mut section.rebar, &rebar, floor, policy, FiberRef::Rebar)?;

            log::debug!(
                "iteration {}: eps0 = {:.6e}, 1/rx = {:.6e}, 1/ry = {:.6e}, residual = {:.3e}, clamped = {}",
                iteration,
                eps0,
                kx,
                ky,
                residuals.max(),
                clamped
            );

            if opts.record_history {
                history.push(IterationRecord {
                    iteration,
                    eps0,
                    curvature_x: kx,
                    curvature_y: ky,
                    resultants,
                    residuals,
                    clamped_fibers: clamped,
                });
            }

            if residuals.below(opts.tolerance) {
                log::info!("NDM converged in {} iterations", iteration);
                return Ok(NdmSolution {
                    concrete,
                    rebar,
                    eps0,
                    curvature_x: kx,
                    curvature_y: ky,
                    iterations: iteration,
                    mode,
                    resultants,
                    residuals,
                    history,
                });
            }
            last_residual = residuals.max();
        }

        log::warn!(
            "NDM did not converge in {} iterations (residual {:.3e})",
            opts.max_iterations,
            last_residual
        );
        Err(NdmError::NonConvergence {
            iterations: opts.max_iterations,
            residual: last_residual,
        })
    }

    fn validate(&self, target: &LoadTarget) -> NdmResult<()> {
        let opts = &self.options;
        if !(opts.tolerance.is_finite() && opts.tolerance > 0.0) {
            return Err(NdmError::InvalidInput(format!(
                "tolerance must be positive (received {})",
                opts.tolerance
            )));
        }
        if opts.max_iterations == 0 {
            return Err(NdmError::InvalidInput(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(opts.strain_floor.is_finite() && opts.strain_floor >= 0.0) {
            return Err(NdmError::InvalidInput(format!(
                "strain floor must be non-negative (received {})",
                opts.strain_floor
            )));
        }
        if !target.is_finite() {
            return Err(NdmError::InvalidInput(format!(
                "load target must be finite: {:?}",
                target
            )));
        }
        Ok(())
    }
}

fn evaluate(set: &FiberSet, law: &dyn StressStrain, eps0: f64, kx: f64, ky: f64) -> FiberResults {
    let strain = set.strains(eps0, kx, ky);
    let stress = strain.iter().map(|&e| law.stress(e)).collect();
    FiberResults { stress, strain }
}

/// Replace each fiber's secant ratio with `stress / (E * strain)`
///
/// Returns the number of fibers whose ratio was clamped.
fn update_secant_ratios(
    set: &mut FiberSet,
    state: &FiberResults,
    floor: f64,
    policy: ZeroStrainPolicy,
    fiber_ref: fn(usize) -> FiberRef,
) -> NdmResult<usize> {
    let e = set.modulus();
    let mut clamped = 0;
    for (i, nu) in set.secant_ratios_mut().iter_mut().enumerate() {
        let strain = state.strain[i];
        if strain.abs() < floor || strain == 0.0 {
            match policy {
                ZeroStrainPolicy::Clamp => {
                    *nu = 1.0;
                    clamped += 1;
                }
                ZeroStrainPolicy::Strict => {
                    return Err(NdmError::DivisionByNearZeroStrain {
                        fiber: fiber_ref(i),
                        strain,
                    });
                }
            }
            continue;
        }

        let ratio = state.stress[i] / (e * strain);
        if ratio.is_finite() && ratio >= 0.0 {
            *nu = ratio;
        } else {
            *nu = 0.0;
            clamped += 1;
        }
    }
    Ok(clamped)
}

/// Flat-array entry point
///
/// Returns (concrete stress, concrete strain, rebar stress, rebar strain).
#[allow(clippy::too_many_arguments)]
pub fn solve_section(
    target: LoadTarget,
    eb: f64,
    concrete_law: &dyn StressStrain,
    es: f64,
    rebar_law: &dyn StressStrain,
    concrete_x: &[f64],
    concrete_y: &[f64],
    concrete_area: &[f64],
    rebar_x: &[f64],
    rebar_y: &[f64],
    rebar_area: &[f64],
    tolerance: f64,
) -> NdmResult<(Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>)> {
    let concrete = FiberSet::new(concrete_x.to_vec(), concrete_y.to_vec(), concrete_area.to_vec(), eb)?;
    let rebar = FiberSet::new(rebar_x.to_vec(), rebar_y.to_vec(), rebar_area.to_vec(), es)?;
    let mut section = Section::new(concrete, rebar)?;

    let solver = NdmSolver::new(SolverOptions::default().with_tolerance(tolerance).without_history());
    let solution = solver.solve(&mut section, &target, concrete_law, rebar_law)?;
    Ok(solution.into_arrays())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_section() -> Section {
        // 2x2 grid of unit fibers around the origin plus 4 corner bars
        let c = FiberSet::new(
            vec![-0.5, 0.5, -0.5, 0.5],
            vec![-0.5, -0.5, 0.5, 0.5],
            vec![1.0; 4],
            30000.0,
        )
        .unwrap();
        let s = FiberSet::new(
            vec![-0.4, 0.4, -0.4, 0.4],
            vec![-0.4, -0.4, 0.4, 0.4],
            vec![0.001; 4],
            2e5,
        )
        .unwrap();
        Section::new(c, s).unwrap()
    }

    #[test]
    fn test_full_stiffness_entries() {
        let s = square_section();
        let d = full_stiffness(&s);
        let d33 = 4.0 * 30000.0 + 4.0 * 0.001 * 2e5;
        let d11 = 4.0 * 0.25 * 30000.0 + 4.0 * 0.16 * 0.001 * 2e5;
        assert_relative_eq!(d[(2, 2)], d33, epsilon = 1e-9);
        assert_relative_eq!(d[(0, 0)], d11, epsilon = 1e-9);
        assert_relative_eq!(d[(1, 1)], d11, epsilon = 1e-9);
        assert_relative_eq!(d[(0, 2)], 0.0, epsilon = 1e-9);
        assert_relative_eq!(d[(0, 1)], d[(1, 0)]);
    }

    #[test]
    fn test_reduced_stiffness_drops_rows() {
        let s = square_section();
        let full = full_stiffness(&s);

        let d = assemble_stiffness(&s, EquilibriumMode::UniaxialX);
        assert_eq!(d.shape(), (2, 2));
        assert_eq!(d[(0, 0)], full[(0, 0)]);
        assert_eq!(d[(0, 1)], full[(0, 2)]);
        assert_eq!(d[(1, 1)], full[(2, 2)]);

        let d = assemble_stiffness(&s, EquilibriumMode::UniaxialY);
        assert_eq!(d[(0, 0)], full[(1, 1)]);

        assert_eq!(assemble_stiffness(&s, EquilibriumMode::Axial).shape(), (1, 1));
    }

    #[test]
    fn test_linear_material_converges_in_one_iteration() {
        let mut s = square_section();
        let concrete = |e: f64| 30000.0 * e;
        let steel = |e: f64| 2e5 * e;
        let target = LoadTarget::new(-1.0, 0.05, -0.02);
        let sol = NdmSolver::default().solve(&mut s, &target, &concrete, &steel).unwrap();
        assert_eq!(sol.iterations, 1);
        assert_relative_eq!(sol.resultants.nz, -1.0, max_relative = 1e-9);
        assert_relative_eq!(sol.resultants.mx, 0.05, max_relative = 1e-9);
        assert_relative_eq!(sol.resultants.my, -0.02, max_relative = 1e-9);
    }

    #[test]
    fn test_axial_row_holds_zero_force_under_pure_bending() {
        // Extra bars on one side only move the stiffness centroid off the origin
        let c = FiberSet::new(
            vec![-0.5, 0.5, -0.5, 0.5],
            vec![-0.5, -0.5, 0.5, 0.5],
            vec![1.0; 4],
            30000.0,
        )
        .unwrap();
        let bars = FiberSet::new(vec![0.4, 0.4], vec![-0.4, 0.4], vec![0.01; 2], 2e5).unwrap();
        let mut s = Section::new(c, bars).unwrap();

        let concrete = |e: f64| 30000.0 * e;
        let steel = |e: f64| 2e5 * e;
        let target = LoadTarget::new(0.0, 0.05, 0.0);
        let sol = NdmSolver::default().solve(&mut s, &target, &concrete, &steel).unwrap();

        assert_eq!(sol.mode, EquilibriumMode::UniaxialX);
        assert_eq!(sol.residuals.nz, 0.0);
        assert!(sol.eps0.abs() > 1e-9);
        assert!(sol.resultants.nz.abs() < 1e-12);
        assert_relative_eq!(sol.resultants.mx, 0.05, max_relative = 1e-9);
    }

    #[test]
    fn test_strict_policy_reports_zero_strain() {
        let mut s = square_section();
        let linear = |e: f64| 30000.0 * e;
        let solver = NdmSolver::new(SolverOptions::default().strict());
        let err = solver
            .solve(&mut s, &LoadTarget::default(), &linear, &linear)
            .unwrap_err();
        assert!(matches!(
            err,
            NdmError::DivisionByNearZeroStrain {
                fiber: FiberRef::Concrete(0),
                ..
            }
        ));
    }

    #[test]
    fn test_clamp_policy_handles_zero_load() {
        let mut s = square_section();
        let linear = |e: f64| 30000.0 * e;
        let sol = NdmSolver::default()
            .solve(&mut s, &LoadTarget::default(), &linear, &linear)
            .unwrap();
        assert_eq!(sol.iterations, 1);
        assert!(sol.concrete.strain.iter().all(|e| *e == 0.0));
        assert_eq!(sol.history[0].clamped_fibers, 8);
        assert!(s.concrete.secant_ratios().iter().all(|nu| *nu == 1.0));
    }

    #[test]
    fn test_all_zero_ratios_are_singular() {
        let mut s = square_section();
        let dead = |_: f64| 0.0;
        let err = NdmSolver::default()
            .solve(&mut s, &LoadTarget::axial(-1.0), &dead, &dead)
            .unwrap_err();
        assert!(matches!(err, NdmError::SingularStiffness));
    }

    #[test]
    fn test_iteration_cap_reports_non_convergence() {
        let mut s = square_section();
        // Stress saturates, so a large load can never be carried
        let capped = |e: f64| (30000.0 * e).clamp(-1.0, 1.0);
        let solver = NdmSolver::new(SolverOptions::default().with_max_iter(5));
        let err = solver
            .solve(&mut s, &LoadTarget::axial(-100.0), &capped, &capped)
            .unwrap_err();
        assert!(matches!(err, NdmError::NonConvergence { iterations: 5, .. }));
    }

    #[test]
    fn test_invalid_tolerance_rejected() {
        let mut s = square_section();
        let linear = |e: f64| 30000.0 * e;
        let solver = NdmSolver::new(SolverOptions::default().with_tolerance(0.0));
        assert!(matches!(
            solver.solve(&mut s, &LoadTarget::axial(-1.0), &linear, &linear),
            Err(NdmError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_flat_array_entry_point() {
        let linear_c = |e: f64| 30000.0 * e;
        let linear_s = |e: f64| 2e5 * e;
        let (sb, eb, ss, es) = solve_section(
            LoadTarget::axial(-1.0),
            30000.0,
            &linear_c,
            2e5,
            &linear_s,
            &[-0.5, 0.5],
            &[0.0, 0.0],
            &[1.0, 1.0],
            &[0.0],
            &[0.0],
            &[0.001],
            1e-3,
        )
        .unwrap();
        assert_eq!(sb.len(), 2);
        assert_eq!(ss.len(), 1);
        let eps0 = -1.0 / (2.0 * 30000.0 + 0.001 * 2e5);
        assert_relative_eq!(eb[0], eps0, max_relative = 1e-12);
        assert_relative_eq!(es[0], eps0, max_relative = 1e-12);
    }

    #[test]
    fn test_flat_array_length_mismatch() {
        let linear = |e: f64| 30000.0 * e;
        let err = solve_section(
            LoadTarget::axial(-1.0),
            30000.0,
            &linear,
            2e5,
            &linear,
            &[0.0, 1.0],
            &[0.0],
            &[1.0, 1.0],
            &[],
            &[],
            &[],
            1e-3,
        )
        .unwrap_err();
        assert!(matches!(err, NdmError::DegenerateGeometry(_)));
    }
}
