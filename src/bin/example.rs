//! NDM Section Example - Rectangular Column Under Biaxial Bending

use ndm_section::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== NDM Section Example: 0.4 x 0.6 m Column ===\n");

    // Concrete region meshed with 20 x 30 cells of 2 cm
    let mesh = TriangleMesh::rectangle(0.4, 0.6, 20, 30);

    //   o-----------o   4 corner bars 32 mm
    //   |           |   2 mid-height bars 20 mm
    //   o           o
    //   |           |
    //   o-----------o
    let rebars = [
        RebarPoint::from_tag("Rebar32", 0.05, 0.05)?,
        RebarPoint::from_tag("Rebar32", 0.35, 0.05)?,
        RebarPoint::from_tag("Rebar32", 0.05, 0.55)?,
        RebarPoint::from_tag("Rebar32", 0.35, 0.55)?,
        RebarPoint::from_tag("Rebar20", 0.05, 0.30)?,
        RebarPoint::from_tag("Rebar20", 0.35, 0.30)?,
    ];

    let concrete = KarpenkoDiagram::standard(ConcreteClass::B25);
    let rebar = PrandtlDiagram::new(RebarClass::A400);
    let concrete_curve = concrete.design()?;
    let rebar_curve = rebar.design()?;

    let geometry = SectionGeometry::from_mesh(&mesh, &rebars, Centering::Concrete)?;
    println!(
        "Section: {} concrete fibers, {} rebars, center of area at ({:.3}, {:.3})",
        geometry.concrete_area.len(),
        geometry.rebar_area.len(),
        geometry.centroid[0],
        geometry.centroid[1]
    );
    // Swap the mesh axes so the 0.6 m depth lies along x
    let mut section = geometry
        .rotated_quarter_turn()
        .into_section(concrete.modulus(), RebarClass::A400.es)?;

    let target = LoadTarget::new(-2.6, -0.25, 0.2);
    println!(
        "Loads:   Nz = {:.3} MN, Mx = {:.3} MN*m, My = {:.3} MN*m\n",
        target.nz, target.mx, target.my
    );

    println!("Design strengths:");
    let solver = NdmSolver::new(SolverOptions::default().with_tolerance(1e-3));
    let solution = solver.solve(&mut section, &target, &concrete_curve, &rebar_curve)?;

    println!("Converged in {} iterations ({:?})", solution.iterations, solution.mode);
    println!("  eps0 = {:.6e}", solution.eps0);
    println!("  1/rx = {:.6e} 1/m", solution.curvature_x);
    println!("  1/ry = {:.6e} 1/m", solution.curvature_y);
    println!(
        "  Resultants: Nz = {:.4}, Mx = {:.4}, My = {:.4}",
        solution.resultants.nz, solution.resultants.mx, solution.resultants.my
    );

    let summary = solution.summary(ConcreteClass::B25.rb, RebarClass::A400.rs);
    println!("\n=== Summary ===");
    println!("Max concrete compression: {:.2} MPa", summary.max_concrete_compression);
    println!("Max concrete tension:     {:.2} MPa", summary.max_concrete_tension);
    println!("Concrete strain range:    {:.5} .. {:.5}", summary.min_concrete_strain, summary.max_concrete_strain);
    println!("Max rebar stress:         {:.1} MPa", summary.max_rebar_stress);
    println!("Concrete utilisation:     {:.1}%", summary.concrete_utilisation * 100.0);
    println!("Rebar utilisation:        {:.1}%", summary.rebar_utilisation * 100.0);

    println!("\nRebar states:");
    for (i, (stress, strain)) in solution
        .rebar
        .stress
        .iter()
        .zip(&solution.rebar.strain)
        .enumerate()
    {
        println!("  Bar {}: sigma = {:8.2} MPa, eps = {:.6}", i + 1, stress, strain);
    }

    println!("\nNormative strengths:");
    let normative = solver.solve(&mut section, &target, &concrete.normative()?, &rebar.normative()?)?;
    println!(
        "  Converged in {} iterations, max concrete compression {:.2} MPa",
        normative.iterations,
        normative.concrete.min_stress()
    );

    println!("\n=== Example Complete ===");
    Ok(())
}
