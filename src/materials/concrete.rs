//! Concrete classes and the Karpenko stress-strain diagram

use serde::{Deserialize, Serialize};

use super::curve::StressStrainCurve;
use super::{ensure_positive, MaterialBasis};
use crate::error::{NdmError, NdmResult};
use crate::math::linspace;

/// Reference temperature of the diagram constants in °C
pub const REFERENCE_TEMPERATURE: f64 = 20.0;

/// Samples per diagram branch
const BRANCH_SAMPLES: usize = 50;

/// Physical and mechanical properties of a concrete class (MPa)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcreteClass {
    /// Class grade B (cube strength in MPa)
    pub b: f64,
    /// Initial modulus of elasticity
    pub eb: f64,
    /// Normative compressive strength
    pub rbn: f64,
    /// Normative tensile strength
    pub rbtn: f64,
    /// Design compressive strength
    pub rb: f64,
    /// Design tensile strength
    pub rbt: f64,
}

impl ConcreteClass {
    pub const B15: Self = Self::new(15.0, 24000.0, 11.0, 1.1, 8.5, 0.75);
    pub const B20: Self = Self::new(20.0, 27500.0, 15.0, 1.35, 11.5, 0.9);
    pub const B25: Self = Self::new(25.0, 30000.0, 18.5, 1.55, 14.5, 1.05);
    pub const B30: Self = Self::new(30.0, 32500.0, 22.0, 1.75, 17.0, 1.15);
    pub const B35: Self = Self::new(35.0, 34500.0, 25.5, 1.95, 19.5, 1.3);
    pub const B40: Self = Self::new(40.0, 36000.0, 29.0, 2.1, 22.0, 1.4);

    pub const fn new(b: f64, eb: f64, rbn: f64, rbtn: f64, rb: f64, rbt: f64) -> Self {
        Self { b, eb, rbn, rbtn, rb, rbt }
    }

    /// Look up a catalogue class by name ("B25", case-insensitive)
    pub fn by_name(name: &str) -> NdmResult<Self> {
        match name.trim().to_uppercase().as_str() {
            "B15" => Ok(Self::B15),
            "B20" => Ok(Self::B20),
            "B25" => Ok(Self::B25),
            "B30" => Ok(Self::B30),
            "B35" => Ok(Self::B35),
            "B40" => Ok(Self::B40),
            _ => Err(NdmError::UnknownClass(name.to_string())),
        }
    }

    /// Check that every constant is finite and positive
    pub fn validate(&self) -> NdmResult<()> {
        ensure_positive("concrete grade B", self.b)?;
        ensure_positive("concrete modulus Eb", self.eb)?;
        ensure_positive("concrete strength Rbn", self.rbn)?;
        ensure_positive("concrete strength Rbtn", self.rbtn)?;
        ensure_positive("concrete strength Rb", self.rb)?;
        ensure_positive("concrete strength Rbt", self.rbt)?;
        Ok(())
    }

    /// Compressive and tensile strength for the given basis
    pub fn strengths(&self, basis: MaterialBasis) -> (f64, f64) {
        match basis {
            MaterialBasis::Normative => (self.rbn, self.rbtn),
            MaterialBasis::Design => (self.rb, self.rbt),
        }
    }
}

/// Linear correction factors for low temperatures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureFactors {
    /// Elastic modulus
    pub modulus: f64,
    /// Compressive peak stress
    pub strength: f64,
    /// Compressive peak strain
    pub strain: f64,
    /// Tensile peak stress
    pub tensile_strength: f64,
}

impl TemperatureFactors {
    pub fn at(temperature: f64) -> Self {
        let dt = (REFERENCE_TEMPERATURE - temperature) / 90.0;
        Self {
            modulus: 1.0 + 0.2 * dt,
            strength: 1.0 + 0.6 * dt,
            strain: 1.0 + 0.55 * dt,
            tensile_strength: 1.0 + 1.3 * dt,
        }
    }
}

impl Default for TemperatureFactors {
    fn default() -> Self {
        Self::at(REFERENCE_TEMPERATURE)
    }
}

/// One sampled branch of the diagram
struct Branch {
    from: f64,
    to: f64,
    peak_stress: f64,
    peak_ratio: f64,
    nu0: f64,
    omega: f64,
    /// -1.0 for softening branches, +1.0 for hardening branches
    sign: f64,
}

impl Branch {
    fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        linspace(self.from, self.to, BRANCH_SAMPLES).into_iter().map(move |stress| {
            let eta = stress / self.peak_stress;
            let root = (1.0 - self.omega * eta - (1.0 - self.omega) * eta * eta).max(0.0);
            let nu = self.peak_ratio + self.sign * (self.nu0 - self.peak_ratio) * root.sqrt();
            (stress, nu)
        })
    }
}

/// Karpenko concrete diagram with temperature correction
///
/// Compression is negative. The diagram is built from four branches
/// (compression softening, compression hardening, tension hardening,
/// tension softening) expressed through the secant modulus ratio `nu`
/// as a function of the stress level `eta = sigma / sigma_peak`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KarpenkoDiagram {
    pub class: ConcreteClass,
    /// Temperature in °C
    pub temperature: f64,
    /// Load-duration coefficient
    pub lambda: f64,
}

/// Characteristic points of a built concrete diagram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcretePeaks {
    /// (strain, stress) at the compression peak
    pub compression: (f64, f64),
    /// (strain, stress) at the tension peak
    pub tension: (f64, f64),
    /// Secant ratio at the compression peak
    pub compression_ratio: f64,
    /// Secant ratio at the tension peak
    pub tension_ratio: f64,
}

impl KarpenkoDiagram {
    pub fn new(class: ConcreteClass, temperature: f64, lambda: f64) -> Self {
        Self {
            class,
            temperature,
            lambda,
        }
    }

    /// Diagram at the reference temperature under short-term loading
    pub fn standard(class: ConcreteClass) -> Self {
        Self::new(class, REFERENCE_TEMPERATURE, 1.0)
    }

    pub fn factors(&self) -> TemperatureFactors {
        TemperatureFactors::at(self.temperature)
    }

    /// Initial modulus corrected for temperature
    pub fn modulus(&self) -> f64 {
        self.class.eb * self.factors().modulus
    }

    /// Diagram from normative (characteristic) strengths
    pub fn normative(&self) -> NdmResult<StressStrainCurve> {
        self.build(MaterialBasis::Normative)
    }

    /// Diagram from design strengths
    pub fn design(&self) -> NdmResult<StressStrainCurve> {
        self.build(MaterialBasis::Design)
    }

    /// Compression peak strain at the reference temperature
    pub fn peak_strain(&self) -> f64 {
        let b = self.class.b;
        let l = self.lambda;
        -b / self.class.eb * l * (1.0 + (0.8 - 0.15 * b * b / 1e4) * l * b / 60.0 + 0.2 * l / b)
            / (0.12 + 1.03 * b / 60.0 + 0.2 / b)
    }

    /// Peak stresses, strains and secant ratios for the given basis
    pub fn peaks(&self, basis: MaterialBasis) -> NdmResult<ConcretePeaks> {
        self.validate()?;
        let f = self.factors();
        let e = self.class.eb * f.modulus;
        let (r, rt) = self.class.strengths(basis);

        let sigma_c = -r * f.strength;
        let nu_c = sigma_c / (self.peak_strain() * f.strain * self.class.eb * f.modulus);
        let sigma_t = rt * f.tensile_strength;
        let nu_t = 0.6 + 0.15 * sigma_t / 2.5;

        if !(nu_c.is_finite() && nu_c > 0.0 && nu_t > 0.0) {
            return Err(NdmError::InvalidMaterial(format!(
                "concrete diagram has non-positive peak secant ratio (compression {}, tension {})",
                nu_c, nu_t
            )));
        }

        Ok(ConcretePeaks {
            compression: (sigma_c / (e * nu_c), sigma_c),
            tension: (sigma_t / (e * nu_t), sigma_t),
            compression_ratio: nu_c,
            tension_ratio: nu_t,
        })
    }

    fn validate(&self) -> NdmResult<()> {
        self.class.validate()?;
        ensure_positive("load-duration coefficient", self.lambda)?;
        if !self.temperature.is_finite() {
            return Err(NdmError::InvalidMaterial("temperature must be finite".to_string()));
        }
        let f = self.factors();
        if f.modulus <= 0.0 || f.strength <= 0.0 || f.strain <= 0.0 || f.tensile_strength <= 0.0 {
            return Err(NdmError::InvalidMaterial(format!(
                "temperature {} gives non-positive correction factors",
                self.temperature
            )));
        }
        Ok(())
    }

    fn build(&self, basis: MaterialBasis) -> NdmResult<StressStrainCurve> {
        let peaks = self.peaks(basis)?;
        let e = self.modulus();
        let (sc, nc) = (peaks.compression.1, peaks.compression_ratio);
        let (st, nt) = (peaks.tension.1, peaks.tension_ratio);

        let branches = [
            Branch {
                from: 0.2 * sc,
                to: sc,
                peak_stress: sc,
                peak_ratio: nc,
                nu0: 2.05 * nc,
                omega: 1.95 * nc - 0.138,
                sign: -1.0,
            },
            Branch {
                from: sc,
                to: 0.0,
                peak_stress: sc,
                peak_ratio: nc,
                nu0: 1.0,
                omega: 2.0 - 2.5 * nc,
                sign: 1.0,
            },
            Branch {
                from: 0.0,
                to: st,
                peak_stress: st,
                peak_ratio: nt,
                nu0: 1.0,
                omega: 2.0 - 2.5 * nt,
                sign: 1.0,
            },
            Branch {
                from: st,
                to: 0.1 * st,
                peak_stress: st,
                peak_ratio: nt,
                nu0: 2.05 * nt,
                omega: 1.95 * nt - 0.138,
                sign: -1.0,
            },
        ];

        let mut points = Vec::with_capacity(4 * BRANCH_SAMPLES);
        for (i, branch) in branches.iter().enumerate() {
            // Each branch starts where the previous one ended
            let skip = if i == 0 { 0 } else { 1 };
            for (stress, nu) in branch.samples().skip(skip) {
                if !nu.is_finite() || nu <= 0.0 {
                    log::debug!("dropping concrete sample at {} MPa with secant ratio {}", stress, nu);
                    continue;
                }
                points.push((stress / (e * nu), stress));
            }
        }

        StressStrainCurve::from_points(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::StressStrain;
    use approx::assert_relative_eq;

    #[test]
    fn test_temperature_factors_at_reference() {
        let f = TemperatureFactors::at(20.0);
        assert_eq!(f.modulus, 1.0);
        assert_eq!(f.strength, 1.0);
        assert_eq!(f.strain, 1.0);
        assert_eq!(f.tensile_strength, 1.0);
    }

    #[test]
    fn test_temperature_factors_below_reference() {
        let f = TemperatureFactors::at(-70.0);
        assert_relative_eq!(f.modulus, 1.2, epsilon = 1e-12);
        assert_relative_eq!(f.strength, 1.6, epsilon = 1e-12);
        assert_relative_eq!(f.strain, 1.55, epsilon = 1e-12);
        assert_relative_eq!(f.tensile_strength, 2.3, epsilon = 1e-12);
    }

    #[test]
    fn test_b25_peak_strain() {
        let d = KarpenkoDiagram::standard(ConcreteClass::B25);
        assert_relative_eq!(d.peak_strain(), -0.0020003, epsilon = 1e-6);
    }

    #[test]
    fn test_design_curve_passes_through_peaks() {
        let d = KarpenkoDiagram::standard(ConcreteClass::B25);
        let curve = d.design().unwrap();
        let peaks = d.peaks(MaterialBasis::Design).unwrap();

        assert_relative_eq!(peaks.compression.1, -14.5, epsilon = 1e-12);
        assert_relative_eq!(peaks.tension.1, 1.05, epsilon = 1e-12);
        assert_relative_eq!(curve.stress(peaks.compression.0), -14.5, epsilon = 1e-9);
        assert_relative_eq!(curve.stress(peaks.tension.0), 1.05, epsilon = 1e-9);
        assert_eq!(curve.stress(0.0), 0.0);
    }

    #[test]
    fn test_monotone_between_peaks() {
        let d = KarpenkoDiagram::standard(ConcreteClass::B25);
        let curve = d.design().unwrap();
        let peaks = d.peaks(MaterialBasis::Design).unwrap();
        let (lo, hi) = (peaks.compression.0, peaks.tension.0);

        let inside: Vec<f64> = curve
            .strains()
            .iter()
            .zip(curve.stresses())
            .filter(|(e, _)| **e >= lo && **e <= hi)
            .map(|(_, s)| *s)
            .collect();
        assert!(inside.len() > 90);
        for w in inside.windows(2) {
            assert!(w[1] >= w[0], "stress drops from {} to {}", w[0], w[1]);
        }

        // Between breakpoints too
        let steps = 1000;
        let mut prev = curve.stress(lo);
        for k in 1..=steps {
            let s = curve.stress(lo + (hi - lo) * k as f64 / steps as f64);
            assert!(s >= prev - 1e-12);
            prev = s;
        }
    }

    #[test]
    fn test_extrapolates_with_boundary_slopes() {
        let curve = KarpenkoDiagram::standard(ConcreteClass::B25).design().unwrap();
        let e = curve.strains();
        let s = curve.stresses();
        let n = e.len();

        let (first, last) = curve.strain_range();
        let slope_lo = (s[1] - s[0]) / (e[1] - e[0]);
        let slope_hi = (s[n - 1] - s[n - 2]) / (e[n - 1] - e[n - 2]);

        let below = first - 0.5;
        assert_relative_eq!(curve.stress(below), s[0] - 0.5 * slope_lo, max_relative = 1e-9);
        let above = last + 1e-3;
        assert_relative_eq!(curve.stress(above), s[n - 1] + 1e-3 * slope_hi, max_relative = 1e-9);

        // Both outer branches soften
        assert!(slope_lo < 0.0);
        assert!(slope_hi < 0.0);
    }

    #[test]
    fn test_cold_design_diagram() {
        let d = KarpenkoDiagram::new(ConcreteClass::B25, -40.0, 1.0);
        let f = d.factors();
        assert_relative_eq!(f.strength, 1.4, epsilon = 1e-12);
        assert_relative_eq!(f.strain, 1.0 + 0.55 * 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(f.modulus, 1.0 + 0.2 * 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(d.modulus(), 30000.0 * f.modulus, epsilon = 1e-9);

        let peaks = d.peaks(MaterialBasis::Design).unwrap();
        assert_relative_eq!(peaks.compression.1, -ConcreteClass::B25.rb * f.strength, epsilon = 1e-12);
        assert_relative_eq!(peaks.compression.1, -20.3, epsilon = 1e-12);
        assert_relative_eq!(peaks.compression.0, d.peak_strain() * f.strain, max_relative = 1e-12);
        assert_relative_eq!(peaks.compression.0, -0.0027338, epsilon = 1e-6);
        assert_relative_eq!(peaks.tension.1, ConcreteClass::B25.rbt * f.tensile_strength, epsilon = 1e-12);

        let curve = d.design().unwrap();
        assert_relative_eq!(curve.stress(peaks.compression.0), -20.3, epsilon = 1e-9);
        assert_relative_eq!(curve.stress(peaks.tension.0), peaks.tension.1, epsilon = 1e-9);
        let min = curve.stresses().iter().cloned().fold(f64::INFINITY, f64::min);
        assert_relative_eq!(min, -20.3, epsilon = 1e-9);
    }

    #[test]
    fn test_curve_point_count() {
        // 4 branches of 50 samples sharing 3 endpoints
        let curve = KarpenkoDiagram::standard(ConcreteClass::B25).design().unwrap();
        assert!(curve.len() <= 197);
        assert!(curve.len() > 150);
    }

    #[test]
    fn test_initial_slope_is_elastic_modulus() {
        let curve = KarpenkoDiagram::standard(ConcreteClass::B30).design().unwrap();
        let e = 1e-6;
        let secant = curve.stress(-e) / -e;
        assert_relative_eq!(secant, 32500.0, max_relative = 0.02);
    }

    #[test]
    fn test_normative_stronger_than_design() {
        let d = KarpenkoDiagram::standard(ConcreteClass::B20);
        let n = d.peaks(MaterialBasis::Normative).unwrap();
        let s = d.peaks(MaterialBasis::Design).unwrap();
        assert!(n.compression.1 < s.compression.1);
        assert!(n.tension.1 > s.tension.1);
    }

    #[test]
    fn test_invalid_class_rejected() {
        let bad = ConcreteClass::new(25.0, 0.0, 18.5, 1.55, 14.5, 1.05);
        let err = KarpenkoDiagram::standard(bad).design().unwrap_err();
        assert!(matches!(err, NdmError::InvalidMaterial(_)));

        let bad = ConcreteClass::new(25.0, 30000.0, 18.5, 1.55, -14.5, 1.05);
        assert!(KarpenkoDiagram::standard(bad).design().is_err());
        assert!(KarpenkoDiagram::new(ConcreteClass::B25, 20.0, 0.0).design().is_err());
    }

    #[test]
    fn test_class_lookup() {
        assert_eq!(ConcreteClass::by_name("b25").unwrap(), ConcreteClass::B25);
        assert!(matches!(ConcreteClass::by_name("C30/37"), Err(NdmError::UnknownClass(_))));
    }
}
