//! Coherent transfer-matrix solver.
//!
//! The stack response follows from the product of 2×2 characteristic
//! matrices: one interface matrix per boundary and one propagation matrix per
//! layer,
//!
//! $$ M = \frac{1}{t_{01}} \begin{pmatrix} 1 & r_{01} \\ r_{01} & 1 \end{pmatrix}
//!        \prod_{j=1}^{L} \frac{1}{t_{j,j+1}}
//!        \begin{pmatrix} e^{-i\delta_j} & 0 \\ 0 & e^{i\delta_j} \end{pmatrix}
//!        \begin{pmatrix} 1 & r_{j,j+1} \\ r_{j,j+1} & 1 \end{pmatrix} $$
//!
//! with $\delta_j = 2\pi n_j \cos\theta_j d_j / \lambda$. Then $r = M_{10}/M_{00}$
//! and $t = 1/M_{00}$. In absorbing media the sign of $\cos\theta$ is chosen so
//! that the wave decays (or, when lossless, propagates) away from the
//! superstrate.

use num_complex::Complex64;

use super::{Polarization, PointResponse, SolverError, StackOptics, TmmSolver};

type Matrix2 = [[Complex64; 2]; 2];

const ONE: Complex64 = Complex64::new(1.0, 0.0);
const ZERO: Complex64 = Complex64::new(0.0, 0.0);

fn matmul(a: &Matrix2, b: &Matrix2) -> Matrix2 {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}

/// Complex amplitudes of one polarisation plus the power normalisation of `t`.
#[derive(Debug, Clone, Copy)]
struct Amplitudes {
    r: Complex64,
    t: Complex64,
    power_ratio: f64,
}

impl Amplitudes {
    fn reflectance(&self) -> f64 {
        self.r.norm_sqr()
    }

    fn transmittance(&self) -> f64 {
        self.t.norm_sqr() * self.power_ratio
    }
}

/// Coherent TMM for planar multilayers between two semi-infinite media.
#[derive(Debug, Clone)]
pub struct TransferMatrixSolver {
    /// Cap on the imaginary part of a layer phase. Opaque layers are clamped
    /// here so the propagation matrix stays finite.
    pub max_attenuation: f64,
}

impl Default for TransferMatrixSolver {
    fn default() -> Self {
        Self {
            max_attenuation: 35.0,
        }
    }
}

impl TransferMatrixSolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(
        &self,
        angle_deg: f64,
        wavelength_m: f64,
        stack: &StackOptics<'_>,
    ) -> Result<(), SolverError> {
        if stack.indices.len() != stack.thicknesses.len() {
            return Err(SolverError::LayerMismatch {
                indices: stack.indices.len(),
                thicknesses: stack.thicknesses.len(),
            });
        }
        if !(0.0..90.0).contains(&angle_deg) {
            return Err(SolverError::InvalidAngle(angle_deg));
        }
        if !(wavelength_m > 0.0 && wavelength_m.is_finite()) {
            return Err(SolverError::InvalidWavelength(wavelength_m));
        }
        // n0 sin(theta0) must be real for the in-plane wavevector to be conserved
        if angle_deg > 0.0 && stack.superstrate.im.abs() > 1e-12 * stack.superstrate.norm() {
            return Err(SolverError::AbsorbingSuperstrate(stack.superstrate));
        }
        Ok(())
    }

    /// Cosine of the propagation angle in a medium of index `n`, given the
    /// conserved in-plane component `kx = n0 sin(theta0)`.
    fn forward_cos(n: Complex64, kx: Complex64) -> Complex64 {
        let sin = kx / n;
        let cos = (ONE - sin * sin).sqrt();
        let n_cos = n * cos;
        let forward = if n_cos.im.abs() > 100.0 * f64::EPSILON {
            n_cos.im > 0.0
        } else {
            n_cos.re > 0.0
        };
        if forward {
            cos
        } else {
            -cos
        }
    }

    /// Fresnel `(r, t)` from medium `i` into medium `f`.
    fn fresnel(
        polarization: Polarization,
        n_i: Complex64,
        cos_i: Complex64,
        n_f: Complex64,
        cos_f: Complex64,
        interface: usize,
    ) -> Result<(Complex64, Complex64), SolverError> {
        let (num, den) = match polarization {
            Polarization::S => (n_i * cos_i - n_f * cos_f, n_i * cos_i + n_f * cos_f),
            Polarization::P => (n_f * cos_i - n_i * cos_f, n_f * cos_i + n_i * cos_f),
        };
        if den.norm() == 0.0 {
            return Err(SolverError::Singular(interface));
        }
        Ok((num / den, 2.0 * n_i * cos_i / den))
    }

    fn interface_matrix(r: Complex64, t: Complex64) -> Matrix2 {
        let inv_t = ONE / t;
        [[inv_t, r * inv_t], [r * inv_t, inv_t]]
    }

    fn amplitudes(
        &self,
        polarization: Polarization,
        angle_deg: f64,
        wavelength_m: f64,
        stack: &StackOptics<'_>,
    ) -> Result<Amplitudes, SolverError> {
        self.check(angle_deg, wavelength_m, stack)?;

        let theta0 = angle_deg.to_radians();
        let n0 = stack.superstrate;
        let kx = n0 * theta0.sin();

        // Media from superstrate (0) to substrate (L + 1)
        let media: Vec<Complex64> = std::iter::once(n0)
            .chain(stack.indices.iter().copied())
            .chain(std::iter::once(stack.substrate))
            .collect();
        let cosines: Vec<Complex64> = media
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                if i == 0 {
                    Complex64::new(theta0.cos(), 0.0)
                } else {
                    Self::forward_cos(n, kx)
                }
            })
            .collect();

        let (r01, t01) = Self::fresnel(
            polarization,
            media[0],
            cosines[0],
            media[1],
            cosines[1],
            0,
        )?;
        let mut m = Self::interface_matrix(r01, t01);

        for (layer, &thickness) in stack.thicknesses.iter().enumerate() {
            let j = layer + 1;
            let mut delta =
                2.0 * std::f64::consts::PI * media[j] * cosines[j] * thickness / wavelength_m;
            if delta.im > self.max_attenuation {
                delta = Complex64::new(delta.re, self.max_attenuation);
            }
            let phase = Complex64::new(0.0, 1.0) * delta;
            let propagation: Matrix2 = [[(-phase).exp(), ZERO], [ZERO, phase.exp()]];

            let (r, t) = Self::fresnel(
                polarization,
                media[j],
                cosines[j],
                media[j + 1],
                cosines[j + 1],
                j,
            )?;
            m = matmul(&m, &matmul(&propagation, &Self::interface_matrix(r, t)));
        }

        if m[0][0].norm() == 0.0 || !m[0][0].is_finite() {
            return Err(SolverError::Singular(stack.num_layers()));
        }
        let r = m[1][0] / m[0][0];
        let t = ONE / m[0][0];

        let last = media.len() - 1;
        let (n_s, cos_s, cos_0) = (media[last], cosines[last], cosines[0]);
        let power_ratio = match polarization {
            Polarization::S => (n_s * cos_s).re / (n0 * cos_0).re,
            Polarization::P => (n_s * cos_s.conj()).re / (n0 * cos_0.conj()).re,
        };

        Ok(Amplitudes { r, t, power_ratio })
    }

    fn ellipsometric_from(rp: Complex64, rs: Complex64) -> Result<(f64, f64), SolverError> {
        if rs.norm() == 0.0 {
            return Err(SolverError::Singular(0));
        }
        let ratio = rp / rs;
        Ok((ratio.norm().atan().to_degrees(), (-ratio).arg().to_degrees()))
    }
}

impl TmmSolver for TransferMatrixSolver {
    fn ellipsometric(
        &self,
        angle_deg: f64,
        wavelength_m: f64,
        stack: &StackOptics<'_>,
    ) -> Result<(f64, f64), SolverError> {
        let p = self.amplitudes(Polarization::P, angle_deg, wavelength_m, stack)?;
        let s = self.amplitudes(Polarization::S, angle_deg, wavelength_m, stack)?;
        Self::ellipsometric_from(p.r, s.r)
    }

    fn reflectance(
        &self,
        polarization: Polarization,
        angle_deg: f64,
        wavelength_m: f64,
        stack: &StackOptics<'_>,
    ) -> Result<f64, SolverError> {
        Ok(self
            .amplitudes(polarization, angle_deg, wavelength_m, stack)?
            .reflectance())
    }

    fn transmittance(
        &self,
        polarization: Polarization,
        angle_deg: f64,
        wavelength_m: f64,
        stack: &StackOptics<'_>,
    ) -> Result<f64, SolverError> {
        Ok(self
            .amplitudes(polarization, angle_deg, wavelength_m, stack)?
            .transmittance())
    }

    fn point_response(
        &self,
        angle_deg: f64,
        wavelength_m: f64,
        stack: &StackOptics<'_>,
    ) -> Result<PointResponse, SolverError> {
        let p = self.amplitudes(Polarization::P, angle_deg, wavelength_m, stack)?;
        let s = self.amplitudes(Polarization::S, angle_deg, wavelength_m, stack)?;
        let (psi, delta) = Self::ellipsometric_from(p.r, s.r)?;
        Ok(PointResponse {
            rp: p.reflectance(),
            rs: s.reflectance(),
            tp: p.transmittance(),
            ts: s.transmittance(),
            psi,
            delta,
        })
    }

    fn method_name(&self) -> &str {
        "Coherent transfer matrix"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    const AIR: Complex64 = Complex64::new(1.0, 0.0);
    const GLASS: Complex64 = Complex64::new(1.5, 0.0);
    const WAVELENGTH: f64 = 600e-9;

    #[test]
    fn test_bare_interface_normal_incidence() {
        let solver = TransferMatrixSolver::new();
        let stack = StackOptics::new(&[], &[], AIR, GLASS);
        for pol in [Polarization::P, Polarization::S] {
            let r = solver.reflectance(pol, 0.0, WAVELENGTH, &stack).unwrap();
            let t = solver.transmittance(pol, 0.0, WAVELENGTH, &stack).unwrap();
            assert_abs_diff_eq!(r, 0.04, epsilon = 1e-12);
            assert_abs_diff_eq!(t, 0.96, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_quarter_wave_coating_cancels_reflection() {
        let solver = TransferMatrixSolver::new();
        let n1 = 1.5_f64.sqrt();
        let indices = [c(n1, 0.0)];
        let thicknesses = [WAVELENGTH / (4.0 * n1)];
        let stack = StackOptics::new(&indices, &thicknesses, AIR, GLASS);
        let r = solver
            .reflectance(Polarization::S, 0.0, WAVELENGTH, &stack)
            .unwrap();
        assert_abs_diff_eq!(r, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lossless_stack_conserves_energy() {
        let solver = TransferMatrixSolver::new();
        let indices = [c(2.3, 0.0), c(1.45, 0.0), c(2.3, 0.0)];
        let thicknesses = [50e-9, 80e-9, 35e-9];
        let stack = StackOptics::new(&indices, &thicknesses, AIR, GLASS);
        for angle in [0.0, 25.0, 45.0, 65.0, 85.0] {
            let resp = solver.point_response(angle, WAVELENGTH, &stack).unwrap();
            assert_abs_diff_eq!(resp.rp + resp.tp, 1.0, epsilon = 1e-10);
            assert_abs_diff_eq!(resp.rs + resp.ts, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_absorbing_layer_loses_energy() {
        let solver = TransferMatrixSolver::new();
        let indices = [c(0.05, 3.4)];
        let thicknesses = [20e-9];
        let stack = StackOptics::new(&indices, &thicknesses, AIR, GLASS);
        let resp = solver.point_response(45.0, WAVELENGTH, &stack).unwrap();
        assert!(resp.rs + resp.ts < 1.0);
        assert!(resp.rp + resp.tp < 1.0);
        assert!(resp.rs > 0.0 && resp.ts > 0.0);
    }

    #[test]
    fn test_normal_incidence_ellipsometry() {
        let solver = TransferMatrixSolver::new();
        let indices = [c(0.05, 3.4), c(1.76, 0.0)];
        let thicknesses = [12e-9, 40e-9];
        let stack = StackOptics::new(&indices, &thicknesses, AIR, GLASS);
        let (psi, delta) = solver.ellipsometric(0.0, WAVELENGTH, &stack).unwrap();
        assert_abs_diff_eq!(psi, 45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(delta, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_brewster_angle_suppresses_p_reflection() {
        let solver = TransferMatrixSolver::new();
        let stack = StackOptics::new(&[], &[], AIR, GLASS);
        let brewster = 1.5_f64.atan().to_degrees();
        let rp = solver
            .reflectance(Polarization::P, brewster, WAVELENGTH, &stack)
            .unwrap();
        let rs = solver
            .reflectance(Polarization::S, brewster, WAVELENGTH, &stack)
            .unwrap();
        assert_abs_diff_eq!(rp, 0.0, epsilon = 1e-20);
        assert!(rs > 0.1);
    }

    #[test]
    fn test_total_internal_reflection() {
        let solver = TransferMatrixSolver::new();
        let stack = StackOptics::new(&[], &[], GLASS, AIR);
        let resp = solver.point_response(60.0, WAVELENGTH, &stack).unwrap();
        assert_abs_diff_eq!(resp.rs, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(resp.rp, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(resp.ts, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_opaque_layer_stays_finite() {
        let solver = TransferMatrixSolver::new();
        let indices = [c(0.05, 4.0)];
        let thicknesses = [5e-6];
        let stack = StackOptics::new(&indices, &thicknesses, AIR, GLASS);
        let resp = solver.point_response(45.0, WAVELENGTH, &stack).unwrap();
        assert!(resp.rs.is_finite() && resp.ts.is_finite());
        assert!(resp.ts < 1e-20);
    }

    #[test]
    fn test_rejects_malformed_input() {
        let solver = TransferMatrixSolver::new();
        let indices = [c(1.5, 0.0)];
        let stack = StackOptics::new(&indices, &[], AIR, GLASS);
        assert!(matches!(
            solver.reflectance(Polarization::S, 0.0, WAVELENGTH, &stack),
            Err(SolverError::LayerMismatch { indices: 1, thicknesses: 0 })
        ));

        let ok = StackOptics::new(&[], &[], AIR, GLASS);
        assert!(matches!(
            solver.reflectance(Polarization::S, 90.0, WAVELENGTH, &ok),
            Err(SolverError::InvalidAngle(_))
        ));
        assert!(matches!(
            solver.reflectance(Polarization::S, 10.0, -1.0, &ok),
            Err(SolverError::InvalidWavelength(_))
        ));
    }
}
