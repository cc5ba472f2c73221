//! Lorentz–Drude oscillator model for metals.
//!
//! $$
//! \epsilon(E) = 1 - \frac{f_0 \omega_p^2}{E(E + i\Gamma_0)}
//!   + \sum_{j\ge1} \frac{f_j \omega_p^2}{\omega_j^2 - E^2 - i E \Gamma_j}
//! $$
//!
//! Parameters: A. D. Rakić *et al.*, *Appl. Opt.* **37**, 5271 (1998), Table 1.

use num_complex::Complex64;

use crate::provider::{photon_energy_ev, MaterialError, MaterialKind, MaterialProvider};

/// A metal described by a Lorentz–Drude fit.
#[derive(Debug, Clone, PartialEq)]
pub struct LorentzDrudeMaterial {
    name: String,
    /// Oscillator strengths, index 0 is the Drude term.
    f: Vec<f64>,
    /// Damping (eV).
    gamma: Vec<f64>,
    /// Resonance energies (eV); entry 0 is unused.
    omega: Vec<f64>,
    /// Plasma frequency (eV).
    wp: f64,
}

impl LorentzDrudeMaterial {
    pub fn new(
        name: impl Into<String>,
        f: Vec<f64>,
        gamma: Vec<f64>,
        omega: Vec<f64>,
        wp: f64,
    ) -> Result<Self, MaterialError> {
        let name = name.into();
        if f.is_empty() || f.len() != gamma.len() || f.len() != omega.len() {
            return Err(MaterialError::IncompatibleArrays {
                name,
                detail: format!(
                    "f, gamma and omega must be non-empty and equal in length ({}, {}, {})",
                    f.len(),
                    gamma.len(),
                    omega.len()
                ),
            });
        }
        Ok(Self {
            name,
            f,
            gamma,
            omega,
            wp,
        })
    }

    /// Silver.
    pub fn silver() -> Self {
        Self {
            name: "Ag_LD".into(),
            f: vec![0.845, 0.065, 0.124, 0.011, 0.840, 5.646],
            gamma: vec![0.048, 3.886, 0.452, 0.065, 0.916, 2.419],
            omega: vec![0.0, 0.816, 4.481, 8.185, 9.083, 20.29],
            wp: 9.01,
        }
    }

    /// Gold.
    pub fn gold() -> Self {
        Self {
            name: "Au_LD".into(),
            f: vec![0.760, 0.024, 0.010, 0.071, 0.601, 4.384],
            gamma: vec![0.053, 0.241, 0.345, 0.870, 2.494, 2.214],
            omega: vec![0.0, 0.415, 0.830, 2.969, 4.304, 13.32],
            wp: 9.03,
        }
    }
}

impl MaterialProvider for LorentzDrudeMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> MaterialKind {
        MaterialKind::LorentzDrude
    }

    fn dielectric_function(&self, wavelengths_m: &[f64]) -> Result<Vec<Complex64>, MaterialError> {
        let wp2 = self.wp * self.wp;
        let i = Complex64::i();

        Ok(wavelengths_m
            .iter()
            .map(|&lambda| {
                let e = photon_energy_ev(lambda);
                let free = 1.0 - self.f[0] * wp2 / (e * (Complex64::from(e) + i * self.gamma[0]));
                let bound: Complex64 = (1..self.f.len())
                    .map(|j| {
                        self.f[j] * wp2
                            / (Complex64::from(self.omega[j] * self.omega[j] - e * e)
                                - i * e * self.gamma[j])
                    })
                    .sum();
                free + bound
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gold_is_metallic_in_the_red() {
        let eps = LorentzDrudeMaterial::gold()
            .dielectric_function(&[700e-9])
            .unwrap();
        assert!(eps[0].re < -10.0);
        assert!(eps[0].im > 0.0);
    }

    #[test]
    fn test_absorption_is_positive() {
        let wl: Vec<f64> = (0..20).map(|i| (400.0 + 30.0 * i as f64) * 1e-9).collect();
        for material in [LorentzDrudeMaterial::silver(), LorentzDrudeMaterial::gold()] {
            for eps in material.dielectric_function(&wl).unwrap() {
                assert!(eps.im > 0.0, "{} has non-positive loss", material.name());
            }
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = LorentzDrudeMaterial::new("x", vec![1.0, 0.5], vec![0.1], vec![0.0, 1.0], 9.0);
        assert!(matches!(err, Err(MaterialError::IncompatibleArrays { .. })));
    }
}
