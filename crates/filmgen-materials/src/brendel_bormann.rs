//! Brendel–Bormann oscillator model for metals.
//!
//! The dielectric function is a Drude free-electron term plus a sum of
//! Lorentzian oscillators convolved with Gaussian broadening (Voigt
//! profiles), written in closed form with the Faddeeva function:
//!
//! $$
//! \epsilon(E) = 1 - \frac{f_0 \omega_p^2}{E(E + i\Gamma_0)}
//!   + \sum_{k\ge1} \frac{i\sqrt{\pi} f_k \omega_p^2}{2\sqrt{2}\,\sigma_k a_k}
//!   \left[w\!\left(\frac{a_k - \omega_k}{\sqrt{2}\sigma_k}\right)
//!       + w\!\left(\frac{a_k + \omega_k}{\sqrt{2}\sigma_k}\right)\right],
//! \qquad a_k = \sqrt{E^2 + i\Gamma_k E}
//! $$
//!
//! Parameters follow A. D. Rakić *et al.*, *Appl. Opt.* **37**, 5271 (1998).

use std::f64::consts::{PI, SQRT_2};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::faddeeva;
use crate::provider::{photon_energy_ev, MaterialError, MaterialKind, MaterialProvider};

/// Number of bound oscillators evaluated by [`MaterialProvider::dielectric_function`].
pub const DEFAULT_OSCILLATORS: usize = 5;

/// Complete parameter set of a Brendel–Bormann fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrendelBormannParameters {
    /// Oscillator strengths.
    pub f: Vec<f64>,
    /// Damping (eV).
    pub g: Vec<f64>,
    /// Resonance energies (eV).
    pub w: Vec<f64>,
    /// Gaussian broadening (eV).
    pub s: Vec<f64>,
    /// Plasma frequency (eV).
    pub wp: f64,
}

/// A metal described by a Brendel–Bormann fit.
///
/// Arrays may be left unset while a material is being assembled; they are
/// required by [`eps`](Self::eps) and by saving to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct BrendelBormannMaterial {
    name: String,
    f: Option<Vec<f64>>,
    g: Option<Vec<f64>>,
    w: Option<Vec<f64>>,
    s: Option<Vec<f64>>,
    wp: f64,
}

impl BrendelBormannMaterial {
    /// Construct from possibly partial arrays.
    ///
    /// Every array that is present must be non-empty and all present arrays
    /// must share one length.
    pub fn new(
        name: impl Into<String>,
        f: Option<Vec<f64>>,
        g: Option<Vec<f64>>,
        w: Option<Vec<f64>>,
        s: Option<Vec<f64>>,
        wp: f64,
    ) -> Result<Self, MaterialError> {
        let material = Self {
            name: name.into(),
            f,
            g,
            w,
            s,
            wp,
        };
        material.check_compatibility()?;
        Ok(material)
    }

    /// Construct from a complete parameter set.
    pub fn from_parameters(
        name: impl Into<String>,
        params: BrendelBormannParameters,
    ) -> Result<Self, MaterialError> {
        Self::new(
            name,
            Some(params.f),
            Some(params.g),
            Some(params.w),
            Some(params.s),
            params.wp,
        )
    }

    fn check_compatibility(&self) -> Result<(), MaterialError> {
        let mut expected: Option<(&str, usize)> = None;
        for (label, data) in self.labelled_arrays() {
            let Some(data) = data else { continue };
            if data.is_empty() {
                return Err(MaterialError::IncompatibleArrays {
                    name: self.name.clone(),
                    detail: format!("array '{}' is empty", label),
                });
            }
            match expected {
                None => expected = Some((label, data.len())),
                Some((first, len)) if len != data.len() => {
                    return Err(MaterialError::IncompatibleArrays {
                        name: self.name.clone(),
                        detail: format!(
                            "'{}' has {} entries but '{}' has {}",
                            first,
                            len,
                            label,
                            data.len()
                        ),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn labelled_arrays(&self) -> [(&'static str, Option<&Vec<f64>>); 4] {
        [
            ("f", self.f.as_ref()),
            ("g", self.g.as_ref()),
            ("w", self.w.as_ref()),
            ("s", self.s.as_ref()),
        ]
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn f(&self) -> Option<&[f64]> {
        self.f.as_deref()
    }

    pub fn g(&self) -> Option<&[f64]> {
        self.g.as_deref()
    }

    pub fn w(&self) -> Option<&[f64]> {
        self.w.as_deref()
    }

    pub fn s(&self) -> Option<&[f64]> {
        self.s.as_deref()
    }

    pub fn wp(&self) -> f64 {
        self.wp
    }

    /// True when all four arrays are set.
    pub fn is_complete(&self) -> bool {
        self.labelled_arrays().iter().all(|(_, d)| d.is_some())
    }

    /// Oscillator count including the Drude term, if any array is set.
    pub fn oscillator_count(&self) -> Option<usize> {
        self.labelled_arrays()
            .iter()
            .find_map(|(_, d)| d.map(|v| v.len()))
    }

    /// Borrow the complete parameter set or fail with [`MaterialError::Incomplete`].
    pub fn parameters(&self) -> Result<BrendelBormannParameters, MaterialError> {
        match (&self.f, &self.g, &self.w, &self.s) {
            (Some(f), Some(g), Some(w), Some(s)) => Ok(BrendelBormannParameters {
                f: f.clone(),
                g: g.clone(),
                w: w.clone(),
                s: s.clone(),
                wp: self.wp,
            }),
            _ => Err(MaterialError::Incomplete(self.name.clone())),
        }
    }

    /// Complex relative permittivity using up to `num_oscillators` bound terms.
    ///
    /// `num_oscillators` is clamped to at least one.
    pub fn eps(
        &self,
        wavelengths_m: &[f64],
        num_oscillators: usize,
    ) -> Result<Vec<Complex64>, MaterialError> {
        let (f, g, w, s) = match (&self.f, &self.g, &self.w, &self.s) {
            (Some(f), Some(g), Some(w), Some(s)) => (f, g, w, s),
            _ => return Err(MaterialError::Incomplete(self.name.clone())),
        };

        let bound_terms = (f.len() - 1).min(num_oscillators.max(1));
        let wp2 = self.wp * self.wp;
        let drude_strength = (f[0].sqrt() * self.wp).powi(2);
        let i = Complex64::i();

        let values = wavelengths_m
            .iter()
            .map(|&lambda| {
                let energy = photon_energy_ev(lambda);
                let eps_free =
                    1.0 - drude_strength / (energy * (Complex64::from(energy) + i * g[0]));

                let eps_bound: Complex64 = (1..=bound_terms)
                    .map(|k| {
                        let a = (Complex64::from(energy * energy) + i * g[k] * energy).sqrt();
                        let width = SQRT_2 * s[k];
                        let b = i * PI.sqrt() * f[k] * wp2 / (2.0 * SQRT_2 * s[k] * a);
                        b * (faddeeva::w((a - w[k]) / width) + faddeeva::w((a + w[k]) / width))
                    })
                    .sum();

                eps_free + eps_bound
            })
            .collect();

        Ok(values)
    }
}

impl MaterialProvider for BrendelBormannMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> MaterialKind {
        MaterialKind::BrendelBormann
    }

    fn dielectric_function(&self, wavelengths_m: &[f64]) -> Result<Vec<Complex64>, MaterialError> {
        self.eps(wavelengths_m, DEFAULT_OSCILLATORS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn silver() -> BrendelBormannMaterial {
        BrendelBormannMaterial::from_parameters(
            "Ag",
            BrendelBormannParameters {
                f: vec![0.821, 0.050, 0.133, 0.051, 0.467, 4.000],
                g: vec![0.049, 0.189, 0.067, 0.019, 0.117, 0.052],
                w: vec![0.0, 2.025, 5.185, 4.343, 9.809, 18.56],
                s: vec![0.0, 1.894, 0.665, 0.189, 1.170, 0.516],
                wp: 9.01,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_silver_permittivity_at_500nm() {
        let eps = silver().eps(&[500e-9], 5).unwrap();
        assert_relative_eq!(eps[0].re, -7.819_053_607_855, max_relative = 1e-9);
        assert_relative_eq!(eps[0].im, 0.779_678_710_273_8, max_relative = 1e-9);
    }

    #[test]
    fn test_silver_index_is_metallic() {
        let n = silver().index_of_refraction(&[400e-9, 500e-9, 800e-9]).unwrap();
        assert_eq!(n.len(), 3);
        for value in &n {
            assert!(value.re > 0.0 && value.re < 0.5);
            assert!(value.im > 1.5);
        }
        // Extinction grows towards the infrared
        assert!(n[2].im > n[1].im && n[1].im > n[0].im);
    }

    #[test]
    fn test_zero_oscillators_behaves_like_one() {
        let ag = silver();
        let wl = [450e-9, 650e-9];
        assert_eq!(ag.eps(&wl, 0).unwrap(), ag.eps(&wl, 1).unwrap());
    }

    #[test]
    fn test_oscillator_count_is_capped_by_arrays() {
        let ag = silver();
        let wl = [600e-9];
        assert_eq!(ag.eps(&wl, 5).unwrap(), ag.eps(&wl, 50).unwrap());
    }

    #[test]
    fn test_drude_only_material() {
        let m = BrendelBormannMaterial::new(
            "drude",
            Some(vec![1.0]),
            Some(vec![0.0]),
            Some(vec![0.0]),
            Some(vec![0.0]),
            10.0,
        )
        .unwrap();
        // Lossless Drude: eps = 1 - wp^2 / E^2
        let lambda = 1239.84193e-9 / 2.0;
        let eps = m.eps(&[lambda], 5).unwrap()[0];
        assert_relative_eq!(eps.re, 1.0 - 100.0 / 4.0, max_relative = 1e-12);
        assert!(eps.im.abs() < 1e-12);
    }

    #[test]
    fn test_mismatched_arrays_rejected() {
        let err = BrendelBormannMaterial::new(
            "bad",
            Some(vec![0.1; 5]),
            Some(vec![0.1; 4]),
            None,
            None,
            9.0,
        );
        assert!(matches!(err, Err(MaterialError::IncompatibleArrays { .. })));
    }

    #[test]
    fn test_empty_array_rejected() {
        let err = BrendelBormannMaterial::new("bad", Some(vec![]), None, None, None, 9.0);
        assert!(matches!(err, Err(MaterialError::IncompatibleArrays { .. })));
    }

    #[test]
    fn test_partial_material_fails_on_first_use() {
        let partial =
            BrendelBormannMaterial::new("partial", Some(vec![0.5, 0.1]), None, None, None, 9.0)
                .unwrap();
        assert!(!partial.is_complete());
        assert_eq!(partial.oscillator_count(), Some(2));
        assert!(matches!(
            partial.eps(&[500e-9], 5),
            Err(MaterialError::Incomplete(_))
        ));
    }

    #[test]
    fn test_equality_is_exact() {
        let a = silver();
        let mut params = a.parameters().unwrap();
        assert_eq!(a, silver());
        params.wp += 1e-12;
        let b = BrendelBormannMaterial::from_parameters("Ag", params).unwrap();
        assert_ne!(a, b);
    }
}
