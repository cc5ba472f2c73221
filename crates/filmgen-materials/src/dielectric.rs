//! Dielectrics for layers, substrates and superstrates.
//!
//! Four dispersion descriptions are supported:
//!
//! | Model | Used for |
//! |-------|----------|
//! | Tabulated $(n, k)$, natural cubic spline | rutile TiO₂ (Palik) |
//! | Sellmeier $n^2 = 1 + \sum B_i\lambda^2/(\lambda^2 - C_i)$ | fused SiO₂, sapphire Al₂O₃ (Malitson) |
//! | Cauchy $n = A + B/\lambda^2$ | lab glass substrate |
//! | Constant | vacuum, index-matched media |
//!
//! Sellmeier and Cauchy wavelengths are in µm, tabulated data in nm.

use num_complex::Complex64;

use crate::provider::{MaterialError, MaterialKind, MaterialProvider};
use crate::spline::CubicSpline;

/// Dispersion description of a dielectric.
#[derive(Debug, Clone)]
pub enum DielectricModel {
    /// Spline-interpolated permittivity over a wavelength table (nm).
    Tabulated {
        wavelengths_nm: Vec<f64>,
        eps_real: CubicSpline,
        eps_imag: CubicSpline,
    },
    /// Sellmeier terms `(B_i, C_i)` with `C_i` in µm².
    Sellmeier { terms: Vec<(f64, f64)> },
    /// Cauchy `n = a + b / λ²`, `b` in µm², lossless.
    Cauchy { a: f64, b: f64 },
    /// Wavelength-independent complex index.
    Constant(Complex64),
}

/// A named dielectric material.
#[derive(Debug, Clone)]
pub struct DielectricMaterial {
    name: String,
    model: DielectricModel,
}

impl DielectricMaterial {
    pub fn new(name: impl Into<String>, model: DielectricModel) -> Self {
        Self {
            name: name.into(),
            model,
        }
    }

    /// Build a tabulated material from `(λ/nm, n, k)` triples.
    ///
    /// The table is converted to $\epsilon_1 = n^2 - k^2$, $\epsilon_2 = 2nk$
    /// before interpolation.
    pub fn from_nk_table(
        name: impl Into<String>,
        data: &[(f64, f64, f64)],
    ) -> Result<Self, MaterialError> {
        let wavelengths_nm: Vec<f64> = data.iter().map(|&(lam, _, _)| lam).collect();
        let eps_real = CubicSpline::new(
            wavelengths_nm.clone(),
            data.iter().map(|&(_, n, k)| n * n - k * k).collect(),
        )?;
        let eps_imag = CubicSpline::new(
            wavelengths_nm.clone(),
            data.iter().map(|&(_, n, k)| 2.0 * n * k).collect(),
        )?;
        Ok(Self::new(
            name,
            DielectricModel::Tabulated {
                wavelengths_nm,
                eps_real,
                eps_imag,
            },
        ))
    }

    pub fn model(&self) -> &DielectricModel {
        &self.model
    }

    /// Vacuum (n = 1).
    pub fn vacuum() -> Self {
        Self::new("vacuum", DielectricModel::Constant(Complex64::new(1.0, 0.0)))
    }

    /// Glass substrate, two-parameter Cauchy fit (A = 1.55, B = 0.005 µm²).
    pub fn glass() -> Self {
        Self::new("glass", DielectricModel::Cauchy { a: 1.55, b: 0.005 })
    }

    /// Fused silica, Malitson (1965) Sellmeier fit.
    pub fn sio2() -> Self {
        Self::new(
            "SiO2",
            DielectricModel::Sellmeier {
                terms: vec![
                    (0.696_166_3, 0.068_404_3_f64.powi(2)),
                    (0.407_942_6, 0.116_241_4_f64.powi(2)),
                    (0.897_479_4, 9.896_161_f64.powi(2)),
                ],
            },
        )
    }

    /// Sapphire (ordinary ray), Malitson (1962) Sellmeier fit.
    pub fn al2o3() -> Self {
        Self::new(
            "Al2O3",
            DielectricModel::Sellmeier {
                terms: vec![
                    (1.431_349_3, 0.072_663_1_f64.powi(2)),
                    (0.650_547_13, 0.119_324_2_f64.powi(2)),
                    (5.341_402_1, 18.028_251_f64.powi(2)),
                ],
            },
        )
    }

    /// Rutile TiO₂ (ordinary ray), Palik Vol. 1, 300–1000 nm.
    ///
    /// High-index dielectric (n ≈ 2.5–2.7 in the visible) with an absorption
    /// edge near 380 nm.
    pub fn tio2() -> Result<Self, MaterialError> {
        // (λ/nm, n, k)
        const TIO2: &[(f64, f64, f64)] = &[
            (300.0, 3.340, 0.880),
            (320.0, 2.990, 0.480),
            (340.0, 2.780, 0.220),
            (360.0, 2.680, 0.080),
            (380.0, 2.640, 0.018),
            (400.0, 2.620, 0.003),
            (440.0, 2.596, 0.000),
            (480.0, 2.579, 0.000),
            (520.0, 2.566, 0.000),
            (560.0, 2.555, 0.000),
            (600.0, 2.547, 0.000),
            (650.0, 2.538, 0.000),
            (700.0, 2.531, 0.000),
            (750.0, 2.526, 0.000),
            (800.0, 2.521, 0.000),
            (850.0, 2.517, 0.000),
            (900.0, 2.513, 0.000),
            (950.0, 2.510, 0.000),
            (1000.0, 2.507, 0.000),
        ];
        Self::from_nk_table("TiO2", TIO2)
    }

    fn permittivity(&self, wavelength_m: f64) -> Result<Complex64, MaterialError> {
        match &self.model {
            DielectricModel::Tabulated {
                wavelengths_nm,
                eps_real,
                eps_imag,
            } => {
                let lambda_nm = wavelength_m * 1e9;
                let (min, max) = (wavelengths_nm[0], wavelengths_nm[wavelengths_nm.len() - 1]);
                if lambda_nm < min || lambda_nm > max {
                    return Err(MaterialError::OutOfRange {
                        wavelength_nm: lambda_nm,
                        min,
                        max,
                    });
                }
                Ok(Complex64::new(
                    eps_real.evaluate(lambda_nm),
                    eps_imag.evaluate(lambda_nm).max(0.0),
                ))
            }
            DielectricModel::Sellmeier { terms } => {
                let l2 = (wavelength_m * 1e6).powi(2);
                let n2 = 1.0 + terms.iter().map(|&(b, c)| b * l2 / (l2 - c)).sum::<f64>();
                Ok(Complex64::new(n2, 0.0))
            }
            DielectricModel::Cauchy { a, b } => {
                let l_um = wavelength_m * 1e6;
                let n = a + b / (l_um * l_um);
                Ok(Complex64::new(n * n, 0.0))
            }
            DielectricModel::Constant(n) => Ok(n * n),
        }
    }
}

impl PartialEq for DielectricMaterial {
    /// Dielectrics are identified by name; model data is not compared.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl MaterialProvider for DielectricMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> MaterialKind {
        MaterialKind::Dielectric
    }

    fn dielectric_function(&self, wavelengths_m: &[f64]) -> Result<Vec<Complex64>, MaterialError> {
        wavelengths_m
            .iter()
            .map(|&lambda| self.permittivity(lambda))
            .collect()
    }

    fn index_of_refraction(&self, wavelengths_m: &[f64]) -> Result<Vec<Complex64>, MaterialError> {
        // Constant and Cauchy models state n directly
        match &self.model {
            DielectricModel::Constant(n) => Ok(vec![*n; wavelengths_m.len()]),
            DielectricModel::Cauchy { a, b } => Ok(wavelengths_m
                .iter()
                .map(|&lambda| {
                    let l_um = lambda * 1e6;
                    Complex64::new(a + b / (l_um * l_um), 0.0)
                })
                .collect()),
            _ => Ok(self
                .dielectric_function(wavelengths_m)?
                .into_iter()
                .map(|e| e.sqrt())
                .collect()),
        }
    }
}
