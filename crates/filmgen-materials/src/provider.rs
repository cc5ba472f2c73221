//! Material property provider trait.
//!
//! Every material model implements [`MaterialProvider`], which maps a grid of
//! vacuum wavelengths (metres) to the complex relative permittivity and the
//! complex refractive index of the material.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from material models, material files and the material library.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("Incompatible oscillator arrays for '{name}': {detail}")]
    IncompatibleArrays { name: String, detail: String },

    #[error("Material '{0}' is incomplete: f, g, w and s must all be set")]
    Incomplete(String),

    #[error("Cannot save material to {0} without overwriting existing file")]
    FileExists(String),

    #[error("Name of material unspecified in {0}")]
    NameUnspecified(String),

    #[error("Malformed material file {path}: {message}")]
    Format { path: String, message: String },

    #[error("Wavelength {wavelength_nm:.2} nm is outside the data range [{min}, {max}] nm")]
    OutOfRange {
        wavelength_nm: f64,
        min: f64,
        max: f64,
    },

    #[error("Material not found: {0}")]
    NotFound(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Family a material model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialKind {
    Dielectric,
    LorentzDrude,
    BrendelBormann,
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MaterialKind::Dielectric => "dielectric",
            MaterialKind::LorentzDrude => "Lorentz-Drude metal",
            MaterialKind::BrendelBormann => "Brendel-Bormann metal",
        };
        f.write_str(label)
    }
}

/// Provides wavelength-dependent optical constants.
///
/// Wavelengths are vacuum wavelengths in metres; the returned vector always
/// has the same length as the input.
pub trait MaterialProvider: Send + Sync {
    /// Name of this material (unique key inside a library).
    fn name(&self) -> &str;

    /// Model family.
    fn kind(&self) -> MaterialKind;

    /// Complex relative permittivity $\epsilon(\lambda)$.
    fn dielectric_function(&self, wavelengths_m: &[f64]) -> Result<Vec<Complex64>, MaterialError>;

    /// Complex refractive index $\tilde{n} = \sqrt{\epsilon}$ (principal branch).
    fn index_of_refraction(&self, wavelengths_m: &[f64]) -> Result<Vec<Complex64>, MaterialError> {
        let eps = self.dielectric_function(wavelengths_m)?;
        Ok(eps.into_iter().map(|e| e.sqrt()).collect())
    }
}

/// Photon energy in eV for a vacuum wavelength in metres.
pub fn photon_energy_ev(wavelength_m: f64) -> f64 {
    1239.84193e-9 / wavelength_m
}
