//! The closed set of material kinds used by thin-film stacks.

use num_complex::Complex64;

use crate::brendel_bormann::BrendelBormannMaterial;
use crate::dielectric::DielectricMaterial;
use crate::lorentz_drude::LorentzDrudeMaterial;
use crate::provider::{MaterialError, MaterialKind, MaterialProvider};

/// A material of one of the supported model families.
///
/// Dispatch is by variant; every variant implements [`MaterialProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Dielectric(DielectricMaterial),
    LorentzDrude(LorentzDrudeMaterial),
    BrendelBormann(BrendelBormannMaterial),
}

impl Material {
    fn provider(&self) -> &dyn MaterialProvider {
        match self {
            Material::Dielectric(m) => m,
            Material::LorentzDrude(m) => m,
            Material::BrendelBormann(m) => m,
        }
    }

    /// Classification tag of this material.
    pub fn classification(&self) -> MaterialKind {
        self.provider().kind()
    }

    pub fn as_brendel_bormann(&self) -> Option<&BrendelBormannMaterial> {
        match self {
            Material::BrendelBormann(m) => Some(m),
            _ => None,
        }
    }
}

impl MaterialProvider for Material {
    fn name(&self) -> &str {
        self.provider().name()
    }

    fn kind(&self) -> MaterialKind {
        self.classification()
    }

    fn dielectric_function(&self, wavelengths_m: &[f64]) -> Result<Vec<Complex64>, MaterialError> {
        self.provider().dielectric_function(wavelengths_m)
    }

    fn index_of_refraction(&self, wavelengths_m: &[f64]) -> Result<Vec<Complex64>, MaterialError> {
        self.provider().index_of_refraction(wavelengths_m)
    }
}

impl From<DielectricMaterial> for Material {
    fn from(m: DielectricMaterial) -> Self {
        Material::Dielectric(m)
    }
}

impl From<LorentzDrudeMaterial> for Material {
    fn from(m: LorentzDrudeMaterial) -> Self {
        Material::LorentzDrude(m)
    }
}

impl From<BrendelBormannMaterial> for Material {
    fn from(m: BrendelBormannMaterial) -> Self {
        Material::BrendelBormann(m)
    }
}
