//! Built-in material catalog and name-keyed material library.
//!
//! Brendel–Bormann parameters are the fits of Rakić *et al.* (1998), Table 3.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::binary::FILE_SUFFIX;
use crate::brendel_bormann::{BrendelBormannMaterial, BrendelBormannParameters};
use crate::dielectric::DielectricMaterial;
use crate::lorentz_drude::LorentzDrudeMaterial;
use crate::material::Material;
use crate::provider::{MaterialError, MaterialProvider};

type BbRow = (&'static str, [&'static [f64]; 4], f64);

/// `(name, [f, g, w, s], wp)` for every catalog metal.
const BB_CATALOG: &[BbRow] = &[
    (
        "Ag",
        [
            &[0.821, 0.050, 0.133, 0.051, 0.467, 4.000],
            &[0.049, 0.189, 0.067, 0.019, 0.117, 0.052],
            &[0.0, 2.025, 5.185, 4.343, 9.809, 18.56],
            &[0.0, 1.894, 0.665, 0.189, 1.170, 0.516],
        ],
        9.01,
    ),
    (
        "Au",
        [
            &[0.770, 0.054, 0.050, 0.312, 0.719, 1.648],
            &[0.050, 0.074, 0.035, 0.083, 0.125, 0.179],
            &[0.0, 0.218, 2.885, 4.069, 6.137, 27.97],
            &[0.0, 0.742, 0.349, 0.830, 1.246, 1.795],
        ],
        9.03,
    ),
    (
        "Cu",
        [
            &[0.562, 0.076, 0.081, 0.324, 0.726],
            &[0.030, 0.056, 0.047, 0.113, 0.172],
            &[0.0, 0.416, 2.849, 4.819, 8.136],
            &[0.0, 0.562, 0.469, 1.131, 1.719],
        ],
        10.83,
    ),
    (
        "Al",
        [
            &[0.526, 0.213, 0.060, 0.182, 0.014],
            &[0.047, 0.312, 0.315, 1.587, 2.145],
            &[0.0, 0.163, 1.561, 1.827, 4.495],
            &[0.0, 0.013, 0.042, 0.256, 1.735],
        ],
        14.98,
    ),
    (
        "Be",
        [
            &[0.081, 0.066, 0.067, 0.346, 0.311],
            &[0.035, 2.956, 3.962, 2.398, 3.904],
            &[0.0, 0.131, 0.469, 2.827, 4.318],
            &[0.0, 0.277, 3.167, 1.446, 0.893],
        ],
        18.51,
    ),
    (
        "Cr",
        [
            &[0.154, 0.338, 0.261, 0.817, 0.105],
            &[0.048, 4.256, 3.957, 2.218, 6.983],
            &[0.0, 0.281, 0.584, 1.919, 6.997],
            &[0.0, 0.115, 0.252, 0.225, 4.903],
        ],
        10.75,
    ),
    (
        "Ni",
        [
            &[0.083, 0.357, 0.039, 0.127, 0.654],
            &[0.022, 2.820, 0.120, 1.822, 6.637],
            &[0.0, 0.317, 1.059, 4.583, 8.825],
            &[0.0, 0.606, 1.454, 0.379, 0.510],
        ],
        15.92,
    ),
    (
        "Pd",
        [
            &[0.330, 0.769, 0.093, 0.309, 0.409],
            &[0.009, 2.343, 0.497, 2.022, 0.119],
            &[0.0, 0.066, 0.502, 2.432, 5.987],
            &[0.0, 0.694, 0.027, 1.167, 1.331],
        ],
        9.72,
    ),
    (
        "Pt",
        [
            &[0.333, 0.186, 0.665, 0.551, 2.214],
            &[0.080, 0.498, 1.851, 2.604, 2.891],
            &[0.0, 0.782, 1.317, 3.189, 8.236],
            &[0.0, 0.031, 0.096, 0.766, 1.146],
        ],
        9.59,
    ),
    (
        "Ti",
        [
            &[0.126, 0.427, 0.218, 0.513, 0.0002],
            &[0.067, 1.877, 0.100, 0.615, 4.109],
            &[0.0, 1.459, 2.661, 0.805, 19.86],
            &[0.0, 0.463, 0.506, 0.799, 2.854],
        ],
        7.29,
    ),
    (
        "W",
        [
            &[0.197, 0.006, 0.022, 0.136, 2.648],
            &[0.057, 3.689, 0.227, 1.433, 4.555],
            &[0.0, 0.481, 0.985, 1.962, 5.442],
            &[0.0, 3.754, 0.059, 0.273, 1.912],
        ],
        13.22,
    ),
];

/// All Brendel–Bormann metals of the built-in catalog, in catalog order.
pub fn brendel_bormann_catalog() -> Result<Vec<BrendelBormannMaterial>, MaterialError> {
    BB_CATALOG
        .iter()
        .map(|&(name, [f, g, w, s], wp)| {
            BrendelBormannMaterial::from_parameters(
                name,
                BrendelBormannParameters {
                    f: f.to_vec(),
                    g: g.to_vec(),
                    w: w.to_vec(),
                    s: s.to_vec(),
                    wp,
                },
            )
        })
        .collect()
}

/// Look up a single catalog metal by name.
pub fn brendel_bormann(name: &str) -> Result<BrendelBormannMaterial, MaterialError> {
    brendel_bormann_catalog()?
        .into_iter()
        .find(|m| m.name() == name)
        .ok_or_else(|| MaterialError::NotFound(name.to_string()))
}

/// Materials keyed by name, shared read-only by every stack built from them.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: BTreeMap<String, Arc<Material>>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in material: catalog metals, Lorentz–Drude metals and
    /// dielectrics.
    pub fn builtin() -> Result<Self, MaterialError> {
        let mut library = Self::new();
        for metal in brendel_bormann_catalog()? {
            library.insert(metal);
        }
        library.insert(LorentzDrudeMaterial::silver());
        library.insert(LorentzDrudeMaterial::gold());
        library.insert(DielectricMaterial::vacuum());
        library.insert(DielectricMaterial::glass());
        library.insert(DielectricMaterial::sio2());
        library.insert(DielectricMaterial::al2o3());
        library.insert(DielectricMaterial::tio2()?);
        Ok(library)
    }

    /// Add or replace a material, returning the previous entry of that name.
    pub fn insert(&mut self, material: impl Into<Material>) -> Option<Arc<Material>> {
        let material = material.into();
        self.materials
            .insert(material.name().to_string(), Arc::new(material))
    }

    /// Load every `*_bb_metal` file in `directory`, replacing entries of the
    /// same name. Returns the names loaded, in directory order.
    pub fn load_brendel_bormann_dir(
        &mut self,
        directory: impl AsRef<Path>,
    ) -> Result<Vec<String>, MaterialError> {
        let directory = directory.as_ref();
        let mut loaded = Vec::new();
        for entry in std::fs::read_dir(directory)? {
            let path = entry?.path();
            let is_material_file = path
                .file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|f| f.ends_with(FILE_SUFFIX));
            if !path.is_file() || !is_material_file {
                debug!("skipping {}", path.display());
                continue;
            }
            let metal = BrendelBormannMaterial::load(&path)?;
            if self.insert(metal.clone()).is_some() {
                debug!("'{}' from {} replaces an existing entry", metal.name(), path.display());
            }
            loaded.push(metal.name().to_string());
        }
        if loaded.is_empty() {
            warn!("no material files found in {}", directory.display());
        } else {
            info!("loaded {} materials from {}", loaded.len(), directory.display());
        }
        Ok(loaded)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Material>> {
        self.materials.get(name)
    }

    /// Look up a material or fail with [`MaterialError::NotFound`].
    pub fn resolve(&self, name: &str) -> Result<Arc<Material>, MaterialError> {
        self.get(name).cloned().ok_or_else(|| {
            MaterialError::NotFound(format!(
                "{} (available: {})",
                name,
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    /// Resolve several names, preserving their order.
    pub fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<Material>>, MaterialError> {
        names.iter().map(|n| self.resolve(n.as_ref())).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.materials.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Material>> {
        self.materials.values()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
