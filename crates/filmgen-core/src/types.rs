//! Core types shared across the generation pipeline.
//!
//! Stacks, per-layer choices drawn by the sampler, and the fixed column
//! layout of one generated sample.

use std::sync::Arc;

use filmgen_materials::{Material, MaterialProvider};
use serde::{Deserialize, Serialize};

/// One layer of a thin-film stack.
#[derive(Debug, Clone)]
pub struct ThinFilmLayer {
    /// Thickness in metres.
    pub thickness: f64,
    /// Shared material; many layers may point at the same instance.
    pub material: Arc<Material>,
}

impl ThinFilmLayer {
    pub fn new(thickness: f64, material: Arc<Material>) -> Self {
        Self {
            thickness,
            material,
        }
    }
}

/// Layers ordered from the superstrate side to the substrate side.
#[derive(Debug, Clone, Default)]
pub struct ThinFilmStack {
    pub layers: Vec<ThinFilmLayer>,
}

impl ThinFilmStack {
    pub fn new(layers: Vec<ThinFilmLayer>) -> Self {
        Self { layers }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn thicknesses(&self) -> Vec<f64> {
        self.layers.iter().map(|l| l.thickness).collect()
    }

    /// Build a stack from sampler choices over a candidate material list.
    ///
    /// Returns `None` if a choice indexes past the candidate list.
    pub fn from_choices(choices: &[LayerChoice], materials: &[Arc<Material>]) -> Option<Self> {
        choices
            .iter()
            .map(|c| {
                materials
                    .get(c.material_index)
                    .map(|m| ThinFilmLayer::new(c.thickness, Arc::clone(m)))
            })
            .collect::<Option<Vec<_>>>()
            .map(Self::new)
    }

    /// Human-readable layer description, e.g. `Ag 12.3 nm | TiO2 40.0 nm`.
    pub fn describe(&self) -> String {
        self.layers
            .iter()
            .map(|l| format!("{} {:.1} nm", l.material.name(), l.thickness * 1e9))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Material index (into the candidate list) and thickness of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerChoice {
    pub material_index: usize,
    /// Thickness in metres.
    pub thickness: f64,
}

/// Half-open thickness interval `[lo, hi)` in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThicknessBounds {
    pub lo: f64,
    pub hi: f64,
}

impl ThicknessBounds {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, thickness: f64) -> bool {
        thickness >= self.lo && thickness < self.hi
    }
}

/// Which quantity fills the fourth response block of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FourthBlock {
    /// Tp written a second time (layout of the published datasets).
    DuplicateTp,
    /// Ts, the s-polarised transmittance.
    Ts,
}

impl FourthBlock {
    pub fn label(&self) -> &'static str {
        match self {
            FourthBlock::DuplicateTp => "Tp",
            FourthBlock::Ts => "Ts",
        }
    }
}

/// Column layout of a generation record.
///
/// ```text
/// [angles | one-hot (layers x materials) | thicknesses | Rp | Rs | Tp | Tp/Ts | psi | delta]
/// ```
///
/// Each response block holds `angles x wavelengths` values, wavelength-minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLayout {
    pub num_angles: usize,
    pub num_layers: usize,
    pub num_materials: usize,
    pub num_wavelengths: usize,
    pub fourth_block: FourthBlock,
}

/// Response blocks, in record order.
pub const RESPONSE_BLOCKS: usize = 6;

impl RecordLayout {
    /// Values per response block.
    pub fn grid_len(&self) -> usize {
        self.num_angles * self.num_wavelengths
    }

    /// Total number of columns.
    pub fn width(&self) -> usize {
        self.num_angles
            + self.num_layers * self.num_materials
            + self.num_layers
            + RESPONSE_BLOCKS * self.grid_len()
    }

    pub fn one_hot_offset(&self) -> usize {
        self.num_angles
    }

    pub fn thickness_offset(&self) -> usize {
        self.one_hot_offset() + self.num_layers * self.num_materials
    }

    /// Offset of response block `block` (0 = Rp … 5 = Δ).
    pub fn response_offset(&self, block: usize) -> usize {
        self.thickness_offset() + self.num_layers + block * self.grid_len()
    }

    /// Flat index of `(angle, wavelength)` within a response block.
    pub fn grid_index(&self, angle_index: usize, wavelength_index: usize) -> usize {
        wavelength_index + self.num_wavelengths * angle_index
    }

    /// Block labels in record order.
    pub fn block_labels(&self) -> [&'static str; 9] {
        [
            "ang",
            "mats",
            "l",
            "Rp",
            "Rs",
            "Tp",
            self.fourth_block.label(),
            "psi",
            "delta",
        ]
    }

    /// Column semantics string, e.g. `[ang,mats,l,Rp,Rs,Tp,Tp,psi,delta]`.
    pub fn semantics(&self) -> String {
        format!("[{}]", self.block_labels().join(","))
    }

    /// `(label, offset, length)` for every block.
    pub fn blocks(&self) -> Vec<(&'static str, usize, usize)> {
        let labels = self.block_labels();
        let mut out = vec![
            (labels[0], 0, self.num_angles),
            (
                labels[1],
                self.one_hot_offset(),
                self.num_layers * self.num_materials,
            ),
            (labels[2], self.thickness_offset(), self.num_layers),
        ];
        for block in 0..RESPONSE_BLOCKS {
            out.push((labels[3 + block], self.response_offset(block), self.grid_len()));
        }
        out
    }
}

/// One synthetic sample: a flat row laid out by [`RecordLayout`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRecord {
    values: Vec<f64>,
}

impl GenerationRecord {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Decode the material indices from the one-hot block.
    pub fn material_indices(&self, layout: &RecordLayout) -> Vec<Option<usize>> {
        let base = layout.one_hot_offset();
        (0..layout.num_layers)
            .map(|layer| {
                let start = base + layer * layout.num_materials;
                self.values[start..start + layout.num_materials]
                    .iter()
                    .position(|&v| v == 1.0)
            })
            .collect()
    }

    pub fn thicknesses<'a>(&'a self, layout: &RecordLayout) -> &'a [f64] {
        let start = layout.thickness_offset();
        &self.values[start..start + layout.num_layers]
    }

    /// Response block `block` (0 = Rp … 5 = Δ).
    pub fn response<'a>(&'a self, layout: &RecordLayout, block: usize) -> &'a [f64] {
        let start = layout.response_offset(block);
        &self.values[start..start + layout.grid_len()]
    }
}

impl AsRef<[f64]> for GenerationRecord {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}
