//! Random structure generation.
//!
//! The [`StructureSampler`] draws one material index and one thickness per
//! layer. Adjacent layers never share a material, so two consecutive layers
//! always form a real interface.

use rand::Rng;
use thiserror::Error;

use crate::types::{LayerChoice, ThicknessBounds};

/// Precondition violations detected before any draw.
#[derive(Debug, Error, PartialEq)]
pub enum SampleError {
    #[error("At least one layer is required")]
    NoLayers,

    #[error("At least one candidate material is required")]
    NoMaterials,

    #[error("{num_layers} layers need at least 2 candidate materials so adjacent layers can differ, got {num_materials}")]
    AdjacencyUnsatisfiable {
        num_materials: usize,
        num_layers: usize,
    },

    #[error("Thickness bounds must satisfy 0 < lo < hi, got [{lo:e}, {hi:e}) m")]
    InvalidBounds { lo: f64, hi: f64 },
}

/// Draws layer structures over a fixed candidate material set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureSampler {
    num_materials: usize,
    num_layers: usize,
    bounds: ThicknessBounds,
}

impl StructureSampler {
    /// Check the preconditions once so that [`sample`](Self::sample) always
    /// terminates.
    pub fn new(
        num_materials: usize,
        num_layers: usize,
        bounds: ThicknessBounds,
    ) -> Result<Self, SampleError> {
        if num_layers == 0 {
            return Err(SampleError::NoLayers);
        }
        if num_materials == 0 {
            return Err(SampleError::NoMaterials);
        }
        if num_layers >= 2 && num_materials < 2 {
            return Err(SampleError::AdjacencyUnsatisfiable {
                num_materials,
                num_layers,
            });
        }
        let ThicknessBounds { lo, hi } = bounds;
        if !(lo > 0.0 && lo < hi && hi.is_finite()) {
            return Err(SampleError::InvalidBounds { lo, hi });
        }
        Ok(Self {
            num_materials,
            num_layers,
            bounds,
        })
    }

    pub fn num_materials(&self) -> usize {
        self.num_materials
    }

    pub fn num_layers(&self) -> usize {
        self.num_layers
    }

    pub fn bounds(&self) -> ThicknessBounds {
        self.bounds
    }

    /// Draw one structure, top layer first.
    ///
    /// For every layer the material index is drawn uniformly and redrawn
    /// while it equals the previous layer's, then the thickness is drawn
    /// uniformly in `[lo, hi)`. The draw order is fixed, so the output is a
    /// pure function of the generator state.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<LayerChoice> {
        let mut choices: Vec<LayerChoice> = Vec::with_capacity(self.num_layers);
        for _ in 0..self.num_layers {
            let previous = choices.last().map(|c| c.material_index);
            let mut material_index = rng.gen_range(0..self.num_materials);
            while Some(material_index) == previous {
                material_index = rng.gen_range(0..self.num_materials);
            }
            let thickness = rng.gen_range(self.bounds.lo..self.bounds.hi);
            choices.push(LayerChoice {
                material_index,
                thickness,
            });
        }
        choices
    }
}
