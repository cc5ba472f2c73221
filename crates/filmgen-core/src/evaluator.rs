//! Optical response of sampled structures.
//!
//! [`ResponseEvaluator`] turns a list of [`LayerChoice`]s into a flat
//! [`GenerationRecord`]. Refractive indices of the candidate materials and of
//! the semi-infinite media are tabulated once on the wavelength grid, so a
//! record costs only solver calls.

use std::sync::Arc;

use log::debug;
use ndarray::Array2;
use num_complex::Complex64;

use filmgen_materials::{Material, MaterialError, MaterialProvider};

use crate::solver::{SolverError, StackOptics, TmmSolver};
use crate::types::{FourthBlock, GenerationRecord, LayerChoice, RecordLayout};
use crate::GenerationError;

/// Fixed optical setup of a generation run.
pub struct ResponseEvaluator {
    wavelengths: Vec<f64>,
    angles_deg: Vec<f64>,
    num_layers: usize,
    /// `index_table[[material, wavelength]]`
    index_table: Array2<Complex64>,
    superstrate: Vec<Complex64>,
    substrate: Vec<Complex64>,
    fourth_block: FourthBlock,
    solver: Arc<dyn TmmSolver>,
}

impl std::fmt::Debug for ResponseEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseEvaluator")
            .field("layout", &self.layout())
            .field("solver", &self.solver.method_name())
            .finish()
    }
}

impl ResponseEvaluator {
    /// Tabulate every material on `wavelengths` (metres).
    pub fn new(
        materials: &[Arc<Material>],
        superstrate: &Material,
        substrate: &Material,
        wavelengths: Vec<f64>,
        angles_deg: Vec<f64>,
        num_layers: usize,
        solver: Arc<dyn TmmSolver>,
    ) -> Result<Self, GenerationError> {
        if wavelengths.is_empty() {
            return Err(GenerationError::Config("wavelength grid is empty".into()));
        }
        if angles_deg.is_empty() {
            return Err(GenerationError::Config("angle set is empty".into()));
        }
        if materials.is_empty() {
            return Err(GenerationError::Config("no candidate materials".into()));
        }

        let mut index_table = Array2::<Complex64>::zeros((materials.len(), wavelengths.len()));
        for (row, material) in materials.iter().enumerate() {
            let indices = material.index_of_refraction(&wavelengths)?;
            check_len(material.name(), indices.len(), wavelengths.len())?;
            for (col, n) in indices.into_iter().enumerate() {
                index_table[[row, col]] = n;
            }
            debug!("tabulated {} on {} wavelengths", material.name(), wavelengths.len());
        }
        let superstrate_n = superstrate.index_of_refraction(&wavelengths)?;
        check_len(superstrate.name(), superstrate_n.len(), wavelengths.len())?;
        let substrate_n = substrate.index_of_refraction(&wavelengths)?;
        check_len(substrate.name(), substrate_n.len(), wavelengths.len())?;

        Ok(Self {
            wavelengths,
            angles_deg,
            num_layers,
            index_table,
            superstrate: superstrate_n,
            substrate: substrate_n,
            fourth_block: FourthBlock::DuplicateTp,
            solver,
        })
    }

    /// Choose what the fourth response block holds.
    pub fn with_fourth_block(mut self, fourth_block: FourthBlock) -> Self {
        self.fourth_block = fourth_block;
        self
    }

    pub fn layout(&self) -> RecordLayout {
        RecordLayout {
            num_angles: self.angles_deg.len(),
            num_layers: self.num_layers,
            num_materials: self.index_table.nrows(),
            num_wavelengths: self.wavelengths.len(),
            fourth_block: self.fourth_block,
        }
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn angles_deg(&self) -> &[f64] {
        &self.angles_deg
    }

    pub fn num_materials(&self) -> usize {
        self.index_table.nrows()
    }

    pub fn index_table(&self) -> &Array2<Complex64> {
        &self.index_table
    }

    pub fn solver(&self) -> &dyn TmmSolver {
        self.solver.as_ref()
    }

    /// Compute the record of one structure.
    ///
    /// Angles form the outer loop and wavelengths the inner loop; every
    /// response block is stored in that order.
    pub fn evaluate(&self, choices: &[LayerChoice]) -> Result<GenerationRecord, GenerationError> {
        let layout = self.layout();
        if choices.len() != self.num_layers {
            return Err(GenerationError::Config(format!(
                "expected {} layers, got {}",
                self.num_layers,
                choices.len()
            )));
        }
        if let Some(bad) = choices
            .iter()
            .find(|c| c.material_index >= layout.num_materials)
        {
            return Err(GenerationError::Config(format!(
                "material index {} out of range for {} materials",
                bad.material_index, layout.num_materials
            )));
        }

        let mut values = vec![0.0; layout.width()];
        values[..layout.num_angles].copy_from_slice(&self.angles_deg);

        let one_hot = layout.one_hot_offset();
        for (layer, choice) in choices.iter().enumerate() {
            values[one_hot + choice.material_index + layout.num_materials * layer] = 1.0;
        }
        let thickness_offset = layout.thickness_offset();
        let thicknesses: Vec<f64> = choices.iter().map(|c| c.thickness).collect();
        values[thickness_offset..thickness_offset + self.num_layers].copy_from_slice(&thicknesses);

        let block = |b: usize, idx: usize| layout.response_offset(b) + idx;
        let mut layer_indices = vec![Complex64::new(0.0, 0.0); self.num_layers];
        for (j, &angle) in self.angles_deg.iter().enumerate() {
            for (i, &wavelength) in self.wavelengths.iter().enumerate() {
                for (slot, choice) in layer_indices.iter_mut().zip(choices) {
                    *slot = self.index_table[[choice.material_index, i]];
                }
                let stack = StackOptics::new(
                    &layer_indices,
                    &thicknesses,
                    self.superstrate[i],
                    self.substrate[i],
                );
                let point = self
                    .solver
                    .point_response(angle, wavelength, &stack)
                    .map_err(|source| solve_error(source, angle, wavelength))?;

                let idx = layout.grid_index(j, i);
                values[block(0, idx)] = point.rp;
                values[block(1, idx)] = point.rs;
                values[block(2, idx)] = point.tp;
                values[block(3, idx)] = match self.fourth_block {
                    FourthBlock::DuplicateTp => point.tp,
                    FourthBlock::Ts => point.ts,
                };
                values[block(4, idx)] = point.psi;
                values[block(5, idx)] = point.delta;
            }
        }

        Ok(GenerationRecord::new(values))
    }
}

fn check_len(name: &str, got: usize, expected: usize) -> Result<(), MaterialError> {
    if got != expected {
        return Err(MaterialError::DataError(format!(
            "{} returned {} values for {} wavelengths",
            name, got, expected
        )));
    }
    Ok(())
}

fn solve_error(source: SolverError, angle_deg: f64, wavelength_m: f64) -> GenerationError {
    GenerationError::Solver {
        angle_deg,
        wavelength_nm: wavelength_m * 1e9,
        source,
    }
}
