use filmgen_compute::ComputeError;
use filmgen_materials::MaterialError;
use thiserror::Error;

use crate::dataset::DatasetError;
use crate::sampler::SampleError;
use crate::solver::SolverError;

/// Errors raised while generating a dataset.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error(transparent)]
    Material(#[from] MaterialError),

    #[error("Solver failed at {angle_deg} deg, {wavelength_nm:.2} nm: {source}")]
    Solver {
        angle_deg: f64,
        wavelength_nm: f64,
        #[source]
        source: SolverError,
    },

    #[error(transparent)]
    Compute(#[from] ComputeError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl GenerationError {
    /// Index of the failing task, when the error came out of a batch.
    pub fn task_index(&self) -> Option<usize> {
        match self {
            GenerationError::Compute(ComputeError::TaskFailed { index, .. }) => Some(*index),
            _ => None,
        }
    }
}
