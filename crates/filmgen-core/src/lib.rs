//! # filmgen Core
//!
//! Synthetic dataset generation for multilayer thin-film optics.
//!
//! ## Architecture
//!
//! A [`batch::BatchOrchestrator`] runs one independent task per sample on a
//! compute backend. Each task draws a layer structure with the
//! [`sampler::StructureSampler`] from its own seeded generator ([`rng`]) and
//! turns it into a flat [`types::GenerationRecord`] with the
//! [`evaluator::ResponseEvaluator`], which calls a [`solver::TmmSolver`] for
//! every angle and wavelength. Records are appended to a growable `.npy`
//! file by the [`dataset::DatasetWriter`].
//!
//! ## Modules
//!
//! - [`types`]: Stacks, layer choices and the record layout.
//! - [`sampler`]: Random structures with distinct adjacent materials.
//! - [`rng`]: Per-task generator derivation.
//! - [`solver`]: TMM contract and the coherent transfer-matrix solver.
//! - [`evaluator`]: Record assembly over the angle × wavelength grid.
//! - [`batch`]: Parallel, reproducible batch generation.
//! - [`dataset`]: Dataset file and manifest.

pub mod batch;
pub mod dataset;
mod error;
pub mod evaluator;
pub mod rng;
pub mod sampler;
pub mod solver;
pub mod types;

pub use batch::{BatchOrchestrator, RunSummary};
pub use dataset::{DatasetError, DatasetManifest, DatasetReader, DatasetWriter};
pub use error::GenerationError;
pub use evaluator::ResponseEvaluator;
pub use sampler::{SampleError, StructureSampler};
pub use solver::transfer_matrix::TransferMatrixSolver;
pub use solver::{Polarization, SolverError, StackOptics, TmmSolver};
pub use types::{GenerationRecord, LayerChoice, RecordLayout, ThicknessBounds, ThinFilmLayer, ThinFilmStack};
