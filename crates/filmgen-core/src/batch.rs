//! Parallel batch generation.
//!
//! Every sample is an independent task: seed a generator from
//! `(seed, task_index)`, draw a structure, evaluate its response. Tasks run
//! on a [`ComputeBackend`] and come back in task order, so a seed fixes the
//! dataset whatever the number of workers.

use std::ops::Range;
use std::time::{Duration, Instant};

use filmgen_compute::{ComputeBackend, TaskError};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use crate::dataset::DatasetWriter;
use crate::evaluator::ResponseEvaluator;
use crate::rng::task_rng;
use crate::sampler::StructureSampler;
use crate::types::{GenerationRecord, RecordLayout};
use crate::GenerationError;

/// Outcome of a streamed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Samples generated by this run.
    pub samples: u64,
    /// Task index of the first generated sample.
    pub first_index: u64,
    /// Rows in the dataset after the run.
    pub total_rows: u64,
    pub elapsed: Duration,
}

/// Drives sampling and evaluation of many structures.
#[derive(Debug)]
pub struct BatchOrchestrator {
    sampler: StructureSampler,
    evaluator: ResponseEvaluator,
    seed: u64,
    chunk_size: Option<usize>,
    show_progress: bool,
}

impl BatchOrchestrator {
    pub fn new(
        sampler: StructureSampler,
        evaluator: ResponseEvaluator,
        seed: u64,
    ) -> Result<Self, GenerationError> {
        let layout = evaluator.layout();
        if sampler.num_materials() != layout.num_materials {
            return Err(GenerationError::Config(format!(
                "sampler draws from {} materials but the evaluator tabulated {}",
                sampler.num_materials(),
                layout.num_materials
            )));
        }
        if sampler.num_layers() != layout.num_layers {
            return Err(GenerationError::Config(format!(
                "sampler draws {} layers but the evaluator expects {}",
                sampler.num_layers(),
                layout.num_layers
            )));
        }
        Ok(Self {
            sampler,
            evaluator,
            seed,
            chunk_size: None,
            show_progress: false,
        })
    }

    /// Evaluate at most `chunk_size` tasks at a time. `None` runs the whole
    /// batch as one chunk.
    pub fn with_chunk_size(mut self, chunk_size: Option<usize>) -> Self {
        self.chunk_size = chunk_size.filter(|&n| n > 0);
        self
    }

    /// Draw a terminal progress bar while running.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn layout(&self) -> RecordLayout {
        self.evaluator.layout()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn sampler(&self) -> &StructureSampler {
        &self.sampler
    }

    pub fn evaluator(&self) -> &ResponseEvaluator {
        &self.evaluator
    }

    /// Generate the sample of task `index`.
    pub fn generate_one(&self, index: usize) -> Result<GenerationRecord, GenerationError> {
        let mut rng = task_rng(self.seed, index);
        let choices = self.sampler.sample(&mut rng);
        self.evaluator.evaluate(&choices)
    }

    /// Generate `sample_count` records in memory, in task order.
    pub fn run(
        &self,
        sample_count: usize,
        backend: &dyn ComputeBackend,
    ) -> Result<Vec<GenerationRecord>, GenerationError> {
        let start = Instant::now();
        let mut records = Vec::with_capacity(sample_count);
        self.run_chunks(0..sample_count, backend, |rows| {
            records.extend(rows.into_iter().map(GenerationRecord::new));
            Ok(())
        })?;
        info!(
            "generated {} samples in {:.2?}",
            records.len(),
            start.elapsed()
        );
        Ok(records)
    }

    /// Generate `sample_count` records and append them to `writer`.
    ///
    /// Task indices continue from the rows already in the dataset, so a
    /// reopened dataset grows with the same sample stream an uninterrupted
    /// run would have produced. The row count is published after every
    /// chunk.
    pub fn run_into(
        &self,
        sample_count: usize,
        backend: &dyn ComputeBackend,
        writer: &mut DatasetWriter,
    ) -> Result<RunSummary, GenerationError> {
        let width = self.layout().width();
        if writer.width() != width {
            return Err(GenerationError::Config(format!(
                "dataset has {} columns but records have {}",
                writer.width(),
                width
            )));
        }

        let start = Instant::now();
        let first = writer.rows() as usize;
        self.run_chunks(first..first + sample_count, backend, |rows| {
            writer.append_all(&rows)?;
            writer.flush()?;
            debug!("published {} rows", writer.rows());
            Ok(())
        })?;

        let summary = RunSummary {
            samples: sample_count as u64,
            first_index: first as u64,
            total_rows: writer.rows(),
            elapsed: start.elapsed(),
        };
        info!(
            "wrote {} samples to {} in {:.2?}",
            summary.samples,
            writer.path().display(),
            summary.elapsed
        );
        Ok(summary)
    }

    fn run_chunks<F>(
        &self,
        tasks: Range<usize>,
        backend: &dyn ComputeBackend,
        mut sink: F,
    ) -> Result<(), GenerationError>
    where
        F: FnMut(Vec<Vec<f64>>) -> Result<(), GenerationError>,
    {
        let total = tasks.len();
        let chunk = self.chunk_size.unwrap_or(total).max(1);
        info!(
            "generating {} samples (tasks {}..{}) on {}, seed {}",
            total,
            tasks.start,
            tasks.end,
            backend.device_info().name,
            self.seed
        );

        let pb = self.progress_bar(total as u64);
        let row_fn = |index: usize| -> Result<Vec<f64>, TaskError> {
            let record = self.generate_one(index)?;
            pb.inc(1);
            Ok(record.into_values())
        };

        let mut next = tasks.start;
        while next < tasks.end {
            let end = (next + chunk).min(tasks.end);
            let rows = backend.parallel_rows(next..end, &row_fn);
            let rows = match rows {
                Ok(rows) => rows,
                Err(e) => {
                    pb.abandon();
                    return Err(e.into());
                }
            };
            debug!("chunk {}..{} done", next, end);
            sink(rows)?;
            next = end;
        }
        pb.finish_and_clear();
        Ok(())
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }
}
