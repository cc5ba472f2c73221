//! Compute backend trait and device description.
//!
//! A backend evaluates a row function for every task index of a range and
//! gathers the rows in index order, whatever order the workers finish in.

use std::ops::Range;

use thiserror::Error;

/// Error returned by a single task.
pub type TaskError = Box<dyn std::error::Error + Send + Sync>;

/// Row function evaluated once per task index.
pub type RowFn<'a> = dyn Fn(usize) -> Result<Vec<f64>, TaskError> + Send + Sync + 'a;

/// Errors originating from compute backends.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to build worker pool: {0}")]
    PoolError(String),

    #[error("Task {index} failed: {source}")]
    TaskFailed {
        index: usize,
        #[source]
        source: TaskError,
    },
}

/// Describes the capabilities of a compute backend.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub workers: usize,
}

/// The type of compute backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Serial,
    Cpu,
}

/// Abstraction over task schedulers.
pub trait ComputeBackend: Send + Sync {
    /// Return information about the device.
    fn device_info(&self) -> DeviceInfo;

    /// Evaluate `row_fn` for every index in `tasks`.
    ///
    /// The returned rows are ordered by task index. The first failing task
    /// aborts the whole range with [`ComputeError::TaskFailed`].
    fn parallel_rows(
        &self,
        tasks: Range<usize>,
        row_fn: &RowFn<'_>,
    ) -> Result<Vec<Vec<f64>>, ComputeError>;
}

pub(crate) fn run_task(index: usize, row_fn: &RowFn<'_>) -> Result<Vec<f64>, ComputeError> {
    row_fn(index).map_err(|source| ComputeError::TaskFailed { index, source })
}
