//! CPU compute backend using Rayon for shared-memory parallelism.

use std::ops::Range;

use log::debug;
use rayon::prelude::*;

use crate::backend::{run_task, BackendType, ComputeBackend, ComputeError, DeviceInfo, RowFn};

/// CPU backend that spreads tasks over a Rayon thread pool.
pub struct CpuBackend {
    /// Dedicated pool; `None` runs on the global Rayon pool.
    pool: Option<rayon::ThreadPool>,
    num_threads: usize,
}

impl CpuBackend {
    /// Create a backend on the global pool (one thread per available core).
    pub fn new() -> Self {
        Self {
            pool: None,
            num_threads: rayon::current_num_threads(),
        }
    }

    /// Create a backend with a dedicated pool of `num_threads` workers.
    ///
    /// `0` selects the number of available cores.
    pub fn with_threads(num_threads: usize) -> Result<Self, ComputeError> {
        if num_threads == 0 {
            return Ok(Self::new());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("filmgen-worker-{}", i))
            .build()
            .map_err(|e| ComputeError::PoolError(e.to_string()))?;
        debug!("built worker pool with {} threads", num_threads);
        Ok(Self {
            pool: Some(pool),
            num_threads,
        })
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: format!("CPU ({} threads)", self.num_threads),
            backend_type: BackendType::Cpu,
            workers: self.num_threads,
        }
    }

    fn parallel_rows(
        &self,
        tasks: Range<usize>,
        row_fn: &RowFn<'_>,
    ) -> Result<Vec<Vec<f64>>, ComputeError> {
        // Indexed collect keeps submission order
        let run = || {
            tasks
                .into_par_iter()
                .map(|index| run_task(index, row_fn))
                .collect::<Result<Vec<_>, _>>()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_rows_gathered_in_submission_order() {
        let backend = CpuBackend::with_threads(4).unwrap();
        // Early tasks sleep longest so they finish last
        let rows = backend
            .parallel_rows(0..16, &|i| {
                std::thread::sleep(Duration::from_millis((16 - i as u64) * 2));
                Ok(vec![i as f64, (i * i) as f64])
            })
            .unwrap();
        assert_eq!(rows.len(), 16);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row, &vec![i as f64, (i * i) as f64]);
        }
    }

    #[test]
    fn test_failure_reports_task_index() {
        let backend = CpuBackend::with_threads(2).unwrap();
        let err = backend
            .parallel_rows(0..8, &|i| {
                if i == 5 {
                    Err(format!("task {} exploded", i).into())
                } else {
                    Ok(vec![0.0])
                }
            })
            .unwrap_err();
        match err {
            ComputeError::TaskFailed { index, source } => {
                assert_eq!(index, 5);
                assert!(source.to_string().contains("exploded"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_zero_threads_uses_global_pool() {
        let backend = CpuBackend::with_threads(0).unwrap();
        assert_eq!(backend.num_threads(), rayon::current_num_threads());
        assert_eq!(backend.device_info().backend_type, BackendType::Cpu);
    }
}
