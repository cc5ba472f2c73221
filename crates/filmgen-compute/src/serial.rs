//! Single-threaded backend running every task on the caller's thread.

use std::ops::Range;

use crate::backend::{run_task, BackendType, ComputeBackend, ComputeError, DeviceInfo, RowFn};

#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl ComputeBackend for SerialBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: "serial".into(),
            backend_type: BackendType::Serial,
            workers: 1,
        }
    }

    fn parallel_rows(
        &self,
        tasks: Range<usize>,
        row_fn: &RowFn<'_>,
    ) -> Result<Vec<Vec<f64>>, ComputeError> {
        tasks.map(|index| run_task(index, row_fn)).collect()
    }
}
