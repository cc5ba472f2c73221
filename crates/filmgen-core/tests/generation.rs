//! End-to-end generation over the built-in material library.
//!
//! - Seeded [Ag, Al2O3, TiO2] three-layer runs are reproducible
//! - Records respect the structural constraints
//! - Streamed output matches in-memory output
//! - Reopened datasets continue the same sample stream

use std::sync::Arc;

use filmgen_compute::{CpuBackend, SerialBackend};
use filmgen_core::{
    BatchOrchestrator, DatasetReader, DatasetWriter, RecordLayout, ResponseEvaluator,
    StructureSampler, ThicknessBounds, TransferMatrixSolver,
};
use filmgen_materials::MaterialLibrary;

const SEED: u64 = 35447;

fn wavelengths(points: usize) -> Vec<f64> {
    (0..points)
        .map(|i| (450.0 + 500.0 * i as f64 / (points - 1) as f64) * 1e-9)
        .collect()
}

fn orchestrator(seed: u64) -> BatchOrchestrator {
    let library = MaterialLibrary::builtin().unwrap();
    let materials = library.resolve_all(&["Ag", "Al2O3", "TiO2"]).unwrap();
    let evaluator = ResponseEvaluator::new(
        &materials,
        &library.resolve("vacuum").unwrap(),
        &library.resolve("glass").unwrap(),
        wavelengths(20),
        vec![25.0, 45.0, 65.0],
        3,
        Arc::new(TransferMatrixSolver::new()),
    )
    .unwrap();
    let sampler = StructureSampler::new(3, 3, ThicknessBounds::new(1e-9, 60e-9)).unwrap();
    BatchOrchestrator::new(sampler, evaluator, seed).unwrap()
}

fn check_record(values: &[f64], layout: &RecordLayout) {
    assert_eq!(values.len(), layout.width());
    assert_eq!(&values[..3], &[25.0, 45.0, 65.0]);

    let record = filmgen_core::GenerationRecord::new(values.to_vec());
    let mats = record.material_indices(layout);
    assert!(mats.iter().all(Option::is_some));
    for pair in mats.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
    for &t in record.thicknesses(layout) {
        assert!((1e-9..60e-9).contains(&t));
    }
    for block in 0..4 {
        for &v in record.response(layout, block) {
            assert!((0.0..=1.0 + 1e-12).contains(&v), "block {} value {}", block, v);
        }
    }
    for &psi in record.response(layout, 4) {
        assert!((0.0..=90.0).contains(&psi));
    }
    for &delta in record.response(layout, 5) {
        assert!(delta > -180.0 - 1e-9 && delta <= 180.0 + 1e-9);
    }
}

#[test]
fn test_seeded_run_is_reproducible_across_thread_counts() {
    let batch = orchestrator(SEED);
    let serial = batch.run(16, &SerialBackend).unwrap();
    let threaded = batch.run(16, &CpuBackend::with_threads(4).unwrap()).unwrap();
    let again = orchestrator(SEED).run(16, &SerialBackend).unwrap();

    assert_eq!(serial.len(), 16);
    for ((a, b), c) in serial.iter().zip(&threaded).zip(&again) {
        let bits = |r: &filmgen_core::GenerationRecord| {
            r.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        };
        assert_eq!(bits(a), bits(b));
        assert_eq!(bits(a), bits(c));
    }

    let other = orchestrator(SEED + 1).run(16, &SerialBackend).unwrap();
    assert_ne!(serial, other);
}

#[test]
fn test_records_respect_structural_constraints() {
    let batch = orchestrator(SEED);
    let layout = batch.layout();
    assert_eq!(layout.width(), 3 + 9 + 3 + 6 * 3 * 20);
    for record in batch.run(32, &CpuBackend::new()).unwrap() {
        check_record(record.values(), &layout);
        // duplicate Tp block
        assert_eq!(record.response(&layout, 2), record.response(&layout, 3));
    }
}

#[test]
fn test_streamed_dataset_matches_in_memory_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stream.npy");
    let batch = orchestrator(SEED).with_chunk_size(Some(5));
    let layout = batch.layout();

    let mut writer = DatasetWriter::create(&path, layout.width()).unwrap();
    let summary = batch
        .run_into(12, &CpuBackend::with_threads(3).unwrap(), &mut writer)
        .unwrap();
    assert_eq!(summary.samples, 12);
    assert_eq!(summary.total_rows, 12);
    assert_eq!(writer.close().unwrap(), 12);

    let expected = orchestrator(SEED).run(12, &SerialBackend).unwrap();
    let mut reader = DatasetReader::open(&path).unwrap();
    assert_eq!(reader.shape(), (12, layout.width()));
    let data = reader.read_all().unwrap();
    for (row, record) in data.outer_iter().zip(&expected) {
        assert_eq!(row.to_vec(), record.values());
        check_record(record.values(), &layout);
    }
}

#[test]
fn test_reopened_dataset_continues_sample_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resume.npy");
    let batch = orchestrator(SEED);
    let width = batch.layout().width();

    let mut writer = DatasetWriter::create(&path, width).unwrap();
    batch.run_into(4, &SerialBackend, &mut writer).unwrap();
    writer.close().unwrap();

    let mut writer = DatasetWriter::reopen(&path).unwrap();
    assert_eq!(writer.rows(), 4);
    let summary = batch.run_into(3, &SerialBackend, &mut writer).unwrap();
    assert_eq!(summary.first_index, 4);
    writer.close().unwrap();

    let uninterrupted = batch.run(7, &SerialBackend).unwrap();
    let data = DatasetReader::open(&path).unwrap().read_all().unwrap();
    assert_eq!(data.nrows(), 7);
    for (row, record) in data.outer_iter().zip(&uninterrupted) {
        assert_eq!(row.to_vec(), record.values());
    }
}

#[test]
fn test_run_into_rejects_wrong_width() {
    let dir = tempfile::tempdir().unwrap();
    let batch = orchestrator(SEED);
    let mut writer = DatasetWriter::create(dir.path().join("bad.npy"), 7).unwrap();
    assert!(batch.run_into(1, &SerialBackend, &mut writer).is_err());
    assert_eq!(writer.rows(), 0);
}
