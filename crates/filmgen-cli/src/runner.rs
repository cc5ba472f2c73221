//! Generation runner: ties together materials, sampler, solver and dataset.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::{info, warn};

use filmgen_compute::{ComputeBackend, CpuBackend};
use filmgen_core::dataset::manifest::{comments_path, json_path};
use filmgen_core::types::FourthBlock;
use filmgen_core::{
    BatchOrchestrator, DatasetManifest, DatasetWriter, RecordLayout, ResponseEvaluator,
    RunSummary, StructureSampler, ThicknessBounds, ThinFilmStack, TmmSolver,
    TransferMatrixSolver,
};
use filmgen_materials::{Material, MaterialLibrary, MaterialProvider};

use crate::config::JobConfig;

/// Files written by a generation run.
pub struct GenerationOutput {
    pub dataset: PathBuf,
    pub comments: PathBuf,
    pub json: Option<PathBuf>,
    pub layout: RecordLayout,
    pub summary: RunSummary,
}

/// Built-in materials plus any material files from `library_dir`.
pub fn build_library(library_dir: Option<&str>) -> Result<MaterialLibrary> {
    let mut library = MaterialLibrary::builtin().context("Failed to build material library")?;
    if let Some(dir) = library_dir {
        let loaded = library
            .load_brendel_bormann_dir(dir)
            .with_context(|| format!("Failed to load material files from {}", dir))?;
        println!("Loaded {} material files from {}", loaded.len(), dir);
    }
    Ok(library)
}

/// Resolve materials, tabulate indices and wire up the batch.
pub fn build_orchestrator(job: &JobConfig, library: &MaterialLibrary) -> Result<BatchOrchestrator> {
    let materials = library.resolve_all(&job.materials.layers)?;
    let superstrate = library.resolve(&job.materials.superstrate)?;
    let substrate = library.resolve(&job.materials.substrate)?;

    let solver: Arc<dyn TmmSolver> = Arc::new(TransferMatrixSolver::new());
    let fourth_block = if job.optics.duplicate_tp_column {
        FourthBlock::DuplicateTp
    } else {
        FourthBlock::Ts
    };
    let evaluator = ResponseEvaluator::new(
        &materials,
        &superstrate,
        &substrate,
        job.optics.wavelengths.grid_m(),
        job.optics.angles_deg.clone(),
        job.structure.num_layers,
        solver,
    )
    .context("Failed to tabulate material indices on the wavelength grid")?
    .with_fourth_block(fourth_block);

    let [lo, hi] = job.structure.thickness_nm;
    let sampler = StructureSampler::new(
        materials.len(),
        job.structure.num_layers,
        ThicknessBounds::new(lo * 1e-9, hi * 1e-9),
    )?;

    let batch = BatchOrchestrator::new(sampler, evaluator, job.seed)?
        .with_chunk_size(job.run.chunk_size)
        .with_progress(job.run.progress);
    Ok(batch)
}

/// Describe the first structure of the run.
pub fn preview(batch: &BatchOrchestrator, library: &MaterialLibrary, job: &JobConfig) -> Result<String> {
    let materials = library.resolve_all(&job.materials.layers)?;
    let mut rng = filmgen_core::rng::task_rng(batch.seed(), 0);
    let choices = batch.sampler().sample(&mut rng);
    let stack = ThinFilmStack::from_choices(&choices, &materials)
        .context("Sampler produced a material index outside the candidate list")?;
    Ok(stack.describe())
}

fn manifest(job: &JobConfig, batch: &BatchOrchestrator, sample_count: u64) -> DatasetManifest {
    let [lo, hi] = job.structure.thickness_nm;
    DatasetManifest {
        comments: job.output.comments.clone(),
        materials: job.materials.layers.clone(),
        superstrate: job.materials.superstrate.clone(),
        substrate: job.materials.substrate.clone(),
        thickness_bounds: ThicknessBounds::new(lo * 1e-9, hi * 1e-9),
        angles_deg: job.optics.angles_deg.clone(),
        wavelengths_m: batch.evaluator().wavelengths().to_vec(),
        seed: job.seed,
        sample_count,
        solver: batch.evaluator().solver().method_name().to_string(),
        layout: batch.layout(),
    }
}

fn create_backend(threads: usize) -> Result<Box<dyn ComputeBackend>> {
    let backend = CpuBackend::with_threads(threads)?;
    println!("Backend: {}", backend.device_info().name);
    Ok(Box::new(backend))
}

/// Run a full generation job from a parsed configuration.
///
/// With `append`, an existing dataset is reopened and extended with the next
/// `samples` task indices.
pub fn run_generation(job: &JobConfig, out_dir: &Path, append: bool) -> Result<GenerationOutput> {
    let library = build_library(job.materials.library_dir.as_deref())?;
    let batch = build_orchestrator(job, &library)?;
    let layout = batch.layout();
    println!(
        "Materials: {} | layers: {} | angles: {} | wavelengths: {} | record width: {}",
        job.materials.layers.join(","),
        layout.num_layers,
        layout.num_angles,
        layout.num_wavelengths,
        layout.width()
    );
    println!("First structure: {}", preview(&batch, &library, job)?);

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let dataset = out_dir.join(format!("{}.npy", job.dataset_stem()));

    let mut writer = if append && dataset.exists() {
        let writer = DatasetWriter::reopen(&dataset)
            .with_context(|| format!("Failed to reopen {}", dataset.display()))?;
        if writer.width() != layout.width() {
            bail!(
                "{} has {} columns but this job produces {}",
                dataset.display(),
                writer.width(),
                layout.width()
            );
        }
        println!("Appending to {} ({} rows)", dataset.display(), writer.rows());
        writer
    } else {
        if append {
            warn!("--append given but {} does not exist, creating it", dataset.display());
        }
        DatasetWriter::create(&dataset, layout.width())
            .with_context(|| format!("Failed to create {}", dataset.display()))?
    };

    let backend = create_backend(job.run.threads)?;
    // On failure the writer is dropped here and finalizes what was written
    let summary = batch
        .run_into(job.run.samples, backend.as_ref(), &mut writer)
        .context("Generation failed")?;
    let total_rows = writer.close().context("Failed to finalize dataset")?;
    info!("{} now holds {} rows", dataset.display(), total_rows);
    println!("Dataset written to: {}", dataset.display());

    let manifest = manifest(job, &batch, total_rows);
    let comments = comments_path(&dataset);
    manifest
        .write(&comments)
        .with_context(|| format!("Failed to write {}", comments.display()))?;
    println!("Manifest written to: {}", comments.display());

    let json = if job.output.save_json {
        let path = json_path(&dataset);
        manifest
            .write_json(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Manifest (JSON) written to: {}", path.display());
        Some(path)
    } else {
        None
    };

    Ok(GenerationOutput {
        dataset,
        comments,
        json,
        layout,
        summary,
    })
}

/// One listing line: name, model family and oscillator count for BB metals.
fn material_line(material: &Material) -> String {
    let oscillators = material
        .as_brendel_bormann()
        .and_then(|bb| bb.oscillator_count())
        .map(|n| format!(" ({} oscillators)", n))
        .unwrap_or_default();
    format!("{:<8} {}{}", material.name(), material.classification(), oscillators)
}

/// Print every material of the library with its model family.
pub fn list_materials(library: &MaterialLibrary) {
    println!("Available materials:");
    println!();
    for material in library.iter() {
        println!("  {}", material_line(material));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filmgen_core::DatasetReader;

    fn job(dir: &Path, extra: &str) -> JobConfig {
        let text = format!(
            r#"
            seed = 7
            [materials]
            layers = ["Ag", "Al2O3", "TiO2"]
            [structure]
            num_layers = 3
            [optics]
            wavelengths = {{ range = [450.0, 950.0], points = 6 }}
            [run]
            samples = 5
            threads = 2
            progress = false
            [output]
            directory = "{}"
            stem = "job"
            comments = "test run"
            {}
            "#,
            dir.display(),
            extra
        );
        let job: JobConfig = toml::from_str(&text).unwrap();
        crate::config::validate_config(&job).unwrap();
        job
    }

    #[test]
    fn test_generation_writes_dataset_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path(), "save_json = true");
        let out = run_generation(&job, dir.path(), false).unwrap();

        assert_eq!(out.summary.total_rows, 5);
        let reader = DatasetReader::open(&out.dataset).unwrap();
        assert_eq!(reader.shape(), (5, out.layout.width()));

        let text = std::fs::read_to_string(&out.comments).unwrap();
        assert!(text.starts_with("test run\n"));
        assert!(text.contains("Seed: 7"));
        assert!(text.contains("Samples: 5"));
        let json = DatasetManifest::read_json(out.json.unwrap()).unwrap();
        assert_eq!(json.sample_count, 5);
        assert_eq!(json.layout, out.layout);
    }

    #[test]
    fn test_append_extends_existing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path(), "");
        run_generation(&job, dir.path(), false).unwrap();
        let out = run_generation(&job, dir.path(), true).unwrap();
        assert_eq!(out.summary.first_index, 5);
        assert_eq!(DatasetReader::open(&out.dataset).unwrap().rows(), 10);
        let text = std::fs::read_to_string(&out.comments).unwrap();
        assert!(text.contains("Samples: 10"));
    }

    #[test]
    fn test_append_with_new_sample_count_extends_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = job(dir.path(), "");
        job.output.stem = None;
        let first = run_generation(&job, dir.path(), false).unwrap();

        job.run.samples = 3;
        let second = run_generation(&job, dir.path(), true).unwrap();
        assert_eq!(second.dataset, first.dataset);
        assert_eq!(second.summary.first_index, 5);
        assert_eq!(second.summary.total_rows, 8);
        assert_eq!(DatasetReader::open(&second.dataset).unwrap().rows(), 8);
    }

    #[test]
    fn test_material_line_counts_oscillators() {
        let library = build_library(None).unwrap();
        let silver = library.resolve("Ag").unwrap();
        assert!(material_line(&silver).ends_with("(6 oscillators)"));
        let glass = library.resolve("glass").unwrap();
        assert!(!material_line(&glass).contains("oscillators"));
    }

    #[test]
    fn test_unknown_material_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = job(dir.path(), "");
        job.materials.layers[1] = "Unobtainium".into();
        let library = build_library(None).unwrap();
        let err = build_orchestrator(&job, &library).unwrap_err();
        assert!(err.to_string().contains("Unobtainium"));
    }
}
