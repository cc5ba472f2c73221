//! TOML configuration deserialisation for generation jobs.

use std::collections::HashSet;

use anyhow::{bail, Context};
use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    /// Master seed; every sample's generator is derived from it.
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub materials: MaterialsConfig,
    #[serde(default)]
    pub structure: StructureConfig,
    #[serde(default)]
    pub optics: OpticsConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_seed() -> u64 {
    35447
}

/// Candidate layer materials and the semi-infinite media.
#[derive(Debug, Deserialize)]
pub struct MaterialsConfig {
    /// Candidate layer materials, in one-hot order.
    pub layers: Vec<String>,
    #[serde(default = "default_superstrate")]
    pub superstrate: String,
    #[serde(default = "default_substrate")]
    pub substrate: String,
    /// Directory of `*_bb_metal` files overriding the built-in fits.
    #[serde(default)]
    pub library_dir: Option<String>,
}

fn default_superstrate() -> String {
    "vacuum".into()
}
fn default_substrate() -> String {
    "glass".into()
}

#[derive(Debug, Deserialize)]
pub struct StructureConfig {
    #[serde(default = "default_num_layers")]
    pub num_layers: usize,
    /// `[min, max)` layer thickness in nm.
    #[serde(default = "default_thickness_nm")]
    pub thickness_nm: [f64; 2],
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            num_layers: default_num_layers(),
            thickness_nm: default_thickness_nm(),
        }
    }
}

fn default_num_layers() -> usize {
    5
}
fn default_thickness_nm() -> [f64; 2] {
    [1.0, 60.0]
}

/// Wavelength specification in nm: either a range or explicit list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WavelengthSpec {
    Range { range: [f64; 2], points: usize },
    List { values: Vec<f64> },
}

impl WavelengthSpec {
    /// Grid in nm.
    pub fn grid_nm(&self) -> Vec<f64> {
        match self {
            WavelengthSpec::Range { range, points } => {
                let (start, end) = (range[0], range[1]);
                (0..*points)
                    .map(|i| start + (end - start) * i as f64 / (*points - 1).max(1) as f64)
                    .collect()
            }
            WavelengthSpec::List { values } => values.clone(),
        }
    }

    /// Grid in metres.
    pub fn grid_m(&self) -> Vec<f64> {
        self.grid_nm().into_iter().map(|nm| nm / 1e9).collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct OpticsConfig {
    #[serde(default = "default_wavelengths")]
    pub wavelengths: WavelengthSpec,
    /// Angles of incidence from the normal, degrees.
    #[serde(default = "default_angles")]
    pub angles_deg: Vec<f64>,
    /// Store Tp in the fourth response block instead of Ts.
    #[serde(default = "default_true")]
    pub duplicate_tp_column: bool,
}

impl Default for OpticsConfig {
    fn default() -> Self {
        Self {
            wavelengths: default_wavelengths(),
            angles_deg: default_angles(),
            duplicate_tp_column: true,
        }
    }
}

fn default_wavelengths() -> WavelengthSpec {
    WavelengthSpec::Range {
        range: [450.0, 950.0],
        points: 200,
    }
}
fn default_angles() -> Vec<f64> {
    vec![25.0, 45.0, 65.0]
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Worker threads; 0 uses every available core.
    #[serde(default)]
    pub threads: usize,
    /// Samples per streamed chunk; unset generates the whole batch at once.
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default = "default_true")]
    pub progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            threads: 0,
            chunk_size: None,
            progress: true,
        }
    }
}

fn default_samples() -> usize {
    1000
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Dataset file stem; derived from the run parameters when unset.
    #[serde(default)]
    pub stem: Option<String>,
    /// Free-form first line of the manifest.
    #[serde(default)]
    pub comments: String,
    /// Also write the manifest as JSON.
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            stem: None,
            comments: String::new(),
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}

impl JobConfig {
    /// Dataset file stem, e.g. `filmgen_5lay5mat`.
    ///
    /// Independent of the sample count so appending runs find the same file.
    pub fn dataset_stem(&self) -> String {
        self.output.stem.clone().unwrap_or_else(|| {
            format!(
                "filmgen_{}lay{}mat",
                self.structure.num_layers,
                self.materials.layers.len()
            )
        })
    }
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: JobConfig =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Cross-field checks that serde cannot express.
pub fn validate_config(job: &JobConfig) -> anyhow::Result<()> {
    let layers = &job.materials.layers;
    if layers.is_empty() {
        bail!("[materials] layers must name at least one material");
    }
    let mut seen = HashSet::new();
    for name in layers {
        if !seen.insert(name.as_str()) {
            bail!("[materials] layers lists '{}' more than once", name);
        }
    }

    let structure = &job.structure;
    if structure.num_layers == 0 {
        bail!("[structure] num_layers must be at least 1");
    }
    if structure.num_layers >= 2 && layers.len() < 2 {
        bail!(
            "[structure] {} layers need at least 2 candidate materials so adjacent layers differ",
            structure.num_layers
        );
    }
    let [lo, hi] = structure.thickness_nm;
    if !(lo > 0.0 && lo < hi && hi.is_finite()) {
        bail!("[structure] thickness_nm must satisfy 0 < min < max, got [{}, {}]", lo, hi);
    }

    let grid = job.optics.wavelengths.grid_nm();
    if grid.is_empty() {
        bail!("[optics] wavelength grid is empty");
    }
    if let Some(bad) = grid.iter().find(|&&w| !(w > 0.0 && w.is_finite())) {
        bail!("[optics] wavelengths must be positive, got {}", bad);
    }
    if job.optics.angles_deg.is_empty() {
        bail!("[optics] angles_deg must list at least one angle");
    }
    if let Some(bad) = job.optics.angles_deg.iter().find(|a| !(0.0..90.0).contains(*a)) {
        bail!("[optics] angles must lie in [0, 90) degrees, got {}", bad);
    }

    if job.run.samples == 0 {
        bail!("[run] samples must be at least 1");
    }
    if job.run.chunk_size == Some(0) {
        bail!("[run] chunk_size must be at least 1 when set");
    }
    Ok(())
}
