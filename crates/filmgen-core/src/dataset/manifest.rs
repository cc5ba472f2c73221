//! Plain-text description written next to every dataset.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::DatasetError;
use crate::types::{FourthBlock, RecordLayout, ThicknessBounds};

/// Everything needed to interpret the columns of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetManifest {
    /// Free-form comment line placed at the top of the text manifest.
    pub comments: String,
    /// Candidate materials in one-hot order.
    pub materials: Vec<String>,
    pub superstrate: String,
    pub substrate: String,
    pub thickness_bounds: ThicknessBounds,
    pub angles_deg: Vec<f64>,
    pub wavelengths_m: Vec<f64>,
    pub seed: u64,
    pub sample_count: u64,
    pub solver: String,
    pub layout: RecordLayout,
}

/// `<stem>_comments.txt` beside `dataset_path`.
pub fn comments_path(dataset_path: &Path) -> PathBuf {
    sibling(dataset_path, "_comments.txt")
}

/// `<stem>_manifest.json` beside `dataset_path`.
pub fn json_path(dataset_path: &Path) -> PathBuf {
    sibling(dataset_path, "_manifest.json")
}

fn sibling(dataset_path: &Path, suffix: &str) -> PathBuf {
    let stem = dataset_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dataset_path.with_file_name(format!("{}{}", stem, suffix))
}

fn join_numbers(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{}", v))
        .collect::<Vec<_>>()
        .join(",")
}

impl DatasetManifest {
    /// Render the text manifest.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.comments.is_empty() {
            let _ = writeln!(out, "{}", self.comments);
        }
        let _ = writeln!(out, "Materials: {}", self.materials.join(","));
        let _ = writeln!(out, "Superstrate: {}", self.superstrate);
        let _ = writeln!(out, "Substrate: {}", self.substrate);
        let _ = writeln!(out, "Layers: {}", self.layout.num_layers);
        let _ = writeln!(
            out,
            "Thickness range: {}-{} nm",
            self.thickness_bounds.lo * 1e9,
            self.thickness_bounds.hi * 1e9
        );
        let _ = writeln!(out, "Angles: {} deg", join_numbers(&self.angles_deg));
        match (self.wavelengths_m.first(), self.wavelengths_m.last()) {
            (Some(first), Some(last)) => {
                let _ = writeln!(
                    out,
                    "Wavelengths: {} points, {}-{} nm",
                    self.wavelengths_m.len(),
                    first * 1e9,
                    last * 1e9
                );
            }
            _ => {
                let _ = writeln!(out, "Wavelengths: none");
            }
        }
        let _ = writeln!(out, "Seed: {}", self.seed);
        let _ = writeln!(out, "Samples: {}", self.sample_count);
        let _ = writeln!(out, "Solver: {}", self.solver);
        let _ = writeln!(out, "Return {}", self.layout.semantics());
        let _ = writeln!(out, "Width: {}", self.layout.width());
        for (label, offset, len) in self.layout.blocks() {
            let _ = writeln!(out, "  {:<6} columns {}..{}", label, offset, offset + len);
        }
        if self.layout.fourth_block == FourthBlock::DuplicateTp {
            let _ = writeln!(out, "Note: the fourth response block repeats Tp; Ts is not stored");
        }
        out
    }

    /// Write the text manifest to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        std::fs::write(path, self.render())?;
        Ok(())
    }

    /// Write the manifest as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> DatasetManifest {
        DatasetManifest {
            comments: "Materials: Ag,Al2O3,TiO2. trange 1-60nm".into(),
            materials: vec!["Ag".into(), "Al2O3".into(), "TiO2".into()],
            superstrate: "vacuum".into(),
            substrate: "glass".into(),
            thickness_bounds: ThicknessBounds::new(1e-9, 60e-9),
            angles_deg: vec![25.0, 45.0, 65.0],
            wavelengths_m: vec![450e-9, 700e-9, 950e-9],
            seed: 35447,
            sample_count: 10,
            solver: "Coherent transfer matrix".into(),
            layout: RecordLayout {
                num_angles: 3,
                num_layers: 3,
                num_materials: 3,
                num_wavelengths: 3,
                fourth_block: FourthBlock::DuplicateTp,
            },
        }
    }

    #[test]
    fn test_sibling_paths() {
        let p = Path::new("/data/run_3lay.npy");
        assert_eq!(comments_path(p), Path::new("/data/run_3lay_comments.txt"));
        assert_eq!(json_path(p), Path::new("/data/run_3lay_manifest.json"));
    }

    #[test]
    fn test_render_lists_run_parameters() {
        let text = manifest().render();
        assert!(text.starts_with("Materials: Ag,Al2O3,TiO2. trange 1-60nm\n"));
        assert!(text.contains("Materials: Ag,Al2O3,TiO2\n"));
        assert!(text.contains("Layers: 3\n"));
        assert!(text.contains("Angles: 25,45,65 deg\n"));
        assert!(text.contains("Wavelengths: 3 points"));
        assert!(text.contains("Seed: 35447\n"));
        assert!(text.contains("Return [ang,mats,l,Rp,Rs,Tp,Tp,psi,delta]\n"));
        assert!(text.contains("repeats Tp"));
    }

    #[test]
    fn test_json_sidecar_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        let m = manifest();
        m.write_json(&path).unwrap();
        assert_eq!(DatasetManifest::read_json(&path).unwrap(), m);
    }
}
