//! Write the Brendel–Bormann catalog to disk and verify it round-trips.
//!
//! Verification compares five field groups (`f`, `g`, `w`, `s`, `wp`) of each
//! freshly loaded file against the in-memory catalog entry of the same name.
//! Mismatches are reported, never raised.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::binary::FILE_SUFFIX;
use crate::brendel_bormann::BrendelBormannMaterial;
use crate::library::brendel_bormann_catalog;
use crate::provider::MaterialError;

/// Field groups checked per material, in report order.
pub const FIELD_GROUPS: [&str; 5] = ["f", "g", "w", "s", "wp"];

/// Round-trip verification of one material file.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub name: String,
    pub path: PathBuf,
    /// Pass flag per entry of [`FIELD_GROUPS`].
    pub checks: [bool; 5],
}

impl VerificationReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|&c| c)
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, passed) in self.checks.iter().enumerate() {
            let verdict = if *passed { "passed" } else { "failed" };
            writeln!(
                f,
                "Check {} ({}) {} for {}",
                i + 1,
                FIELD_GROUPS[i],
                verdict,
                self.name
            )?;
        }
        Ok(())
    }
}

/// Compare two materials field group by field group, bit for bit.
pub fn verify(expected: &BrendelBormannMaterial, loaded: &BrendelBormannMaterial) -> [bool; 5] {
    fn same(a: Option<&[f64]>, b: Option<&[f64]>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            _ => false,
        }
    }

    [
        same(expected.f(), loaded.f()),
        same(expected.g(), loaded.g()),
        same(expected.w(), loaded.w()),
        same(expected.s(), loaded.s()),
        expected.wp().to_bits() == loaded.wp().to_bits(),
    ]
}

/// Save `materials` into `directory` (overwriting), reload every material
/// file found there and verify it against the entry of the same name.
///
/// Files whose name matches no saved material are skipped.
pub fn save_and_verify(
    materials: &[BrendelBormannMaterial],
    directory: impl AsRef<Path>,
) -> Result<Vec<VerificationReport>, MaterialError> {
    let directory = directory.as_ref();
    std::fs::create_dir_all(directory)?;

    for material in materials {
        let path = material.save_to_directory(directory, true)?;
        info!("wrote {} to {}", material.name(), path.display());
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(directory)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    paths.retain(|p| {
        p.is_file()
            && p.file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|f| f.ends_with(FILE_SUFFIX))
    });
    paths.sort();

    let mut reports = Vec::new();
    for path in paths {
        let loaded = BrendelBormannMaterial::load(&path)?;
        let Some(expected) = materials.iter().find(|m| m.name() == loaded.name()) else {
            continue;
        };
        let report = VerificationReport {
            name: loaded.name().to_string(),
            checks: verify(expected, &loaded),
            path,
        };
        if !report.all_passed() {
            warn!("round-trip mismatch for {} in {}", report.name, report.path.display());
        }
        reports.push(report);
    }
    Ok(reports)
}

/// Bootstrap the built-in catalog into `directory`.
pub fn bootstrap_catalog(
    directory: impl AsRef<Path>,
) -> Result<Vec<VerificationReport>, MaterialError> {
    save_and_verify(&brendel_bormann_catalog()?, directory)
}
