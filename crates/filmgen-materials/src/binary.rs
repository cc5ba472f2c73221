//! Binary persistence of Brendel–Bormann materials.
//!
//! One file per material, all fields little-endian and fixed width:
//!
//! ```text
//! u32            name length in bytes (L)
//! u32            oscillator count (N)
//! [u8; L]        UTF-8 name
//! [f64; 4N + 1]  f[0..N], g[0..N], w[0..N], s[0..N], wp
//! ```
//!
//! Files are conventionally named `<name>_bb_metal` and grouped in a
//! directory per family (`resources/materials/bb_metals`).

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::brendel_bormann::{BrendelBormannMaterial, BrendelBormannParameters};
use crate::provider::MaterialError;

/// Suffix appended to the material name to form its file name.
pub const FILE_SUFFIX: &str = "_bb_metal";

/// Default directory for the Brendel–Bormann family.
pub const DEFAULT_DIRECTORY: &str = "resources/materials/bb_metals";

/// Default file location of `name` inside `directory`.
pub fn default_path(directory: &Path, name: &str) -> PathBuf {
    directory.join(format!("{}{}", name, FILE_SUFFIX))
}

/// Serialise a complete material into its binary record.
pub fn encode(material: &BrendelBormannMaterial) -> Result<Vec<u8>, MaterialError> {
    let params = material.parameters()?;
    let name = material.name().as_bytes();
    let n = params.f.len();

    let mut bytes = Vec::with_capacity(8 + name.len() + 8 * (4 * n + 1));
    bytes.extend_from_slice(&header_u32(name.len(), material.name())?.to_le_bytes());
    bytes.extend_from_slice(&header_u32(n, material.name())?.to_le_bytes());
    bytes.extend_from_slice(name);
    for value in params
        .f
        .iter()
        .chain(&params.g)
        .chain(&params.w)
        .chain(&params.s)
        .chain(std::iter::once(&params.wp))
    {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    Ok(bytes)
}

fn header_u32(value: usize, name: &str) -> Result<u32, MaterialError> {
    u32::try_from(value).map_err(|_| {
        MaterialError::DataError(format!("'{}' is too large for the material file header", name))
    })
}

/// Parse a binary record. `path` is used for the name fallback and messages.
pub fn decode(bytes: &[u8], path: &Path) -> Result<BrendelBormannMaterial, MaterialError> {
    let display = path.display().to_string();
    let format_error = |message: String| MaterialError::Format {
        path: display.clone(),
        message,
    };

    if bytes.len() < 8 {
        return Err(format_error(format!(
            "header needs 8 bytes, file has {}",
            bytes.len()
        )));
    }
    let name_len = read_u32(&bytes[0..4]) as usize;
    let n = read_u32(&bytes[4..8]) as usize;
    let name_end = 8 + name_len;
    let expected = name_end + 8 * (4 * n + 1);
    if bytes.len() != expected {
        return Err(format_error(format!(
            "expected {} bytes for {} oscillators, file has {}",
            expected,
            n,
            bytes.len()
        )));
    }

    let name = match std::str::from_utf8(&bytes[8..name_end]) {
        Ok(name) if !name.is_empty() => name.to_string(),
        _ => name_from_path(path)?,
    };

    let mut values = bytes[name_end..expected]
        .chunks_exact(8)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            f64::from_le_bytes(raw)
        })
        .collect::<Vec<f64>>();

    let wp = values.pop().unwrap_or_default();
    let s = values.split_off(3 * n);
    let w = values.split_off(2 * n);
    let g = values.split_off(n);
    let f = values;

    BrendelBormannMaterial::from_parameters(name, BrendelBormannParameters { f, g, w, s, wp })
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    u32::from_le_bytes(raw)
}

/// Recover a material name from a `<name>_bb_metal` file name.
fn name_from_path(path: &Path) -> Result<String, MaterialError> {
    path.file_name()
        .and_then(|f| f.to_str())
        .and_then(|f| f.strip_suffix(FILE_SUFFIX))
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| MaterialError::NameUnspecified(path.display().to_string()))
}

impl BrendelBormannMaterial {
    /// Write this material to `path`.
    ///
    /// Without `overwrite` the file is created exclusively and an occupied
    /// path fails with [`MaterialError::FileExists`].
    pub fn save(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<(), MaterialError> {
        let path = path.as_ref();
        let bytes = encode(self)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut options = OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let mut file = options.open(path).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => MaterialError::FileExists(path.display().to_string()),
            _ => MaterialError::Io(e),
        })?;
        file.write_all(&bytes)?;
        file.sync_all()?;

        debug!("saved '{}' ({} bytes) to {}", self.name(), bytes.len(), path.display());
        Ok(())
    }

    /// Save under the default file name inside `directory`, returning the path.
    pub fn save_to_directory(
        &self,
        directory: impl AsRef<Path>,
        overwrite: bool,
    ) -> Result<PathBuf, MaterialError> {
        let path = default_path(directory.as_ref(), self.name());
        self.save(&path, overwrite)?;
        Ok(path)
    }

    /// Read a material written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MaterialError> {
        let path = path.as_ref();
        let mut bytes = Vec::new();
        File::open(path)?.read_to_end(&mut bytes)?;
        decode(&bytes, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn copper() -> BrendelBormannMaterial {
        BrendelBormannMaterial::from_parameters(
            "Cu",
            BrendelBormannParameters {
                f: vec![0.562, 0.076, 0.081, 0.324, 0.726],
                g: vec![0.030, 0.056, 0.047, 0.113, 0.172],
                w: vec![0.0, 0.416, 2.849, 4.819, 8.136],
                s: vec![0.0, 0.562, 0.469, 1.131, 1.719],
                wp: 10.83,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_record_layout() {
        let bytes = encode(&copper()).unwrap();
        assert_eq!(bytes.len(), 8 + 2 + 8 * 21);
        assert_eq!(&bytes[0..4], &2u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &5u32.to_le_bytes());
        assert_eq!(&bytes[8..10], b"Cu");
        assert_eq!(&bytes[10..18], &0.562f64.to_le_bytes());
        assert_eq!(&bytes[bytes.len() - 8..], &10.83f64.to_le_bytes());
    }

    #[test]
    fn test_decode_inverts_encode() {
        let cu = copper();
        let bytes = encode(&cu).unwrap();
        let back = decode(&bytes, Path::new("Cu_bb_metal")).unwrap();
        assert_eq!(back, cu);
    }

    #[test]
    fn test_empty_name_falls_back_to_file_name() {
        let mut bytes = encode(&copper()).unwrap();
        // Replace the name with an invalid UTF-8 sequence of the same length
        bytes[8] = 0xff;
        bytes[9] = 0xfe;
        let back = decode(&bytes, Path::new("/tmp/Brass_bb_metal")).unwrap();
        assert_eq!(back.name(), "Brass");
    }

    #[test]
    fn test_unreadable_name_without_suffix_fails() {
        let mut bytes = encode(&copper()).unwrap();
        bytes[8] = 0xff;
        let err = decode(&bytes, Path::new("/tmp/copper.bin"));
        assert!(matches!(err, Err(MaterialError::NameUnspecified(_))));
    }

    #[test]
    fn test_truncated_record_fails() {
        let bytes = encode(&copper()).unwrap();
        let err = decode(&bytes[..bytes.len() - 1], Path::new("Cu_bb_metal"));
        assert!(matches!(err, Err(MaterialError::Format { .. })));
    }

    #[test]
    fn test_trailing_bytes_fail() {
        let mut bytes = encode(&copper()).unwrap();
        bytes.extend_from_slice(&1.0f64.to_le_bytes());
        let err = decode(&bytes, Path::new("Cu_bb_metal"));
        assert!(matches!(err, Err(MaterialError::Format { .. })));
    }

    #[test]
    fn test_incomplete_material_cannot_be_encoded() {
        let m = BrendelBormannMaterial::new("x", Some(vec![1.0]), None, None, None, 1.0).unwrap();
        assert!(matches!(encode(&m), Err(MaterialError::Incomplete(_))));
    }
}
