//! Integration tests for Brendel–Bormann material files.
//!
//! - Bit-identical save/load for every catalog metal
//! - Exclusive create without overwrite
//! - Incomplete materials are never written
//! - Loaded metals evaluate identically to the originals

use filmgen_materials::binary::{default_path, FILE_SUFFIX};
use filmgen_materials::library::brendel_bormann_catalog;
use filmgen_materials::{BrendelBormannMaterial, MaterialError, MaterialProvider};

#[test]
fn test_catalog_round_trips_bit_for_bit() {
    let dir = tempfile::tempdir().unwrap();
    for metal in brendel_bormann_catalog().unwrap() {
        let path = metal.save_to_directory(dir.path(), false).unwrap();
        assert!(path.to_string_lossy().ends_with(FILE_SUFFIX));

        let loaded = BrendelBormannMaterial::load(&path).unwrap();
        assert_eq!(loaded.name(), metal.name());
        assert_eq!(loaded, metal);

        let bits = |v: Option<&[f64]>| v.unwrap().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(loaded.f()), bits(metal.f()));
        assert_eq!(bits(loaded.s()), bits(metal.s()));
        assert_eq!(loaded.wp().to_bits(), metal.wp().to_bits());
    }
}

#[test]
fn test_save_without_overwrite_refuses_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let metal = brendel_bormann_catalog().unwrap().remove(0);
    let path = default_path(dir.path(), metal.name());

    metal.save(&path, false).unwrap();
    let err = metal.save(&path, false).unwrap_err();
    assert!(matches!(err, MaterialError::FileExists(_)));
    assert!(err.to_string().contains("without overwriting"));

    // Overwrite leaves a loadable file
    metal.save(&path, true).unwrap();
    assert_eq!(BrendelBormannMaterial::load(&path).unwrap(), metal);
}

#[test]
fn test_incomplete_material_is_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let partial = BrendelBormannMaterial::new(
        "partial",
        Some(vec![0.8, 0.1]),
        Some(vec![0.05, 0.2]),
        None,
        Some(vec![0.0, 1.0]),
        9.0,
    )
    .unwrap();
    let path = default_path(dir.path(), "partial");
    assert!(matches!(
        partial.save(&path, true),
        Err(MaterialError::Incomplete(_))
    ));
    assert!(!path.exists());
}

#[test]
fn test_loaded_metal_has_identical_optics() {
    let dir = tempfile::tempdir().unwrap();
    let wavelengths: Vec<f64> = (0..11).map(|i| (450.0 + 50.0 * i as f64) * 1e-9).collect();
    for metal in brendel_bormann_catalog().unwrap() {
        let path = metal.save_to_directory(dir.path(), true).unwrap();
        let loaded = BrendelBormannMaterial::load(&path).unwrap();
        assert_eq!(
            loaded.index_of_refraction(&wavelengths).unwrap(),
            metal.index_of_refraction(&wavelengths).unwrap()
        );
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BrendelBormannMaterial::load(dir.path().join("Zz_bb_metal")).unwrap_err();
    assert!(matches!(err, MaterialError::Io(_)));
}
