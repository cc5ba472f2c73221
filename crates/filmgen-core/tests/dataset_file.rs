//! Dataset file behaviour: growth, prefix stability, finalization and
//! recovery.

use std::fs::OpenOptions;
use std::io::Write;

use filmgen_core::dataset::npy::HEADER_LEN;
use filmgen_core::{DatasetError, DatasetReader, DatasetWriter};

fn row(i: usize, width: usize) -> Vec<f64> {
    (0..width).map(|j| (i * 100 + j) as f64 + 0.5).collect()
}

#[test]
fn test_row_count_tracks_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.npy");
    let mut writer = DatasetWriter::create(&path, 4).unwrap();
    for i in 0..25 {
        writer.append(&row(i, 4)).unwrap();
    }
    writer.flush().unwrap();
    assert_eq!(DatasetReader::open(&path).unwrap().rows(), 25);
    assert_eq!(writer.close().unwrap(), 25);

    let len = std::fs::metadata(&path).unwrap().len();
    assert_eq!(len, (HEADER_LEN + 25 * 4 * 8) as u64);

    let mut reader = DatasetReader::open(&path).unwrap();
    assert_eq!(reader.shape(), (25, 4));
    assert_eq!(reader.row(7).unwrap(), row(7, 4));
    assert!(matches!(
        reader.row(25),
        Err(DatasetError::RowOutOfRange { index: 25, rows: 25 })
    ));
}

#[test]
fn test_appends_never_touch_earlier_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefix.npy");
    let mut writer = DatasetWriter::create(&path, 3).unwrap();
    for i in 0..5 {
        writer.append(&row(i, 3)).unwrap();
    }
    writer.flush().unwrap();
    let before = std::fs::read(&path).unwrap();

    for i in 5..9 {
        writer.append(&row(i, 3)).unwrap();
    }
    writer.close().unwrap();
    let after = std::fs::read(&path).unwrap();

    assert_eq!(after[HEADER_LEN..before.len()], before[HEADER_LEN..]);
    assert_eq!(after.len(), HEADER_LEN + 9 * 3 * 8);
}

#[test]
fn test_drop_without_close_finalizes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dropped.npy");
    {
        let mut writer = DatasetWriter::create(&path, 2).unwrap();
        writer.append(&[1.0, 2.0]).unwrap();
        writer.append(&[3.0, 4.0]).unwrap();
    }
    let mut reader = DatasetReader::open(&path).unwrap();
    assert_eq!(reader.shape(), (2, 2));
    assert_eq!(reader.row(1).unwrap(), vec![3.0, 4.0]);
}

#[test]
fn test_reopen_discards_partial_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.npy");
    let mut writer = DatasetWriter::create(&path, 2).unwrap();
    writer.append(&[1.0, 2.0]).unwrap();
    writer.close().unwrap();

    // half a row from an interrupted writer
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&9.0f64.to_le_bytes()).unwrap();
    drop(file);

    let mut writer = DatasetWriter::reopen(&path).unwrap();
    assert_eq!(writer.rows(), 1);
    writer.append(&[5.0, 6.0]).unwrap();
    writer.close().unwrap();

    let data = DatasetReader::open(&path).unwrap().read_all().unwrap();
    assert_eq!(data.shape(), &[2, 2]);
    assert_eq!(data.row(1).to_vec(), vec![5.0, 6.0]);
}

#[test]
fn test_create_fails_in_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no/such/dir/data.npy");
    assert!(matches!(
        DatasetWriter::create(&path, 3),
        Err(DatasetError::Io(_))
    ));
}
