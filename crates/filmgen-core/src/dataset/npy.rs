//! Growable `.npy` (format 1.0) datasets.
//!
//! Rows are appended to the end of the file and never rewritten. The header
//! is written with a fixed reserved size so that its `shape` field can be
//! updated in place whenever the row count is published.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use ndarray::Array2;

use super::DatasetError;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
/// Preamble: magic, version, u16 header length.
const PREAMBLE_LEN: usize = 10;
/// Total bytes reserved for the header of newly created files.
pub const HEADER_LEN: usize = 128;
const F64_BYTES: u64 = 8;

fn header_dict(rows: u64, width: usize) -> String {
    format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({}, {}), }}",
        rows, width
    )
}

/// Encode a complete header of exactly `total_len` bytes.
fn encode_header(rows: u64, width: usize, total_len: usize) -> Result<Vec<u8>, DatasetError> {
    let dict = header_dict(rows, width);
    let dict_len = total_len - PREAMBLE_LEN;
    // dict + at least the terminating newline
    if dict.len() + 1 > dict_len || dict_len > u16::MAX as usize {
        return Err(DatasetError::HeaderOverflow { rows, width });
    }
    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(dict_len as u16).to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    out.resize(total_len - 1, b' ');
    out.push(b'\n');
    Ok(out)
}

/// Parsed header of an `.npy` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NpyHeader {
    pub rows: u64,
    pub width: usize,
    /// Offset of the first data byte.
    pub data_offset: usize,
}

fn header_error(path: &Path, message: impl Into<String>) -> DatasetError {
    DatasetError::Header {
        path: path.display().to_string(),
        message: message.into(),
    }
}

/// Read and validate the header at the start of `reader`.
fn read_header<R: Read>(reader: &mut R, path: &Path) -> Result<NpyHeader, DatasetError> {
    let mut preamble = [0u8; PREAMBLE_LEN];
    reader.read_exact(&mut preamble)?;
    if &preamble[..6] != MAGIC {
        return Err(header_error(path, "not an .npy file"));
    }
    if preamble[6] != 1 {
        return Err(header_error(
            path,
            format!("unsupported format version {}.{}", preamble[6], preamble[7]),
        ));
    }
    let dict_len = u16::from_le_bytes([preamble[8], preamble[9]]) as usize;
    let mut dict = vec![0u8; dict_len];
    reader.read_exact(&mut dict)?;
    let dict = std::str::from_utf8(&dict).map_err(|_| header_error(path, "header is not ASCII"))?;

    if !dict.contains("'descr': '<f8'") {
        return Err(header_error(path, "only little-endian f64 data is supported"));
    }
    if !dict.contains("'fortran_order': False") {
        return Err(header_error(path, "only C-ordered data is supported"));
    }
    let (rows, width) = parse_shape(dict).ok_or_else(|| header_error(path, "expected a 2-D shape"))?;
    Ok(NpyHeader {
        rows,
        width,
        data_offset: PREAMBLE_LEN + dict_len,
    })
}

fn parse_shape(dict: &str) -> Option<(u64, usize)> {
    let start = dict.find("'shape':")? + "'shape':".len();
    let rest = &dict[start..];
    let open = rest.find('(')?;
    let close = rest.find(')')?;
    let mut dims = rest[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let rows = dims.next()?.parse().ok()?;
    let width = dims.next()?.parse().ok()?;
    if dims.next().is_some() {
        return None;
    }
    Some((rows, width))
}

/// Append-only writer of a 2-D `f64` dataset.
///
/// Only a buffered file handle is held; rows go straight to disk. The header
/// row count is updated by [`flush`](Self::flush) and [`close`](Self::close).
/// A writer dropped without `close` finalizes best-effort.
#[derive(Debug)]
pub struct DatasetWriter {
    path: PathBuf,
    file: Option<BufWriter<File>>,
    width: usize,
    rows: u64,
    header_len: usize,
}

impl DatasetWriter {
    /// Create (or truncate) a dataset with `width` columns and no rows.
    pub fn create(path: impl AsRef<Path>, width: usize) -> Result<Self, DatasetError> {
        let path = path.as_ref().to_path_buf();
        if width == 0 {
            return Err(DatasetError::InvalidWidth);
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        let mut file = BufWriter::new(file);
        file.write_all(&encode_header(0, width, HEADER_LEN)?)?;
        file.flush()?;
        debug!("created dataset {} with {} columns", path.display(), width);
        Ok(Self {
            path,
            file: Some(file),
            width,
            rows: 0,
            header_len: HEADER_LEN,
        })
    }

    /// Reopen an existing dataset to continue appending.
    ///
    /// The row count is taken from the complete rows on disk. A trailing
    /// partial row left by an interrupted writer is discarded.
    pub fn reopen(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;
        let header = read_header(&mut file, &path)?;
        if header.width == 0 {
            return Err(DatasetError::InvalidWidth);
        }

        let data_bytes = file.metadata()?.len().saturating_sub(header.data_offset as u64);
        let row_bytes = header.width as u64 * F64_BYTES;
        let rows = data_bytes / row_bytes;
        if rows != header.rows {
            warn!(
                "{}: header records {} rows but {} complete rows are on disk",
                path.display(),
                header.rows,
                rows
            );
        }
        if data_bytes % row_bytes != 0 {
            warn!("{}: discarding trailing partial row", path.display());
            file.set_len(header.data_offset as u64 + rows * row_bytes)?;
        }
        file.seek(SeekFrom::End(0))?;

        let mut writer = Self {
            path,
            file: Some(BufWriter::new(file)),
            width: header.width,
            rows,
            header_len: header.data_offset,
        };
        writer.flush()?;
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows appended so far, published or not.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    fn handle(&mut self) -> Result<&mut BufWriter<File>, DatasetError> {
        self.file.as_mut().ok_or(DatasetError::Closed)
    }

    /// Append one row; the dataset grows by exactly one row.
    pub fn append(&mut self, row: &[f64]) -> Result<(), DatasetError> {
        if row.len() != self.width {
            return Err(DatasetError::WidthMismatch {
                expected: self.width,
                got: row.len(),
            });
        }
        let file = self.handle()?;
        for value in row {
            file.write_all(&value.to_le_bytes())?;
        }
        self.rows += 1;
        Ok(())
    }

    /// Append rows in order.
    pub fn append_all<I, R>(&mut self, rows: I) -> Result<(), DatasetError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[f64]>,
    {
        for row in rows {
            self.append(row.as_ref())?;
        }
        Ok(())
    }

    /// Write buffered rows and publish the row count in the header.
    pub fn flush(&mut self) -> Result<(), DatasetError> {
        let (rows, width, header_len) = (self.rows, self.width, self.header_len);
        let header = encode_header(rows, width, header_len)?;
        let file = self.handle()?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&header)?;
        file.seek(SeekFrom::End(0))?;
        file.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<u64, DatasetError> {
        self.flush()?;
        if let Some(file) = self.file.take() {
            let file = file.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }
        debug!("closed dataset {} with {} rows", self.path.display(), self.rows);
        Ok(self.rows)
    }

    /// Finalize the file and return the number of rows written.
    pub fn close(mut self) -> Result<u64, DatasetError> {
        self.finish()
    }
}

impl Drop for DatasetWriter {
    fn drop(&mut self) {
        if self.file.is_some() {
            if let Err(e) = self.finish() {
                warn!("failed to finalize dataset {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Sequential reader of a dataset written by [`DatasetWriter`] (or numpy).
#[derive(Debug)]
pub struct DatasetReader {
    path: PathBuf,
    file: BufReader<File>,
    header: NpyHeader,
}

impl DatasetReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref().to_path_buf();
        let mut file = BufReader::new(File::open(&path)?);
        let header = read_header(&mut file, &path)?;
        let expected = header.data_offset as u64 + header.rows * header.width as u64 * F64_BYTES;
        if file.get_ref().metadata()?.len() < expected {
            return Err(header_error(&path, "file is shorter than its header claims"));
        }
        Ok(Self { path, file, header })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> u64 {
        self.header.rows
    }

    pub fn width(&self) -> usize {
        self.header.width
    }

    pub fn shape(&self) -> (u64, usize) {
        (self.header.rows, self.header.width)
    }

    /// Read row `index`.
    pub fn row(&mut self, index: u64) -> Result<Vec<f64>, DatasetError> {
        if index >= self.header.rows {
            return Err(DatasetError::RowOutOfRange {
                index,
                rows: self.header.rows,
            });
        }
        let offset =
            self.header.data_offset as u64 + index * self.header.width as u64 * F64_BYTES;
        self.file.seek(SeekFrom::Start(offset))?;
        self.read_row()
    }

    fn read_row(&mut self) -> Result<Vec<f64>, DatasetError> {
        let mut buf = vec![0u8; self.header.width * F64_BYTES as usize];
        self.file.read_exact(&mut buf)?;
        Ok(buf
            .chunks_exact(F64_BYTES as usize)
            .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
            .collect())
    }

    /// Load the whole dataset into memory.
    pub fn read_all(&mut self) -> Result<Array2<f64>, DatasetError> {
        let (rows, width) = (self.header.rows as usize, self.header.width);
        self.file
            .seek(SeekFrom::Start(self.header.data_offset as u64))?;
        let mut data = Vec::with_capacity(rows * width);
        for _ in 0..rows {
            data.extend(self.read_row()?);
        }
        Array2::from_shape_vec((rows, width), data)
            .map_err(|e| header_error(&self.path, e.to_string()))
    }
}
