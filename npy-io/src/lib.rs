//! NPY I/O - Archives, tabular export and file-level APIs
//!
//! This crate provides the I/O layer on top of the array codec:
//!
//! - `.npz` archive reading and writing ([`read_npz`], [`write_npz`])
//! - Tabular projection of arrays to CSV ([`project`], [`write_table`])
//! - Path-level helpers for `.npy`, `.npz` and CSV files

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod container;
pub mod table;

// Re-export commonly used types
pub use container::{logical_name, member_name, read_npz, write_npz, Container};
pub use npy_codec::{AnyArray, Array, Element, ElementType, Layout};
pub use npy_format::{Limits, NpyError, Result};
pub use table::{project, project_any, write_table, Rows};

use npy_format::constants::{NPY_EXTENSION, NPZ_EXTENSION};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// Storage method for archive members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Members stored uncompressed
    #[default]
    Stored,
    /// Members deflated with the given level (1-9)
    Deflated(u8),
}

impl Compression {
    /// Zip compression method for this setting
    pub fn method(&self) -> CompressionMethod {
        match self {
            Compression::Stored => CompressionMethod::Stored,
            Compression::Deflated(_) => CompressionMethod::Deflated,
        }
    }

    /// Compression level for this setting
    pub fn level(&self) -> Option<i64> {
        match self {
            Compression::Stored => None,
            Compression::Deflated(level) => Some(i64::from(*level)),
        }
    }

    /// Check if this setting can be written
    pub fn is_supported(&self) -> bool {
        match self {
            Compression::Stored => true,
            Compression::Deflated(level) => (1..=9).contains(level),
        }
    }

    pub(crate) fn file_options(&self) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(self.method())
            .compression_level(self.level())
    }
}

/// Options for reading arrays and archives
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Limits applied to every decoded header
    pub limits: Limits,
}

/// Options for writing archives
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Storage method for archive members
    pub compression: Compression,
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map_or(false, |ext| ext == extension.trim_start_matches('.'))
}

fn require_extension(path: &Path, extension: &'static str) -> Result<()> {
    if has_extension(path, extension) {
        Ok(())
    } else {
        Err(NpyError::InvalidExtension {
            expected: extension,
            path: path.display().to_string(),
        })
    }
}

fn with_extension(path: &Path, extension: &str) -> PathBuf {
    if has_extension(path, extension) {
        return path.to_path_buf();
    }
    let mut raw = OsString::from(path.as_os_str());
    raw.push(extension);
    PathBuf::from(raw)
}

/// Read a `.npy` file as an array of `T`.
pub fn read_npy_file<T: Element>(path: impl AsRef<Path>, opts: &ReadOptions) -> Result<Array<T>> {
    let path = path.as_ref();
    require_extension(path, NPY_EXTENSION)?;

    let mut reader = BufReader::new(File::open(path)?);
    npy_codec::read_array(&mut reader, &opts.limits)
}

/// Read a `.npy` file whose element type is resolved from its header.
pub fn read_npy_file_any(path: impl AsRef<Path>, opts: &ReadOptions) -> Result<AnyArray> {
    let path = path.as_ref();
    require_extension(path, NPY_EXTENSION)?;

    let mut reader = BufReader::new(File::open(path)?);
    npy_codec::read_any(&mut reader, &opts.limits)
}

/// Write an array to a `.npy` file, appending the extension when missing.
///
/// Returns the path actually written.
pub fn write_npy_file<T: Element>(path: impl AsRef<Path>, array: &Array<T>) -> Result<PathBuf> {
    array.validate()?;
    let path = with_extension(path.as_ref(), NPY_EXTENSION);

    let mut writer = BufWriter::new(File::create(&path)?);
    npy_codec::write_array(&mut writer, array)?;
    writer.flush()?;
    Ok(path)
}

/// Read every array of a `.npz` file.
pub fn read_npz_file(path: impl AsRef<Path>, opts: &ReadOptions) -> Result<Container> {
    let path = path.as_ref();
    require_extension(path, NPZ_EXTENSION)?;

    let reader = BufReader::new(File::open(path)?);
    read_npz(reader, opts)
}

/// Write a container to a `.npz` file, appending the extension when missing.
///
/// The container is checked before the file is created. Returns the path
/// actually written.
pub fn write_npz_file(
    path: impl AsRef<Path>,
    container: &Container,
    opts: &WriteOptions,
) -> Result<PathBuf> {
    container::check_writable(container, opts)?;
    let path = with_extension(path.as_ref(), NPZ_EXTENSION);

    let writer = BufWriter::new(File::create(&path)?);
    let mut writer = write_npz(writer, container, opts)?;
    writer.flush()?;
    Ok(path)
}

/// Project one array and write it as a CSV file.
///
/// The projection runs before the file is created, so an unsupported shape
/// leaves nothing behind.
pub fn array_to_csv_file(array: &AnyArray, path: impl AsRef<Path>) -> Result<()> {
    let rows = project_any(array)?;
    let writer = BufWriter::new(File::create(path.as_ref())?);
    write_table(writer, &rows)
}

/// Export every array of a `.npz` file to `<out_dir>/<name>.csv`.
///
/// Creates `out_dir`, and any subdirectory named by an archive member, when
/// missing. Returns the files written in name order.
pub fn npz_to_csv_dir(
    npz_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    opts: &ReadOptions,
) -> Result<Vec<PathBuf>> {
    let container = read_npz_file(npz_path, opts)?;
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(container.len());
    for (name, array) in container.iter() {
        let csv_path = out_dir.join(format!("{}.csv", name));
        debug!(array = %name, path = %csv_path.display(), "exporting array to csv");
        // Member names may carry archive directories (`sub/a`).
        if let Some(parent) = csv_path.parent() {
            fs::create_dir_all(parent).map_err(|err| NpyError::Io(err).in_member(name))?;
        }
        array_to_csv_file(array, &csv_path).map_err(|err| err.in_member(name))?;
        written.push(csv_path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_support() {
        assert!(Compression::Stored.is_supported());
        assert!(Compression::Deflated(9).is_supported());
        assert!(Compression::Deflated(1).is_supported());
        assert!(!Compression::Deflated(0).is_supported());
        assert!(!Compression::Deflated(10).is_supported());
    }

    #[test]
    fn test_compression_mapping() {
        assert_eq!(Compression::Stored.method(), CompressionMethod::Stored);
        assert_eq!(Compression::Stored.level(), None);
        assert_eq!(Compression::Deflated(6).method(), CompressionMethod::Deflated);
        assert_eq!(Compression::Deflated(6).level(), Some(6));
        assert_eq!(Compression::default(), Compression::Stored);
    }

    #[test]
    fn test_extension_helpers() {
        assert!(has_extension(Path::new("a/b.npy"), NPY_EXTENSION));
        assert!(!has_extension(Path::new("a/b.npz"), NPY_EXTENSION));
        assert!(!has_extension(Path::new("a/npy"), NPY_EXTENSION));

        assert_eq!(with_extension(Path::new("out"), NPY_EXTENSION), PathBuf::from("out.npy"));
        assert_eq!(
            with_extension(Path::new("out.npz"), NPZ_EXTENSION),
            PathBuf::from("out.npz")
        );
        assert_eq!(
            with_extension(Path::new("out.v1"), NPZ_EXTENSION),
            PathBuf::from("out.v1.npz")
        );
    }

    #[test]
    fn test_require_extension_message() {
        match require_extension(Path::new("data.txt"), NPY_EXTENSION) {
            Err(NpyError::InvalidExtension { expected, path }) => {
                assert_eq!(expected, ".npy");
                assert_eq!(path, "data.txt");
            }
            other => panic!("expected InvalidExtension, got {other:?}"),
        }
    }
}
