//! Named multi-array archives (`.npz`)
//!
//! Each entry is stored as an independent `.npy` member of a zip archive.
//! Because the archive records no element types, decoding a member runs in
//! two passes: the member is opened once to discover its dtype from the
//! header, then reopened and decoded through the matching typed reader.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Seek, Write};

use npy_codec::{codec_for, peek_header, AnyArray, Array, Element};
use npy_format::constants::NPY_EXTENSION;
use npy_format::{NpyError, Result};
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::{ZipArchive, ZipWriter};

use crate::{ReadOptions, WriteOptions};

/// Collection of arrays keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    entries: BTreeMap<String, AnyArray>,
}

impl Container {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an array, returning the entry it replaced.
    pub fn insert(&mut self, name: impl Into<String>, array: impl Into<AnyArray>) -> Option<AnyArray> {
        self.entries.insert(name.into(), array.into())
    }

    /// Insert a typed array, returning the entry it replaced.
    pub fn insert_array<T: Element>(&mut self, name: impl Into<String>, array: Array<T>) -> Option<AnyArray> {
        self.entries.insert(name.into(), T::into_any(array))
    }

    /// Borrow a typed array.
    ///
    /// Returns `None` both for unknown names and when the stored element type
    /// is not `T`.
    pub fn get<T: Element>(&self, name: &str) -> Option<&Array<T>> {
        self.entries.get(name).and_then(T::from_any)
    }

    /// Borrow an entry without committing to an element type.
    pub fn get_any(&self, name: &str) -> Option<&AnyArray> {
        self.entries.get(name)
    }

    /// Remove an entry.
    pub fn remove(&mut self, name: &str) -> Option<AnyArray> {
        self.entries.remove(name)
    }

    /// True when an entry with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entry names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnyArray)> {
        self.entries.iter().map(|(name, array)| (name.as_str(), array))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the container holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Container {
    type Item = (String, AnyArray);
    type IntoIter = std::collections::btree_map::IntoIter<String, AnyArray>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<N: Into<String>> FromIterator<(N, AnyArray)> for Container {
    fn from_iter<I: IntoIterator<Item = (N, AnyArray)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, array)| (name.into(), array))
                .collect(),
        }
    }
}

/// Archive member name for a logical array name.
pub fn member_name(name: &str) -> String {
    if name.ends_with(NPY_EXTENSION) {
        name.to_string()
    } else {
        format!("{}{}", name, NPY_EXTENSION)
    }
}

/// Logical array name for an archive member name.
pub fn logical_name(member: &str) -> &str {
    member.strip_suffix(NPY_EXTENSION).unwrap_or(member)
}

pub(crate) fn archive_error(err: ZipError) -> NpyError {
    match err {
        ZipError::Io(io) => NpyError::Io(io),
        other => NpyError::Archive(other.to_string()),
    }
}

/// Check options, entries and member names without touching any sink.
///
/// Member names collide when two entries map to the same `.npy` name
/// (`a` and `a.npy`).
pub(crate) fn check_writable(container: &Container, options: &WriteOptions) -> Result<()> {
    if !options.compression.is_supported() {
        return Err(NpyError::Validation(format!(
            "unsupported archive compression: {:?}",
            options.compression
        )));
    }

    let mut members = BTreeSet::new();
    for (name, array) in container.iter() {
        let member = member_name(name);
        array.validate().map_err(|err| err.in_member(&member))?;
        if !members.insert(member.clone()) {
            return Err(NpyError::Validation(format!(
                "duplicate archive member from entry '{}'",
                name
            ))
            .in_member(member));
        }
    }
    Ok(())
}

/// Write every entry of `container` as a member of a new zip archive.
///
/// All entries are validated, and member names checked for collisions,
/// before the archive is started. Returns the underlying writer once the
/// archive directory has been written.
pub fn write_npz<W: Write + Seek>(
    writer: W,
    container: &Container,
    options: &WriteOptions,
) -> Result<W> {
    check_writable(container, options)?;

    let file_options = options.compression.file_options();
    let mut archive = ZipWriter::new(writer);

    for (name, array) in container.iter() {
        let member = member_name(name);
        debug!(
            member = %member,
            dtype = %array.dtype(),
            shape = ?array.shape(),
            "writing archive member"
        );

        archive
            .start_file(member.as_str(), file_options)
            .map_err(|err| archive_error(err).in_member(&member))?;
        (codec_for(array.dtype()).write)(&mut archive, array)
            .map_err(|err| err.in_member(&member))?;
    }

    archive.finish().map_err(archive_error)
}

/// Read every member of a zip archive into a container.
///
/// Any member failure aborts the whole read.
pub fn read_npz<R: Read + Seek>(reader: R, options: &ReadOptions) -> Result<Container> {
    let mut archive = ZipArchive::new(reader).map_err(archive_error)?;
    let mut container = Container::new();

    for index in 0..archive.len() {
        // Pass one: discover the element type from the member's own header.
        let (member, header) = {
            let mut file = archive.by_index(index).map_err(archive_error)?;
            if file.is_dir() {
                warn!(member = %file.name(), "skipping directory entry");
                continue;
            }
            let member = file.name().to_string();
            let header = peek_header(&mut file, &options.limits)
                .map_err(|err| err.in_member(&member))?;
            (member, header)
        };
        debug!(
            member = %member,
            dtype = %header.dtype,
            shape = ?header.shape,
            "discovered member header"
        );

        // Pass two: reopen and decode through the typed reader for that dtype.
        let mut file = archive
            .by_index(index)
            .map_err(|err| archive_error(err).in_member(&member))?;
        let array = (codec_for(header.dtype).read)(&mut file, &options.limits)
            .map_err(|err| err.in_member(&member))?;

        container.insert(logical_name(&member), array);
    }

    Ok(container)
}
