//! Tabular projection of 1-D and 2-D arrays

use std::io::Write;

use npy_codec::{AnyArray, Array, ArrayVisitor, Element, Layout};
use npy_format::{NpyError, Result};
use tracing::trace;

/// Rows of text fields.
pub type Rows = Vec<Vec<String>>;

/// Flatten an array into rows of text fields.
///
/// - no dimensions, or one empty dimension: no rows
/// - one dimension: a single row in stream order
/// - two dimensions `[R, C]`: `R` rows of `C` fields in logical order,
///   whatever the array's layout
/// - more dimensions: [`NpyError::UnsupportedShape`]
pub fn project<T: Element>(array: &Array<T>) -> Result<Rows> {
    let rows = match array.shape.as_slice() {
        [] | [0] => Vec::new(),
        [_] => {
            array.validate()?;
            vec![array.data.iter().map(ToString::to_string).collect()]
        }
        &[rows, cols] => {
            array.validate()?;
            (0..rows)
                .map(|r| {
                    (0..cols)
                        .map(|c| {
                            let index = match array.layout {
                                Layout::ColumnMajor => c * rows + r,
                                Layout::RowMajor => r * cols + c,
                            };
                            array.data[index].to_string()
                        })
                        .collect()
                })
                .collect()
        }
        dims => return Err(NpyError::UnsupportedShape(dims.len())),
    };

    let dtype = T::DTYPE;
    trace!(dtype = %dtype, rows = rows.len(), "projected array");
    Ok(rows)
}

struct Projector;

impl ArrayVisitor for Projector {
    type Output = Result<Rows>;

    fn visit<T: Element>(self, array: &Array<T>) -> Self::Output {
        project(array)
    }
}

/// Flatten a type-erased array into rows of text fields.
pub fn project_any(array: &AnyArray) -> Result<Rows> {
    array.visit(Projector)
}

pub(crate) fn table_error(err: csv::Error) -> NpyError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => NpyError::Io(io),
        kind => NpyError::Table(format!("{:?}", kind)),
    }
}

/// Write rows as comma-separated text, one record per line.
pub fn write_table<W: Write>(writer: W, rows: &[Vec<String>]) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    for row in rows {
        out.write_record(row).map_err(table_error)?;
    }
    out.flush()?;
    Ok(())
}
