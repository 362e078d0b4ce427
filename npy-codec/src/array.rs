//! Typed in-memory arrays

use npy_format::{element_count, ArrayHeader, ElementType, Layout, NpyError, Result};

use crate::any::AnyArray;
use crate::element::Element;

/// An n-dimensional array stored as a flat buffer.
///
/// `data` is kept in the order described by `layout`; the codec never
/// reorders it.
#[derive(Debug, Clone, PartialEq)]
pub struct Array<T> {
    /// Flat element buffer
    pub data: Vec<T>,
    /// Logical dimensions
    pub shape: Vec<usize>,
    /// Memory order of `data`
    pub layout: Layout,
}

impl<T: Element> Array<T> {
    /// Create a row-major array.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> Self {
        Self::with_layout(data, shape, Layout::RowMajor)
    }

    /// Create an array with an explicit layout.
    pub fn with_layout(data: Vec<T>, shape: Vec<usize>, layout: Layout) -> Self {
        Self {
            data,
            shape,
            layout,
        }
    }

    /// Create a one-dimensional array over `data`.
    pub fn from_vec(data: Vec<T>) -> Self {
        let shape = vec![data.len()];
        Self::new(data, shape)
    }

    /// Element type recorded when this array is written.
    pub fn dtype(&self) -> ElementType {
        T::DTYPE
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Header dictionary describing this array.
    pub fn header(&self) -> ArrayHeader {
        ArrayHeader::new(T::DTYPE, self.shape.clone(), self.layout)
    }

    /// Check that the buffer length equals the product of the shape.
    pub fn validate(&self) -> Result<()> {
        let expected = element_count(&self.shape).ok_or_else(|| {
            NpyError::Validation(format!("shape {:?} overflows the element count", self.shape))
        })?;
        if self.data.len() != expected {
            return Err(NpyError::Validation(format!(
                "data length ({}) does not match shape dimensions ({})",
                self.data.len(),
                expected
            )));
        }
        Ok(())
    }

    /// Erase the element type.
    pub fn into_any(self) -> AnyArray {
        T::into_any(self)
    }
}

impl<T: Element> From<Array<T>> for AnyArray {
    fn from(array: Array<T>) -> Self {
        T::into_any(array)
    }
}
