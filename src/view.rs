//! Zero-copy views over native buffers.
//!
//! Tables, rows, columns, CIGAR codes and matrix scores are never copied out
//! of native memory. Each view borrows the handle that owns the buffer, so it
//! cannot outlive the resource.

use ndarray::{ArrayView1, ArrayView2, ErrorKind, ShapeError};

use crate::error::{ParasailError, Result};

/// Slice over `len` elements at `ptr`.
///
/// An empty buffer yields an empty slice whatever `ptr` is; a null pointer
/// with a nonzero length is an allocation failure of `call`.
///
/// # Safety
///
/// When non-null, `ptr` must be valid for `len` reads for `'a`.
pub(crate) unsafe fn slice<'a, T>(ptr: *const T, len: usize, call: &str) -> Result<&'a [T]> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(ParasailError::allocation(call));
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

/// One-dimensional view of `len` elements.
///
/// # Safety
///
/// Same contract as [`slice`].
pub(crate) unsafe fn vector<'a, T>(
    ptr: *const T,
    len: usize,
    call: &str,
) -> Result<ArrayView1<'a, T>> {
    Ok(ArrayView1::from(slice(ptr, len, call)?))
}

/// Row-major `rows x cols` view.
///
/// # Safety
///
/// When non-null, `ptr` must be valid for `rows * cols` reads for `'a`.
pub(crate) unsafe fn table<'a, T>(
    ptr: *const T,
    rows: usize,
    cols: usize,
    call: &str,
) -> Result<ArrayView2<'a, T>> {
    let len = rows
        .checked_mul(cols)
        .ok_or_else(|| ShapeError::from_kind(ErrorKind::Overflow))?;
    let data = slice(ptr, len, call)?;
    Ok(ArrayView2::from_shape((rows, cols), data)?)
}
