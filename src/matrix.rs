//! Substitution matrices.
//!
//! A [`Matrix`] is either *library-resident* (a built-in table returned by
//! name lookup, never released, never mutable) or *owned* (created, loaded
//! from a file, or copied; released exactly once on drop, mutable). The mode
//! is read from the native struct when the handle is wrapped.
//!
//! # Mutation
//!
//! Cells are addressed by [`MatrixKey`]. Every index the key covers is
//! checked against the matrix size before the first cell is written, so a
//! rejected key leaves the matrix untouched. Mutation takes `&mut self`,
//! which the borrow checker keeps apart from any alignment, profile or view
//! still borrowing the matrix.
//!
//! ```no_run
//! use parasail_bind::{Matrix, MatrixKey, Parasail, StepRange};
//!
//! # fn main() -> parasail_bind::Result<()> {
//! let parasail = Parasail::load()?;
//! let mut matrix = Matrix::create(&parasail, "ACGT", 2, -1)?;
//!
//! matrix.set(MatrixKey::Cell(0, 1), 1)?;
//! matrix.set(MatrixKey::Row(3), 0)?;
//! matrix.set(MatrixKey::Block(StepRange::new(0, 4).step_by(2)?, (1..3).into()), -3)?;
//!
//! // Built-in tables must be copied first
//! let mut blosum = Matrix::lookup(&parasail, "blosum62")?.copy()?;
//! blosum.set_value(0, 0, 10)?;
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::ffi::{c_int, CStr, CString};
use std::fmt;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};
use std::path::Path;
use std::ptr::NonNull;

use ndarray::ArrayView2;

use crate::error::{ParasailError, Result};
use crate::ffi::parasail_matrix_t;
use crate::library::Parasail;
use crate::view;

// ============================================================================
// Stepped ranges
// ============================================================================

/// Half-open index range with a positive step
///
/// Unlike slicing, both bounds are mandatory: an open-ended range has no
/// meaning for a matrix key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRange {
    start: usize,
    stop: usize,
    step: usize,
}

impl StepRange {
    /// `start..stop` with step 1
    pub fn new(start: usize, stop: usize) -> Self {
        Self { start, stop, step: 1 }
    }

    /// Build from optional parts, the way a slice key arrives.
    ///
    /// # Errors
    ///
    /// [`ParasailError::MissingRangeBound`] without a start or stop,
    /// [`ParasailError::ZeroStep`] for a zero step. A missing step means 1.
    pub fn from_parts(
        start: Option<usize>,
        stop: Option<usize>,
        step: Option<usize>,
    ) -> Result<Self> {
        let start = start.ok_or(ParasailError::MissingRangeBound("start"))?;
        let stop = stop.ok_or(ParasailError::MissingRangeBound("stop"))?;
        Self::new(start, stop).step_by(step.unwrap_or(1))
    }

    /// Same bounds, different step.
    pub fn step_by(self, step: usize) -> Result<Self> {
        if step == 0 {
            return Err(ParasailError::ZeroStep);
        }
        Ok(Self { step, ..self })
    }

    /// First index
    pub fn start(&self) -> usize {
        self.start
    }

    /// Exclusive upper bound
    pub fn stop(&self) -> usize {
        self.stop
    }

    /// Step
    pub fn step(&self) -> usize {
        self.step
    }

    /// Indices covered, in order
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        (self.start..self.stop).step_by(self.step)
    }

    /// Largest index covered, if any
    pub fn last(&self) -> Option<usize> {
        if self.start >= self.stop {
            return None;
        }
        let span = self.stop - 1 - self.start;
        Some(self.start + span - span % self.step)
    }
}

impl From<Range<usize>> for StepRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl TryFrom<RangeFrom<usize>> for StepRange {
    type Error = ParasailError;

    fn try_from(_: RangeFrom<usize>) -> Result<Self> {
        Err(ParasailError::MissingRangeBound("stop"))
    }
}

impl TryFrom<RangeTo<usize>> for StepRange {
    type Error = ParasailError;

    fn try_from(_: RangeTo<usize>) -> Result<Self> {
        Err(ParasailError::MissingRangeBound("start"))
    }
}

impl TryFrom<RangeFull> for StepRange {
    type Error = ParasailError;

    fn try_from(_: RangeFull) -> Result<Self> {
        Err(ParasailError::MissingRangeBound("start"))
    }
}

/// Cells addressed by one mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKey {
    /// One cell `(row, col)`
    Cell(usize, usize),
    /// Every column of one row
    Row(usize),
    /// One row, stepped columns
    RowSpan(usize, StepRange),
    /// Stepped rows, one column
    ColumnSpan(StepRange, usize),
    /// Stepped rows, every column
    Rows(StepRange),
    /// Cartesian product of stepped rows and stepped columns
    Block(StepRange, StepRange),
}

impl MatrixKey {
    /// Fixed row and column indices, if the key has them
    fn fixed(&self) -> [Option<usize>; 2] {
        match *self {
            MatrixKey::Cell(r, c) => [Some(r), Some(c)],
            MatrixKey::Row(r) | MatrixKey::RowSpan(r, _) => [Some(r), None],
            MatrixKey::ColumnSpan(_, c) => [None, Some(c)],
            MatrixKey::Rows(_) | MatrixKey::Block(..) => [None, None],
        }
    }

    fn rows(&self) -> StepRange {
        match *self {
            MatrixKey::Cell(r, _) | MatrixKey::Row(r) | MatrixKey::RowSpan(r, _) => {
                StepRange::new(r, r.saturating_add(1))
            }
            MatrixKey::ColumnSpan(rows, _)
            | MatrixKey::Rows(rows)
            | MatrixKey::Block(rows, _) => rows,
        }
    }

    fn cols(&self, size: usize) -> StepRange {
        match *self {
            MatrixKey::Cell(_, c) | MatrixKey::ColumnSpan(_, c) => {
                StepRange::new(c, c.saturating_add(1))
            }
            MatrixKey::Row(_) | MatrixKey::Rows(_) => StepRange::new(0, size),
            MatrixKey::RowSpan(_, cols) | MatrixKey::Block(_, cols) => cols,
        }
    }

    /// Every `(row, col)` the key covers.
    fn cells(&self, size: usize) -> impl Iterator<Item = (usize, usize)> {
        let cols = self.cols(size);
        self.rows()
            .iter()
            .flat_map(move |r| cols.iter().map(move |c| (r, c)))
    }

    /// Reject the key if any covered index is outside `[0, size)`.
    fn check(&self, size: usize) -> Result<()> {
        let out_of_range = |index: usize| ParasailError::IndexOutOfRange { index, len: size };
        if let Some(index) = self.fixed().into_iter().flatten().find(|&i| i >= size) {
            return Err(out_of_range(index));
        }
        // An empty axis writes nothing, so the other axis is never indexed
        let (Some(last_row), Some(last_col)) = (self.rows().last(), self.cols(size).last()) else {
            return Ok(());
        };
        match [last_row, last_col].into_iter().find(|&i| i >= size) {
            Some(index) => Err(out_of_range(index)),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Matrix handle
// ============================================================================

enum MatrixHandle {
    /// Library-resident table, never released
    Builtin(NonNull<parasail_matrix_t>),
    /// Caller-owned, released on drop
    Owned(NonNull<parasail_matrix_t>),
}

/// Substitution matrix handle
pub struct Matrix {
    handle: MatrixHandle,
    parasail: Parasail,
}

// SAFETY: built-in tables are immutable static data; owned matrices are only
// mutated through &mut self and released exactly once from Drop.
unsafe impl Send for Matrix {}
unsafe impl Sync for Matrix {}

impl Matrix {
    /// Wrap a native matrix, deciding ownership from `user_matrix`.
    fn wrap(parasail: &Parasail, raw: *const parasail_matrix_t, call: &str) -> Result<Self> {
        let raw = NonNull::new(raw.cast_mut()).ok_or_else(|| ParasailError::allocation(call))?;
        // SAFETY: non-null matrix just returned by the library.
        let owned = unsafe { !raw.as_ref().user_matrix.is_null() };
        let handle = if owned {
            MatrixHandle::Owned(raw)
        } else {
            MatrixHandle::Builtin(raw)
        };
        Ok(Self {
            handle,
            parasail: parasail.clone(),
        })
    }

    /// Built-in matrix by name, e.g. `"blosum62"` or `"dnafull"`.
    ///
    /// # Errors
    ///
    /// [`ParasailError::MatrixNotFound`] for an unknown name.
    pub fn lookup(parasail: &Parasail, name: &str) -> Result<Self> {
        let c_name = CString::new(name)?;
        // SAFETY: NUL-terminated name; lookup returns static data or null.
        let raw = unsafe { (parasail.api().parasail_matrix_lookup)(c_name.as_ptr()) };
        if raw.is_null() {
            return Err(ParasailError::MatrixNotFound(name.to_string()));
        }
        Self::wrap(parasail, raw, "parasail_matrix_lookup")
    }

    /// Load a matrix file.
    ///
    /// The file's existence is checked before the native loader runs, since
    /// the loader terminates the process on a missing file.
    ///
    /// # Errors
    ///
    /// [`ParasailError::MatrixFileNotFound`] when `path` is not a file,
    /// [`ParasailError::MatrixNotFound`] when the loader rejects it.
    pub fn from_file<P: AsRef<Path>>(parasail: &Parasail, path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ParasailError::MatrixFileNotFound {
                path: path.to_path_buf(),
            });
        }
        let c_path = CString::new(path.to_string_lossy().into_owned())?;
        // SAFETY: NUL-terminated path to an existing file.
        let raw = unsafe { (parasail.api().parasail_matrix_from_file)(c_path.as_ptr()) };
        if raw.is_null() {
            return Err(ParasailError::MatrixNotFound(path.display().to_string()));
        }
        log::debug!("loaded matrix file {}", path.display());
        Self::wrap(parasail, raw, "parasail_matrix_from_file")
    }

    /// Built-in matrix by name, falling back to a file path.
    pub fn from_name_or_file(parasail: &Parasail, name_or_path: &str) -> Result<Self> {
        match Self::lookup(parasail, name_or_path) {
            Err(ParasailError::MatrixNotFound(_)) => Self::from_file(parasail, name_or_path),
            other => other,
        }
    }

    /// Match/mismatch matrix over `alphabet`.
    pub fn create(
        parasail: &Parasail,
        alphabet: &str,
        match_score: i32,
        mismatch: i32,
    ) -> Result<Self> {
        let c_alphabet = CString::new(alphabet)?;
        // SAFETY: NUL-terminated alphabet.
        let create = parasail.api().parasail_matrix_create;
        let raw = unsafe { create(c_alphabet.as_ptr(), match_score, mismatch) };
        Self::wrap(parasail, raw, "parasail_matrix_create")
    }

    /// Owned, mutable copy of this matrix.
    pub fn copy(&self) -> Result<Self> {
        // SAFETY: valid matrix; the copy is a fresh allocation.
        let raw = unsafe { (self.parasail.api().parasail_matrix_copy)(self.as_ptr()) };
        Self::wrap(&self.parasail, raw, "parasail_matrix_copy")
    }

    pub(crate) fn as_ptr(&self) -> *const parasail_matrix_t {
        match self.handle {
            MatrixHandle::Builtin(raw) | MatrixHandle::Owned(raw) => raw.as_ptr().cast_const(),
        }
    }

    fn raw(&self) -> &parasail_matrix_t {
        // SAFETY: non-null and alive for as long as self.
        unsafe { &*self.as_ptr() }
    }

    /// Whether this is a library-resident table
    pub fn is_builtin(&self) -> bool {
        matches!(self.handle, MatrixHandle::Builtin(_))
    }

    /// Matrix name; file matrices are named after their path
    pub fn name(&self) -> Cow<'_, str> {
        let name = self.raw().name;
        if name.is_null() {
            return Cow::Borrowed("");
        }
        // SAFETY: NUL-terminated string owned by the matrix.
        unsafe { CStr::from_ptr(name) }.to_string_lossy()
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        usize::try_from(self.raw().size).unwrap_or(0)
    }

    /// Largest score
    pub fn max(&self) -> i32 {
        self.raw().max
    }

    /// Smallest score
    pub fn min(&self) -> i32 {
        self.raw().min
    }

    /// Scores as a `(size, size)` view
    pub fn scores(&self) -> Result<ArrayView2<'_, i32>> {
        let size = self.size();
        // SAFETY: `matrix` holds size * size cells owned by this handle.
        unsafe { view::table(self.raw().matrix, size, size, "parasail_matrix_t.matrix") }
    }

    /// One score
    pub fn get(&self, row: usize, col: usize) -> Result<i32> {
        MatrixKey::Cell(row, col).check(self.size())?;
        Ok(self.scores()?[[row, col]])
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    fn owned_ptr(&mut self) -> Result<NonNull<parasail_matrix_t>> {
        match self.handle {
            MatrixHandle::Owned(raw) => Ok(raw),
            MatrixHandle::Builtin(_) => {
                Err(ParasailError::ImmutableMatrix(self.name().into_owned()))
            }
        }
    }

    /// Set every cell `key` covers to `value`.
    ///
    /// # Errors
    ///
    /// [`ParasailError::ImmutableMatrix`] for a library-resident matrix,
    /// [`ParasailError::IndexOutOfRange`] if any covered index is out of
    /// bounds. Nothing is written on error.
    pub fn set(&mut self, key: MatrixKey, value: i32) -> Result<()> {
        let raw = self.owned_ptr()?;
        let size = self.size();
        key.check(size)?;

        let set_value = self.parasail.api().parasail_matrix_set_value;
        for (row, col) in key.cells(size) {
            // SAFETY: owned matrix, indices checked against size above, and
            // size < c_int::MAX since it came from a c_int.
            unsafe { set_value(raw.as_ptr(), row as c_int, col as c_int, value) };
        }
        Ok(())
    }

    /// Set one cell
    pub fn set_value(&mut self, row: usize, col: usize, value: i32) -> Result<()> {
        self.set(MatrixKey::Cell(row, col), value)
    }

    /// Set every column of `row`
    pub fn set_row(&mut self, row: usize, value: i32) -> Result<()> {
        self.set(MatrixKey::Row(row), value)
    }

    /// Set every row of `col`
    pub fn set_column(&mut self, col: usize, value: i32) -> Result<()> {
        let size = self.size();
        self.set(MatrixKey::ColumnSpan(StepRange::new(0, size), col), value)
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("name", &self.name())
            .field("size", &self.size())
            .field("builtin", &self.is_builtin())
            .finish()
    }
}

impl Drop for Matrix {
    fn drop(&mut self) {
        if let MatrixHandle::Owned(raw) = self.handle {
            log::trace!("releasing parasail matrix {:p}", raw);
            // SAFETY: owned, released exactly once.
            unsafe { (self.parasail.api().parasail_matrix_free)(raw.as_ptr()) };
        }
    }
}
