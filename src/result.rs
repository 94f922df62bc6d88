//! Alignment results and capability-checked access.
//!
//! An [`AlignResult`] owns one native `parasail_result_t`. Score and end
//! positions are always available. Everything else depends on what the
//! variant computed, and the native predicates are the only source of truth:
//! each gated accessor asks the matching predicate first and returns
//! [`ParasailError::MissingCapability`] without touching the native getter
//! when it reports false.
//!
//! | Accessor                                   | Requires                     |
//! |--------------------------------------------|------------------------------|
//! | `matches`, `similar`, `length`             | stats                        |
//! | `score_table`                              | table or stats table         |
//! | `matches_table`, `similar_table`, ...      | stats table                  |
//! | `score_row`, `score_col`                   | rowcol or stats rowcol       |
//! | `matches_row`, `similar_col`, ...          | stats rowcol                 |
//! | `cigar`, `traceback`                       | trace                        |
//!
//! Tables, rows and columns are zero-copy views borrowed from the result.
//! CIGAR and traceback are computed on first access, at most once, and cached.
//!
//! # Example
//!
//! ```no_run
//! use parasail_bind::{Matrix, Parasail};
//!
//! # fn main() -> parasail_bind::Result<()> {
//! let parasail = Parasail::load()?;
//! let matrix = Matrix::lookup(&parasail, "blosum62")?;
//!
//! let name = "sw_stats_table_striped_16";
//! let result = parasail.align_named(name, "HEAGAWGHEE", "PAWHEAE", 10, 1, &matrix)?;
//! println!("score {} matches {}", result.score(), result.matches()?);
//! let table = result.score_table()?;
//! assert_eq!(table.dim(), (10, 7));
//!
//! // Not a trace variant
//! assert!(result.cigar().unwrap_err().is_missing_capability());
//! # Ok(())
//! # }
//! ```

use std::ffi::{c_int, c_void};
use std::fmt;
use std::ptr::NonNull;
use std::sync::{Mutex, OnceLock, PoisonError};

use ndarray::{ArrayView1, ArrayView2};

use crate::cigar::Cigar;
use crate::error::{ParasailError, Result};
use crate::ffi::{parasail_result_t, NativeApi};
use crate::library::Parasail;
use crate::matrix::Matrix;
use crate::traceback::{Traceback, MATCH_MARKER, MISMATCH_MARKER, SIMILAR_MARKER};
use crate::variant::{Algorithm, Strategy, Variant};
use crate::view;

/// Optional output a variant may or may not have computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Match, similarity and length counts
    Stats,
    /// Full score table
    Table,
    /// Full score table plus statistics tables
    StatsTable,
    /// Last row and column of scores
    RowCol,
    /// Last row and column of scores and statistics
    StatsRowCol,
    /// Traceback (CIGAR and traceback strings)
    Trace,
}

impl Capability {
    /// All capabilities
    pub const ALL: [Capability; 6] = [
        Capability::Stats,
        Capability::Table,
        Capability::StatsTable,
        Capability::RowCol,
        Capability::StatsRowCol,
        Capability::Trace,
    ];

    fn predicate(self, api: &NativeApi) -> unsafe extern "C" fn(*const parasail_result_t) -> c_int {
        match self {
            Capability::Stats => api.parasail_result_is_stats,
            Capability::Table => api.parasail_result_is_table,
            Capability::StatsTable => api.parasail_result_is_stats_table,
            Capability::RowCol => api.parasail_result_is_rowcol,
            Capability::StatsRowCol => api.parasail_result_is_stats_rowcol,
            Capability::Trace => api.parasail_result_is_trace,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Stats => "statistics",
            Capability::Table => "a score table",
            Capability::StatsTable => "statistics tables",
            Capability::RowCol => "a last row and column",
            Capability::StatsRowCol => "statistics rows and columns",
            Capability::Trace => "a traceback",
        })
    }
}

/// Inputs a traceback result needs to derive its CIGAR and strings.
pub(crate) struct TraceInputs<'m> {
    pub(crate) query: Vec<u8>,
    pub(crate) reference: Vec<u8>,
    pub(crate) matrix: &'m Matrix,
}

type Getter = unsafe extern "C" fn(*const parasail_result_t) -> *mut c_int;
type StatGetter = unsafe extern "C" fn(*const parasail_result_t) -> c_int;

/// Owned native alignment result
///
/// `'m` is the lifetime of the matrix a traceback result borrows to compute
/// its CIGAR.
pub struct AlignResult<'m> {
    raw: NonNull<parasail_result_t>,
    parasail: Parasail,
    variant: Option<Variant>,
    query_len: usize,
    ref_len: usize,
    trace_inputs: Option<TraceInputs<'m>>,
    // Only successful derivations are cached; `derive` serializes the first
    // computation so each native getter succeeds at most once.
    derive: Mutex<()>,
    cigar: OnceLock<Cigar>,
    traceback: OnceLock<Traceback>,
}

// SAFETY: the native result is read-only after creation and released
// exactly once from Drop; lazy derivations are serialized by OnceLock.
unsafe impl Send for AlignResult<'_> {}
unsafe impl Sync for AlignResult<'_> {}

impl<'m> AlignResult<'m> {
    /// Take ownership of a native result; null is an allocation failure of `call`.
    pub(crate) fn from_raw(
        parasail: &Parasail,
        raw: *mut parasail_result_t,
        call: &str,
        variant: Option<Variant>,
        query_len: usize,
        ref_len: usize,
        trace_inputs: Option<TraceInputs<'m>>,
    ) -> Result<Self> {
        let raw = NonNull::new(raw).ok_or_else(|| ParasailError::allocation(call))?;
        Ok(Self {
            raw,
            parasail: parasail.clone(),
            variant,
            query_len,
            ref_len,
            trace_inputs,
            derive: Mutex::new(()),
            cigar: OnceLock::new(),
            traceback: OnceLock::new(),
        })
    }

    fn raw(&self) -> &parasail_result_t {
        // SAFETY: non-null and alive until Drop.
        unsafe { self.raw.as_ref() }
    }

    fn api(&self) -> &NativeApi {
        self.parasail.api()
    }

    fn cached<'a, T>(
        &'a self,
        cell: &'a OnceLock<T>,
        init: impl FnOnce() -> Result<T>,
    ) -> Result<&'a T> {
        if let Some(value) = cell.get() {
            return Ok(value);
        }
        let _guard = self.derive.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = cell.get() {
            return Ok(value);
        }
        let value = init()?;
        Ok(cell.get_or_init(|| value))
    }

    fn ask(&self, predicate: unsafe extern "C" fn(*const parasail_result_t) -> c_int) -> bool {
        // SAFETY: predicates only read the flag word.
        unsafe { predicate(self.raw.as_ptr()) != 0 }
    }

    // ========================================================================
    // Unconditional fields
    // ========================================================================

    /// Alignment score
    pub fn score(&self) -> i32 {
        self.raw().score
    }

    /// Zero-based query position where the alignment ends
    pub fn end_query(&self) -> i32 {
        self.raw().end_query
    }

    /// Zero-based reference position where the alignment ends
    pub fn end_ref(&self) -> i32 {
        self.raw().end_ref
    }

    /// Raw native flag word
    pub fn flag(&self) -> i32 {
        self.raw().flag
    }

    /// Native extra pointer, opaque to this crate
    pub fn extra(&self) -> *mut c_void {
        self.raw().extra
    }

    /// Whether the lane width overflowed.
    ///
    /// Saturated scores are not reliable; rerun with a wider variant.
    pub fn saturated(&self) -> bool {
        self.ask(self.api().parasail_result_is_saturated)
    }

    /// Variant that produced this result, if it came from the registry
    pub fn variant(&self) -> Option<Variant> {
        self.variant
    }

    /// Query length passed to the alignment
    pub fn query_len(&self) -> usize {
        self.query_len
    }

    /// Reference length passed to the alignment
    pub fn ref_len(&self) -> usize {
        self.ref_len
    }

    // ========================================================================
    // Result kind
    // ========================================================================

    /// Algorithm family reported by the native flags
    pub fn algorithm(&self) -> Option<Algorithm> {
        let api = self.api();
        if self.ask(api.parasail_result_is_nw) {
            Some(Algorithm::Global)
        } else if self.ask(api.parasail_result_is_sg) {
            Some(Algorithm::SemiGlobal)
        } else if self.ask(api.parasail_result_is_sw) {
            Some(Algorithm::Local)
        } else {
            None
        }
    }

    /// Vector strategy reported by the native flags
    pub fn strategy(&self) -> Option<Strategy> {
        let api = self.api();
        if self.ask(api.parasail_result_is_striped) {
            Some(Strategy::Striped)
        } else if self.ask(api.parasail_result_is_diag) {
            Some(Strategy::Diagonal)
        } else if self.ask(api.parasail_result_is_scan) {
            Some(Strategy::Scan)
        } else {
            None
        }
    }

    /// Whether the result came from a banded alignment
    pub fn is_banded(&self) -> bool {
        self.ask(self.api().parasail_result_is_banded)
    }

    /// Whether the result came from a blocked implementation
    pub fn is_blocked(&self) -> bool {
        self.ask(self.api().parasail_result_is_blocked)
    }

    /// Whether the variant computed `capability`
    pub fn has(&self, capability: Capability) -> bool {
        self.ask(capability.predicate(self.api()))
    }

    fn require(&self, field: &'static str, accepted: &[Capability]) -> Result<()> {
        if accepted.iter().any(|&c| self.has(c)) {
            return Ok(());
        }
        Err(ParasailError::MissingCapability {
            field,
            capability: accepted[0],
        })
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    fn stat(&self, field: &'static str, getter: StatGetter) -> Result<i32> {
        self.require(field, &[Capability::Stats])?;
        // SAFETY: gated by the stats predicate.
        Ok(unsafe { getter(self.raw.as_ptr()) })
    }

    /// Number of exact matches
    pub fn matches(&self) -> Result<i32> {
        self.stat("matches", self.api().parasail_result_get_matches)
    }

    /// Number of positive-scoring substitutions
    pub fn similar(&self) -> Result<i32> {
        self.stat("similar", self.api().parasail_result_get_similar)
    }

    /// Alignment length
    pub fn length(&self) -> Result<i32> {
        self.stat("length", self.api().parasail_result_get_length)
    }

    // ========================================================================
    // Tables
    // ========================================================================

    fn table(
        &self,
        field: &'static str,
        accepted: &[Capability],
        getter: Getter,
    ) -> Result<ArrayView2<'_, i32>> {
        self.require(field, accepted)?;
        // SAFETY: gated; the native table holds query_len * ref_len cells
        // owned by this result.
        unsafe {
            let ptr = getter(self.raw.as_ptr());
            view::table(ptr.cast_const(), self.query_len, self.ref_len, field)
        }
    }

    /// Score table, shape `(query_len, ref_len)`
    pub fn score_table(&self) -> Result<ArrayView2<'_, i32>> {
        let accepted = [Capability::Table, Capability::StatsTable];
        self.table("score_table", &accepted, self.api().parasail_result_get_score_table)
    }

    /// Match-count table, shape `(query_len, ref_len)`
    pub fn matches_table(&self) -> Result<ArrayView2<'_, i32>> {
        let getter = self.api().parasail_result_get_matches_table;
        self.table("matches_table", &[Capability::StatsTable], getter)
    }

    /// Similarity-count table, shape `(query_len, ref_len)`
    pub fn similar_table(&self) -> Result<ArrayView2<'_, i32>> {
        let getter = self.api().parasail_result_get_similar_table;
        self.table("similar_table", &[Capability::StatsTable], getter)
    }

    /// Length table, shape `(query_len, ref_len)`
    pub fn length_table(&self) -> Result<ArrayView2<'_, i32>> {
        let getter = self.api().parasail_result_get_length_table;
        self.table("length_table", &[Capability::StatsTable], getter)
    }

    // ========================================================================
    // Last row and column
    // ========================================================================

    fn line(
        &self,
        field: &'static str,
        accepted: &[Capability],
        getter: Getter,
        len: usize,
    ) -> Result<ArrayView1<'_, i32>> {
        self.require(field, accepted)?;
        // SAFETY: gated; the native buffer holds `len` cells owned by this
        // result.
        unsafe {
            let ptr = getter(self.raw.as_ptr());
            view::vector(ptr.cast_const(), len, field)
        }
    }

    /// Last row of scores, length `ref_len`
    pub fn score_row(&self) -> Result<ArrayView1<'_, i32>> {
        let accepted = [Capability::RowCol, Capability::StatsRowCol];
        self.line("score_row", &accepted, self.api().parasail_result_get_score_row, self.ref_len)
    }

    /// Last column of scores, length `query_len`
    pub fn score_col(&self) -> Result<ArrayView1<'_, i32>> {
        let accepted = [Capability::RowCol, Capability::StatsRowCol];
        self.line("score_col", &accepted, self.api().parasail_result_get_score_col, self.query_len)
    }

    /// Last row of match counts
    pub fn matches_row(&self) -> Result<ArrayView1<'_, i32>> {
        let getter = self.api().parasail_result_get_matches_row;
        self.line("matches_row", &[Capability::StatsRowCol], getter, self.ref_len)
    }

    /// Last column of match counts
    pub fn matches_col(&self) -> Result<ArrayView1<'_, i32>> {
        let getter = self.api().parasail_result_get_matches_col;
        self.line("matches_col", &[Capability::StatsRowCol], getter, self.query_len)
    }

    /// Last row of similarity counts
    pub fn similar_row(&self) -> Result<ArrayView1<'_, i32>> {
        let getter = self.api().parasail_result_get_similar_row;
        self.line("similar_row", &[Capability::StatsRowCol], getter, self.ref_len)
    }

    /// Last column of similarity counts
    pub fn similar_col(&self) -> Result<ArrayView1<'_, i32>> {
        let getter = self.api().parasail_result_get_similar_col;
        self.line("similar_col", &[Capability::StatsRowCol], getter, self.query_len)
    }

    /// Last row of lengths
    pub fn length_row(&self) -> Result<ArrayView1<'_, i32>> {
        let getter = self.api().parasail_result_get_length_row;
        self.line("length_row", &[Capability::StatsRowCol], getter, self.ref_len)
    }

    /// Last column of lengths
    pub fn length_col(&self) -> Result<ArrayView1<'_, i32>> {
        let getter = self.api().parasail_result_get_length_col;
        self.line("length_col", &[Capability::StatsRowCol], getter, self.query_len)
    }

    // ========================================================================
    // Traceback
    // ========================================================================

    fn trace_inputs(&self, field: &'static str) -> Result<&TraceInputs<'m>> {
        self.require(field, &[Capability::Trace])?;
        self.trace_inputs.as_ref().ok_or(ParasailError::MissingCapability {
            field,
            capability: Capability::Trace,
        })
    }

    /// CIGAR of the alignment, computed on first call and cached.
    pub fn cigar(&self) -> Result<&Cigar> {
        let inputs = self.trace_inputs("cigar")?;
        self.cached(&self.cigar, || {
            // SAFETY: trace result; inputs are the sequences and matrix the
            // alignment ran with and outlive the call.
            let raw = unsafe {
                (self.api().parasail_result_get_cigar)(
                    self.raw.as_ptr(),
                    inputs.query.as_ptr().cast(),
                    self.query_len as c_int,
                    inputs.reference.as_ptr().cast(),
                    self.ref_len as c_int,
                    inputs.matrix.as_ptr(),
                )
            };
            Cigar::from_raw(&self.parasail, raw, "parasail_result_get_cigar")
        })
    }

    /// Release the result and keep only its CIGAR.
    pub fn into_cigar(mut self) -> Result<Cigar> {
        self.cigar()?;
        self.cigar
            .take()
            .ok_or_else(|| ParasailError::allocation("parasail_result_get_cigar"))
    }

    /// Traceback strings, computed on first call and cached.
    ///
    /// The comparison line uses `|` for matches, `:` for positive-scoring
    /// substitutions and `.` otherwise.
    pub fn traceback(&self) -> Result<&Traceback> {
        let inputs = self.trace_inputs("traceback")?;
        self.cached(&self.traceback, || {
            // SAFETY: as for `cigar`.
            let raw = unsafe {
                (self.api().parasail_result_get_traceback)(
                    self.raw.as_ptr(),
                    inputs.query.as_ptr().cast(),
                    self.query_len as c_int,
                    inputs.reference.as_ptr().cast(),
                    self.ref_len as c_int,
                    inputs.matrix.as_ptr(),
                    MATCH_MARKER as _,
                    SIMILAR_MARKER as _,
                    MISMATCH_MARKER as _,
                )
            };
            Traceback::from_raw(&self.parasail, raw, "parasail_result_get_traceback")
        })
    }
}

impl fmt::Debug for AlignResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignResult")
            .field("variant", &self.variant.map(|v| v.name()))
            .field("score", &self.score())
            .field("end_query", &self.end_query())
            .field("end_ref", &self.end_ref())
            .field("saturated", &self.saturated())
            .finish()
    }
}

impl Drop for AlignResult<'_> {
    fn drop(&mut self) {
        log::trace!("releasing parasail result {:p}", self.raw);
        // SAFETY: owned, released exactly once. Cached Cigar and Traceback
        // are separate resources dropped with their own fields.
        unsafe { (self.api().parasail_result_free)(self.raw.as_ptr()) };
    }
}
