//! Native ABI descriptor for parasail.
//!
//! Struct layouts and function signatures exactly as exported by
//! `parasail.h`. Nothing in this module has behavior beyond resolving the
//! function table from a loaded library; safe wrappers live in the handle
//! modules ([`crate::result`], [`crate::matrix`], ...).
//!
//! # Struct layouts
//!
//! ```text
//! parasail_result_t    { score, end_query, end_ref, flag, extra }
//! parasail_cigar_t     { seq, len, beg_query, beg_ref }
//! parasail_matrix_t    { name, matrix, mapper, size, max, min, user_matrix }
//! parasail_profile_t   { s1, s1Len, matrix, profile8..profile64, free, stop }
//! parasail_sequences_t { seqs, l, characters, shortest, longest, mean, stddev }
//! ```

#![allow(non_camel_case_types, non_snake_case)]

use std::ffi::{c_char, c_float, c_int, c_void};

use libc::size_t;
use libloading::Library;

use crate::error::{ParasailError, Result};

/// `parasail_result_t`
#[repr(C)]
#[derive(Debug)]
pub struct parasail_result_t {
    pub score: c_int,
    pub end_query: c_int,
    pub end_ref: c_int,
    pub flag: c_int,
    pub extra: *mut c_void,
}

/// `parasail_cigar_t`
#[repr(C)]
#[derive(Debug)]
pub struct parasail_cigar_t {
    pub seq: *mut u32,
    pub len: c_int,
    pub beg_query: c_int,
    pub beg_ref: c_int,
}

/// `parasail_matrix_t`
///
/// `user_matrix` is non-null exactly when the matrix is owned by the caller
/// (created, loaded from file or copied); built-in tables leave it null.
#[repr(C)]
#[derive(Debug)]
pub struct parasail_matrix_t {
    pub name: *const c_char,
    pub matrix: *const c_int,
    pub mapper: *const c_int,
    pub size: c_int,
    pub max: c_int,
    pub min: c_int,
    pub user_matrix: *mut c_int,
}

/// `parasail_profile_data_t`
#[repr(C)]
#[derive(Debug)]
pub struct parasail_profile_data_t {
    pub score: *mut c_void,
    pub matches: *mut c_void,
    pub similar: *mut c_void,
}

/// `parasail_profile_t`
///
/// `s1` is borrowed from the caller, not copied.
#[repr(C)]
#[derive(Debug)]
pub struct parasail_profile_t {
    pub s1: *const c_char,
    pub s1Len: c_int,
    pub matrix: *const parasail_matrix_t,
    pub profile8: parasail_profile_data_t,
    pub profile16: parasail_profile_data_t,
    pub profile32: parasail_profile_data_t,
    pub profile64: parasail_profile_data_t,
    pub free: *mut c_void,
    pub stop: c_int,
}

/// `parasail_string_t`: length-prefixed byte buffer
#[repr(C)]
#[derive(Debug)]
pub struct parasail_string_t {
    pub l: size_t,
    pub s: *mut c_char,
}

/// `parasail_sequence_t`
#[repr(C)]
#[derive(Debug)]
pub struct parasail_sequence_t {
    pub name: parasail_string_t,
    pub comment: parasail_string_t,
    pub seq: parasail_string_t,
    pub qual: parasail_string_t,
}

/// `parasail_sequences_t`
#[repr(C)]
#[derive(Debug)]
pub struct parasail_sequences_t {
    pub seqs: *mut parasail_sequence_t,
    pub l: size_t,
    pub characters: size_t,
    pub shortest: size_t,
    pub longest: size_t,
    pub mean: c_float,
    pub stddev: c_float,
}

/// `parasail_traceback_t`
#[repr(C)]
#[derive(Debug)]
pub struct parasail_traceback_t {
    pub query: *mut c_char,
    pub comp: *mut c_char,
    pub ref_: *mut c_char,
}

/// `parasail_result_ssw_t`
#[repr(C)]
#[derive(Debug)]
pub struct parasail_result_ssw_t {
    pub score1: u16,
    pub ref_begin1: i32,
    pub ref_end1: i32,
    pub read_begin1: i32,
    pub read_end1: i32,
    pub cigar: *mut u32,
    pub cigarLen: i32,
}

/// Sequence-vs-sequence alignment entry point
pub type AlignFn = unsafe extern "C" fn(
    s1: *const c_char,
    s1Len: c_int,
    s2: *const c_char,
    s2Len: c_int,
    open: c_int,
    extend: c_int,
    matrix: *const parasail_matrix_t,
) -> *mut parasail_result_t;

/// Profile-vs-sequence alignment entry point
pub type ProfileAlignFn = unsafe extern "C" fn(
    profile: *const parasail_profile_t,
    s2: *const c_char,
    s2Len: c_int,
    open: c_int,
    extend: c_int,
) -> *mut parasail_result_t;

/// Profile constructor (`parasail_profile_create_*`)
pub type ProfileCreateFn = unsafe extern "C" fn(
    s1: *const c_char,
    s1Len: c_int,
    matrix: *const parasail_matrix_t,
) -> *mut parasail_profile_t;

type Predicate = unsafe extern "C" fn(*const parasail_result_t) -> c_int;
type IntGetter = unsafe extern "C" fn(*const parasail_result_t) -> c_int;
type BufferGetter = unsafe extern "C" fn(*const parasail_result_t) -> *mut c_int;
type CpuProbe = unsafe extern "C" fn() -> c_int;

/// Declares the table of required native functions. Field names are the
/// exported symbol names, so resolution is a straight `dlsym` per field.
macro_rules! native_api {
    ($( $symbol:ident : $ty:ty; )*) => {
        /// Required parasail functions, resolved once at load time.
        #[derive(Clone, Copy)]
        pub(crate) struct NativeApi {
            $( pub(crate) $symbol: $ty, )*
        }

        impl NativeApi {
            /// Resolve every required symbol, failing on the first missing one.
            ///
            /// # Safety
            ///
            /// The declared signatures must match the loaded library.
            pub(crate) unsafe fn resolve(library: &Library) -> Result<Self> {
                Ok(Self {
                    $(
                        $symbol: *library
                            .get::<$ty>(concat!(stringify!($symbol), "\0").as_bytes())
                            .map_err(|source| ParasailError::MissingSymbol {
                                symbol: stringify!($symbol),
                                source,
                            })?,
                    )*
                })
            }
        }
    };
}

native_api! {
    parasail_free: unsafe extern "C" fn(*mut c_void);

    parasail_result_free: unsafe extern "C" fn(*mut parasail_result_t);
    parasail_result_is_nw: Predicate;
    parasail_result_is_sg: Predicate;
    parasail_result_is_sw: Predicate;
    parasail_result_is_saturated: Predicate;
    parasail_result_is_banded: Predicate;
    parasail_result_is_scan: Predicate;
    parasail_result_is_striped: Predicate;
    parasail_result_is_diag: Predicate;
    parasail_result_is_blocked: Predicate;
    parasail_result_is_stats: Predicate;
    parasail_result_is_stats_table: Predicate;
    parasail_result_is_stats_rowcol: Predicate;
    parasail_result_is_table: Predicate;
    parasail_result_is_rowcol: Predicate;
    parasail_result_is_trace: Predicate;

    parasail_result_get_matches: IntGetter;
    parasail_result_get_similar: IntGetter;
    parasail_result_get_length: IntGetter;
    parasail_result_get_score_table: BufferGetter;
    parasail_result_get_matches_table: BufferGetter;
    parasail_result_get_similar_table: BufferGetter;
    parasail_result_get_length_table: BufferGetter;
    parasail_result_get_score_row: BufferGetter;
    parasail_result_get_matches_row: BufferGetter;
    parasail_result_get_similar_row: BufferGetter;
    parasail_result_get_length_row: BufferGetter;
    parasail_result_get_score_col: BufferGetter;
    parasail_result_get_matches_col: BufferGetter;
    parasail_result_get_similar_col: BufferGetter;
    parasail_result_get_length_col: BufferGetter;

    parasail_result_get_cigar: unsafe extern "C" fn(
        *const parasail_result_t,
        *const c_char,
        c_int,
        *const c_char,
        c_int,
        *const parasail_matrix_t,
    ) -> *mut parasail_cigar_t;
    parasail_result_get_traceback: unsafe extern "C" fn(
        *const parasail_result_t,
        *const c_char,
        c_int,
        *const c_char,
        c_int,
        *const parasail_matrix_t,
        c_char,
        c_char,
        c_char,
    ) -> *mut parasail_traceback_t;
    parasail_traceback_free: unsafe extern "C" fn(*mut parasail_traceback_t);

    parasail_cigar_free: unsafe extern "C" fn(*mut parasail_cigar_t);
    parasail_cigar_encode: unsafe extern "C" fn(u32, c_char) -> u32;
    parasail_cigar_encode_string: unsafe extern "C" fn(*const c_char) -> *mut parasail_cigar_t;
    parasail_cigar_decode_op: unsafe extern "C" fn(u32) -> c_char;
    parasail_cigar_decode_len: unsafe extern "C" fn(u32) -> u32;
    parasail_cigar_decode: unsafe extern "C" fn(*const parasail_cigar_t) -> *mut c_char;

    parasail_matrix_lookup: unsafe extern "C" fn(*const c_char) -> *const parasail_matrix_t;
    parasail_matrix_from_file: unsafe extern "C" fn(*const c_char) -> *mut parasail_matrix_t;
    parasail_matrix_create:
        unsafe extern "C" fn(*const c_char, c_int, c_int) -> *mut parasail_matrix_t;
    parasail_matrix_copy: unsafe extern "C" fn(*const parasail_matrix_t) -> *mut parasail_matrix_t;
    parasail_matrix_set_value: unsafe extern "C" fn(*mut parasail_matrix_t, c_int, c_int, c_int);
    parasail_matrix_free: unsafe extern "C" fn(*mut parasail_matrix_t);

    parasail_profile_create_8: ProfileCreateFn;
    parasail_profile_create_16: ProfileCreateFn;
    parasail_profile_create_32: ProfileCreateFn;
    parasail_profile_create_64: ProfileCreateFn;
    parasail_profile_create_sat: ProfileCreateFn;
    parasail_profile_create_stats_8: ProfileCreateFn;
    parasail_profile_create_stats_16: ProfileCreateFn;
    parasail_profile_create_stats_32: ProfileCreateFn;
    parasail_profile_create_stats_64: ProfileCreateFn;
    parasail_profile_create_stats_sat: ProfileCreateFn;
    parasail_profile_free: unsafe extern "C" fn(*mut parasail_profile_t);

    parasail_sequences_from_file: unsafe extern "C" fn(*const c_char) -> *mut parasail_sequences_t;
    parasail_sequences_free: unsafe extern "C" fn(*mut parasail_sequences_t);

    parasail_nw_banded: unsafe extern "C" fn(
        *const c_char,
        c_int,
        *const c_char,
        c_int,
        c_int,
        c_int,
        c_int,
        *const parasail_matrix_t,
    ) -> *mut parasail_result_t;

    parasail_ssw: unsafe extern "C" fn(
        *const c_char,
        c_int,
        *const c_char,
        c_int,
        c_int,
        c_int,
        *const parasail_matrix_t,
    ) -> *mut parasail_result_ssw_t;
    parasail_ssw_profile: unsafe extern "C" fn(
        *const parasail_profile_t,
        *const c_char,
        c_int,
        c_int,
        c_int,
    ) -> *mut parasail_result_ssw_t;
    parasail_ssw_init: unsafe extern "C" fn(
        *const c_char,
        c_int,
        *const parasail_matrix_t,
        i8,
    ) -> *mut parasail_profile_t;
    parasail_result_ssw_free: unsafe extern "C" fn(*mut parasail_result_ssw_t);
}

/// Optional CPU-dispatch probes; older builds do not export all of them.
#[derive(Clone, Copy, Default)]
pub(crate) struct CpuProbes {
    pub(crate) avx2: Option<CpuProbe>,
    pub(crate) sse41: Option<CpuProbe>,
    pub(crate) sse2: Option<CpuProbe>,
    pub(crate) altivec: Option<CpuProbe>,
    pub(crate) neon: Option<CpuProbe>,
}

impl CpuProbes {
    /// # Safety
    ///
    /// Exported probes must have the `int (void)` signature.
    pub(crate) unsafe fn resolve(library: &Library) -> Self {
        let probe = |symbol: &[u8]| library.get::<CpuProbe>(symbol).ok().map(|s| *s);
        Self {
            avx2: probe(b"parasail_can_use_avx2\0"),
            sse41: probe(b"parasail_can_use_sse41\0"),
            sse2: probe(b"parasail_can_use_sse2\0"),
            altivec: probe(b"parasail_can_use_altivec\0"),
            neon: probe(b"parasail_can_use_neon\0"),
        }
    }
}
