//! In-process stand-in for the native library, for unit tests.
//!
//! Every function in [`NativeApi`] is backed by an `extern "C"` stub with the
//! real signature. The stubs compute toy alignments (position-wise identity,
//! leftover query as insertion, leftover reference as deletion), record every
//! release and selected native calls by address, and leak their allocations
//! so recorded addresses are never reused within a test run.
//!
//! The flag word layout is private to this module; handles only ever read it
//! through the predicates, exactly as with the real library.

use std::cell::Cell;
use std::collections::HashMap;
use std::ffi::{c_char, c_float, c_int, c_void, CStr, CString};
use std::sync::{Mutex, OnceLock};

use libc::size_t;

use crate::ffi::*;
use crate::library::{Binding, Parasail};
use crate::matrix::Matrix;
use crate::variant::{Algorithm, Detail, Implementation, Strategy, Variant};

/// Gap-open value that makes stub alignments report saturation
pub const SATURATING_OPEN: i32 = 99;

/// Query for which stub alignments return null
pub const NULL_QUERY: &str = "NULL";

const NW: c_int = 1;
const SG: c_int = 1 << 1;
const SW: c_int = 1 << 2;
const STATS: c_int = 1 << 3;
const TABLE: c_int = 1 << 4;
const ROWCOL: c_int = 1 << 5;
const TRACE: c_int = 1 << 6;
const SATURATED: c_int = 1 << 7;
const BANDED: c_int = 1 << 8;
const SCAN: c_int = 1 << 9;
const STRIPED: c_int = 1 << 10;
const DIAG: c_int = 1 << 11;

const STATS_TABLE: c_int = STATS | TABLE;
const STATS_ROWCOL: c_int = STATS | ROWCOL;

const OPS: &[u8; 10] = b"MIDNSHP=XB";

// ============================================================================
// Call recording
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Release,
    Cigar,
    Getter,
    SetValue,
}

static EVENTS: Mutex<Vec<(Event, usize)>> = Mutex::new(Vec::new());

thread_local! {
    static FROM_FILE_CALLS: Cell<usize> = Cell::new(0);
}

fn record<T>(event: Event, ptr: *const T) {
    let mut events = EVENTS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    events.push((event, ptr as usize));
}

fn count(event: Event, addr: usize) -> usize {
    let events = EVENTS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    events.iter().filter(|&&(e, a)| e == event && a == addr).count()
}

/// Times the resource at `addr` was released
pub fn release_count(addr: usize) -> usize {
    count(Event::Release, addr)
}

/// Times a CIGAR was computed from the result at `addr`
pub fn cigar_calls(addr: usize) -> usize {
    count(Event::Cigar, addr)
}

/// Times a stats, table, row or column getter ran on the result at `addr`
pub fn getter_calls(addr: usize) -> usize {
    count(Event::Getter, addr)
}

/// Cells written into the matrix at `addr`
pub fn set_value_calls(addr: usize) -> usize {
    count(Event::SetValue, addr)
}

/// Matrix files loaded on the current thread
pub fn from_file_calls() -> usize {
    FROM_FILE_CALLS.with(Cell::get)
}

/// Query bytes the native profile at `addr` points to
pub fn profile_query(addr: usize) -> Vec<u8> {
    // SAFETY: stub profiles are leaked, so the address stays valid.
    unsafe {
        let profile = &*(addr as *const parasail_profile_t);
        input(profile.s1, profile.s1Len).to_vec()
    }
}

// ============================================================================
// Toy alignment
// ============================================================================

/// Score the stubs report: identical residues at equal offsets
pub fn mock_score(query: &[u8], reference: &[u8]) -> i32 {
    query.iter().zip(reference).filter(|(q, r)| q == r).count() as i32
}

fn mock_cigar(query: &[u8], reference: &[u8]) -> Vec<u32> {
    let mut ops: Vec<(u32, u32)> = Vec::new();
    let mut push = |op: u32, len: u32| match ops.last_mut() {
        Some((last, n)) if *last == op => *n += len,
        _ => ops.push((op, len)),
    };
    for (q, r) in query.iter().zip(reference) {
        push(if q == r { 7 } else { 8 }, 1);
    }
    if query.len() > reference.len() {
        push(1, (query.len() - reference.len()) as u32);
    }
    if reference.len() > query.len() {
        push(2, (reference.len() - query.len()) as u32);
    }
    ops.into_iter().map(|(op, len)| len << 4 | op).collect()
}

unsafe fn input<'a>(ptr: *const c_char, len: c_int) -> &'a [u8] {
    if ptr.is_null() || len <= 0 {
        return &[];
    }
    std::slice::from_raw_parts(ptr.cast(), len as usize)
}

fn leak<T>(values: Vec<T>) -> *mut T {
    Box::leak(values.into_boxed_slice()).as_mut_ptr()
}

fn leak_string(bytes: &[u8]) -> parasail_string_t {
    if bytes.is_empty() {
        return parasail_string_t {
            l: 0,
            s: std::ptr::null_mut(),
        };
    }
    parasail_string_t {
        l: bytes.len() as size_t,
        s: leak(bytes.to_vec()).cast(),
    }
}

// ============================================================================
// Results
// ============================================================================

#[repr(C)]
struct MockResult {
    base: parasail_result_t,
    // matches, similar, length
    stats: [c_int; 3],
    // score, matches, similar, length
    tables: [Vec<c_int>; 4],
    rows: [Vec<c_int>; 4],
    cols: [Vec<c_int>; 4],
}

fn build_result(
    query: &[u8],
    reference: &[u8],
    open: c_int,
    mut flag: c_int,
) -> *mut parasail_result_t {
    if query == NULL_QUERY.as_bytes() {
        return std::ptr::null_mut();
    }
    if open == SATURATING_OPEN {
        flag |= SATURATED;
    }

    let (rows, cols) = (query.len(), reference.len());
    let score = mock_score(query, reference);
    let table: Vec<c_int> = (0..rows * cols).map(|i| i as c_int).collect();
    let row: Vec<c_int> = (0..cols).map(|j| j as c_int).collect();
    let col: Vec<c_int> = (0..rows).map(|i| i as c_int).collect();

    let result = MockResult {
        base: parasail_result_t {
            score,
            end_query: rows as c_int - 1,
            end_ref: cols as c_int - 1,
            flag,
            extra: std::ptr::null_mut(),
        },
        stats: [score, score, rows.min(cols) as c_int],
        tables: [table.clone(), table.clone(), table.clone(), table],
        rows: [row.clone(), row.clone(), row.clone(), row],
        cols: [col.clone(), col.clone(), col.clone(), col],
    };
    Box::into_raw(Box::new(result)).cast()
}

unsafe fn mock(result: *const parasail_result_t) -> &'static MockResult {
    record(Event::Getter, result);
    &*result.cast::<MockResult>()
}

unsafe fn has(result: *const parasail_result_t, bits: c_int) -> c_int {
    c_int::from((*result).flag & bits == bits)
}

unsafe extern "C" fn align<const ALG: c_int, const MODE: c_int, const STRATEGY: c_int>(
    s1: *const c_char,
    s1_len: c_int,
    s2: *const c_char,
    s2_len: c_int,
    open: c_int,
    _extend: c_int,
    _matrix: *const parasail_matrix_t,
) -> *mut parasail_result_t {
    build_result(input(s1, s1_len), input(s2, s2_len), open, ALG | MODE | STRATEGY)
}

unsafe extern "C" fn align_profile<const ALG: c_int, const MODE: c_int, const STRATEGY: c_int>(
    profile: *const parasail_profile_t,
    s2: *const c_char,
    s2_len: c_int,
    open: c_int,
    _extend: c_int,
) -> *mut parasail_result_t {
    let profile = &*profile;
    build_result(input(profile.s1, profile.s1Len), input(s2, s2_len), open, ALG | MODE | STRATEGY)
}

unsafe extern "C" fn nw_banded(
    s1: *const c_char,
    s1_len: c_int,
    s2: *const c_char,
    s2_len: c_int,
    open: c_int,
    _extend: c_int,
    _band: c_int,
    _matrix: *const parasail_matrix_t,
) -> *mut parasail_result_t {
    build_result(input(s1, s1_len), input(s2, s2_len), open, NW | BANDED)
}

fn pair<const ALG: c_int, const MODE: c_int, const STRATEGY: c_int>() -> (AlignFn, ProfileAlignFn) {
    (
        align::<ALG, MODE, STRATEGY> as AlignFn,
        align_profile::<ALG, MODE, STRATEGY> as ProfileAlignFn,
    )
}

fn by_strategy<const ALG: c_int, const MODE: c_int>(variant: Variant) -> (AlignFn, ProfileAlignFn) {
    let strategy = match variant.implementation() {
        Implementation::Serial => None,
        Implementation::SerialScan => Some(Strategy::Scan),
        Implementation::Vector(s, _) | Implementation::Profile(s, _) => Some(s),
    };
    match strategy {
        None => pair::<ALG, MODE, 0>(),
        Some(Strategy::Scan) => pair::<ALG, MODE, { SCAN }>(),
        Some(Strategy::Striped) => pair::<ALG, MODE, { STRIPED }>(),
        Some(Strategy::Diagonal) => pair::<ALG, MODE, { DIAG }>(),
    }
}

fn by_mode<const ALG: c_int>(variant: Variant) -> (AlignFn, ProfileAlignFn) {
    match (variant.stats(), variant.detail()) {
        (false, Detail::Score) | (true, Detail::Trace) => by_strategy::<ALG, 0>(variant),
        (false, Detail::Table) => by_strategy::<ALG, { TABLE }>(variant),
        (false, Detail::RowCol) => by_strategy::<ALG, { ROWCOL }>(variant),
        (false, Detail::Trace) => by_strategy::<ALG, { TRACE }>(variant),
        (true, Detail::Score) => by_strategy::<ALG, { STATS }>(variant),
        (true, Detail::Table) => by_strategy::<ALG, { STATS_TABLE }>(variant),
        (true, Detail::RowCol) => by_strategy::<ALG, { STATS_ROWCOL }>(variant),
    }
}

fn entry(variant: Variant) -> (AlignFn, ProfileAlignFn) {
    match variant.algorithm() {
        Algorithm::Global => by_mode::<{ NW }>(variant),
        Algorithm::SemiGlobal => by_mode::<{ SG }>(variant),
        Algorithm::Local => by_mode::<{ SW }>(variant),
    }
}

unsafe extern "C" fn result_free(result: *mut parasail_result_t) {
    record(Event::Release, result);
}

unsafe extern "C" fn is_nw(r: *const parasail_result_t) -> c_int {
    has(r, NW)
}
unsafe extern "C" fn is_sg(r: *const parasail_result_t) -> c_int {
    has(r, SG)
}
unsafe extern "C" fn is_sw(r: *const parasail_result_t) -> c_int {
    has(r, SW)
}
unsafe extern "C" fn is_saturated(r: *const parasail_result_t) -> c_int {
    has(r, SATURATED)
}
unsafe extern "C" fn is_banded(r: *const parasail_result_t) -> c_int {
    has(r, BANDED)
}
unsafe extern "C" fn is_scan(r: *const parasail_result_t) -> c_int {
    has(r, SCAN)
}
unsafe extern "C" fn is_striped(r: *const parasail_result_t) -> c_int {
    has(r, STRIPED)
}
unsafe extern "C" fn is_diag(r: *const parasail_result_t) -> c_int {
    has(r, DIAG)
}
unsafe extern "C" fn is_blocked(_r: *const parasail_result_t) -> c_int {
    0
}
unsafe extern "C" fn is_stats(r: *const parasail_result_t) -> c_int {
    has(r, STATS)
}
unsafe extern "C" fn is_stats_table(r: *const parasail_result_t) -> c_int {
    has(r, STATS_TABLE)
}
unsafe extern "C" fn is_stats_rowcol(r: *const parasail_result_t) -> c_int {
    has(r, STATS_ROWCOL)
}
unsafe extern "C" fn is_table(r: *const parasail_result_t) -> c_int {
    has(r, TABLE)
}
unsafe extern "C" fn is_rowcol(r: *const parasail_result_t) -> c_int {
    has(r, ROWCOL)
}
unsafe extern "C" fn is_trace(r: *const parasail_result_t) -> c_int {
    has(r, TRACE)
}

macro_rules! stat_getters {
    ($( $name:ident => $index:expr; )*) => {
        $(
            unsafe extern "C" fn $name(r: *const parasail_result_t) -> c_int {
                mock(r).stats[$index]
            }
        )*
    };
}

stat_getters! {
    get_matches => 0;
    get_similar => 1;
    get_length => 2;
}

macro_rules! buffer_getters {
    ($( $name:ident => $field:ident[$index:expr]; )*) => {
        $(
            unsafe extern "C" fn $name(r: *const parasail_result_t) -> *mut c_int {
                mock(r).$field[$index].as_ptr().cast_mut()
            }
        )*
    };
}

buffer_getters! {
    get_score_table => tables[0];
    get_matches_table => tables[1];
    get_similar_table => tables[2];
    get_length_table => tables[3];
    get_score_row => rows[0];
    get_matches_row => rows[1];
    get_similar_row => rows[2];
    get_length_row => rows[3];
    get_score_col => cols[0];
    get_matches_col => cols[1];
    get_similar_col => cols[2];
    get_length_col => cols[3];
}

// ============================================================================
// Traceback and CIGAR
// ============================================================================

fn new_cigar(codes: Vec<u32>) -> *mut parasail_cigar_t {
    let len = codes.len() as c_int;
    let seq = if codes.is_empty() {
        std::ptr::null_mut()
    } else {
        leak(codes)
    };
    Box::into_raw(Box::new(parasail_cigar_t {
        seq,
        len,
        beg_query: 0,
        beg_ref: 0,
    }))
}

unsafe extern "C" fn get_cigar(
    result: *const parasail_result_t,
    s1: *const c_char,
    s1_len: c_int,
    s2: *const c_char,
    s2_len: c_int,
    _matrix: *const parasail_matrix_t,
) -> *mut parasail_cigar_t {
    record(Event::Cigar, result);
    if s1_len == 0 {
        return std::ptr::null_mut();
    }
    new_cigar(mock_cigar(input(s1, s1_len), input(s2, s2_len)))
}

#[allow(clippy::too_many_arguments)]
unsafe extern "C" fn get_traceback(
    _result: *const parasail_result_t,
    s1: *const c_char,
    s1_len: c_int,
    s2: *const c_char,
    s2_len: c_int,
    _matrix: *const parasail_matrix_t,
    matched: c_char,
    _similar: c_char,
    mismatched: c_char,
) -> *mut parasail_traceback_t {
    let (query, reference) = (input(s1, s1_len), input(s2, s2_len));
    let width = query.len().max(reference.len());
    let (mut q, mut c, mut r) = (Vec::new(), Vec::new(), Vec::new());
    for i in 0..width {
        let (a, b) = (query.get(i).copied(), reference.get(i).copied());
        q.push(a.unwrap_or(b'-'));
        r.push(b.unwrap_or(b'-'));
        c.push(match (a, b) {
            (Some(a), Some(b)) if a == b => matched as u8,
            (Some(_), Some(_)) => mismatched as u8,
            _ => b' ',
        });
    }
    let line = |bytes: Vec<u8>| {
        CString::new(bytes)
            .map(CString::into_raw)
            .unwrap_or(std::ptr::null_mut())
    };
    Box::into_raw(Box::new(parasail_traceback_t {
        query: line(q),
        comp: line(c),
        ref_: line(r),
    }))
}

unsafe extern "C" fn traceback_free(traceback: *mut parasail_traceback_t) {
    record(Event::Release, traceback);
}

unsafe extern "C" fn cigar_free(cigar: *mut parasail_cigar_t) {
    record(Event::Release, cigar);
}

unsafe extern "C" fn cigar_encode(length: u32, op: c_char) -> u32 {
    let code = OPS.iter().position(|&c| c == op as u8).unwrap_or(0) as u32;
    length << 4 | code
}

unsafe extern "C" fn cigar_encode_string(text: *const c_char) -> *mut parasail_cigar_t {
    let text = CStr::from_ptr(text).to_bytes();
    let mut codes = Vec::new();
    let mut length: u32 = 0;
    for &byte in text {
        if byte.is_ascii_digit() {
            length = length * 10 + u32::from(byte - b'0');
        } else {
            match OPS.iter().position(|&c| c == byte) {
                Some(code) => codes.push(length << 4 | code as u32),
                None => return std::ptr::null_mut(),
            }
            length = 0;
        }
    }
    new_cigar(codes)
}

unsafe extern "C" fn cigar_decode_op(code: u32) -> c_char {
    let op = (code & 0xF) as usize;
    OPS.get(op).copied().unwrap_or(b'M') as c_char
}

unsafe extern "C" fn cigar_decode_len(code: u32) -> u32 {
    code >> 4
}

unsafe extern "C" fn cigar_decode(cigar: *const parasail_cigar_t) -> *mut c_char {
    let cigar = &*cigar;
    let codes: &[u32] = if cigar.seq.is_null() || cigar.len <= 0 {
        &[]
    } else {
        std::slice::from_raw_parts(cigar.seq, cigar.len as usize)
    };
    let text: String = codes
        .iter()
        .map(|&code| {
            let op = OPS.get((code & 0xF) as usize).copied().unwrap_or(b'M');
            format!("{}{}", code >> 4, char::from(op))
        })
        .collect();
    CString::new(text).map(CString::into_raw).unwrap_or(std::ptr::null_mut())
}

unsafe extern "C" fn parasail_free(ptr: *mut c_void) {
    record(Event::Release, ptr);
}

// ============================================================================
// Matrices
// ============================================================================

fn new_matrix(name: &[u8], size: usize, scores: Vec<c_int>, owned: bool) -> *mut parasail_matrix_t {
    let max = scores.iter().copied().max().unwrap_or(0);
    let min = scores.iter().copied().min().unwrap_or(0);
    let data = leak(scores);
    let name = CString::new(name).map(CString::into_raw).unwrap_or(std::ptr::null_mut());
    Box::into_raw(Box::new(parasail_matrix_t {
        name,
        matrix: data.cast_const(),
        mapper: std::ptr::null(),
        size: size as c_int,
        max,
        min,
        user_matrix: if owned { data } else { std::ptr::null_mut() },
    }))
}

fn identity_scores(size: usize, matched: c_int, mismatched: c_int) -> Vec<c_int> {
    (0..size * size)
        .map(|i| if i / size == i % size { matched } else { mismatched })
        .collect()
}

unsafe extern "C" fn matrix_lookup(name: *const c_char) -> *const parasail_matrix_t {
    static BLOSUM62: OnceLock<usize> = OnceLock::new();
    if CStr::from_ptr(name).to_bytes() != b"blosum62" {
        return std::ptr::null();
    }
    let addr = *BLOSUM62
        .get_or_init(|| new_matrix(b"blosum62", 4, identity_scores(4, 4, -1), false) as usize);
    addr as *const parasail_matrix_t
}

unsafe extern "C" fn matrix_from_file(path: *const c_char) -> *mut parasail_matrix_t {
    FROM_FILE_CALLS.with(|calls| calls.set(calls.get() + 1));
    new_matrix(CStr::from_ptr(path).to_bytes(), 2, identity_scores(2, 3, -1), true)
}

unsafe extern "C" fn matrix_create(
    alphabet: *const c_char,
    matched: c_int,
    mismatched: c_int,
) -> *mut parasail_matrix_t {
    let size = CStr::from_ptr(alphabet).to_bytes().len();
    new_matrix(b"user", size, identity_scores(size, matched, mismatched), true)
}

unsafe extern "C" fn matrix_copy(matrix: *const parasail_matrix_t) -> *mut parasail_matrix_t {
    let matrix = &*matrix;
    let size = matrix.size as usize;
    let scores = std::slice::from_raw_parts(matrix.matrix, size * size).to_vec();
    new_matrix(CStr::from_ptr(matrix.name).to_bytes(), size, scores, true)
}

unsafe extern "C" fn matrix_set_value(
    matrix: *mut parasail_matrix_t,
    row: c_int,
    col: c_int,
    value: c_int,
) {
    record(Event::SetValue, matrix);
    let matrix = &mut *matrix;
    let index = row as usize * matrix.size as usize + col as usize;
    *matrix.user_matrix.add(index) = value;
    matrix.max = matrix.max.max(value);
    matrix.min = matrix.min.min(value);
}

unsafe extern "C" fn matrix_free(matrix: *mut parasail_matrix_t) {
    record(Event::Release, matrix);
}

// ============================================================================
// Profiles, SSW, sequences
// ============================================================================

unsafe extern "C" fn profile_create(
    s1: *const c_char,
    s1_len: c_int,
    matrix: *const parasail_matrix_t,
) -> *mut parasail_profile_t {
    let empty = || parasail_profile_data_t {
        score: std::ptr::null_mut(),
        matches: std::ptr::null_mut(),
        similar: std::ptr::null_mut(),
    };
    Box::into_raw(Box::new(parasail_profile_t {
        s1,
        s1Len: s1_len,
        matrix,
        profile8: empty(),
        profile16: empty(),
        profile32: empty(),
        profile64: empty(),
        free: std::ptr::null_mut(),
        stop: 0,
    }))
}

unsafe extern "C" fn ssw_init(
    s1: *const c_char,
    s1_len: c_int,
    matrix: *const parasail_matrix_t,
    _score_size: i8,
) -> *mut parasail_profile_t {
    profile_create(s1, s1_len, matrix)
}

unsafe extern "C" fn profile_free(profile: *mut parasail_profile_t) {
    record(Event::Release, profile);
}

fn build_ssw(query: &[u8], reference: &[u8]) -> *mut parasail_result_ssw_t {
    let codes = mock_cigar(query, reference);
    Box::into_raw(Box::new(parasail_result_ssw_t {
        score1: mock_score(query, reference) as u16,
        ref_begin1: 0,
        ref_end1: reference.len() as i32 - 1,
        read_begin1: 0,
        read_end1: query.len() as i32 - 1,
        cigarLen: codes.len() as i32,
        cigar: leak(codes),
    }))
}

unsafe extern "C" fn ssw(
    s1: *const c_char,
    s1_len: c_int,
    s2: *const c_char,
    s2_len: c_int,
    _open: c_int,
    _extend: c_int,
    _matrix: *const parasail_matrix_t,
) -> *mut parasail_result_ssw_t {
    build_ssw(input(s1, s1_len), input(s2, s2_len))
}

unsafe extern "C" fn ssw_profile(
    profile: *const parasail_profile_t,
    s2: *const c_char,
    s2_len: c_int,
    _open: c_int,
    _extend: c_int,
) -> *mut parasail_result_ssw_t {
    let profile = &*profile;
    build_ssw(input(profile.s1, profile.s1Len), input(s2, s2_len))
}

unsafe extern "C" fn result_ssw_free(result: *mut parasail_result_ssw_t) {
    record(Event::Release, result);
}

unsafe extern "C" fn sequences_from_file(path: *const c_char) -> *mut parasail_sequences_t {
    let Ok(path) = CStr::from_ptr(path).to_str() else {
        return std::ptr::null_mut();
    };
    let Ok(contents) = std::fs::read_to_string(path) else {
        return std::ptr::null_mut();
    };

    let mut records: Vec<(String, String, String)> = Vec::new();
    for line in contents.lines() {
        if let Some(header) = line.strip_prefix('>') {
            let (name, comment) = header.split_once(' ').unwrap_or((header, ""));
            records.push((name.to_string(), comment.to_string(), String::new()));
        } else if let Some((_, _, seq)) = records.last_mut() {
            seq.push_str(line.trim());
        }
    }

    let lengths: Vec<usize> = records.iter().map(|(_, _, s)| s.len()).collect();
    let characters: usize = lengths.iter().sum();
    let n = lengths.len().max(1) as c_float;
    let mean = characters as c_float / n;
    let variance = lengths.iter().map(|&l| (l as c_float - mean).powi(2)).sum::<c_float>() / n;

    let seqs: Vec<parasail_sequence_t> = records
        .iter()
        .map(|(name, comment, seq)| {
            let mut seq = leak_string(seq.as_bytes());
            if name == NULL_QUERY {
                seq.s = std::ptr::null_mut();
            }
            parasail_sequence_t {
                name: leak_string(name.as_bytes()),
                comment: leak_string(comment.as_bytes()),
                seq,
                qual: leak_string(b""),
            }
        })
        .collect();

    Box::into_raw(Box::new(parasail_sequences_t {
        l: seqs.len() as size_t,
        seqs: leak(seqs),
        characters: characters as size_t,
        shortest: lengths.iter().copied().min().unwrap_or(0) as size_t,
        longest: lengths.iter().copied().max().unwrap_or(0) as size_t,
        mean,
        stddev: variance.sqrt(),
    }))
}

unsafe extern "C" fn sequences_free(sequences: *mut parasail_sequences_t) {
    record(Event::Release, sequences);
}

// ============================================================================
// Assembly
// ============================================================================

fn mock_api() -> NativeApi {
    NativeApi {
        parasail_free,
        parasail_result_free: result_free,
        parasail_result_is_nw: is_nw,
        parasail_result_is_sg: is_sg,
        parasail_result_is_sw: is_sw,
        parasail_result_is_saturated: is_saturated,
        parasail_result_is_banded: is_banded,
        parasail_result_is_scan: is_scan,
        parasail_result_is_striped: is_striped,
        parasail_result_is_diag: is_diag,
        parasail_result_is_blocked: is_blocked,
        parasail_result_is_stats: is_stats,
        parasail_result_is_stats_table: is_stats_table,
        parasail_result_is_stats_rowcol: is_stats_rowcol,
        parasail_result_is_table: is_table,
        parasail_result_is_rowcol: is_rowcol,
        parasail_result_is_trace: is_trace,
        parasail_result_get_matches: get_matches,
        parasail_result_get_similar: get_similar,
        parasail_result_get_length: get_length,
        parasail_result_get_score_table: get_score_table,
        parasail_result_get_matches_table: get_matches_table,
        parasail_result_get_similar_table: get_similar_table,
        parasail_result_get_length_table: get_length_table,
        parasail_result_get_score_row: get_score_row,
        parasail_result_get_matches_row: get_matches_row,
        parasail_result_get_similar_row: get_similar_row,
        parasail_result_get_length_row: get_length_row,
        parasail_result_get_score_col: get_score_col,
        parasail_result_get_matches_col: get_matches_col,
        parasail_result_get_similar_col: get_similar_col,
        parasail_result_get_length_col: get_length_col,
        parasail_result_get_cigar: get_cigar,
        parasail_result_get_traceback: get_traceback,
        parasail_traceback_free: traceback_free,
        parasail_cigar_free: cigar_free,
        parasail_cigar_encode: cigar_encode,
        parasail_cigar_encode_string: cigar_encode_string,
        parasail_cigar_decode_op: cigar_decode_op,
        parasail_cigar_decode_len: cigar_decode_len,
        parasail_cigar_decode: cigar_decode,
        parasail_matrix_lookup: matrix_lookup,
        parasail_matrix_from_file: matrix_from_file,
        parasail_matrix_create: matrix_create,
        parasail_matrix_copy: matrix_copy,
        parasail_matrix_set_value: matrix_set_value,
        parasail_matrix_free: matrix_free,
        parasail_profile_create_8: profile_create,
        parasail_profile_create_16: profile_create,
        parasail_profile_create_32: profile_create,
        parasail_profile_create_64: profile_create,
        parasail_profile_create_sat: profile_create,
        parasail_profile_create_stats_8: profile_create,
        parasail_profile_create_stats_16: profile_create,
        parasail_profile_create_stats_32: profile_create,
        parasail_profile_create_stats_64: profile_create,
        parasail_profile_create_stats_sat: profile_create,
        parasail_profile_free: profile_free,
        parasail_sequences_from_file: sequences_from_file,
        parasail_sequences_free: sequences_free,
        parasail_nw_banded: nw_banded,
        parasail_ssw: ssw,
        parasail_ssw_profile: ssw_profile,
        parasail_ssw_init: ssw_init,
        parasail_result_ssw_free: result_ssw_free,
    }
}

/// Stub library exporting every variant except `missing`
pub fn mock_parasail_without(missing: &str) -> Parasail {
    let mut sequence_fns = HashMap::new();
    let mut profile_fns = HashMap::new();
    for variant in Variant::all().into_iter().filter(|v| v.name() != missing) {
        let (align, profile) = entry(variant);
        if variant.is_profile() {
            profile_fns.insert(variant, profile);
        } else {
            sequence_fns.insert(variant, align);
        }
    }
    Parasail::from_binding(Binding::from_parts(mock_api(), sequence_fns, profile_fns))
}

/// Stub library exporting every variant
pub fn mock_parasail() -> Parasail {
    mock_parasail_without("")
}

/// Owned 4x4 match/mismatch matrix over `ACGT`
pub fn mock_matrix(parasail: &Parasail) -> Matrix {
    Matrix::create(parasail, "ACGT", 1, -1).unwrap()
}
