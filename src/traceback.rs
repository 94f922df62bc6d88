//! Traceback strings: the aligned query, a comparison line and the aligned
//! reference, as returned by `parasail_result_get_traceback`.

use std::ffi::CStr;
use std::fmt;
use std::ptr::NonNull;

use crate::error::{ParasailError, Result};
use crate::ffi::parasail_traceback_t;
use crate::library::Parasail;

/// Comparison marker for identical residues
pub const MATCH_MARKER: u8 = b'|';
/// Comparison marker for positive-scoring substitutions
pub const SIMILAR_MARKER: u8 = b':';
/// Comparison marker for everything else
pub const MISMATCH_MARKER: u8 = b'.';

/// Owned native traceback
pub struct Traceback {
    raw: NonNull<parasail_traceback_t>,
    parasail: Parasail,
}

// SAFETY: immutable after creation, released exactly once from Drop.
unsafe impl Send for Traceback {}
unsafe impl Sync for Traceback {}

impl Traceback {
    /// Take ownership of a native traceback.
    ///
    /// A null traceback, or one with a null or non-UTF-8 line, is rejected;
    /// the resource is still released in the latter cases.
    pub(crate) fn from_raw(
        parasail: &Parasail,
        raw: *mut parasail_traceback_t,
        call: &str,
    ) -> Result<Self> {
        let raw = NonNull::new(raw).ok_or_else(|| ParasailError::allocation(call))?;
        let traceback = Self {
            raw,
            parasail: parasail.clone(),
        };
        for line in traceback.lines() {
            let line = line.ok_or_else(|| ParasailError::allocation(call))?;
            line.to_str()?;
        }
        Ok(traceback)
    }

    fn lines(&self) -> [Option<&CStr>; 3] {
        // SAFETY: non-null and alive until Drop.
        let raw = unsafe { self.raw.as_ref() };
        [raw.query, raw.comp, raw.ref_].map(|ptr| {
            // SAFETY: non-null lines are NUL-terminated strings owned by
            // this traceback.
            (!ptr.is_null()).then(|| unsafe { CStr::from_ptr(ptr) })
        })
    }

    fn line(&self, index: usize) -> &str {
        // Validated as present and UTF-8 in from_raw
        self.lines()[index].and_then(|l| l.to_str().ok()).unwrap_or_default()
    }

    /// Aligned query, with `-` for gaps
    pub fn query(&self) -> &str {
        self.line(0)
    }

    /// Comparison line
    pub fn comp(&self) -> &str {
        self.line(1)
    }

    /// Aligned reference, with `-` for gaps
    pub fn reference(&self) -> &str {
        self.line(2)
    }

    #[cfg(test)]
    pub(crate) fn address(&self) -> usize {
        self.raw.as_ptr() as usize
    }
}

impl fmt::Display for Traceback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.query())?;
        writeln!(f, "{}", self.comp())?;
        write!(f, "{}", self.reference())
    }
}

impl fmt::Debug for Traceback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traceback")
            .field("query", &self.query())
            .field("comp", &self.comp())
            .field("reference", &self.reference())
            .finish()
    }
}

impl Drop for Traceback {
    fn drop(&mut self) {
        log::trace!("releasing parasail traceback {:p}", self.raw);
        // SAFETY: owned, released exactly once.
        unsafe { (self.parasail.api().parasail_traceback_free)(self.raw.as_ptr()) };
    }
}
