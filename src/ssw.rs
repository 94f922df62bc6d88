//! SSW-compatible local alignment.
//!
//! parasail can emulate the result layout of the SSW library: one best score,
//! zero-based begin/end coordinates on both sequences and a packed CIGAR.
//! Useful as a drop-in for code written against SSW.

use std::fmt;
use std::ptr::NonNull;

use crate::align::c_len;
use crate::cigar::{codec, CigarOp};
use crate::error::{ParasailError, Result};
use crate::ffi::parasail_result_ssw_t;
use crate::library::Parasail;
use crate::matrix::Matrix;
use crate::profile::{Profile, ProfileKind};
use crate::view;

/// Owned native SSW result
pub struct SswResult {
    raw: NonNull<parasail_result_ssw_t>,
    parasail: Parasail,
}

// SAFETY: read-only after creation, released exactly once from Drop.
unsafe impl Send for SswResult {}
unsafe impl Sync for SswResult {}

impl SswResult {
    fn from_raw(parasail: &Parasail, raw: *mut parasail_result_ssw_t, call: &str) -> Result<Self> {
        let raw = NonNull::new(raw).ok_or_else(|| ParasailError::allocation(call))?;
        Ok(Self {
            raw,
            parasail: parasail.clone(),
        })
    }

    fn raw(&self) -> &parasail_result_ssw_t {
        // SAFETY: non-null and alive until Drop.
        unsafe { self.raw.as_ref() }
    }

    /// Best alignment score
    pub fn score(&self) -> u16 {
        self.raw().score1
    }

    /// Zero-based reference begin
    pub fn ref_begin(&self) -> i32 {
        self.raw().ref_begin1
    }

    /// Zero-based reference end
    pub fn ref_end(&self) -> i32 {
        self.raw().ref_end1
    }

    /// Zero-based query (read) begin
    pub fn read_begin(&self) -> i32 {
        self.raw().read_begin1
    }

    /// Zero-based query (read) end
    pub fn read_end(&self) -> i32 {
        self.raw().read_end1
    }

    /// Packed CIGAR codes, borrowed from native memory
    pub fn cigar_codes(&self) -> Result<&[u32]> {
        let raw = self.raw();
        let len = usize::try_from(raw.cigarLen).unwrap_or(0);
        // SAFETY: `cigar` holds `cigarLen` codes owned by this result.
        unsafe { view::slice(raw.cigar.cast_const(), len, "parasail_result_ssw_t.cigar") }
    }

    /// Decoded CIGAR operations
    pub fn cigar_ops(&self) -> Result<Vec<CigarOp>> {
        codec::decode(self.cigar_codes()?)
    }

    /// CIGAR string
    pub fn cigar(&self) -> Result<String> {
        codec::decode_to_string(self.cigar_codes()?)
    }

    #[cfg(test)]
    pub(crate) fn address(&self) -> usize {
        self.raw.as_ptr() as usize
    }
}

impl fmt::Debug for SswResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SswResult")
            .field("score", &self.score())
            .field("ref", &(self.ref_begin(), self.ref_end()))
            .field("read", &(self.read_begin(), self.read_end()))
            .field("cigar", &self.cigar().unwrap_or_default())
            .finish()
    }
}

impl Drop for SswResult {
    fn drop(&mut self) {
        log::trace!("releasing parasail ssw result {:p}", self.raw);
        // SAFETY: owned, released exactly once.
        unsafe { (self.parasail.api().parasail_result_ssw_free)(self.raw.as_ptr()) };
    }
}

impl Parasail {
    /// SSW-compatible local alignment of `query` against `reference`.
    pub fn ssw<Q, R>(
        &self,
        query: Q,
        reference: R,
        open: i32,
        extend: i32,
        matrix: &Matrix,
    ) -> Result<SswResult>
    where
        Q: AsRef<[u8]>,
        R: AsRef<[u8]>,
    {
        let (query, reference) = (query.as_ref(), reference.as_ref());
        let (query_len, ref_len) = (c_len(query.len())?, c_len(reference.len())?);
        // SAFETY: inputs and matrix outlive the call; lengths match buffers.
        let raw = unsafe {
            (self.api().parasail_ssw)(
                query.as_ptr().cast(),
                query_len,
                reference.as_ptr().cast(),
                ref_len,
                open,
                extend,
                matrix.as_ptr(),
            )
        };
        SswResult::from_raw(self, raw, "parasail_ssw")
    }

    /// SSW-compatible alignment of a profile built with [`Profile::ssw`].
    ///
    /// # Errors
    ///
    /// [`ParasailError::IncompatibleProfile`] for a profile from
    /// [`Profile::new`].
    pub fn ssw_profile<R: AsRef<[u8]>>(
        &self,
        profile: &Profile<'_>,
        reference: R,
        open: i32,
        extend: i32,
    ) -> Result<SswResult> {
        if !matches!(profile.kind(), ProfileKind::Ssw { .. }) {
            return Err(ParasailError::IncompatibleProfile {
                variant: "ssw_profile".to_string(),
                reason: "profile was not built with Profile::ssw".to_string(),
            });
        }
        let reference = reference.as_ref();
        let ref_len = c_len(reference.len())?;
        // SAFETY: profile and reference outlive the call.
        let align = self.api().parasail_ssw_profile;
        let raw =
            unsafe { align(profile.as_ptr(), reference.as_ptr().cast(), ref_len, open, extend) };
        SswResult::from_raw(self, raw, "parasail_ssw_profile")
    }
}
