//! CIGAR handles produced by traceback alignments.
//!
//! A [`Cigar`] owns one native `parasail_cigar_t`. It is obtained from an
//! [`AlignResult`](crate::AlignResult) of a traceback variant, or built
//! standalone from a CIGAR string with [`Cigar::encode`]. Either way it is
//! released independently of any alignment result.
//!
//! Packed codes are exposed without copying; textual decoding goes through
//! the pure [`codec`].
//!
//! # Example
//!
//! ```no_run
//! use parasail_bind::{Matrix, Parasail};
//!
//! # fn main() -> parasail_bind::Result<()> {
//! let parasail = Parasail::load()?;
//! let matrix = Matrix::lookup(&parasail, "dnafull")?;
//! let result =
//!     parasail.align_named("sw_trace_striped_16", "GATGTGC", "ATCGATGTGC", 8, 4, &matrix)?;
//!
//! let cigar = result.cigar()?;
//! assert_eq!(cigar.decode()?, "3D7=");
//! assert_eq!((cigar.beg_query(), cigar.beg_ref()), (0, 0));
//! # Ok(())
//! # }
//! ```

pub mod codec;

use std::ffi::{c_char, CStr, CString};
use std::fmt;
use std::ptr::NonNull;

use ndarray::ArrayView1;

pub use codec::CigarOp;

use crate::error::{ParasailError, Result};
use crate::ffi::parasail_cigar_t;
use crate::library::Parasail;
use crate::view;

/// Owned native CIGAR
pub struct Cigar {
    raw: NonNull<parasail_cigar_t>,
    parasail: Parasail,
}

// SAFETY: the native cigar is never mutated after creation and is released
// exactly once, from Drop.
unsafe impl Send for Cigar {}
unsafe impl Sync for Cigar {}

impl Cigar {
    /// Take ownership of a native cigar; null is an allocation failure of `call`.
    pub(crate) fn from_raw(
        parasail: &Parasail,
        raw: *mut parasail_cigar_t,
        call: &str,
    ) -> Result<Self> {
        let raw = NonNull::new(raw).ok_or_else(|| ParasailError::allocation(call))?;
        Ok(Self {
            raw,
            parasail: parasail.clone(),
        })
    }

    /// Build a standalone CIGAR from its textual form.
    ///
    /// The string is validated with [`codec::parse`] before it reaches the
    /// native encoder.
    pub fn encode(parasail: &Parasail, cigar: &str) -> Result<Self> {
        codec::parse(cigar)?;
        let text = CString::new(cigar)?;
        // SAFETY: `text` is NUL-terminated and outlives the call.
        let raw = unsafe { (parasail.api().parasail_cigar_encode_string)(text.as_ptr()) };
        Self::from_raw(parasail, raw, "parasail_cigar_encode_string")
    }

    fn raw(&self) -> &parasail_cigar_t {
        // SAFETY: non-null and alive until Drop.
        unsafe { self.raw.as_ref() }
    }

    /// Number of packed codes
    pub fn len(&self) -> usize {
        usize::try_from(self.raw().len).unwrap_or(0)
    }

    /// Whether the CIGAR has no operations
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-based query position where the alignment begins
    pub fn beg_query(&self) -> i32 {
        self.raw().beg_query
    }

    /// Zero-based reference position where the alignment begins
    pub fn beg_ref(&self) -> i32 {
        self.raw().beg_ref
    }

    #[cfg(test)]
    pub(crate) fn address(&self) -> usize {
        self.raw.as_ptr() as usize
    }

    /// Packed codes, borrowed from native memory
    pub fn codes(&self) -> Result<&[u32]> {
        // SAFETY: `seq` holds `len` codes owned by this handle.
        unsafe { view::slice(self.raw().seq, self.len(), "parasail_cigar_t.seq") }
    }

    /// Packed codes as a one-dimensional view
    pub fn seq(&self) -> Result<ArrayView1<'_, u32>> {
        Ok(ArrayView1::from(self.codes()?))
    }

    /// Decoded operations, adjacent runs merged
    pub fn ops(&self) -> Result<Vec<CigarOp>> {
        codec::decode(self.codes()?)
    }

    /// Textual form, e.g. `"4S10="`
    pub fn decode(&self) -> Result<String> {
        codec::decode_to_string(self.codes()?)
    }

    /// Textual form produced by the native decoder.
    ///
    /// The native string is copied and released with `parasail_free`.
    pub fn decode_native(&self) -> Result<String> {
        let api = self.parasail.api();
        // SAFETY: the cigar is valid; the returned string is NUL-terminated
        // and owned by the caller.
        let text = unsafe { (api.parasail_cigar_decode)(self.raw.as_ptr()) };
        if text.is_null() {
            return Err(ParasailError::allocation("parasail_cigar_decode"));
        }
        // SAFETY: non-null, NUL-terminated, released right after copying.
        let decoded = unsafe { CStr::from_ptr(text) }.to_str().map(str::to_owned);
        unsafe { (api.parasail_free)(text.cast()) };
        Ok(decoded?)
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode() {
            Ok(text) => f.write_str(&text),
            // SAM's "unavailable" marker
            Err(_) => f.write_str("*"),
        }
    }
}

impl fmt::Debug for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cigar")
            .field("codes", &self.codes().unwrap_or_default())
            .field("beg_query", &self.beg_query())
            .field("beg_ref", &self.beg_ref())
            .finish()
    }
}

impl Drop for Cigar {
    fn drop(&mut self) {
        log::trace!("releasing parasail cigar {:p}", self.raw);
        // SAFETY: owned, released exactly once.
        unsafe { (self.parasail.api().parasail_cigar_free)(self.raw.as_ptr()) };
    }
}

impl Parasail {
    /// Pack one operation with the native encoder.
    ///
    /// # Errors
    ///
    /// [`ParasailError::InvalidCigar`] for a non-ASCII symbol.
    pub fn cigar_encode(&self, length: u32, op: char) -> Result<u32> {
        let op = u8::try_from(op)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                ParasailError::InvalidCigar(format!("operation '{}' is not ASCII", op))
            })?;
        // SAFETY: pure function of its arguments.
        Ok(unsafe { (self.api().parasail_cigar_encode)(length, op as c_char) })
    }

    /// Operation symbol of a packed code, from the native decoder
    pub fn cigar_decode_op(&self, code: u32) -> char {
        // SAFETY: pure function of its argument.
        let op = unsafe { (self.api().parasail_cigar_decode_op)(code) };
        char::from(op as u8)
    }

    /// Operation length of a packed code, from the native decoder
    pub fn cigar_decode_len(&self, code: u32) -> u32 {
        // SAFETY: pure function of its argument.
        unsafe { (self.api().parasail_cigar_decode_len)(code) }
    }
}
