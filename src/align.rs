//! Alignment entry points.
//!
//! Every registry variant is reached through one typed call path: pick a
//! [`Variant`] (or parse its stable name), and the matching native function
//! resolved at load time is invoked.
//!
//! ```no_run
//! use parasail_bind::{
//!     Algorithm, Detail, Implementation, Matrix, Parasail, Strategy, Variant, Width,
//! };
//!
//! # fn main() -> parasail_bind::Result<()> {
//! let parasail = Parasail::load()?;
//! let matrix = Matrix::lookup(&parasail, "dnafull")?;
//!
//! let variant = Variant::new(
//!     Algorithm::Local,
//!     false,
//!     Detail::Trace,
//!     Implementation::Vector(Strategy::Striped, Width::W16),
//! )?;
//! let result = parasail.align(variant, "ATCGTTATGTGC", "ATCGATGTGC", 8, 4, &matrix)?;
//! assert_eq!(result.cigar()?.decode()?, "4=2I6=");
//!
//! // Same call by name
//! let result =
//!     parasail.align_named("sw_trace_striped_16", "ATCGTTATGTGC", "ATCGATGTGC", 8, 4, &matrix)?;
//! assert_eq!(result.end_query(), 11);
//! # Ok(())
//! # }
//! ```
//!
//! Each call runs synchronously to completion in native code; there is no
//! timeout or cancellation. Calls take `&self` and hold no lock, so threads
//! sharing a [`Parasail`] align concurrently.

use std::ffi::c_int;

use crate::error::{ParasailError, Result};
use crate::library::Parasail;
use crate::matrix::Matrix;
use crate::profile::{Profile, ProfileKind};
use crate::result::{AlignResult, TraceInputs};
use crate::variant::{Detail, Variant, Width};

/// Convert a buffer length to the native `int` length type.
pub(crate) fn c_len(len: usize) -> Result<c_int> {
    c_int::try_from(len).map_err(|_| ParasailError::SequenceTooLong { len })
}

/// Check that `profile` was built for `variant`.
///
/// The saturating profile carries both 8- and 16-bit data, so it also serves
/// the fixed 8- and 16-bit variants.
fn check_profile(variant: Variant, profile: &Profile<'_>) -> Result<()> {
    let incompatible = |reason: String| ParasailError::IncompatibleProfile {
        variant: variant.name(),
        reason,
    };

    let (width, stats) = match profile.kind() {
        ProfileKind::Vector { width, stats } => (width, stats),
        ProfileKind::Ssw { .. } => {
            return Err(incompatible("SSW profiles only serve ssw_profile".to_string()));
        }
    };

    let wanted = variant.implementation().width();
    let fits = match (wanted, width) {
        (Some(w), p) if w == p => true,
        (Some(Width::W8 | Width::W16), Width::Saturating) => true,
        _ => false,
    };
    if !fits {
        return Err(incompatible(format!(
            "profile was built for {:?} lanes, variant needs {:?}",
            width, wanted
        )));
    }

    if variant.stats() && !stats {
        return Err(incompatible(
            "variant tracks statistics; build the profile with stats".to_string(),
        ));
    }
    Ok(())
}

impl Parasail {
    /// Align `query` against `reference` with a sequence variant.
    ///
    /// # Errors
    ///
    /// - [`ParasailError::InvalidVariant`] for a profile variant
    /// - [`ParasailError::VariantUnavailable`] if the library lacks it
    /// - [`ParasailError::SequenceTooLong`] for inputs beyond `int` range
    /// - [`ParasailError::Allocation`] if the native call returns null
    pub fn align<'m, Q, R>(
        &self,
        variant: Variant,
        query: Q,
        reference: R,
        open: i32,
        extend: i32,
        matrix: &'m Matrix,
    ) -> Result<AlignResult<'m>>
    where
        Q: AsRef<[u8]>,
        R: AsRef<[u8]>,
    {
        let function = self.sequence_fn(variant)?;
        let (query, reference) = (query.as_ref(), reference.as_ref());
        let (query_len, ref_len) = (c_len(query.len())?, c_len(reference.len())?);

        // SAFETY: signature matches the resolved symbol; inputs and matrix
        // outlive the call and lengths match the buffers.
        let raw = unsafe {
            function(
                query.as_ptr().cast(),
                query_len,
                reference.as_ptr().cast(),
                ref_len,
                open,
                extend,
                matrix.as_ptr(),
            )
        };

        let trace_inputs = (variant.detail() == Detail::Trace).then(|| TraceInputs {
            query: query.to_vec(),
            reference: reference.to_vec(),
            matrix,
        });
        AlignResult::from_raw(
            self,
            raw,
            &variant.symbol(),
            Some(variant),
            query.len(),
            reference.len(),
            trace_inputs,
        )
    }

    /// [`Parasail::align`] with the variant given by its stable name
    /// (with or without the `parasail_` prefix).
    pub fn align_named<'m, Q, R>(
        &self,
        name: &str,
        query: Q,
        reference: R,
        open: i32,
        extend: i32,
        matrix: &'m Matrix,
    ) -> Result<AlignResult<'m>>
    where
        Q: AsRef<[u8]>,
        R: AsRef<[u8]>,
    {
        self.align(name.parse()?, query, reference, open, extend, matrix)
    }

    /// Align a precomputed profile against `reference`.
    ///
    /// # Errors
    ///
    /// As [`Parasail::align`], plus [`ParasailError::IncompatibleProfile`]
    /// when the profile's width or statistics do not fit the variant.
    pub fn align_profile<'m, R: AsRef<[u8]>>(
        &self,
        variant: Variant,
        profile: &Profile<'m>,
        reference: R,
        open: i32,
        extend: i32,
    ) -> Result<AlignResult<'m>> {
        let function = self.profile_fn(variant)?;
        check_profile(variant, profile)?;
        let reference = reference.as_ref();
        let ref_len = c_len(reference.len())?;

        // SAFETY: as for `align`; the profile outlives the call.
        let raw =
            unsafe { function(profile.as_ptr(), reference.as_ptr().cast(), ref_len, open, extend) };

        let trace_inputs = (variant.detail() == Detail::Trace).then(|| TraceInputs {
            query: profile.query().to_vec(),
            reference: reference.to_vec(),
            matrix: profile.matrix(),
        });
        AlignResult::from_raw(
            self,
            raw,
            &variant.symbol(),
            Some(variant),
            profile.len(),
            reference.len(),
            trace_inputs,
        )
    }

    /// Banded global alignment (`parasail_nw_banded`) with band width `band`.
    ///
    /// The result has no table, row, column or traceback.
    pub fn align_banded<'m, Q, R>(
        &self,
        query: Q,
        reference: R,
        open: i32,
        extend: i32,
        band: usize,
        matrix: &'m Matrix,
    ) -> Result<AlignResult<'m>>
    where
        Q: AsRef<[u8]>,
        R: AsRef<[u8]>,
    {
        let (query, reference) = (query.as_ref(), reference.as_ref());
        let (query_len, ref_len) = (c_len(query.len())?, c_len(reference.len())?);
        let band = c_int::try_from(band).map_err(|_| ParasailError::SequenceTooLong { len: band })?;

        // SAFETY: as for `align`.
        let raw = unsafe {
            (self.api().parasail_nw_banded)(
                query.as_ptr().cast(),
                query_len,
                reference.as_ptr().cast(),
                ref_len,
                open,
                extend,
                band,
                matrix.as_ptr(),
            )
        };
        AlignResult::from_raw(
            self,
            raw,
            "parasail_nw_banded",
            None,
            query.len(),
            reference.len(),
            None,
        )
    }
}
