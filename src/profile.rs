//! Query profiles.
//!
//! A [`Profile`] precomputes one query against one matrix for a given lane
//! width, so the query can be aligned against many references without
//! rebuilding it. It keeps its own copy of the query (the native struct
//! points into it) and borrows the matrix for as long as it lives.
//!
//! ```no_run
//! use parasail_bind::{Matrix, Parasail, Profile, Width};
//!
//! # fn main() -> parasail_bind::Result<()> {
//! let parasail = Parasail::load()?;
//! let matrix = Matrix::lookup(&parasail, "blosum62")?;
//! let profile = Profile::new(&parasail, "HEAGAWGHEE", &matrix, Width::W16, false)?;
//! let variant = "sw_striped_profile_16".parse()?;
//!
//! for reference in ["PAWHEAE", "HEAGAWGHEE", "GAWGHE"] {
//!     let result = parasail.align_profile(variant, &profile, reference, 10, 1)?;
//!     println!("{reference}: {}", result.score());
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::ptr::NonNull;

use crate::align::c_len;
use crate::error::{ParasailError, Result};
use crate::ffi::{parasail_profile_t, ProfileCreateFn};
use crate::library::Parasail;
use crate::matrix::Matrix;
use crate::variant::Width;

/// How a profile was built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// `parasail_profile_create[_stats]_<width>`, for profile variants
    Vector {
        /// Lane width
        width: Width,
        /// Whether statistics data was built
        stats: bool,
    },
    /// `parasail_ssw_init`, for SSW-compatible alignment
    Ssw {
        /// Requested score size: 0 for 8-bit, 1 for 16-bit, 2 for both
        score_size: i8,
    },
}

/// Owned native query profile
pub struct Profile<'m> {
    raw: NonNull<parasail_profile_t>,
    parasail: Parasail,
    // NUL-terminated; the heap buffer never moves while the profile lives
    query: Box<[u8]>,
    matrix: &'m Matrix,
    kind: ProfileKind,
}

// SAFETY: the native profile is read-only after creation and released
// exactly once from Drop.
unsafe impl Send for Profile<'_> {}
unsafe impl Sync for Profile<'_> {}

fn terminated(query: &[u8]) -> Box<[u8]> {
    let mut buffer = Vec::with_capacity(query.len() + 1);
    buffer.extend_from_slice(query);
    buffer.push(0);
    buffer.into_boxed_slice()
}

impl<'m> Profile<'m> {
    /// Build a profile for the profile variants of `width`.
    pub fn new<Q: AsRef<[u8]>>(
        parasail: &Parasail,
        query: Q,
        matrix: &'m Matrix,
        width: Width,
        stats: bool,
    ) -> Result<Self> {
        let api = parasail.api();
        let (create, call): (ProfileCreateFn, &str) = match (width, stats) {
            (Width::W8, false) => (api.parasail_profile_create_8, "parasail_profile_create_8"),
            (Width::W16, false) => (api.parasail_profile_create_16, "parasail_profile_create_16"),
            (Width::W32, false) => (api.parasail_profile_create_32, "parasail_profile_create_32"),
            (Width::W64, false) => (api.parasail_profile_create_64, "parasail_profile_create_64"),
            (Width::Saturating, false) => {
                (api.parasail_profile_create_sat, "parasail_profile_create_sat")
            }
            (Width::W8, true) => {
                (api.parasail_profile_create_stats_8, "parasail_profile_create_stats_8")
            }
            (Width::W16, true) => {
                (api.parasail_profile_create_stats_16, "parasail_profile_create_stats_16")
            }
            (Width::W32, true) => {
                (api.parasail_profile_create_stats_32, "parasail_profile_create_stats_32")
            }
            (Width::W64, true) => {
                (api.parasail_profile_create_stats_64, "parasail_profile_create_stats_64")
            }
            (Width::Saturating, true) => {
                (api.parasail_profile_create_stats_sat, "parasail_profile_create_stats_sat")
            }
        };

        let query = query.as_ref();
        let len = c_len(query.len())?;
        let query = terminated(query);
        // SAFETY: `query` and `matrix` outlive the profile.
        let raw = unsafe { create(query.as_ptr().cast(), len, matrix.as_ptr()) };
        Self::wrap(parasail, raw, call, query, matrix, ProfileKind::Vector { width, stats })
    }

    /// Build a profile for [`Parasail::ssw_profile`].
    ///
    /// # Errors
    ///
    /// [`ParasailError::IncompatibleProfile`] for a score size other than
    /// 0, 1 or 2.
    pub fn ssw<Q: AsRef<[u8]>>(
        parasail: &Parasail,
        query: Q,
        matrix: &'m Matrix,
        score_size: i8,
    ) -> Result<Self> {
        if !(0..=2).contains(&score_size) {
            return Err(ParasailError::IncompatibleProfile {
                variant: "ssw_init".to_string(),
                reason: format!("score size {} is not 0, 1 or 2", score_size),
            });
        }

        let query = query.as_ref();
        let len = c_len(query.len())?;
        let query = terminated(query);
        // SAFETY: as for `new`.
        let init = parasail.api().parasail_ssw_init;
        let raw = unsafe { init(query.as_ptr().cast(), len, matrix.as_ptr(), score_size) };
        let kind = ProfileKind::Ssw { score_size };
        Self::wrap(parasail, raw, "parasail_ssw_init", query, matrix, kind)
    }

    fn wrap(
        parasail: &Parasail,
        raw: *mut parasail_profile_t,
        call: &str,
        query: Box<[u8]>,
        matrix: &'m Matrix,
        kind: ProfileKind,
    ) -> Result<Self> {
        let raw = NonNull::new(raw).ok_or_else(|| ParasailError::allocation(call))?;
        Ok(Self {
            raw,
            parasail: parasail.clone(),
            query,
            matrix,
            kind,
        })
    }

    pub(crate) fn as_ptr(&self) -> *const parasail_profile_t {
        self.raw.as_ptr().cast_const()
    }

    /// Query the profile was built from
    pub fn query(&self) -> &[u8] {
        &self.query[..self.query.len() - 1]
    }

    /// Query length
    pub fn len(&self) -> usize {
        self.query().len()
    }

    /// Whether the query is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Matrix the profile was built against
    pub fn matrix(&self) -> &'m Matrix {
        self.matrix
    }

    /// How the profile was built
    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    /// Whether statistics data was built
    pub fn has_stats(&self) -> bool {
        matches!(self.kind, ProfileKind::Vector { stats: true, .. })
    }

    #[cfg(test)]
    pub(crate) fn address(&self) -> usize {
        self.raw.as_ptr() as usize
    }
}

impl fmt::Debug for Profile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("query_len", &self.len())
            .field("matrix", &self.matrix.name())
            .field("kind", &self.kind)
            .finish()
    }
}

impl Drop for Profile<'_> {
    fn drop(&mut self) {
        log::trace!("releasing parasail profile {:p}", self.raw);
        // SAFETY: owned, released exactly once, before `query` is freed.
        unsafe { (self.parasail.api().parasail_profile_free)(self.raw.as_ptr()) };
    }
}
