//! parasail-bind: safe Rust bindings to the parasail pairwise alignment library
//!
//! # Overview
//!
//! parasail ships hundreds of SIMD-vectorized Needleman-Wunsch, semi-global
//! and Smith-Waterman kernels as a C shared library. This crate loads that
//! library at runtime and exposes it through owned handles that release their
//! native memory exactly once, and through borrowed views that cannot outlive
//! the handle they point into.
//!
//! ## Key Features
//!
//! - **Variant registry**: all 567 alignment functions addressable by a typed
//!   [`Variant`] or by their stable name (`"sw_trace_striped_16"`)
//! - **Capability-gated results**: statistics, DP tables, last row/column and
//!   tracebacks are only reachable on results whose variant computed them
//! - **Zero-copy views**: score tables come back as `ndarray` views over the
//!   native buffers
//! - **CIGAR codec**: pure-Rust packing and unpacking of the 32-bit CIGAR words
//! - **Mutable matrices**: copy a built-in matrix and rewrite cells, rows,
//!   columns or stepped blocks
//!
//! ## Quick Start
//!
//! ```no_run
//! use parasail_bind::{Matrix, Parasail};
//!
//! # fn main() -> parasail_bind::Result<()> {
//! // Honors PARASAIL_LIB, then looks next to the executable and on the
//! // system loader path
//! let parasail = Parasail::load()?;
//! let matrix = Matrix::lookup(&parasail, "blosum62")?;
//!
//! let result =
//!     parasail.align_named("sw_trace_striped_16", "HEAGAWGHEE", "PAWHEAE", 10, 1, &matrix)?;
//! println!("score {} cigar {}", result.score(), result.cigar()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`variant`]: the variant registry and stable names
//! - [`cigar`]: owned native CIGARs and the pure-Rust [`cigar::codec`]
//! - [`error`]: the crate-wide error type
//!
//! Everything else is re-exported at the crate root.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod align;
pub mod cigar;
pub mod error;
mod ffi;
mod library;
mod matrix;
mod profile;
mod result;
mod sequences;
mod ssw;
mod traceback;
pub mod variant;
mod view;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use cigar::{Cigar, CigarOp};
pub use error::{ParasailError, Result};
pub use library::{library_file_name, CpuFeatures, LibraryConfig, Parasail, LIBRARY_ENV};
pub use matrix::{Matrix, MatrixKey, StepRange};
pub use profile::{Profile, ProfileKind};
pub use result::{AlignResult, Capability};
pub use sequences::{Sequence, SequenceIter, Sequences};
pub use ssw::SswResult;
pub use traceback::{Traceback, MATCH_MARKER, MISMATCH_MARKER, SIMILAR_MARKER};
pub use variant::{Algorithm, Detail, Implementation, Strategy, Variant, Width};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
