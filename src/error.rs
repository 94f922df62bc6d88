//! Error types for parasail-bind

use std::path::PathBuf;

use thiserror::Error;

use crate::result::Capability;

/// Result type alias for parasail-bind operations
pub type Result<T> = std::result::Result<T, ParasailError>;

/// Error types that can occur while binding to or calling parasail
#[derive(Debug, Error)]
pub enum ParasailError {
    /// No candidate location yielded a loadable library
    #[error("parasail library not found (tried: {})", tried.join(", "))]
    LibraryNotFound {
        /// Every candidate path or name that was attempted
        tried: Vec<String>,
    },

    /// The library file exists but could not be loaded
    #[error("failed to load parasail library {}: {source}", path.display())]
    LibraryLoad {
        /// Path or name passed to the system loader
        path: PathBuf,
        /// Loader error
        #[source]
        source: libloading::Error,
    },

    /// A required native function is not exported by the loaded library
    #[error("parasail library does not export `{symbol}`")]
    MissingSymbol {
        /// Native symbol name
        symbol: &'static str,
        /// Loader error
        #[source]
        source: libloading::Error,
    },

    /// The variant is valid but the loaded library does not provide it
    #[error("alignment function `{0}` is not available in the loaded library")]
    VariantUnavailable(String),

    /// The axis combination does not name a native function
    #[error("invalid alignment variant `{name}`: {reason}")]
    InvalidVariant {
        /// Name (or partial name) of the rejected variant
        name: String,
        /// Why the combination is rejected
        reason: &'static str,
    },

    /// A string could not be parsed as a variant name
    #[error("unknown alignment function `{0}`")]
    UnknownVariant(String),

    /// Named matrix lookup failed
    #[error("specified matrix not found: {0}")]
    MatrixNotFound(String),

    /// Matrix file does not exist
    #[error("cannot open matrix file `{}`", path.display())]
    MatrixFileNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// The result does not carry the requested field
    #[error("result has no {field}: the alignment variant did not compute {capability}")]
    MissingCapability {
        /// Requested field
        field: &'static str,
        /// Capability the native predicate reported missing
        capability: Capability,
    },

    /// A native call returned a null resource pointer
    #[error("native call `{call}` returned a null resource")]
    Allocation {
        /// Native function name
        call: String,
    },

    /// Index outside a collection, sequence or matrix
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Valid length
        len: usize,
    },

    /// A stepped range was given without its start or stop
    #[error("range {0} must be given explicitly")]
    MissingRangeBound(&'static str),

    /// A stepped range was given a step of zero
    #[error("range step must be positive")]
    ZeroStep,

    /// Attempt to mutate a library-resident matrix
    #[error("matrix `{0}` is library-resident and cannot be modified; copy it first")]
    ImmutableMatrix(String),

    /// Profile cannot be used with the requested variant
    #[error("profile cannot be used with `{variant}`: {reason}")]
    IncompatibleProfile {
        /// Requested variant name
        variant: String,
        /// Why the profile does not fit
        reason: String,
    },

    /// Input longer than the native `int` length type
    #[error("sequence of length {len} exceeds the native length limit")]
    SequenceTooLong {
        /// Input length
        len: usize,
    },

    /// Malformed CIGAR string
    #[error("invalid CIGAR: {0}")]
    InvalidCigar(String),

    /// Packed CIGAR code with an unknown operation
    #[error("invalid CIGAR operation code {0}")]
    InvalidCigarOp(u32),

    /// String passed to native code contains a NUL byte
    #[error("string contains an interior NUL byte: {0}")]
    InteriorNul(#[from] std::ffi::NulError),

    /// Native string is not valid UTF-8
    #[error("native string is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Native buffer does not fit the requested view shape
    #[error("invalid view shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParasailError {
    pub(crate) fn allocation(call: impl Into<String>) -> Self {
        ParasailError::Allocation { call: call.into() }
    }

    /// Whether this error reports a field the variant never computed
    pub fn is_missing_capability(&self) -> bool {
        matches!(self, ParasailError::MissingCapability { .. })
    }
}
