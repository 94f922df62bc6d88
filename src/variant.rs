//! Registry of parasail alignment variants.
//!
//! parasail exports one function per point of a five-axis grid:
//!
//! | Axis           | Values                                              |
//! |----------------|-----------------------------------------------------|
//! | algorithm      | `nw` (global), `sg` (semi-global), `sw` (local)     |
//! | statistics     | off, `_stats`                                       |
//! | detail         | score only, `_table`, `_rowcol`, `_trace`           |
//! | implementation | serial, serial `_scan`, vector, profile             |
//! | width          | `_64`, `_32`, `_16`, `_8`, `_sat` (vector/profile)  |
//!
//! Vector implementations use one of three strategies (`_scan`, `_striped`,
//! `_diag`); profile implementations only `_scan_profile` and
//! `_striped_profile`. Statistics combined with traceback is not provided by
//! the library and is rejected when a [`Variant`] is constructed.
//!
//! Names are a deterministic join of the axis tokens and round-trip through
//! [`Variant::from_str`](std::str::FromStr):
//!
//! ```
//! use parasail_bind::variant::{Algorithm, Detail, Implementation, Strategy, Variant, Width};
//!
//! let v = Variant::new(
//!     Algorithm::Local,
//!     false,
//!     Detail::Trace,
//!     Implementation::Vector(Strategy::Striped, Width::W16),
//! )
//! .unwrap();
//! assert_eq!(v.name(), "sw_trace_striped_16");
//! assert_eq!("sw_trace_striped_16".parse::<Variant>().unwrap(), v);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{ParasailError, Result};

/// Alignment algorithm family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    /// Needleman-Wunsch (`nw`)
    Global,
    /// Semi-global, free end gaps (`sg`)
    SemiGlobal,
    /// Smith-Waterman (`sw`)
    Local,
}

impl Algorithm {
    /// All algorithms in registry order
    pub const ALL: [Algorithm; 3] = [Algorithm::Global, Algorithm::SemiGlobal, Algorithm::Local];

    /// Name token
    pub fn token(self) -> &'static str {
        match self {
            Algorithm::Global => "nw",
            Algorithm::SemiGlobal => "sg",
            Algorithm::Local => "sw",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.token() == token)
    }
}

/// How much intermediate state a variant retains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Detail {
    /// Score and end positions only
    Score,
    /// Full dynamic programming table
    Table,
    /// Last row and last column
    RowCol,
    /// Traceback, enabling CIGAR and traceback strings
    Trace,
}

impl Detail {
    /// All detail modes in registry order
    pub const ALL: [Detail; 4] = [Detail::Score, Detail::Table, Detail::RowCol, Detail::Trace];

    /// Name token, empty for [`Detail::Score`]
    pub fn token(self) -> &'static str {
        match self {
            Detail::Score => "",
            Detail::Table => "table",
            Detail::RowCol => "rowcol",
            Detail::Trace => "trace",
        }
    }
}

/// Data-parallel memory access strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    /// Prefix scan
    Scan,
    /// Farrar striped
    Striped,
    /// Anti-diagonal
    Diagonal,
}

impl Strategy {
    /// All strategies in registry order
    pub const ALL: [Strategy; 3] = [Strategy::Scan, Strategy::Striped, Strategy::Diagonal];

    /// Strategies that accept a precomputed [`Profile`](crate::Profile)
    pub const PROFILE: [Strategy; 2] = [Strategy::Scan, Strategy::Striped];

    /// Name token
    pub fn token(self) -> &'static str {
        match self {
            Strategy::Scan => "scan",
            Strategy::Striped => "striped",
            Strategy::Diagonal => "diag",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.token() == token)
    }
}

/// Integer width of the vector lanes
///
/// [`Width::Saturating`] starts at 8 bits and re-runs at 16 bits when the
/// narrow pass saturates; the fixed widths only flag saturation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Width {
    /// 64-bit lanes
    W64,
    /// 32-bit lanes
    W32,
    /// 16-bit lanes
    W16,
    /// 8-bit lanes
    W8,
    /// 8-bit with automatic 16-bit retry
    Saturating,
}

impl Width {
    /// All widths in registry order
    pub const ALL: [Width; 5] = [Width::W64, Width::W32, Width::W16, Width::W8, Width::Saturating];

    /// Name token
    pub fn token(self) -> &'static str {
        match self {
            Width::W64 => "64",
            Width::W32 => "32",
            Width::W16 => "16",
            Width::W8 => "8",
            Width::Saturating => "sat",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.token() == token)
    }
}

/// Which family of native implementation a variant binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Implementation {
    /// Serial reference implementation
    Serial,
    /// Serial prefix-scan reference implementation
    SerialScan,
    /// SIMD implementation over two sequences
    Vector(Strategy, Width),
    /// SIMD implementation over a [`Profile`](crate::Profile) and a sequence
    Profile(Strategy, Width),
}

impl Implementation {
    /// Whether the entry point takes a profile instead of a query and matrix
    pub fn is_profile(self) -> bool {
        matches!(self, Implementation::Profile(..))
    }

    /// Lane width, if the implementation is vectorized
    pub fn width(self) -> Option<Width> {
        match self {
            Implementation::Vector(_, w) | Implementation::Profile(_, w) => Some(w),
            Implementation::Serial | Implementation::SerialScan => None,
        }
    }

    /// Every implementation, valid or not, in registry order
    fn grid() -> impl Iterator<Item = Implementation> {
        let serial = [Implementation::Serial, Implementation::SerialScan].into_iter();
        let vector = Strategy::ALL.into_iter().flat_map(|s| {
            Width::ALL.into_iter().map(move |w| Implementation::Vector(s, w))
        });
        let profile = Strategy::ALL.into_iter().flat_map(|s| {
            Width::ALL.into_iter().map(move |w| Implementation::Profile(s, w))
        });
        serial.chain(vector).chain(profile)
    }

    fn write_suffix(self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::Serial => Ok(()),
            Implementation::SerialScan => f.write_str("_scan"),
            Implementation::Vector(s, w) => write!(f, "_{}_{}", s.token(), w.token()),
            Implementation::Profile(s, w) => write!(f, "_{}_profile_{}", s.token(), w.token()),
        }
    }
}

/// One point of the variant grid, i.e. one native alignment function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variant {
    algorithm: Algorithm,
    stats: bool,
    detail: Detail,
    implementation: Implementation,
}

impl Variant {
    /// Build a variant, rejecting combinations the library does not export.
    ///
    /// # Errors
    ///
    /// [`ParasailError::InvalidVariant`] for statistics with traceback, and
    /// for the diagonal strategy in profile mode.
    pub fn new(
        algorithm: Algorithm,
        stats: bool,
        detail: Detail,
        implementation: Implementation,
    ) -> Result<Self> {
        let variant = Self { algorithm, stats, detail, implementation };
        match variant.invalid_reason() {
            None => Ok(variant),
            Some(reason) => Err(ParasailError::InvalidVariant { name: variant.name(), reason }),
        }
    }

    fn invalid_reason(&self) -> Option<&'static str> {
        if self.stats && self.detail == Detail::Trace {
            return Some("statistics cannot be combined with traceback");
        }
        if let Implementation::Profile(Strategy::Diagonal, _) = self.implementation {
            return Some("the diagonal strategy has no profile form");
        }
        None
    }

    /// Every valid variant: serial, serial scan, vector, then profile.
    pub fn all() -> Vec<Variant> {
        let mut variants = Vec::with_capacity(567);
        for implementation in Implementation::grid() {
            for algorithm in Algorithm::ALL {
                for stats in [false, true] {
                    for detail in Detail::ALL {
                        let candidate = Self { algorithm, stats, detail, implementation };
                        if candidate.invalid_reason().is_none() {
                            variants.push(candidate);
                        }
                    }
                }
            }
        }
        variants
    }

    /// Algorithm family
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Whether match/similarity/length statistics are tracked
    pub fn stats(&self) -> bool {
        self.stats
    }

    /// Detail mode
    pub fn detail(&self) -> Detail {
        self.detail
    }

    /// Implementation family
    pub fn implementation(&self) -> Implementation {
        self.implementation
    }

    /// Whether the entry point takes a [`Profile`](crate::Profile)
    pub fn is_profile(&self) -> bool {
        self.implementation.is_profile()
    }

    /// Stable public name, e.g. `sw_stats_table_striped_16`
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Exported native symbol, e.g. `parasail_sw_trace_scan_sat`
    pub fn symbol(&self) -> String {
        format!("parasail_{}", self)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.algorithm.token())?;
        if self.stats {
            f.write_str("_stats")?;
        }
        if self.detail != Detail::Score {
            write!(f, "_{}", self.detail.token())?;
        }
        self.implementation.write_suffix(f)
    }
}

impl FromStr for Variant {
    type Err = ParasailError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || ParasailError::UnknownVariant(s.to_string());
        let name = s.strip_prefix("parasail_").unwrap_or(s);
        let mut tokens = name.split('_').peekable();

        let algorithm = tokens.next().and_then(Algorithm::from_token).ok_or_else(unknown)?;

        let stats = tokens.next_if_eq(&"stats").is_some();

        let detail = match tokens.peek().copied() {
            Some("table") => Detail::Table,
            Some("rowcol") => Detail::RowCol,
            Some("trace") => Detail::Trace,
            _ => Detail::Score,
        };
        if detail != Detail::Score {
            tokens.next();
        }

        let rest: Vec<&str> = tokens.collect();
        let implementation = match rest.as_slice() {
            [] => Implementation::Serial,
            ["scan"] => Implementation::SerialScan,
            [strategy, width] => Implementation::Vector(
                Strategy::from_token(strategy).ok_or_else(unknown)?,
                Width::from_token(width).ok_or_else(unknown)?,
            ),
            [strategy, "profile", width] => Implementation::Profile(
                Strategy::from_token(strategy).ok_or_else(unknown)?,
                Width::from_token(width).ok_or_else(unknown)?,
            ),
            _ => return Err(unknown()),
        };

        Variant::new(algorithm, stats, detail, implementation)
    }
}
