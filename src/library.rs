//! Locating, loading and holding the native parasail library.
//!
//! The library is opened at runtime with `libloading`. Candidates are tried
//! in order:
//!
//! 1. an explicit path ([`LibraryConfig::path`], or `PARASAIL_LIB` via
//!    [`LibraryConfig::from_env`]); when given, nothing else is tried
//! 2. the platform file name next to the running executable
//! 3. the bare platform file name, resolved by the system loader
//!
//! All required functions are resolved once. Alignment entry points are
//! resolved for every [`Variant`] in the registry; a library built without
//! some of them still loads, and calls to the missing ones fail with
//! [`ParasailError::VariantUnavailable`].
//!
//! # Lifetime
//!
//! [`Parasail`] is a cheap, clonable handle to the loaded library. Every
//! native handle created through it keeps a clone, so the library stays
//! mapped until the last handle has released its resource. Release can never
//! run against an unloaded library.
//!
//! ```no_run
//! use parasail_bind::Parasail;
//!
//! # fn main() -> parasail_bind::Result<()> {
//! let parasail = Parasail::load()?;
//! println!("loaded {} alignment functions", parasail.variants().count());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;

use crate::error::{ParasailError, Result};
use crate::ffi::{AlignFn, CpuProbes, NativeApi, ProfileAlignFn};
use crate::variant::Variant;

/// Environment variable holding an explicit library path
pub const LIBRARY_ENV: &str = "PARASAIL_LIB";

/// Platform file name of the shared library
pub fn library_file_name() -> &'static str {
    if cfg!(target_os = "macos") {
        "libparasail.dylib"
    } else if cfg!(target_os = "windows") {
        "parasail.dll"
    } else {
        "libparasail.so"
    }
}

/// Where to look for the shared library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Explicit library path; disables the other candidates when set
    pub path: Option<PathBuf>,
    /// Try the platform file name in the executable's directory
    pub search_adjacent: bool,
    /// Try the bare file name through the system loader search path
    pub search_system: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: None,
            search_adjacent: true,
            search_system: true,
        }
    }
}

impl LibraryConfig {
    /// Default search, with the explicit path taken from `PARASAIL_LIB`
    pub fn from_env() -> Self {
        let path = env::var_os(LIBRARY_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self { path, ..Self::default() }
    }

    /// Config that only tries `path`
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: Some(path.into()),
            search_adjacent: false,
            search_system: false,
        }
    }

    /// Candidate paths in the order they are tried
    pub fn candidates(&self) -> Vec<PathBuf> {
        if let Some(path) = &self.path {
            return vec![path.clone()];
        }

        let mut candidates = Vec::new();
        if self.search_adjacent {
            let exe_dir = env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf));
            if let Some(dir) = exe_dir {
                candidates.push(dir.join(library_file_name()));
            }
        }
        if self.search_system {
            candidates.push(PathBuf::from(library_file_name()));
        }
        candidates
    }
}

/// CPU instruction sets the loaded library can dispatch to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuFeatures {
    /// AVX2 kernels usable
    pub avx2: bool,
    /// SSE4.1 kernels usable
    pub sse41: bool,
    /// SSE2 kernels usable
    pub sse2: bool,
    /// AltiVec kernels usable
    pub altivec: bool,
    /// NEON kernels usable
    pub neon: bool,
}

/// Resolved function tables plus the library that backs them.
pub(crate) struct Binding {
    pub(crate) api: NativeApi,
    sequence_fns: HashMap<Variant, AlignFn>,
    profile_fns: HashMap<Variant, ProfileAlignFn>,
    cpu: CpuProbes,
    path: Option<PathBuf>,
    // Declared last: unmapped only after the tables above are gone.
    _library: Option<Library>,
}

impl Binding {
    fn open(path: &Path) -> Result<Self> {
        // SAFETY: loading runs the library's initializers; parasail has none
        // with observable side effects.
        let library = unsafe { Library::new(path) }.map_err(|source| ParasailError::LibraryLoad {
            path: path.to_path_buf(),
            source,
        })?;

        // SAFETY: signatures in `ffi` mirror parasail.h.
        let api = unsafe { NativeApi::resolve(&library)? };
        let cpu = unsafe { CpuProbes::resolve(&library) };

        let mut sequence_fns = HashMap::new();
        let mut profile_fns = HashMap::new();
        let mut missing = 0usize;
        for variant in Variant::all() {
            let symbol = format!("{}\0", variant.symbol());
            // SAFETY: as above; profile variants use the profile signature.
            let found = unsafe {
                if variant.is_profile() {
                    library
                        .get::<ProfileAlignFn>(symbol.as_bytes())
                        .map(|f| profile_fns.insert(variant, *f))
                        .is_ok()
                } else {
                    library
                        .get::<AlignFn>(symbol.as_bytes())
                        .map(|f| sequence_fns.insert(variant, *f))
                        .is_ok()
                }
            };
            if !found {
                missing += 1;
            }
        }

        if missing > 0 {
            log::warn!("{} does not export {} alignment functions", path.display(), missing);
        }
        log::info!(
            "resolved {} sequence and {} profile alignment functions from {}",
            sequence_fns.len(),
            profile_fns.len(),
            path.display()
        );

        Ok(Self {
            api,
            sequence_fns,
            profile_fns,
            cpu,
            path: Some(path.to_path_buf()),
            _library: Some(library),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        api: NativeApi,
        sequence_fns: HashMap<Variant, AlignFn>,
        profile_fns: HashMap<Variant, ProfileAlignFn>,
    ) -> Self {
        Self {
            api,
            sequence_fns,
            profile_fns,
            cpu: CpuProbes::default(),
            path: None,
            _library: None,
        }
    }
}

/// Shared handle to the loaded parasail library
///
/// All entry points ([`Parasail::align`], [`Matrix::lookup`](crate::Matrix::lookup), ...)
/// go through this handle. Cloning is cheap.
#[derive(Clone)]
pub struct Parasail {
    binding: Arc<Binding>,
}

impl fmt::Debug for Parasail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parasail")
            .field("path", &self.binding.path)
            .field("sequence_fns", &self.binding.sequence_fns.len())
            .field("profile_fns", &self.binding.profile_fns.len())
            .finish()
    }
}

impl Parasail {
    /// Load using [`LibraryConfig::from_env`]
    pub fn load() -> Result<Self> {
        Self::load_with(&LibraryConfig::from_env())
    }

    /// Load from an explicit path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(&LibraryConfig::with_path(path.as_ref()))
    }

    /// Try every candidate of `config` in order.
    ///
    /// # Errors
    ///
    /// With a single candidate, the loader error for it; otherwise
    /// [`ParasailError::LibraryNotFound`] listing every candidate. A library
    /// that loads but lacks a required function fails immediately with
    /// [`ParasailError::MissingSymbol`].
    pub fn load_with(config: &LibraryConfig) -> Result<Self> {
        let candidates = config.candidates();
        let mut last_error = None;

        for candidate in &candidates {
            log::debug!("trying parasail library at {}", candidate.display());
            match Binding::open(candidate) {
                Ok(binding) => {
                    log::debug!("loaded parasail library from {}", candidate.display());
                    return Ok(Self { binding: Arc::new(binding) });
                }
                Err(err @ ParasailError::MissingSymbol { .. }) => return Err(err),
                Err(err) => {
                    log::debug!("{}", err);
                    last_error = Some(err);
                }
            }
        }

        match (candidates.len(), last_error) {
            (1, Some(err)) => Err(err),
            _ => Err(ParasailError::LibraryNotFound {
                tried: candidates.iter().map(|c| c.display().to_string()).collect(),
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_binding(binding: Binding) -> Self {
        Self { binding: Arc::new(binding) }
    }

    pub(crate) fn api(&self) -> &NativeApi {
        &self.binding.api
    }

    /// Path the library was loaded from
    pub fn path(&self) -> Option<&Path> {
        self.binding.path.as_deref()
    }

    /// Whether the loaded library exports `variant`
    pub fn has_variant(&self, variant: Variant) -> bool {
        if variant.is_profile() {
            self.binding.profile_fns.contains_key(&variant)
        } else {
            self.binding.sequence_fns.contains_key(&variant)
        }
    }

    /// Variants exported by the loaded library, in registry order
    pub fn variants(&self) -> impl Iterator<Item = Variant> + '_ {
        Variant::all().into_iter().filter(move |v| self.has_variant(*v))
    }

    pub(crate) fn sequence_fn(&self, variant: Variant) -> Result<AlignFn> {
        if variant.is_profile() {
            return Err(ParasailError::InvalidVariant {
                name: variant.name(),
                reason: "profile variants take a Profile; use align_profile",
            });
        }
        self.binding
            .sequence_fns
            .get(&variant)
            .copied()
            .ok_or_else(|| ParasailError::VariantUnavailable(variant.name()))
    }

    pub(crate) fn profile_fn(&self, variant: Variant) -> Result<ProfileAlignFn> {
        if !variant.is_profile() {
            return Err(ParasailError::InvalidVariant {
                name: variant.name(),
                reason: "sequence variants take a query and matrix; use align",
            });
        }
        self.binding
            .profile_fns
            .get(&variant)
            .copied()
            .ok_or_else(|| ParasailError::VariantUnavailable(variant.name()))
    }

    /// Instruction sets the library reports as usable on this CPU.
    ///
    /// Probes missing from older builds read as `false`.
    pub fn cpu_features(&self) -> CpuFeatures {
        let probe = |f: Option<unsafe extern "C" fn() -> std::ffi::c_int>| {
            // SAFETY: probes take no arguments and only read CPUID state.
            f.map(|f| unsafe { f() } != 0).unwrap_or(false)
        };
        let cpu = &self.binding.cpu;
        CpuFeatures {
            avx2: probe(cpu.avx2),
            sse41: probe(cpu.sse41),
            sse2: probe(cpu.sse2),
            altivec: probe(cpu.altivec),
            neon: probe(cpu.neon),
        }
    }
}
