//! Sequence collections loaded by the native FASTA/FASTQ reader.
//!
//! [`Sequences`] owns the native array; each [`Sequence`] is a borrowed view
//! of one record and cannot outlive the collection.
//!
//! ```no_run
//! use parasail_bind::{Parasail, Sequences};
//!
//! # fn main() -> parasail_bind::Result<()> {
//! let parasail = Parasail::load()?;
//! let sequences = Sequences::from_file(&parasail, "proteins.fasta")?;
//! println!(
//!     "{} sequences, {} residues, longest {}",
//!     sequences.len(),
//!     sequences.characters(),
//!     sequences.longest()
//! );
//! for record in sequences.iter() {
//!     println!("{} {}", String::from_utf8_lossy(record.name()), record.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::ffi::CString;
use std::fmt;
use std::io;
use std::path::Path;
use std::ptr::NonNull;

use crate::error::{ParasailError, Result};
use crate::ffi::{parasail_sequence_t, parasail_sequences_t, parasail_string_t};
use crate::library::Parasail;
use crate::view;

/// # Safety
///
/// `string` must belong to a collection that passed [`Sequences::validate`].
unsafe fn bytes(string: &parasail_string_t) -> &[u8] {
    if string.l == 0 {
        return &[];
    }
    std::slice::from_raw_parts(string.s.cast::<u8>().cast_const(), string.l)
}

/// Owned collection of sequences
pub struct Sequences {
    raw: NonNull<parasail_sequences_t>,
    parasail: Parasail,
}

// SAFETY: read-only after loading, released exactly once from Drop.
unsafe impl Send for Sequences {}
unsafe impl Sync for Sequences {}

impl Sequences {
    /// Load every record of a FASTA or FASTQ file.
    ///
    /// The path is checked before the native reader runs, since the reader
    /// terminates the process on a missing file.
    pub fn from_file<P: AsRef<Path>>(parasail: &Parasail, path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ParasailError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("cannot open sequence file `{}`", path.display()),
            )));
        }
        let c_path = CString::new(path.to_string_lossy().into_owned())?;
        // SAFETY: NUL-terminated path to an existing file.
        let raw = unsafe { (parasail.api().parasail_sequences_from_file)(c_path.as_ptr()) };
        let raw = NonNull::new(raw)
            .ok_or_else(|| ParasailError::allocation("parasail_sequences_from_file"))?;
        let sequences = Self {
            raw,
            parasail: parasail.clone(),
        };
        sequences.validate()?;
        log::debug!("loaded {} sequences from {}", sequences.len(), path.display());
        Ok(sequences)
    }

    fn raw(&self) -> &parasail_sequences_t {
        // SAFETY: non-null and alive until Drop.
        unsafe { self.raw.as_ref() }
    }

    /// Reject null buffers paired with a nonzero length, so that record
    /// accessors can hand out plain slices.
    fn validate(&self) -> Result<()> {
        let raw = self.raw();
        // SAFETY: `seqs` holds `l` records owned by this collection, and
        // every string holds `l` bytes when its buffer is non-null.
        unsafe {
            let records = view::slice(raw.seqs.cast_const(), raw.l, "parasail_sequences_t.seqs")?;
            for record in records {
                for (field, string) in [
                    ("name", &record.name),
                    ("comment", &record.comment),
                    ("seq", &record.seq),
                    ("qual", &record.qual),
                ] {
                    view::slice(string.s.cast_const(), string.l, field)?;
                }
            }
        }
        Ok(())
    }

    fn records(&self) -> &[parasail_sequence_t] {
        let raw = self.raw();
        if raw.l == 0 {
            return &[];
        }
        // SAFETY: checked non-null by `validate`; `seqs` holds `l` records
        // owned by this collection.
        unsafe { std::slice::from_raw_parts(raw.seqs.cast_const(), raw.l) }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Whether the file had no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record at `index`
    ///
    /// # Errors
    ///
    /// [`ParasailError::IndexOutOfRange`] when `index >= len()`.
    pub fn get(&self, index: usize) -> Result<Sequence<'_>> {
        let records = self.records();
        records
            .get(index)
            .map(|raw| Sequence { raw })
            .ok_or(ParasailError::IndexOutOfRange {
                index,
                len: records.len(),
            })
    }

    /// Records in file order
    pub fn iter(&self) -> SequenceIter<'_> {
        SequenceIter {
            records: self.records().iter(),
        }
    }

    /// Total residues over all records
    pub fn characters(&self) -> usize {
        self.raw().characters
    }

    /// Length of the shortest record
    pub fn shortest(&self) -> usize {
        self.raw().shortest
    }

    /// Length of the longest record
    pub fn longest(&self) -> usize {
        self.raw().longest
    }

    /// Mean record length
    pub fn mean(&self) -> f32 {
        self.raw().mean
    }

    /// Standard deviation of record lengths
    pub fn stddev(&self) -> f32 {
        self.raw().stddev
    }

    #[cfg(test)]
    pub(crate) fn address(&self) -> usize {
        self.raw.as_ptr() as usize
    }
}

impl<'a> IntoIterator for &'a Sequences {
    type Item = Sequence<'a>;
    type IntoIter = SequenceIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the records of a [`Sequences`], in file order
#[derive(Clone)]
pub struct SequenceIter<'a> {
    records: std::slice::Iter<'a, parasail_sequence_t>,
}

impl<'a> Iterator for SequenceIter<'a> {
    type Item = Sequence<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next().map(|raw| Sequence { raw })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl DoubleEndedIterator for SequenceIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.records.next_back().map(|raw| Sequence { raw })
    }
}

impl ExactSizeIterator for SequenceIter<'_> {}

impl fmt::Debug for Sequences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequences")
            .field("len", &self.len())
            .field("characters", &self.characters())
            .field("shortest", &self.shortest())
            .field("longest", &self.longest())
            .finish()
    }
}

impl Drop for Sequences {
    fn drop(&mut self) {
        log::trace!("releasing parasail sequences {:p}", self.raw);
        // SAFETY: owned, released exactly once.
        unsafe { (self.parasail.api().parasail_sequences_free)(self.raw.as_ptr()) };
    }
}

/// One record, borrowed from its [`Sequences`]
#[derive(Clone, Copy)]
pub struct Sequence<'a> {
    raw: &'a parasail_sequence_t,
}

impl<'a> Sequence<'a> {
    /// Record name (first word of the header)
    pub fn name(&self) -> &'a [u8] {
        // SAFETY: the owning collection was validated on load.
        unsafe { bytes(&self.raw.name) }
    }

    /// Rest of the header line
    pub fn comment(&self) -> &'a [u8] {
        // SAFETY: the owning collection was validated on load.
        unsafe { bytes(&self.raw.comment) }
    }

    /// Residues
    pub fn seq(&self) -> &'a [u8] {
        // SAFETY: the owning collection was validated on load.
        unsafe { bytes(&self.raw.seq) }
    }

    /// Quality string; empty for FASTA
    pub fn qual(&self) -> &'a [u8] {
        // SAFETY: the owning collection was validated on load.
        unsafe { bytes(&self.raw.qual) }
    }

    /// Number of residues
    pub fn len(&self) -> usize {
        self.seq().len()
    }

    /// Whether the record has no residues
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Residue at `index`
    pub fn get(&self, index: usize) -> Result<u8> {
        let seq = self.seq();
        seq.get(index).copied().ok_or(ParasailError::IndexOutOfRange {
            index,
            len: seq.len(),
        })
    }
}

impl AsRef<[u8]> for Sequence<'_> {
    fn as_ref(&self) -> &[u8] {
        self.seq()
    }
}

impl fmt::Debug for Sequence<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("name", &String::from_utf8_lossy(self.name()))
            .field("len", &self.len())
            .finish()
    }
}
