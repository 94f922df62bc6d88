//! Packed CIGAR codec.
//!
//! parasail stores a CIGAR as 32-bit integers:
//! - Low 4 bits: operation index into `"MIDNSHP=XB"`
//! - High 28 bits: operation length (0 to 268,435,455)
//!
//! # Operations
//!
//! - M: Alignment match (match or mismatch)
//! - I: Insertion to reference
//! - D: Deletion from reference
//! - N: Skipped region from reference
//! - S: Soft clipping (bases present in query, not in alignment)
//! - H: Hard clipping
//! - P: Padding
//! - =: Sequence match
//! - X: Sequence mismatch
//! - B: Back (reverse over the query)
//!
//! Nothing here calls into the native library.

use std::fmt;

use crate::error::{ParasailError, Result};

/// Operation symbols, indexed by packed operation code
pub const OP_CHARS: &[u8; 10] = b"MIDNSHP=XB";

/// Largest length a packed code can carry
pub const MAX_OP_LEN: u32 = (1 << 28) - 1;

/// CIGAR operation with its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CigarOp {
    /// Match or mismatch (M)
    Match(u32),
    /// Insertion to reference (I)
    Insertion(u32),
    /// Deletion from reference (D)
    Deletion(u32),
    /// Skipped region from reference (N)
    RefSkip(u32),
    /// Soft clipping (S)
    SoftClip(u32),
    /// Hard clipping (H)
    HardClip(u32),
    /// Padding (P)
    Padding(u32),
    /// Sequence match (=)
    SeqMatch(u32),
    /// Sequence mismatch (X)
    SeqMismatch(u32),
    /// Back (B)
    Back(u32),
}

impl CigarOp {
    /// Build an operation from its symbol and length.
    ///
    /// # Errors
    ///
    /// [`ParasailError::InvalidCigar`] for a symbol outside `MIDNSHP=XB`.
    pub fn new(op: char, length: u32) -> Result<Self> {
        let code = OP_CHARS
            .iter()
            .position(|&c| char::from(c) == op)
            .ok_or_else(|| ParasailError::InvalidCigar(format!("unknown operation '{}'", op)))?;
        // position() < 10, so from_code cannot fail here
        Self::from_code(code as u32, length)
    }

    fn from_code(code: u32, length: u32) -> Result<Self> {
        Ok(match code {
            0 => CigarOp::Match(length),
            1 => CigarOp::Insertion(length),
            2 => CigarOp::Deletion(length),
            3 => CigarOp::RefSkip(length),
            4 => CigarOp::SoftClip(length),
            5 => CigarOp::HardClip(length),
            6 => CigarOp::Padding(length),
            7 => CigarOp::SeqMatch(length),
            8 => CigarOp::SeqMismatch(length),
            9 => CigarOp::Back(length),
            _ => return Err(ParasailError::InvalidCigarOp(code)),
        })
    }

    /// Unpack a native 32-bit code.
    ///
    /// # Example
    ///
    /// ```
    /// use parasail_bind::CigarOp;
    ///
    /// // 10= is 10 << 4 | 7
    /// assert_eq!(CigarOp::from_packed(167).unwrap(), CigarOp::SeqMatch(10));
    /// ```
    pub fn from_packed(packed: u32) -> Result<Self> {
        Self::from_code(packed & 0x0F, packed >> 4)
    }

    /// Pack into a native 32-bit code.
    ///
    /// # Errors
    ///
    /// [`ParasailError::InvalidCigar`] when the length exceeds 28 bits.
    pub fn to_packed(&self) -> Result<u32> {
        let length = self.length();
        if length > MAX_OP_LEN {
            return Err(ParasailError::InvalidCigar(format!(
                "operation length {} exceeds {}",
                length, MAX_OP_LEN
            )));
        }
        Ok(length << 4 | self.code())
    }

    /// Operation index into [`OP_CHARS`]
    pub fn code(&self) -> u32 {
        match self {
            CigarOp::Match(_) => 0,
            CigarOp::Insertion(_) => 1,
            CigarOp::Deletion(_) => 2,
            CigarOp::RefSkip(_) => 3,
            CigarOp::SoftClip(_) => 4,
            CigarOp::HardClip(_) => 5,
            CigarOp::Padding(_) => 6,
            CigarOp::SeqMatch(_) => 7,
            CigarOp::SeqMismatch(_) => 8,
            CigarOp::Back(_) => 9,
        }
    }

    /// Get the operation count/length.
    pub fn length(&self) -> u32 {
        match *self {
            CigarOp::Match(len)
            | CigarOp::Insertion(len)
            | CigarOp::Deletion(len)
            | CigarOp::RefSkip(len)
            | CigarOp::SoftClip(len)
            | CigarOp::HardClip(len)
            | CigarOp::Padding(len)
            | CigarOp::SeqMatch(len)
            | CigarOp::SeqMismatch(len)
            | CigarOp::Back(len) => len,
        }
    }

    /// Check if this operation has zero length.
    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Operation symbol.
    pub fn as_char(&self) -> char {
        char::from(OP_CHARS[self.code() as usize])
    }

    /// Same operation, different length.
    pub fn with_length(&self, length: u32) -> Self {
        match self {
            CigarOp::Match(_) => CigarOp::Match(length),
            CigarOp::Insertion(_) => CigarOp::Insertion(length),
            CigarOp::Deletion(_) => CigarOp::Deletion(length),
            CigarOp::RefSkip(_) => CigarOp::RefSkip(length),
            CigarOp::SoftClip(_) => CigarOp::SoftClip(length),
            CigarOp::HardClip(_) => CigarOp::HardClip(length),
            CigarOp::Padding(_) => CigarOp::Padding(length),
            CigarOp::SeqMatch(_) => CigarOp::SeqMatch(length),
            CigarOp::SeqMismatch(_) => CigarOp::SeqMismatch(length),
            CigarOp::Back(_) => CigarOp::Back(length),
        }
    }

    /// Whether the operation consumes query bases.
    pub fn consumes_query(&self) -> bool {
        matches!(
            self,
            CigarOp::Match(_)
                | CigarOp::Insertion(_)
                | CigarOp::SoftClip(_)
                | CigarOp::SeqMatch(_)
                | CigarOp::SeqMismatch(_)
        )
    }

    /// Whether the operation consumes reference bases.
    pub fn consumes_reference(&self) -> bool {
        matches!(
            self,
            CigarOp::Match(_)
                | CigarOp::Deletion(_)
                | CigarOp::RefSkip(_)
                | CigarOp::SeqMatch(_)
                | CigarOp::SeqMismatch(_)
        )
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length(), self.as_char())
    }
}

/// Decode packed codes, merging adjacent runs of the same operation.
///
/// # Errors
///
/// [`ParasailError::InvalidCigarOp`] if a code carries an operation index
/// above 9.
pub fn decode(codes: &[u32]) -> Result<Vec<CigarOp>> {
    let mut ops: Vec<CigarOp> = Vec::with_capacity(codes.len());
    for &packed in codes {
        let op = CigarOp::from_packed(packed)?;
        match ops.last_mut() {
            Some(last) if last.code() == op.code() => {
                *last = last.with_length(last.length().saturating_add(op.length()));
            }
            _ => ops.push(op),
        }
    }
    Ok(ops)
}

/// Decode packed codes straight to the textual form, e.g. `"4=2I6="`.
pub fn decode_to_string(codes: &[u32]) -> Result<String> {
    Ok(format_ops(&decode(codes)?))
}

/// Render operations as a CIGAR string.
pub fn format_ops(ops: &[CigarOp]) -> String {
    ops.iter().map(CigarOp::to_string).collect()
}

/// Parse a CIGAR string such as `"4S10="`.
///
/// Every operation needs an explicit length; an empty string is an empty
/// CIGAR.
///
/// # Errors
///
/// [`ParasailError::InvalidCigar`] for a missing length, an unknown
/// operation, trailing digits, or a length that does not fit in 28 bits.
pub fn parse(cigar: &str) -> Result<Vec<CigarOp>> {
    let mut ops = Vec::new();
    let mut length: Option<u32> = None;

    for c in cigar.chars() {
        if let Some(digit) = c.to_digit(10) {
            let next = length
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|l| l.checked_add(digit))
                .filter(|&l| l <= MAX_OP_LEN)
                .ok_or_else(|| {
                    ParasailError::InvalidCigar(format!("length overflow in '{}'", cigar))
                })?;
            length = Some(next);
            continue;
        }

        let len = length
            .take()
            .ok_or_else(|| {
                let message = format!("operation '{}' has no length in '{}'", c, cigar);
                ParasailError::InvalidCigar(message)
            })?;
        ops.push(CigarOp::new(c, len)?);
    }

    if length.is_some() {
        return Err(ParasailError::InvalidCigar(format!("trailing length in '{}'", cigar)));
    }
    Ok(ops)
}

/// Pack operations into native codes.
pub fn encode(ops: &[CigarOp]) -> Result<Vec<u32>> {
    ops.iter().map(CigarOp::to_packed).collect()
}

/// Parse a CIGAR string and pack it.
///
/// # Example
///
/// ```
/// use parasail_bind::cigar::codec;
///
/// let codes = codec::encode_str("4=2I6=").unwrap();
/// assert_eq!(codes, vec![4 << 4 | 7, 2 << 4 | 1, 6 << 4 | 7]);
/// assert_eq!(codec::decode_to_string(&codes).unwrap(), "4=2I6=");
/// ```
pub fn encode_str(cigar: &str) -> Result<Vec<u32>> {
    encode(&parse(cigar)?)
}

/// Query bases covered by the operations.
pub fn query_length(ops: &[CigarOp]) -> u64 {
    ops.iter()
        .filter(|op| op.consumes_query())
        .map(|op| u64::from(op.length()))
        .sum()
}

/// Reference bases covered by the operations.
pub fn reference_length(ops: &[CigarOp]) -> u64 {
    ops.iter()
        .filter(|op| op.consumes_reference())
        .map(|op| u64::from(op.length()))
        .sum()
}
