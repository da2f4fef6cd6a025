//! Fixed-size buffer types shared by every stage of the pipeline.
//!
//! The digest only ever sees whole 4096-byte blocks. Encoding that in the type
//! system (`&[u8; 4096]` instead of `&[u8]`) turns the wrong-size case into a
//! compile error for typed callers; the flat-buffer helpers below are the one
//! place where lengths are checked at runtime.

use crate::error::IntegrityError;

/// Number of bytes in one input block.
pub const BLOCK_LEN: usize = 4096;

/// Number of bytes in the folded intermediate (one SM3 message block).
pub const INTERMEDIATE_LEN: usize = 64;

/// Number of 64-byte lanes folded together.
pub const LANES: usize = BLOCK_LEN / INTERMEDIATE_LEN;

/// One 4096-byte input block.
pub type Block = [u8; BLOCK_LEN];

/// 64-byte value produced by the XOR-fold stage.
pub type Intermediate = [u8; INTERMEDIATE_LEN];

/// Full 256-bit digest.
pub type Digest256 = [u8; 32];

/// 128-bit digest; always the first 16 bytes of the matching [`Digest256`].
pub type Digest128 = [u8; 16];

/// Output size selector for raw-buffer dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DigestWidth {
    /// 16-byte output.
    Bits128,
    /// 32-byte output.
    #[default]
    Bits256,
}

impl DigestWidth {
    /// Number of output bytes per block.
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::Bits128 => 16,
            Self::Bits256 => 32,
        }
    }

    /// Width in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits128 => 128,
            Self::Bits256 => 256,
        }
    }

    /// Maps a bit count (`128` or `256`) to a width.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            128 => Some(Self::Bits128),
            256 => Some(Self::Bits256),
            _ => None,
        }
    }
}

/// A digest shape that can be derived from the full 256-bit digest.
///
/// Batch and parallel dispatch are written once against this trait. The only
/// way to obtain a 128-bit value is truncation of the 256-bit one, so the two
/// widths cannot drift apart.
pub trait DigestOutput: Copy + Default + Send + Sync + 'static {
    /// Output width.
    const WIDTH: DigestWidth;

    /// Builds the output from a full digest.
    fn from_full(full: &Digest256) -> Self;

    /// Byte view of the output.
    fn as_bytes(&self) -> &[u8];
}

impl DigestOutput for Digest256 {
    const WIDTH: DigestWidth = DigestWidth::Bits256;

    #[inline]
    fn from_full(full: &Digest256) -> Self {
        *full
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

impl DigestOutput for Digest128 {
    const WIDTH: DigestWidth = DigestWidth::Bits128;

    #[inline]
    fn from_full(full: &Digest256) -> Self {
        truncate(full)
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self
    }
}

/// Returns the first 16 bytes of a 256-bit digest.
#[inline]
#[must_use]
pub fn truncate(full: &Digest256) -> Digest128 {
    let mut out = [0u8; 16];
    out.copy_from_slice(&full[..16]);
    out
}

/// Views a flat byte buffer as a slice of whole blocks.
///
/// # Errors
///
/// Returns [`IntegrityError::BufferLength`] when `bytes` is not a whole
/// multiple of [`BLOCK_LEN`].
pub fn blocks_from_bytes(bytes: &[u8]) -> Result<&[Block], IntegrityError> {
    let (blocks, rest) = bytes.as_chunks::<BLOCK_LEN>();
    if rest.is_empty() {
        Ok(blocks)
    } else {
        Err(IntegrityError::BufferLength {
            what: "input",
            len: bytes.len(),
            unit: BLOCK_LEN,
        })
    }
}

/// Checks that `out` holds exactly `count` outputs of `width`.
///
/// # Errors
///
/// Returns [`IntegrityError::OutputLength`] on a size mismatch.
pub fn check_output_len(out: &[u8], count: usize, width: DigestWidth) -> Result<(), IntegrityError> {
    let expected = count * width.len();
    if out.len() == expected {
        Ok(())
    } else {
        Err(IntegrityError::OutputLength {
            len: out.len(),
            expected,
        })
    }
}
