#![deny(unsafe_code)]
#![deny(missing_docs)]

//! Deterministic 4096-byte block fixtures shared by tests and benchmarks.
//!
//! Every generator here is reproducible: patterned blocks are pure
//! functions of their index, and random blocks come from a seeded
//! [`StdRng`], so a failing property can be replayed from its seed.
//!
//! Fixture files are raw concatenations of whole blocks with no header.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tempfile::TempDir;

/// Size of one fixture block.
pub const BLOCK_LEN: usize = 4096;

/// One fixture block.
pub type Block = [u8; BLOCK_LEN];

/// `block[i] = i mod 256`.
#[must_use]
pub fn pattern_block() -> Block {
    std::array::from_fn(|i| (i % 256) as u8)
}

/// All-zero block.
#[must_use]
pub const fn zero_block() -> Block {
    [0u8; BLOCK_LEN]
}

/// All-`0xFF` block.
#[must_use]
pub const fn ones_block() -> Block {
    [0xffu8; BLOCK_LEN]
}

/// `count` distinct blocks where `blocks[i][j] = (i + j) mod 256`.
///
/// Every lane position sees each value an even number of times, so the
/// whole family folds to the all-zero intermediate. Use [`random_blocks`]
/// when distinct digests are required.
#[must_use]
pub fn offset_pattern_blocks(count: usize) -> Vec<Block> {
    (0..count)
        .map(|i| std::array::from_fn(|j| ((i + j) % 256) as u8))
        .collect()
}

/// `count` blocks of seeded random bytes.
#[must_use]
pub fn random_blocks(count: usize, seed: u64) -> Vec<Block> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let mut block = [0u8; BLOCK_LEN];
            rng.fill_bytes(&mut block);
            block
        })
        .collect()
}

/// A random block together with a copy that differs in exactly one bit.
#[derive(Clone, Debug)]
pub struct FlipPair {
    /// Original block.
    pub original: Block,
    /// Copy with one bit flipped.
    pub flipped: Block,
    /// Index of the flipped bit (`byte * 8 + bit`).
    pub bit: usize,
}

/// `count` seeded single-bit-flip pairs for avalanche measurements.
#[must_use]
pub fn avalanche_pairs(count: usize, seed: u64) -> Vec<FlipPair> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let mut original = [0u8; BLOCK_LEN];
            rng.fill_bytes(&mut original);
            let bit = rng.gen_range(0..BLOCK_LEN * 8);
            let mut flipped = original;
            flipped[bit / 8] ^= 1 << (bit % 8);
            FlipPair {
                original,
                flipped,
                bit,
            }
        })
        .collect()
}

/// Flattens blocks into one contiguous buffer.
#[must_use]
pub fn concat_blocks(blocks: &[Block]) -> Vec<u8> {
    blocks.concat()
}

/// Writes `blocks` back to back into `path`.
pub fn write_fixture(path: &Path, blocks: &[Block]) -> io::Result<()> {
    fs::write(path, concat_blocks(blocks))
}

/// Reads a fixture file written by [`write_fixture`].
///
/// # Errors
///
/// Returns [`io::ErrorKind::InvalidData`] when the file length is not a
/// whole multiple of [`BLOCK_LEN`].
pub fn read_fixture(path: &Path) -> io::Result<Vec<Block>> {
    let bytes = fs::read(path)?;
    let (blocks, rest) = bytes.as_chunks::<BLOCK_LEN>();
    if !rest.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "{} is {} bytes, not a whole number of {BLOCK_LEN}-byte blocks",
                path.display(),
                bytes.len()
            ),
        ));
    }
    Ok(blocks.to_vec())
}

/// A temporary directory holding one fixture file.
///
/// The directory is removed when the value is dropped.
pub struct FixtureFile {
    _dir: TempDir,
    path: PathBuf,
}

impl FixtureFile {
    /// Writes `blocks` into a fresh temporary directory.
    pub fn create(blocks: &[Block]) -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("blocks.bin");
        write_fixture(&path, blocks)?;
        Ok(Self { _dir: dir, path })
    }

    /// Path of the fixture file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the blocks back.
    pub fn read(&self) -> io::Result<Vec<Block>> {
        read_fixture(&self.path)
    }
}
