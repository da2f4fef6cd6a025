//! SM3 compression core (GB/T 32905-2016).
//!
//! The digest pipeline hands this module the 64-byte folded intermediate. It
//! is hashed as a 512-bit SM3 message: the intermediate is compressed as one
//! message block, followed by the constant padding block (`0x80`, zeros, and
//! the big-endian bit length `0x200`). The result is the standard SM3 digest
//! of the intermediate, so the second compression never depends on input and
//! its message schedule is computed at compile time.
//!
//! Two realizations live here:
//!
//! - the loop-based reference ([`compress`]), written directly from the
//!   standard's round description, and
//! - [`unrolled`], a fully unrolled round schedule with register renaming.
//!
//! Both produce identical state for identical input.

pub(crate) mod unrolled;

use crate::block::{Digest256, INTERMEDIATE_LEN, Intermediate};

/// Standard SM3 initialization vector.
pub const IV: [u32; 8] = [
    0x7380_166f,
    0x4914_b2b9,
    0x1724_42d7,
    0xda8a_0600,
    0xa96f_30bc,
    0x1631_38aa,
    0xe38d_ee4d,
    0xb0fb_0e4e,
];

/// Size of one SM3 message block in bytes.
pub const MESSAGE_BLOCK_LEN: usize = 64;

const T_EARLY: u32 = 0x79cc_4519;
const T_LATE: u32 = 0x7a87_9d8a;

/// `T_j <<< (j mod 32)` for every round.
pub(crate) const T_ROTATED: [u32; 64] = rotated_round_constants();

/// The padding block that follows a 64-byte message.
pub(crate) const PADDING_BLOCK: [u8; MESSAGE_BLOCK_LEN] = padding_block();

/// Expanded schedule of [`PADDING_BLOCK`].
pub(crate) const PADDING_SCHEDULE: Schedule = expand(&load_words(&PADDING_BLOCK));

const fn rotated_round_constants() -> [u32; 64] {
    let mut out = [0u32; 64];
    let mut j = 0;
    while j < 64 {
        let base = if j < 16 { T_EARLY } else { T_LATE };
        out[j] = base.rotate_left((j % 32) as u32);
        j += 1;
    }
    out
}

const fn padding_block() -> [u8; MESSAGE_BLOCK_LEN] {
    let mut block = [0u8; MESSAGE_BLOCK_LEN];
    block[0] = 0x80;
    let bits = (INTERMEDIATE_LEN as u64 * 8).to_be_bytes();
    let mut i = 0;
    while i < 8 {
        block[MESSAGE_BLOCK_LEN - 8 + i] = bits[i];
        i += 1;
    }
    block
}

/// Expanded message words `W[0..68]` and `W'[0..64]`.
#[derive(Clone, Debug)]
pub(crate) struct Schedule {
    pub(crate) w: [u32; 68],
    pub(crate) w1: [u32; 64],
}

#[inline(always)]
pub(crate) const fn p0(x: u32) -> u32 {
    x ^ x.rotate_left(9) ^ x.rotate_left(17)
}

#[inline(always)]
pub(crate) const fn p1(x: u32) -> u32 {
    x ^ x.rotate_left(15) ^ x.rotate_left(23)
}

#[inline(always)]
const fn ff(j: usize, x: u32, y: u32, z: u32) -> u32 {
    if j < 16 {
        x ^ y ^ z
    } else {
        (x & y) | (x & z) | (y & z)
    }
}

#[inline(always)]
const fn gg(j: usize, x: u32, y: u32, z: u32) -> u32 {
    if j < 16 { x ^ y ^ z } else { (x & y) | (!x & z) }
}

/// Reads the 16 big-endian message words of a block.
#[inline]
pub(crate) const fn load_words(block: &[u8; MESSAGE_BLOCK_LEN]) -> [u32; 16] {
    let mut words = [0u32; 16];
    let mut i = 0;
    while i < 16 {
        words[i] = u32::from_be_bytes([
            block[i * 4],
            block[i * 4 + 1],
            block[i * 4 + 2],
            block[i * 4 + 3],
        ]);
        i += 1;
    }
    words
}

/// Message expansion: `W[j] = P1(W[j-16] ^ W[j-9] ^ (W[j-3] <<< 15)) ^ (W[j-13] <<< 7) ^ W[j-6]`.
pub(crate) const fn expand(words: &[u32; 16]) -> Schedule {
    let mut w = [0u32; 68];
    let mut j = 0;
    while j < 16 {
        w[j] = words[j];
        j += 1;
    }
    while j < 68 {
        w[j] = p1(w[j - 16] ^ w[j - 9] ^ w[j - 3].rotate_left(15))
            ^ w[j - 13].rotate_left(7)
            ^ w[j - 6];
        j += 1;
    }

    let mut w1 = [0u32; 64];
    j = 0;
    while j < 64 {
        w1[j] = w[j] ^ w[j + 4];
        j += 1;
    }
    Schedule { w, w1 }
}

/// Applies the SM3 compression function to `state` with one message block.
///
/// This is the loop-based reference realization.
///
/// # Examples
///
/// ```
/// use integrity::sm3::{IV, compress, state_to_bytes};
///
/// // "abc" padded to one block: 0x80 terminator, bit length 24.
/// let mut block = [0u8; 64];
/// block[..3].copy_from_slice(b"abc");
/// block[3] = 0x80;
/// block[63] = 0x18;
///
/// let mut state = IV;
/// compress(&mut state, &block);
/// assert_eq!(state_to_bytes(&state)[..4], [0x66, 0xc7, 0xf0, 0xf4]);
/// ```
pub fn compress(state: &mut [u32; 8], block: &[u8; MESSAGE_BLOCK_LEN]) {
    compress_schedule(state, &expand(&load_words(block)));
}

pub(crate) fn compress_schedule(state: &mut [u32; 8], schedule: &Schedule) {
    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for j in 0..64 {
        let a12 = a.rotate_left(12);
        let ss1 = a12.wrapping_add(e).wrapping_add(T_ROTATED[j]).rotate_left(7);
        let ss2 = ss1 ^ a12;
        let tt1 = ff(j, a, b, c)
            .wrapping_add(d)
            .wrapping_add(ss2)
            .wrapping_add(schedule.w1[j]);
        let tt2 = gg(j, e, f, g)
            .wrapping_add(h)
            .wrapping_add(ss1)
            .wrapping_add(schedule.w[j]);
        d = c;
        c = b.rotate_left(9);
        b = a;
        a = tt1;
        h = g;
        g = f.rotate_left(19);
        f = e;
        e = p0(tt2);
    }

    for (slot, value) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *slot ^= value;
    }
}

/// Big-endian serialization of the eight state words.
#[must_use]
pub fn state_to_bytes(state: &[u32; 8]) -> Digest256 {
    let mut out = [0u8; 32];
    for (chunk, word) in out.chunks_exact_mut(4).zip(state) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    out
}

/// SM3 digest of a 64-byte intermediate, loop-based reference path.
#[must_use]
pub fn digest_intermediate(intermediate: &Intermediate) -> Digest256 {
    let mut state = IV;
    compress(&mut state, intermediate);
    compress_schedule(&mut state, &PADDING_SCHEDULE);
    state_to_bytes(&state)
}

/// Plain SM3 over an arbitrary in-memory message.
///
/// The block digest never calls this; it serves the comparison baselines
/// and known-answer checks of the compression function.
#[must_use]
pub fn digest_message(message: &[u8]) -> Digest256 {
    let mut state = IV;
    let (blocks, tail) = message.as_chunks::<MESSAGE_BLOCK_LEN>();
    for block in blocks {
        compress(&mut state, block);
    }

    let bit_len = (message.len() as u64).wrapping_mul(8);
    let mut last = [0u8; MESSAGE_BLOCK_LEN * 2];
    last[..tail.len()].copy_from_slice(tail);
    last[tail.len()] = 0x80;
    let trailer_len = if tail.len() < MESSAGE_BLOCK_LEN - 8 {
        MESSAGE_BLOCK_LEN
    } else {
        MESSAGE_BLOCK_LEN * 2
    };
    last[trailer_len - 8..trailer_len].copy_from_slice(&bit_len.to_be_bytes());

    for block in last[..trailer_len].as_chunks::<MESSAGE_BLOCK_LEN>().0 {
        compress(&mut state, block);
    }
    state_to_bytes(&state)
}
