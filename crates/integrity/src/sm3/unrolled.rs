//! Fully unrolled SM3 compression.
//!
//! Every round is expanded by macro with a fixed round index, so `T_j` and
//! the choice of boolean function resolve at compile time. Instead of
//! shifting all eight registers each round, the round macro writes the new
//! `A` into the old `D` slot and the new `E` into the old `H` slot and the
//! caller rotates the register names; after four rounds the names line up
//! again. `W'` is formed inline from `W` rather than stored.

use super::{IV, MESSAGE_BLOCK_LEN, PADDING_SCHEDULE, T_ROTATED, load_words, p0, p1, state_to_bytes};
use crate::block::{Digest256, Intermediate};

#[inline(always)]
const fn ff_early(x: u32, y: u32, z: u32) -> u32 {
    x ^ y ^ z
}

#[inline(always)]
const fn ff_late(x: u32, y: u32, z: u32) -> u32 {
    (x & y) | (x & z) | (y & z)
}

#[inline(always)]
const fn gg_early(x: u32, y: u32, z: u32) -> u32 {
    x ^ y ^ z
}

#[inline(always)]
const fn gg_late(x: u32, y: u32, z: u32) -> u32 {
    (x & y) | (!x & z)
}

macro_rules! round {
    ($w:ident, $j:expr, $ff:ident, $gg:ident, $a:ident, $b:ident, $c:ident, $d:ident, $e:ident, $f:ident, $g:ident, $h:ident) => {{
        let a12 = $a.rotate_left(12);
        let ss1 = a12
            .wrapping_add($e)
            .wrapping_add(T_ROTATED[$j])
            .rotate_left(7);
        let ss2 = ss1 ^ a12;
        let tt1 = $ff($a, $b, $c)
            .wrapping_add($d)
            .wrapping_add(ss2)
            .wrapping_add($w[$j] ^ $w[$j + 4]);
        let tt2 = $gg($e, $f, $g)
            .wrapping_add($h)
            .wrapping_add(ss1)
            .wrapping_add($w[$j]);
        $b = $b.rotate_left(9);
        $f = $f.rotate_left(19);
        $d = tt1;
        $h = p0(tt2);
    }};
}

macro_rules! four_rounds {
    ($w:ident, $j:expr, $ff:ident, $gg:ident, $a:ident, $b:ident, $c:ident, $d:ident, $e:ident, $f:ident, $g:ident, $h:ident) => {{
        round!($w, $j, $ff, $gg, $a, $b, $c, $d, $e, $f, $g, $h);
        round!($w, $j + 1, $ff, $gg, $d, $a, $b, $c, $h, $e, $f, $g);
        round!($w, $j + 2, $ff, $gg, $c, $d, $a, $b, $g, $h, $e, $f);
        round!($w, $j + 3, $ff, $gg, $b, $c, $d, $a, $f, $g, $h, $e);
    }};
}

#[inline(always)]
fn expand_words(words: &[u32; 16]) -> [u32; 68] {
    let mut w = [0u32; 68];
    w[..16].copy_from_slice(words);
    for j in 16..68 {
        w[j] = p1(w[j - 16] ^ w[j - 9] ^ w[j - 3].rotate_left(15))
            ^ w[j - 13].rotate_left(7)
            ^ w[j - 6];
    }
    w
}

#[inline(always)]
fn compress_expanded(state: &mut [u32; 8], w: &[u32; 68]) {
    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    four_rounds!(w, 0, ff_early, gg_early, a, b, c, d, e, f, g, h);
    four_rounds!(w, 4, ff_early, gg_early, a, b, c, d, e, f, g, h);
    four_rounds!(w, 8, ff_early, gg_early, a, b, c, d, e, f, g, h);
    four_rounds!(w, 12, ff_early, gg_early, a, b, c, d, e, f, g, h);
    four_rounds!(w, 16, ff_late, gg_late, a, b, c, d, e, f, g, h);
    four_rounds!(w, 20, ff_late, gg_late, a, b, c, d, e, f, g, h);
    four_rounds!(w, 24, ff_late, gg_late, a, b, c, d, e, f, g, h);
    four_rounds!(w, 28, ff_late, gg_late, a, b, c, d, e, f, g, h);
    four_rounds!(w, 32, ff_late, gg_late, a, b, c, d, e, f, g, h);
    four_rounds!(w, 36, ff_late, gg_late, a, b, c, d, e, f, g, h);
    four_rounds!(w, 40, ff_late, gg_late, a, b, c, d, e, f, g, h);
    four_rounds!(w, 44, ff_late, gg_late, a, b, c, d, e, f, g, h);
    four_rounds!(w, 48, ff_late, gg_late, a, b, c, d, e, f, g, h);
    four_rounds!(w, 52, ff_late, gg_late, a, b, c, d, e, f, g, h);
    four_rounds!(w, 56, ff_late, gg_late, a, b, c, d, e, f, g, h);
    four_rounds!(w, 60, ff_late, gg_late, a, b, c, d, e, f, g, h);

    state[0] ^= a;
    state[1] ^= b;
    state[2] ^= c;
    state[3] ^= d;
    state[4] ^= e;
    state[5] ^= f;
    state[6] ^= g;
    state[7] ^= h;
}

/// Unrolled counterpart of [`super::compress`].
#[inline]
pub(crate) fn compress(state: &mut [u32; 8], block: &[u8; MESSAGE_BLOCK_LEN]) {
    let w = expand_words(&load_words(block));
    compress_expanded(state, &w);
}

/// Unrolled counterpart of [`super::digest_intermediate`].
#[inline]
pub(crate) fn digest_intermediate(intermediate: &Intermediate) -> Digest256 {
    let mut state = IV;
    compress(&mut state, intermediate);
    compress_expanded(&mut state, &PADDING_SCHEDULE.w);
    state_to_bytes(&state)
}
