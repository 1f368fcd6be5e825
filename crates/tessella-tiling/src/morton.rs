//! Morton (Z-order) codes for quadtree cells.
//!
//! `x` occupies the even bits of the code and `y` the odd bits, so the four
//! children of a cell are numbered `(0,0)`, `(1,0)`, `(0,1)`, `(1,1)`.

/// Spread the bits of `v` so that bit `i` moves to bit `2i`.
fn spread(v: u32) -> u64 {
    let mut x = u64::from(v);
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    x = (x | (x << 1)) & 0x5555_5555_5555_5555;
    x
}

/// Inverse of [`spread`]: gather the even bits of `v`.
fn gather(v: u64) -> u32 {
    let mut x = v & 0x5555_5555_5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333_3333_3333;
    x = (x | (x >> 2)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x >> 4)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x >> 8)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x >> 16)) & 0x0000_0000_FFFF_FFFF;
    x as u32
}

/// Interleave `x` and `y` into a Morton code.
#[inline]
#[must_use]
pub fn encode(x: u32, y: u32) -> u64 {
    spread(x) | (spread(y) << 1)
}

/// Split a Morton code into `(x, y)`.
#[inline]
#[must_use]
pub fn decode(index: u64) -> (u32, u32) {
    (gather(index), gather(index >> 1))
}

/// Number of cells at `level` of a quadtree, i.e. `4^level`.
#[inline]
#[must_use]
pub fn size(level: u32) -> u64 {
    1u64 << (2 * level)
}
