//! Nested HEALPix ordering and ring <-> nested renumbering.
//!
//! In nested ordering each of the 12 base faces holds `nside^2` pixels
//! numbered along a Z-order curve: pixel `(x, y)` of face `f` is
//! `f * nside^2 + interleave(x, y)`. This only works when `nside` is a power
//! of two.
//!
//! Face layout:
//! - 0-3: north polar cap
//! - 4-7: equatorial belt
//! - 8-11: south polar cap

use tracing::debug;

use crate::error::{HealpixError, HealpixResult, IndexKind};
use crate::indexer::MAX_NSIDE;

/// Ring number (in units of nside) of each face's southern corner.
const JRLL: [i64; 12] = [2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4];

/// Longitude of each face's centre, in units of a quarter-pixel of the
/// face's equatorial ring.
const JPLL: [i64; 12] = [1, 3, 5, 7, 0, 2, 4, 6, 1, 3, 5, 7];

/// Interleave the bits of `v` with zeros: `b3b2b1b0 -> 0b30b20b10b0`.
#[inline]
pub fn spread_bits(v: u32) -> u64 {
    let mut b = v as u64;
    b = (b | (b << 16)) & 0x0000_ffff_0000_ffff;
    b = (b | (b << 8)) & 0x00ff_00ff_00ff_00ff;
    b = (b | (b << 4)) & 0x0f0f_0f0f_0f0f_0f0f;
    b = (b | (b << 2)) & 0x3333_3333_3333_3333;
    b = (b | (b << 1)) & 0x5555_5555_5555_5555;
    b
}

/// Inverse of [`spread_bits`]; odd bits are ignored.
#[inline]
pub fn compress_bits(v: u64) -> u32 {
    let mut b = v & 0x5555_5555_5555_5555;
    b = (b | (b >> 1)) & 0x3333_3333_3333_3333;
    b = (b | (b >> 2)) & 0x0f0f_0f0f_0f0f_0f0f;
    b = (b | (b >> 4)) & 0x00ff_00ff_00ff_00ff;
    b = (b | (b >> 8)) & 0x0000_ffff_0000_ffff;
    b = (b | (b >> 16)) & 0x0000_0000_ffff_ffff;
    b as u32
}

fn isqrt(v: i64) -> i64 {
    ((v as f64) + 0.5).sqrt() as i64
}

/// Renumbering between ring and nested ordering for one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reorder {
    nside: i64,
    /// log2(nside)
    order: u32,
    npix: i64,
    /// Pixels in the north polar cap
    ncap: i64,
}

impl Reorder {
    /// Fails with `InvalidParameter` unless `nside` is a power of two in
    /// `[1, MAX_NSIDE]`.
    pub fn new(nside: i64) -> HealpixResult<Self> {
        if nside <= 0 || nside > MAX_NSIDE {
            return Err(HealpixError::invalid(
                "nside",
                format!("must be within [1, {}], got {}", MAX_NSIDE, nside),
            ));
        }
        if nside & (nside - 1) != 0 {
            return Err(HealpixError::invalid(
                "nside",
                format!("nested ordering requires a power of two, got {}", nside),
            ));
        }

        Ok(Self {
            nside,
            order: nside.trailing_zeros(),
            npix: 12 * nside * nside,
            ncap: 2 * nside * (nside - 1),
        })
    }

    pub fn nside(&self) -> i64 {
        self.nside
    }

    pub fn size(&self) -> i64 {
        self.npix
    }

    /// Nested index of ring-ordered pixel `pix`.
    pub fn ring_to_nest(&self, pix: i64) -> HealpixResult<i64> {
        HealpixError::check_index(IndexKind::Rank, pix, self.npix)?;
        let (ix, iy, face) = self.ring_to_xyf(pix);
        Ok(self.xyf_to_nest(ix, iy, face))
    }

    /// Ring index of nested pixel `pix`.
    pub fn nest_to_ring(&self, pix: i64) -> HealpixResult<i64> {
        HealpixError::check_index(IndexKind::Rank, pix, self.npix)?;
        let (ix, iy, face) = self.nest_to_xyf(pix);
        Ok(self.xyf_to_ring(ix, iy, face))
    }

    /// Full renumbering table: `table[i]` is the nested index of ring pixel
    /// `i` when `to_nested`, otherwise the ring index of nested pixel `i`.
    pub fn table(&self, to_nested: bool) -> Vec<i64> {
        debug!(
            nside = self.nside,
            to = if to_nested { "nested" } else { "ring" },
            "Building HEALPix renumbering table"
        );
        (0..self.npix)
            .map(|pix| {
                if to_nested {
                    let (ix, iy, face) = self.ring_to_xyf(pix);
                    self.xyf_to_nest(ix, iy, face)
                } else {
                    let (ix, iy, face) = self.nest_to_xyf(pix);
                    self.xyf_to_ring(ix, iy, face)
                }
            })
            .collect()
    }

    fn xyf_to_nest(&self, ix: i64, iy: i64, face: usize) -> i64 {
        let inner = spread_bits(ix as u32) | (spread_bits(iy as u32) << 1);
        ((face as i64) << (2 * self.order)) + inner as i64
    }

    fn nest_to_xyf(&self, pix: i64) -> (i64, i64, usize) {
        let face = (pix >> (2 * self.order)) as usize;
        let inner = (pix & ((1i64 << (2 * self.order)) - 1)) as u64;
        (
            compress_bits(inner) as i64,
            compress_bits(inner >> 1) as i64,
            face,
        )
    }

    fn ring_to_xyf(&self, pix: i64) -> (i64, i64, usize) {
        let nside = self.nside;
        let nl2 = 2 * nside;

        let (iring, iphi, kshift, nr, face) = if pix < self.ncap {
            // North polar cap
            let iring = (1 + isqrt(1 + 2 * pix)) >> 1;
            let iphi = (pix + 1) - 2 * iring * (iring - 1);
            let face = (iphi - 1) / iring;
            (iring, iphi, 0, iring, face)
        } else if pix < self.npix - self.ncap {
            // Equatorial belt
            let ip = pix - self.ncap;
            let tmp = ip >> (self.order + 2);
            let iring = tmp + nside;
            let iphi = ip - tmp * 4 * nside + 1;
            let kshift = (iring + nside) & 1;
            let ire = tmp + 1;
            let irm = nl2 + 1 - tmp;
            let ifm = (iphi - (ire >> 1) + nside - 1) >> self.order;
            let ifp = (iphi - (irm >> 1) + nside - 1) >> self.order;
            let face = if ifp == ifm {
                ifp | 4
            } else if ifp < ifm {
                ifp
            } else {
                ifm + 8
            };
            (iring, iphi, kshift, nside, face)
        } else {
            // South polar cap
            let ip = self.npix - pix;
            let iring = (1 + isqrt(2 * ip - 1)) >> 1;
            let iphi = 4 * iring + 1 - (ip - 2 * iring * (iring - 1));
            let face = 8 + (iphi - 1) / iring;
            (2 * nl2 - iring, iphi, 0, iring, face)
        };

        let face = face as usize;
        let irt = iring - (2 + (face as i64 >> 2)) * nside + 1;
        let mut ipt = 2 * iphi - JPLL[face] * nr - kshift - 1;
        if ipt >= nl2 {
            ipt -= 8 * nside;
        }

        ((ipt - irt) >> 1, (-ipt - irt) >> 1, face)
    }

    fn xyf_to_ring(&self, ix: i64, iy: i64, face: usize) -> i64 {
        let nl4 = 4 * self.nside;
        let ring = JRLL[face] * self.nside - ix - iy - 1;
        let (start, ring_pixels, shifted) = self.ring_info(ring);

        let nr = ring_pixels >> 2;
        let kshift = if shifted { 0 } else { 1 };
        let mut jp = (JPLL[face] * nr + ix - iy + 1 + kshift) / 2;
        if jp > nl4 {
            jp -= nl4;
        }
        if jp < 1 {
            jp += nl4;
        }

        start + jp - 1
    }

    /// First pixel, pixel count and half-pixel shift of 1-based `ring`.
    fn ring_info(&self, ring: i64) -> (i64, i64, bool) {
        let nside = self.nside;
        if ring < nside {
            (2 * ring * (ring - 1), 4 * ring, true)
        } else if ring < 3 * nside {
            let pixels = 4 * nside;
            (
                self.ncap + (ring - nside) * pixels,
                pixels,
                (ring - nside) & 1 == 0,
            )
        } else {
            let nre = 4 * nside - ring;
            (self.npix - 2 * nre * (nre + 1), 4 * nre, true)
        }
    }
}
