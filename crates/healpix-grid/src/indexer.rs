//! Ring-ordered HEALPix pixel indexing.
//!
//! The sphere is cut into `4 * nside - 1` iso-latitude rows. Row pixel
//! counts grow by 4 per row from the north pole up to `4 * nside`, stay flat
//! across the equatorial belt and shrink again towards the south pole, so
//! that every pixel covers the same area.
//!
//! Pixels are ranked row-major: north to south, west to east within a row.
//! A cumulative table of row sizes is built once at construction, after
//! which rank to row lookup is an upper-bound binary search.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HealpixError, HealpixResult, IndexKind};

/// Largest accepted resolution. Keeps `12 * nside^2` and the row table
/// comfortably inside memory and `i64`.
pub const MAX_NSIDE: i64 = 1 << 20;

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees east, in [0, 360)
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Rank/row/coordinate indexer for one HEALPix resolution.
///
/// Immutable after construction; share it freely across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealpixIndexer {
    nside: i64,
    /// `pla[i]` is the number of pixels in rows `0..=i`.
    pla: Vec<i64>,
}

impl HealpixIndexer {
    /// Build the indexer for `nside`.
    ///
    /// Fails with `InvalidParameter` unless `0 < nside <= MAX_NSIDE`.
    pub fn new(nside: i64) -> HealpixResult<Self> {
        if nside <= 0 {
            return Err(HealpixError::invalid(
                "nside",
                format!("must be positive, got {}", nside),
            ));
        }
        if nside > MAX_NSIDE {
            return Err(HealpixError::invalid(
                "nside",
                format!("must not exceed {}, got {}", MAX_NSIDE, nside),
            ));
        }

        let rows = 4 * nside - 1;
        let mut pla = Vec::with_capacity(rows as usize);
        let mut total = 0i64;
        for row in 0..rows {
            total += ring_pixels(nside, row);
            pla.push(total);
        }

        debug_assert_eq!(total, 12 * nside * nside);
        debug!(nside, rows, size = total, "Built HEALPix row table");

        Ok(Self { nside, pla })
    }

    /// Resolution parameter.
    pub fn nside(&self) -> i64 {
        self.nside
    }

    /// Total number of pixels, `12 * nside^2`.
    pub fn size(&self) -> i64 {
        12 * self.nside * self.nside
    }

    /// Number of iso-latitude rows, `4 * nside - 1`.
    pub fn row_count(&self) -> i64 {
        self.pla.len() as i64
    }

    /// Number of pixels in `row`.
    pub fn row_pixel_count(&self, row: i64) -> HealpixResult<i64> {
        HealpixError::check_index(IndexKind::Row, row, self.row_count())?;
        Ok(ring_pixels(self.nside, row))
    }

    /// Rank of the first pixel in `row`.
    pub fn row_start(&self, row: i64) -> HealpixResult<i64> {
        let row = HealpixError::check_index(IndexKind::Row, row, self.row_count())?;
        Ok(self.start_of(row))
    }

    /// Row containing `rank`.
    ///
    /// Returns the smallest row `i` with `pla[i] > rank`, so a rank equal to
    /// a cumulative boundary `pla[i]` lands in row `i + 1`.
    pub fn row_of(&self, rank: i64) -> HealpixResult<i64> {
        HealpixError::check_index(IndexKind::Rank, rank, self.size())?;
        Ok(self.pla.partition_point(|&cumulative| cumulative <= rank) as i64)
    }

    /// Approximate centre of pixel `rank`.
    ///
    /// Rows are spaced `45 / nside` degrees apart starting one step below
    /// the north pole. Odd rows are shifted east by half a pixel width.
    pub fn latlon(&self, rank: i64) -> HealpixResult<LatLon> {
        let row = self.row_of(rank)?;
        let j = rank - self.start_of(row as usize);
        Ok(self.latlon_in_row(row, j))
    }

    /// Inverse of [`latlon`](Self::latlon): rank of the pixel whose centre
    /// is nearest to the given coordinate.
    ///
    /// Latitude must lie in [-90, 90]. Longitude may be any finite value and
    /// is wrapped into [0, 360).
    pub fn rank_of(&self, lat: f64, lon: f64) -> HealpixResult<i64> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(HealpixError::invalid(
                "lat",
                format!("must be within [-90, 90], got {}", lat),
            ));
        }
        if !lon.is_finite() {
            return Err(HealpixError::invalid(
                "lon",
                format!("must be finite, got {}", lon),
            ));
        }

        let dlat = 45.0 / self.nside as f64;
        let last_row = (self.row_count() - 1) as f64;
        let row = ((90.0 - lat) / dlat - 1.0).round().clamp(0.0, last_row) as i64;

        let pixels = ring_pixels(self.nside, row);
        let dlon = 180.0 / pixels as f64;
        let parity = (row & 1) as f64;
        let j = ((lon.rem_euclid(360.0) / dlon - parity) / 2.0).round() as i64;

        Ok(self.start_of(row as usize) + j.rem_euclid(pixels))
    }

    /// Approximate centres of every pixel, in rank order.
    pub fn latlons(&self) -> impl Iterator<Item = LatLon> + '_ {
        (0..self.row_count()).flat_map(move |row| {
            (0..ring_pixels(self.nside, row)).map(move |j| self.latlon_in_row(row, j))
        })
    }

    pub(crate) fn start_of(&self, row: usize) -> i64 {
        if row == 0 {
            0
        } else {
            self.pla[row - 1]
        }
    }

    fn latlon_in_row(&self, row: i64, j: i64) -> LatLon {
        let dlat = 45.0 / self.nside as f64;
        let lat = 90.0 - dlat * (row + 1) as f64;

        let dlon = 180.0 / ring_pixels(self.nside, row) as f64;
        let parity = if row % 2 == 1 { 1 } else { 0 };
        let lon = dlon * (2 * j + parity) as f64;

        LatLon { lat, lon }
    }
}

/// Pixel count of `row`; caller guarantees `0 <= row < 4 * nside - 1`.
///
/// Southern rows reflect onto their northern twin, which always falls below
/// `2 * nside`, so one reflection suffices.
pub(crate) fn ring_pixels(nside: i64, row: i64) -> i64 {
    let rows = 4 * nside - 1;
    let row = if row >= 2 * nside { rows - 1 - row } else { row };
    4 * (row + 1).min(nside)
}
