//! Reference HEALPix ring geometry.
//!
//! [`HealpixIndexer::latlon`] spaces rows evenly in latitude. The true ring
//! centres of the equal-area construction sit at `z = cos(colatitude)`
//! values that are quadratic in the ring number inside the polar caps and
//! linear across the equatorial belt:
//!
//! - north cap (ring `k < nside`): `z = 1 - k^2 / (3 nside^2)`
//! - belt (`nside <= k <= 2 nside`): `z = 4/3 - 2k / (3 nside)`
//!
//! Southern rings mirror the northern ones. Cap rings and every other belt
//! ring start half a pixel east of the prime meridian.

use crate::error::{HealpixError, HealpixResult, IndexKind};
use crate::indexer::{ring_pixels, HealpixIndexer, LatLon};

impl HealpixIndexer {
    /// Exact ring-centre latitudes, north to south.
    pub fn ring_latitudes(&self) -> Vec<f64> {
        (0..self.row_count()).map(|row| self.ring_latitude(row)).collect()
    }

    /// Exact pixel-centre longitudes of `row`, west to east.
    pub fn ring_longitudes(&self, row: i64) -> HealpixResult<Vec<f64>> {
        HealpixError::check_index(IndexKind::Row, row, self.row_count())?;
        let (start, step) = self.longitude_start_step(row);
        let pixels = ring_pixels(self.nside(), row);
        Ok((0..pixels).map(|j| start + j as f64 * step).collect())
    }

    /// Exact centre of pixel `rank` on the reference HEALPix rings.
    pub fn center(&self, rank: i64) -> HealpixResult<LatLon> {
        let row = self.row_of(rank)?;
        let j = rank - self.start_of(row as usize);
        Ok(self.center_in_row(row, j))
    }

    pub(crate) fn center_in_row(&self, row: i64, j: i64) -> LatLon {
        let (start, step) = self.longitude_start_step(row);
        LatLon {
            lat: self.ring_latitude(row),
            lon: start + j as f64 * step,
        }
    }

    fn ring_latitude(&self, row: i64) -> f64 {
        let nside = self.nside();
        let ring = row + 1;
        if ring > 2 * nside {
            return -self.ring_latitude(self.row_count() - 1 - row);
        }
        if ring == 2 * nside {
            return 0.0;
        }

        let n = nside as f64;
        let k = ring as f64;
        let z = if ring < nside {
            1.0 - k * k / (3.0 * n * n)
        } else {
            4.0 / 3.0 - 2.0 * k / (3.0 * n)
        };
        90.0 - z.acos().to_degrees()
    }

    fn longitude_start_step(&self, row: i64) -> (f64, f64) {
        let nside = self.nside();
        let step = 360.0 / ring_pixels(nside, row) as f64;
        let shifted = row < nside || row > 3 * nside - 1 || (row + nside) % 2 == 1;
        let start = if shifted { step / 2.0 } else { 0.0 };
        (start, step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_nside_1_geometry() {
        let idx = HealpixIndexer::new(1).unwrap();
        let lats = idx.ring_latitudes();
        let cap = (2.0f64 / 3.0).asin().to_degrees();
        assert!(approx_eq(lats[0], cap), "got {}", lats[0]);
        assert_eq!(lats[1], 0.0);
        assert!(approx_eq(lats[2], -cap));

        assert_eq!(idx.ring_longitudes(0).unwrap(), vec![45.0, 135.0, 225.0, 315.0]);
        assert_eq!(idx.ring_longitudes(1).unwrap(), vec![0.0, 90.0, 180.0, 270.0]);
        assert_eq!(idx.ring_longitudes(2).unwrap(), vec![45.0, 135.0, 225.0, 315.0]);
    }

    #[test]
    fn test_latitudes_descend_and_mirror() {
        for nside in [1, 2, 3, 8, 32] {
            let idx = HealpixIndexer::new(nside).unwrap();
            let lats = idx.ring_latitudes();
            assert_eq!(lats.len() as i64, idx.row_count());
            assert!(lats.windows(2).all(|w| w[0] > w[1]), "nside={}", nside);
            for (a, b) in lats.iter().zip(lats.iter().rev()) {
                assert!(approx_eq(*a, -*b));
            }
            assert_eq!(lats[(2 * nside - 1) as usize], 0.0);
            assert!(lats[0] < 90.0 && lats[0] > 90.0 - 90.0 / nside as f64);
        }
    }

    #[test]
    fn test_belt_rings_alternate_offset() {
        let idx = HealpixIndexer::new(4).unwrap();
        // Belt rows 4..=10; cap boundary row 3 is shifted
        assert_eq!(idx.ring_longitudes(3).unwrap()[0], 11.25);
        assert_eq!(idx.ring_longitudes(4).unwrap()[0], 0.0);
        assert_eq!(idx.ring_longitudes(5).unwrap()[0], 11.25);
        assert_eq!(idx.ring_longitudes(10).unwrap()[0], 0.0);
        assert_eq!(idx.ring_longitudes(11).unwrap()[0], 11.25);
    }

    #[test]
    fn test_center_matches_ring_tables() {
        let idx = HealpixIndexer::new(3).unwrap();
        let lats = idx.ring_latitudes();
        let mut rank = 0;
        for row in 0..idx.row_count() {
            for lon in idx.ring_longitudes(row).unwrap() {
                let c = idx.center(rank).unwrap();
                assert_eq!(c.lat, lats[row as usize]);
                assert!(approx_eq(c.lon, lon));
                rank += 1;
            }
        }
        assert_eq!(rank, idx.size());
        assert!(idx.center(rank).is_err());
        assert!(idx.ring_longitudes(idx.row_count()).is_err());
    }
}
