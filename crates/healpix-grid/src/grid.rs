//! HEALPix grids: a resolution plus a pixel ordering.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HealpixError, HealpixResult, IndexKind};
use crate::indexer::{HealpixIndexer, LatLon};
use crate::nested::Reorder;

/// Pixel numbering scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ordering {
    /// Row-major along iso-latitude rings, north to south
    #[default]
    Ring,
    /// Z-order within each of the 12 base faces
    Nested,
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ordering::Ring => write!(f, "ring"),
            Ordering::Nested => write!(f, "nested"),
        }
    }
}

impl FromStr for Ordering {
    type Err = HealpixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ring" => Ok(Ordering::Ring),
            "nested" => Ok(Ordering::Nested),
            _ => Err(HealpixError::invalid(
                "ordering",
                format!("expected 'ring' or 'nested', got '{}'", s),
            )),
        }
    }
}

/// A parsed grid name such as `H4`, `h2n`, `Hn2` or `h2_nested`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridName {
    pub nside: i64,
    pub ordering: Ordering,
}

impl GridName {
    /// Parse a grid name (case-insensitive).
    ///
    /// Accepts `H<N>` optionally followed by `n`, `nested`, `_nested`, `r`,
    /// `ring` or `_ring`, or `H` followed by `n`/`r` and then `<N>`.
    /// `<N>` must not start with a zero.
    pub fn parse(s: &str) -> HealpixResult<Self> {
        let bad = || {
            HealpixError::invalid(
                "grid",
                format!("'{}' is not a HEALPix grid name (e.g. H4, h2n, H8_nested)", s),
            )
        };

        let lower = s.trim().to_lowercase();
        let rest = lower.strip_prefix('h').ok_or_else(bad)?;

        let (prefix, rest) = match rest.chars().next() {
            Some(c @ ('n' | 'r')) => (Some(c), &rest[1..]),
            _ => (None, rest),
        };

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, suffix) = rest.split_at(digits_end);
        if digits.is_empty() || digits.starts_with('0') {
            return Err(bad());
        }
        let nside: i64 = digits.parse().map_err(|_| bad())?;

        let ordering = match (prefix, suffix) {
            (Some('n'), "") => Ordering::Nested,
            (Some(_), "") => Ordering::Ring,
            (None, "" | "r" | "ring" | "_ring") => Ordering::Ring,
            (None, "n" | "nested" | "_nested") => Ordering::Nested,
            _ => return Err(bad()),
        };

        Ok(Self { nside, ordering })
    }
}

impl FromStr for GridName {
    type Err = HealpixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GridName::parse(s)
    }
}

impl fmt::Display for GridName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ordering {
            Ordering::Ring => write!(f, "H{}", self.nside),
            Ordering::Nested => write!(f, "H{}_nested", self.nside),
        }
    }
}

/// Serialized form of a grid, e.g. `{"grid":"H2","order":"nested"}`.
///
/// Ring ordering is the default and is omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub grid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Ordering>,
}

impl GridSpec {
    /// Resolve into a grid. An explicit `order` overrides any ordering
    /// implied by the grid name.
    pub fn build(&self) -> HealpixResult<HealpixGrid> {
        let name = GridName::parse(&self.grid)?;
        HealpixGrid::new(name.nside, self.order.unwrap_or(name.ordering))
    }
}

/// HEALPix grid with a fixed resolution and ordering.
#[derive(Debug, Clone)]
pub struct HealpixGrid {
    indexer: HealpixIndexer,
    ordering: Ordering,
    /// Present for nested grids
    reorder: Option<Reorder>,
}

impl HealpixGrid {
    /// Create a grid. Nested ordering requires `nside` to be a power of two.
    pub fn new(nside: i64, ordering: Ordering) -> HealpixResult<Self> {
        let indexer = HealpixIndexer::new(nside)?;
        let reorder = match ordering {
            Ordering::Ring => None,
            Ordering::Nested => Some(Reorder::new(nside)?),
        };

        debug!(nside, %ordering, "Created HEALPix grid");

        Ok(Self {
            indexer,
            ordering,
            reorder,
        })
    }

    /// Create a grid from a name such as `H4` or `h8_nested`.
    pub fn from_name(name: &str) -> HealpixResult<Self> {
        let name = GridName::parse(name)?;
        Self::new(name.nside, name.ordering)
    }

    pub fn nside(&self) -> i64 {
        self.indexer.nside()
    }

    pub fn ordering(&self) -> Ordering {
        self.ordering
    }

    pub fn size(&self) -> i64 {
        self.indexer.size()
    }

    /// Underlying ring-ordered indexer.
    pub fn indexer(&self) -> &HealpixIndexer {
        &self.indexer
    }

    /// Canonical name, `H<nside>`. Ordering is not part of the name.
    pub fn name(&self) -> String {
        format!("H{}", self.nside())
    }

    pub fn spec(&self) -> GridSpec {
        GridSpec {
            grid: self.name(),
            order: match self.ordering {
                Ordering::Ring => None,
                Ordering::Nested => Some(Ordering::Nested),
            },
        }
    }

    /// JSON form of [`spec`](Self::spec).
    pub fn spec_json(&self) -> String {
        serde_json::to_string(&self.spec())
            .unwrap_or_else(|_| format!(r#"{{"grid":"{}"}}"#, self.name()))
    }

    /// Ring rank of the pixel at `index` in this grid's ordering.
    pub fn ring_index(&self, index: i64) -> HealpixResult<i64> {
        match &self.reorder {
            None => {
                HealpixError::check_index(IndexKind::Rank, index, self.size())?;
                Ok(index)
            }
            Some(reorder) => reorder.nest_to_ring(index),
        }
    }

    /// Approximate centre of pixel `index`, see [`HealpixIndexer::latlon`].
    pub fn latlon(&self, index: i64) -> HealpixResult<LatLon> {
        self.indexer.latlon(self.ring_index(index)?)
    }

    /// Exact centre of pixel `index`, see [`HealpixIndexer::center`].
    pub fn center(&self, index: i64) -> HealpixResult<LatLon> {
        self.indexer.center(self.ring_index(index)?)
    }

    /// Exact centres of every pixel in this grid's ordering, as separate
    /// latitude and longitude vectors.
    pub fn to_latlon(&self) -> HealpixResult<(Vec<f64>, Vec<f64>)> {
        let ring_ranks: Vec<i64> = match &self.reorder {
            None => (0..self.size()).collect(),
            Some(reorder) => reorder.table(false),
        };

        let points: Vec<LatLon> = ring_ranks
            .par_iter()
            .map(|&rank| self.indexer.center(rank))
            .collect::<HealpixResult<_>>()?;

        Ok(points.into_iter().map(|p| (p.lat, p.lon)).unzip())
    }

    /// Renumbering into `target` ordering: `ren[i]` is the index, under
    /// `target`, of this grid's pixel `i`.
    pub fn reorder(&self, target: Ordering) -> HealpixResult<Vec<i64>> {
        if target == self.ordering {
            return Ok((0..self.size()).collect());
        }

        let reorder = match &self.reorder {
            Some(reorder) => *reorder,
            None => Reorder::new(self.nside())?,
        };
        Ok(reorder.table(target == Ordering::Nested))
    }
}

impl PartialEq for HealpixGrid {
    fn eq(&self, other: &Self) -> bool {
        self.nside() == other.nside() && self.ordering == other.ordering
    }
}

impl Eq for HealpixGrid {}

impl fmt::Display for HealpixGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", GridName { nside: self.nside(), ordering: self.ordering })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ordering() {
        assert_eq!("ring".parse::<Ordering>().unwrap(), Ordering::Ring);
        assert_eq!("NESTED".parse::<Ordering>().unwrap(), Ordering::Nested);
        assert!("zorder".parse::<Ordering>().is_err());
    }

    #[test]
    fn test_parse_grid_names() {
        for name in ["H2", "h2r", "hR2", "h2_rinG", "h2ring"] {
            let g = GridName::parse(name).unwrap();
            assert_eq!(g, GridName { nside: 2, ordering: Ordering::Ring }, "{}", name);
        }
        for name in ["h2N", "Hn2", "h2_nEsted", "H2nested"] {
            let g = GridName::parse(name).unwrap();
            assert_eq!(g, GridName { nside: 2, ordering: Ordering::Nested }, "{}", name);
        }
        assert_eq!(GridName::parse("H128").unwrap().nside, 128);
    }

    #[test]
    fn test_reject_bad_grid_names() {
        for name in ["", "H", "H0", "H02", "X4", "h2x", "hn", "hn2n", "4", "H-1"] {
            assert!(GridName::parse(name).is_err(), "{} should not parse", name);
        }
    }

    #[test]
    fn test_spec_json() {
        let ring = HealpixGrid::from_name("H3").unwrap();
        assert_eq!(ring.size(), 108);
        assert_eq!(ring.spec_json(), r#"{"grid":"H3"}"#);

        let nested = HealpixGrid::from_name("h2n").unwrap();
        assert_eq!(nested.size(), 48);
        assert_eq!(nested.spec_json(), r#"{"grid":"H2","order":"nested"}"#);
    }

    #[test]
    fn test_nested_needs_power_of_two() {
        assert!(HealpixGrid::new(3, Ordering::Nested).is_err());
        assert!(HealpixGrid::new(3, Ordering::Ring).is_ok());
        let ring = HealpixGrid::new(3, Ordering::Ring).unwrap();
        assert!(ring.reorder(Ordering::Nested).is_err());
        assert_eq!(ring.reorder(Ordering::Ring).unwrap().len(), 108);
    }

    #[test]
    fn test_nested_latlon_follows_renumbering() {
        let grid = HealpixGrid::new(2, Ordering::Nested).unwrap();
        // Nested pixel 3 is ring pixel 0
        assert_eq!(grid.ring_index(3).unwrap(), 0);
        assert_eq!(grid.latlon(3).unwrap(), grid.indexer().latlon(0).unwrap());
        assert!(grid.latlon(48).is_err());
    }
}
