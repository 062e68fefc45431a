//! HEALPix equal-area sphere pixelisation.
//!
//! Maps between linear pixel ranks, iso-latitude rows and geographic
//! coordinates, and renumbers pixels between ring and nested ordering.

pub mod error;
pub mod grid;
pub mod indexer;
pub mod nested;
pub mod rings;

pub use error::{HealpixError, HealpixResult, IndexKind};
pub use grid::{GridName, GridSpec, HealpixGrid, Ordering};
pub use indexer::{HealpixIndexer, LatLon, MAX_NSIDE};
pub use nested::Reorder;
