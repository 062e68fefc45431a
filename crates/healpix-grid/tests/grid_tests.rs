//! Tests for HEALPix grids, grid names and orderings.

use healpix_grid::{GridSpec, HealpixError, HealpixGrid, Ordering};

#[test]
fn test_sizes_from_name() {
    for (nside, size) in [(2, 48), (3, 108), (64, 49152)] {
        let by_name = HealpixGrid::from_name(&format!("h{}", nside)).unwrap();
        let direct = HealpixGrid::new(nside, Ordering::Ring).unwrap();
        assert_eq!(by_name.size(), size);
        assert_eq!(direct.size(), size);
        assert_eq!(by_name, direct);
    }
}

#[test]
fn test_name_spellings_build_equal_grids() {
    let nested = HealpixGrid::new(2, Ordering::Nested).unwrap();
    for name in ["h2N", "Hn2", "h2_nEsted"] {
        assert_eq!(HealpixGrid::from_name(name).unwrap(), nested, "{}", name);
    }

    let ring = HealpixGrid::new(2, Ordering::Ring).unwrap();
    for name in ["H2", "h2r", "hR2", "h2_rinG"] {
        assert_eq!(HealpixGrid::from_name(name).unwrap(), ring, "{}", name);
    }
    assert_ne!(ring, nested);
}

#[test]
fn test_spec_round_trip_through_json() {
    let spec: GridSpec = serde_json::from_str(r#"{"grid":"h2","order":"nested"}"#).unwrap();
    let grid = spec.build().unwrap();
    assert_eq!(grid.ordering(), Ordering::Nested);
    assert_eq!(grid.spec_json(), r#"{"grid":"H2","order":"nested"}"#);

    let spec: GridSpec = serde_json::from_str(r#"{"grid":"h2n","order":"ring"}"#).unwrap();
    let grid = spec.build().unwrap();
    assert_eq!(grid.ordering(), Ordering::Ring);
    assert_eq!(grid.spec_json(), r#"{"grid":"H2"}"#);
    assert_eq!(grid.to_string(), "H2");
}

#[test]
fn test_invalid_names() {
    for name in ["H0", "G4", "h4q"] {
        assert!(matches!(
            HealpixGrid::from_name(name),
            Err(HealpixError::InvalidParameter { .. })
        ));
    }
    // Valid name, but nested needs a power of two
    assert!(HealpixGrid::from_name("h6n").is_err());
}

#[test]
fn test_to_latlon_nested_is_permutation_of_ring() {
    let ring = HealpixGrid::new(4, Ordering::Ring).unwrap();
    let nested = HealpixGrid::new(4, Ordering::Nested).unwrap();

    let (ring_lat, ring_lon) = ring.to_latlon().unwrap();
    let (nest_lat, nest_lon) = nested.to_latlon().unwrap();
    assert_eq!(ring_lat.len(), 192);
    assert_eq!(nest_lat.len(), 192);

    let to_ring = nested.reorder(Ordering::Ring).unwrap();
    for (n, &r) in to_ring.iter().enumerate() {
        assert_eq!(nest_lat[n], ring_lat[r as usize]);
        assert_eq!(nest_lon[n], ring_lon[r as usize]);
    }
}

#[test]
fn test_to_latlon_matches_center() {
    let grid = HealpixGrid::new(8, Ordering::Nested).unwrap();
    let (lats, lons) = grid.to_latlon().unwrap();
    for index in (0..grid.size()).step_by(7) {
        let c = grid.center(index).unwrap();
        assert_eq!(lats[index as usize], c.lat);
        assert_eq!(lons[index as usize], c.lon);
    }
}

#[test]
fn test_reorder_tables_are_inverse() {
    let ring = HealpixGrid::new(8, Ordering::Ring).unwrap();
    let nested = HealpixGrid::new(8, Ordering::Nested).unwrap();

    let to_nest = ring.reorder(Ordering::Nested).unwrap();
    let to_ring = nested.reorder(Ordering::Ring).unwrap();
    for (r, &n) in to_nest.iter().enumerate() {
        assert_eq!(to_ring[n as usize], r as i64);
    }

    let identity = nested.reorder(Ordering::Nested).unwrap();
    assert!(identity.iter().enumerate().all(|(i, &v)| v == i as i64));
}
