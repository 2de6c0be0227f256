//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator world pixels, the space in which labels are projected and
//! markers are bucketed into clusters.

mod types;

pub use types::{LatLong, Point, Size, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON, TILE_SIZE};

use std::f64::consts::PI;

/// Edge length of the whole world in pixels at `zoom`.
///
/// Fractional zoom levels are supported.
#[inline]
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2.0_f64.powf(zoom)
}

/// Projects a location to Web Mercator world pixels at `zoom`.
///
/// Latitudes beyond the Mercator limit are clamped; longitudes are not wrapped.
#[inline]
pub fn to_world_pixel(location: LatLong, zoom: f64) -> Point {
    let n = world_size(zoom);
    let lat = location.latitude.clamp(MIN_LAT, MAX_LAT);

    let x = (location.longitude + 180.0) / 360.0 * n;

    let lat_rad = lat * PI / 180.0;
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;

    Point::new(x, y)
}

/// Converts world pixels at `zoom` back to a geographic location.
#[inline]
pub fn from_world_pixel(point: Point, zoom: f64) -> LatLong {
    let n = world_size(zoom);

    let longitude = point.x / n * 360.0 - 180.0;

    let y = point.y / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();

    LatLong::new(lat_rad * 180.0 / PI, longitude)
}

/// Arithmetic mean of a set of locations.
///
/// Returns `None` for an empty slice.
pub fn mean_location(locations: &[LatLong]) -> Option<LatLong> {
    if locations.is_empty() {
        return None;
    }
    let count = locations.len() as f64;
    let (lat, lon) = locations.iter().fold((0.0, 0.0), |(lat, lon), loc| {
        (lat + loc.latitude, lon + loc.longitude)
    });
    Some(LatLong::new(lat / count, lon / count))
}

/// Area-weighted centroid of a closed ring.
///
/// Degenerate rings (zero area, fewer than three vertices) fall back to the
/// vertex mean.
pub fn centroid(ring: &[LatLong]) -> Option<LatLong> {
    if ring.len() < 3 {
        return mean_location(ring);
    }

    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for (i, a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        let cross = a.longitude * b.latitude - b.longitude * a.latitude;
        area += cross;
        cx += (a.longitude + b.longitude) * cross;
        cy += (a.latitude + b.latitude) * cross;
    }

    if area.abs() < f64::EPSILON {
        return mean_location(ring);
    }

    area *= 0.5;
    Some(LatLong::new(cy / (6.0 * area), cx / (6.0 * area)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_size_doubles_per_zoom() {
        assert_eq!(world_size(0.0), 256.0);
        assert_eq!(world_size(1.0), 512.0);
        assert_eq!(world_size(10.0), 262_144.0);
    }

    #[test]
    fn test_equator_prime_meridian_is_world_center() {
        let p = to_world_pixel(LatLong::new(0.0, 0.0), 1.0);
        assert!((p.x - 256.0).abs() < 1e-9);
        assert!((p.y - 256.0).abs() < 1e-9);
    }

    #[test]
    fn test_new_york_at_zoom_16_matches_tile_grid() {
        // Tile (row 24640, col 19295) at zoom 16 contains NYC
        let p = to_world_pixel(LatLong::new(40.7128, -74.0060), 16.0);
        assert_eq!((p.x / TILE_SIZE) as u32, 19295);
        assert_eq!((p.y / TILE_SIZE) as u32, 24640);
    }

    #[test]
    fn test_latitude_is_clamped() {
        let north = to_world_pixel(LatLong::new(90.0, 0.0), 0.0);
        assert!(north.y.abs() < 1e-6, "clamped to top edge, got {}", north.y);
    }

    #[test]
    fn test_roundtrip_at_different_zooms() {
        let london = LatLong::new(51.5074, -0.1278);
        for zoom in [0.0, 5.0, 10.5, 18.0] {
            let back = from_world_pixel(to_world_pixel(london, zoom), zoom);
            assert!(
                (back.latitude - london.latitude).abs() < 1e-9,
                "zoom {}: latitude drifted to {}",
                zoom,
                back.latitude
            );
            assert!((back.longitude - london.longitude).abs() < 1e-9);
        }
    }

    #[test]
    fn test_mean_location() {
        assert_eq!(mean_location(&[]), None);
        let mean = mean_location(&[LatLong::new(0.0, 0.0), LatLong::new(10.0, 20.0)]).unwrap();
        assert_eq!(mean, LatLong::new(5.0, 10.0));
    }

    #[test]
    fn test_centroid_of_square() {
        let square = [
            LatLong::new(0.0, 0.0),
            LatLong::new(0.0, 2.0),
            LatLong::new(2.0, 2.0),
            LatLong::new(2.0, 0.0),
        ];
        let c = centroid(&square).unwrap();
        assert!((c.latitude - 1.0).abs() < 1e-9);
        assert!((c.longitude - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_centroid_of_degenerate_ring_uses_mean() {
        let line = [
            LatLong::new(0.0, 0.0),
            LatLong::new(1.0, 1.0),
            LatLong::new(2.0, 2.0),
        ];
        let c = centroid(&line).unwrap();
        assert!((c.latitude - 1.0).abs() < 1e-9);
    }
}
