//! Geographic utilities: great-circle distance, path length, simplification.

use geo::{Coord, LineString, SimplifyIdx};

use crate::GeoFix;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two fixes in meters, using the
/// haversine formula.
pub fn haversine_distance(p1: &GeoFix, p2: &GeoFix) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = (p2.latitude - p1.latitude).to_radians();
    let dlng = (p2.longitude - p1.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Total length of a path in meters, summed over consecutive pairs in
/// stored order. Returns 0.0 for fewer than two points.
///
/// The sum depends on point order: reordering the same points generally
/// changes the result.
pub fn polyline_length(points: &[GeoFix]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Douglas-Peucker simplification that keeps original fixes.
///
/// Unlike simplifying raw coordinates, this returns the subset of input
/// fixes retained by the algorithm, in order, so timestamps and accuracy
/// survive. `tolerance` is in degrees (0.0001 is roughly 11 meters).
pub fn simplify_track(points: &[GeoFix], tolerance: f64) -> Vec<GeoFix> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let coords: Vec<Coord<f64>> = points
        .iter()
        .map(|p| Coord {
            x: p.longitude,
            y: p.latitude,
        })
        .collect();

    let line = LineString::new(coords);
    let kept = line.simplify_idx(&tolerance);

    kept.into_iter().map(|i| points[i]).collect()
}
