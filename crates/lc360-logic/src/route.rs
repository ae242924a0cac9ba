//! Pure route logic: waypoints and marker interpolation.
//!
//! Algorithm: "scale then lerp"
//! 1. Scale progress by the number of segments in the polyline
//! 2. The integer part picks the segment, the remainder is the fraction along it
//! 3. At or past the last segment, snap to the final waypoint (no extrapolation)
//! 4. Otherwise interpolate each axis independently between the segment ends

use serde::{Deserialize, Serialize};

/// A point on the synthetic tracking map (pixel coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
}

impl Waypoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other` by `t` (0 = self, 1 = other).
    pub fn lerp(self, other: Waypoint, t: f64) -> Waypoint {
        Waypoint {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn distance(self, other: Waypoint) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Marker position for `progress` along `waypoints`.
///
/// Returns `None` for routes with fewer than two points; callers skip the
/// marker for that shipment. Progress is spread evenly over segments, not
/// over distance, so a short segment is crossed as fast as a long one.
pub fn position(waypoints: &[Waypoint], progress: f64) -> Option<Waypoint> {
    if waypoints.len() < 2 {
        return None;
    }

    // Negative and NaN progress both start at the origin.
    let progress = if progress > 0.0 { progress } else { 0.0 };

    let segment_count = waypoints.len() - 1;
    let scaled = progress * segment_count as f64;
    let floor = scaled.floor();
    let fraction = scaled - floor;

    if floor >= segment_count as f64 {
        return waypoints.last().copied();
    }

    let segment = floor as usize;
    Some(waypoints[segment].lerp(waypoints[segment + 1], fraction))
}

/// Total polyline length in map units.
pub fn route_length(waypoints: &[Waypoint]) -> f64 {
    waypoints.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Whether `point` lies on the polyline within `tolerance`.
pub fn is_on_route(waypoints: &[Waypoint], point: Waypoint, tolerance: f64) -> bool {
    waypoints
        .windows(2)
        .any(|w| distance_to_segment(point, w[0], w[1]) <= tolerance)
}

fn distance_to_segment(p: Waypoint, a: Waypoint, b: Waypoint) -> f64 {
    let len_sq = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / len_sq).clamp(0.0, 1.0);
    p.distance(a.lerp(b, t))
}
