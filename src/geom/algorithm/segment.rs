use geo::{Coord, Line};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use smallvec::{smallvec, SmallVec};

/// Cross product of (b - a) and (p - a); positive when `p` is left of the directed line a→b.
#[inline]
pub(crate) fn cross(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// True if `p` lies on or to the left of the directed edge a→b.
#[inline]
pub fn left_side(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> bool {
    cross(a, b, p) >= 0.0
}

/// True if `p` lies on the closed segment a–b.
fn on_segment(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> bool {
    cross(a, b, p) == 0.0
        && p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Intersection points of two closed segments.
///
/// Returns two points (the ends of the shared piece) when the segments are
/// collinear and overlap, one point for a simple crossing or touch, and none otherwise.
pub fn closed_segment_intersections(
    a0: Coord<f64>, a1: Coord<f64>,
    b0: Coord<f64>, b1: Coord<f64>,
) -> SmallVec<[Coord<f64>; 2]> {
    // Degenerate segments collapse to point tests.
    match (a0 == a1, b0 == b1) {
        (true, true) => return if a0 == b0 { smallvec![a0] } else { smallvec![] },
        (true, false) => return if on_segment(b0, b1, a0) { smallvec![a0] } else { smallvec![] },
        (false, true) => return if on_segment(a0, a1, b0) { smallvec![b0] } else { smallvec![] },
        (false, false) => {}
    }

    match line_intersection(Line::new(a0, a1), Line::new(b0, b1)) {
        None => smallvec![],
        Some(LineIntersection::SinglePoint { intersection, .. }) => smallvec![intersection],
        Some(LineIntersection::Collinear { intersection }) => {
            if intersection.start == intersection.end {
                smallvec![intersection.start]
            } else {
                smallvec![intersection.start, intersection.end]
            }
        }
    }
}
