use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use geo::{ConvexHull, Coord, CoordsIter, MultiPoint, Rect};

use crate::geom::{bbox::bounds_of, Affine};

/// Relative tolerance under which two candidate box areas count as equal.
const AREA_RTOL: f64 = 1e-9;

/// Fold an edge direction into [-π/4, π/4): a box aligned with an edge is
/// also aligned with the perpendicular edges, so only the angle mod π/2 matters.
fn fold_quarter_turn(theta: f64) -> f64 {
    let t = theta.rem_euclid(FRAC_PI_2);
    if t >= FRAC_PI_4 { t - FRAC_PI_2 } else { t }
}

/// Find the rotation giving the minimum-area axis-aligned box of a point set.
///
/// The optimal box shares a side with the convex hull, so only hull edge
/// directions are tried (rotating calipers). Returns the rotation angle (radians)
/// to apply to the points and the box in the rotated frame, or `None` for an empty set.
/// Among equal-area candidates the smallest rotation wins, so an already
/// axis-aligned layout is left unrotated.
pub fn tightest_bbox(points: &[Coord<f64>]) -> Option<(f64, Rect<f64>)> {
    if points.is_empty() { return None }

    let hull = MultiPoint::from(points.to_vec()).convex_hull();
    let mut ring = hull.exterior().coords_iter().collect::<Vec<_>>();
    if ring.len() > 1 { ring.pop(); } // Remove the duplicate closing coord.
    if ring.is_empty() { ring = points.to_vec() }

    let mut candidates = vec![0.0];
    for i in 0..ring.len() {
        let (p, q) = (ring[i], ring[(i + 1) % ring.len()]);
        if p == q { continue }
        candidates.push(-fold_quarter_turn((q.y - p.y).atan2(q.x - p.x)));
    }

    let mut best: Option<(f64, Rect<f64>, f64)> = None;
    for angle in candidates {
        let rot = Affine::rotation(angle);
        let Some(rect) = bounds_of(ring.iter().map(|&p| rot.apply(p))) else { continue };
        let area = rect.width() * rect.height();

        let better = match &best {
            None => true,
            Some((best_angle, _, best_area)) => {
                let tol = AREA_RTOL * best_area.max(1.0);
                area < best_area - tol || (area <= best_area + tol && angle.abs() < best_angle.abs())
            }
        };
        if better { best = Some((angle, rect, area)) }
    }

    best.map(|(angle, _, _)| {
        // Recompute the box from every input point so interior points cannot escape it.
        let rot = Affine::rotation(angle);
        let rect = bounds_of(points.iter().map(|&p| rot.apply(p)))
            .unwrap_or_else(|| Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.0 }));
        (angle, rect)
    })
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_abs_diff_eq;

    use super::*;

    fn rect_corners(w: f64, h: f64) -> Vec<Coord<f64>> {
        vec![Coord { x: 0.0, y: 0.0 }, Coord { x: w, y: 0.0 }, Coord { x: w, y: h }, Coord { x: 0.0, y: h }]
    }

    #[test]
    fn axis_aligned_is_not_rotated() {
        let (angle, rect) = tightest_bbox(&rect_corners(300.0, 100.0)).unwrap();
        assert_eq!(angle, 0.0);
        assert_abs_diff_eq!(rect.width(), 300.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rect.height(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn rotated_rectangle_is_straightened() {
        let tilt = Affine::rotation(PI / 6.0).translated(50.0, -20.0);
        let mut pts = rect_corners(400.0, 100.0);
        tilt.apply_all(&mut pts);

        let (angle, rect) = tightest_bbox(&pts).unwrap();
        assert_abs_diff_eq!(angle, -PI / 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rect.width(), 400.0, epsilon = 1e-6);
        assert_abs_diff_eq!(rect.height(), 100.0, epsilon = 1e-6);
    }

    #[test]
    fn steep_rotation_folds_to_small_angle() {
        // A 70 degree tilt is straightened by -70 + 90 = +20 degrees with width and height swapped.
        let tilt = Affine::rotation(70f64.to_radians());
        let mut pts = rect_corners(400.0, 100.0);
        tilt.apply_all(&mut pts);

        let (angle, rect) = tightest_bbox(&pts).unwrap();
        assert_abs_diff_eq!(angle, 20f64.to_radians(), epsilon = 1e-9);
        assert_abs_diff_eq!(rect.width() * rect.height(), 40_000.0, epsilon = 1e-4);
    }

    #[test]
    fn interior_points_inside_box() {
        let mut pts = rect_corners(10.0, 10.0);
        pts.push(Coord { x: 5.0, y: 5.0 });
        let (_, rect) = tightest_bbox(&pts).unwrap();
        assert_abs_diff_eq!(rect.width() * rect.height(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn single_point_and_empty() {
        let (angle, rect) = tightest_bbox(&[Coord { x: 3.0, y: 4.0 }]).unwrap();
        assert_eq!(angle, 0.0);
        assert_eq!(rect.width(), 0.0);
        assert!(tightest_bbox(&[]).is_none());
    }
}
