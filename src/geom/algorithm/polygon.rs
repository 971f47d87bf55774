use geo::{Coord, LineString, Polygon};

const COORD_EPS: f64 = 1e-9;
const ANGLE_EPS: f64 = 1e-12;

/// Snap near-equal coordinates to the value of an earlier point.
///
/// For each point, an x (or y) within `tol` of an earlier point's x (or y) is
/// replaced by that earlier value. Suppresses near-duplicate vertices left by
/// floating-point noise where two tiles share an edge.
pub fn snap_coords(points: &mut [Coord<f64>], tol: f64) {
    for i in 1..points.len() {
        for j in 0..i {
            if (points[i].x - points[j].x).abs() <= tol { points[i].x = points[j].x }
            if (points[i].y - points[j].y).abs() <= tol { points[i].y = points[j].y }
        }
    }
}

/// Mean of a non-empty point set.
fn centroid(points: &[Coord<f64>]) -> Coord<f64> {
    let n = points.len() as f64;
    let sum = points.iter().fold(Coord { x: 0.0, y: 0.0 }, |acc, p| acc + *p);
    Coord { x: sum.x / n, y: sum.y / n }
}

/// Assemble a convex polygon from an unordered set of its boundary vertices.
///
/// Vertices are ordered by polar angle about their centroid, which yields a
/// simple counter-clockwise ring whenever the input is the vertex set of a
/// convex region. Points repeating an earlier point's position or angle are
/// dropped. Returns `None` when fewer than three distinct vertices remain.
pub fn assemble_convex_polygon(vertices: &[Coord<f64>]) -> Option<Polygon<f64>> {
    if vertices.len() < 3 { return None }

    let center = centroid(vertices);
    let mut ordered = vertices.iter()
        .map(|&v| ((v.y - center.y).atan2(v.x - center.x), v))
        .collect::<Vec<_>>();
    ordered.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    // Drop any vertex that duplicates a predecessor.
    for i in (1..ordered.len()).rev() {
        let (ai, vi) = ordered[i];
        let duplicate = ordered[..i].iter().any(|&(aj, vj)| {
            ((vi.x - vj.x).abs() <= COORD_EPS && (vi.y - vj.y).abs() <= COORD_EPS)
                || (ai - aj).abs() <= ANGLE_EPS
        });
        if duplicate { ordered.remove(i); }
    }

    if ordered.len() < 3 { return None }

    let mut ring = ordered.iter().map(|&(_, v)| v).collect::<Vec<_>>();
    ring.push(ring[0]);

    Some(Polygon::new(LineString::from(ring), vec![]))
}
