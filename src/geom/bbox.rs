use geo::{Coord, Rect};
use rstar::{RTreeObject, AABB};

/// A tile footprint in an R-tree, associated with a tile by registry index.
#[derive(Debug, Clone)]
pub(crate) struct BoundingBox {
    idx: usize, // Index of the corresponding tile in the registry
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub(crate) fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Get the index of the corresponding tile.
    #[inline] pub(crate) fn idx(&self) -> usize { self.idx }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Axis-aligned bounds of a set of points, or `None` if the set is empty.
pub fn bounds_of<I>(points: I) -> Option<Rect<f64>>
where
    I: IntoIterator<Item = Coord<f64>>,
{
    points.into_iter()
        .map(|p| Rect::new(p, p))
        .reduce(|a, b| union(&a, &b))
}

/// Smallest rectangle covering both inputs.
#[inline]
pub fn union(a: &Rect<f64>, b: &Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

/// Grow a rectangle by `tol` on every side.
#[inline]
pub fn expand(r: &Rect<f64>, tol: f64) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [r.min().x - tol, r.min().y - tol],
        [r.max().x + tol, r.max().y + tol],
    )
}
