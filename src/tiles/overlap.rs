use geo::{Area, Coord};
use smallvec::SmallVec;

use crate::{
    error::TileError,
    geom::{
        algorithm::{assemble_convex_polygon, closed_segment_intersections, left_side, snap_coords},
        Affine,
    },
};
use super::{TileDims, TileSet};

/// Coordinates of the mapped rectangle closer than this (in pixels) are merged.
const SNAP_TOL: f64 = 2.0;

/// Fraction of a `W×H` image covered by the intersection of two image rectangles.
///
/// `t` maps the first image's local pixels into the second image's local frame,
/// where the second image is the axis-aligned rectangle `[0, W-1]×[0, H-1]`.
///
/// The intersection polygon's vertices are the crossings of the two outlines plus
/// every corner of either rectangle lying inside the other; being convex, the
/// polygon is recovered by sorting those vertices by angle about their centroid.
pub fn frame_overlap(t: &Affine, dims: &TileDims) -> f64 {
    let vb = dims.corners();

    let mut va = dims.corners();
    t.apply_all(&mut va);
    if t.det() < 0.0 { va.reverse() } // Keep the mapped outline counter-clockwise.
    snap_coords(&mut va, SNAP_TOL);

    let mut verts = SmallVec::<[Coord<f64>; 16]>::new();

    for i in 0..4 {
        let mut a_in_b = 0;
        let mut b_in_a = 0;

        for j in 0..4 {
            // Side crossings.
            verts.extend(closed_segment_intersections(va[i], va[(i + 1) % 4], vb[j], vb[(j + 1) % 4]));

            // Corner containment counts.
            if left_side(vb[j], vb[(j + 1) % 4], va[i]) { a_in_b += 1 }
            if left_side(va[j], va[(j + 1) % 4], vb[i]) { b_in_a += 1 }
        }

        if a_in_b == 4 { verts.push(va[i]) }
        if b_in_a == 4 { verts.push(vb[i]) }
    }

    if verts.len() < 3 { return 0.0 }

    assemble_convex_polygon(&verts)
        .map_or(0.0, |poly| (poly.signed_area() / dims.area()).max(0.0))
}

impl TileSet {
    /// Transform mapping tile `a`'s local pixels into tile `b`'s local pixels.
    pub fn relative_transform(&self, a: usize, b: usize) -> Result<Affine, TileError> {
        let len = self.len();
        for i in [a, b] {
            if i >= len { return Err(TileError::IndexOutOfRange { index: i, len }) }
        }
        let aux = self.aux()?;
        Ok(aux[self.tile(b).seq()].inverse * self.tile(a).transform)
    }

    /// Intersection area of tiles `a` and `b` as a fraction of one tile's area, in [0, 1].
    ///
    /// `Ok(0.0)` means the tiles do not meet; errors are reserved for stale aux data
    /// or bad indices.
    pub fn overlap(&self, a: usize, b: usize) -> Result<f64, TileError> {
        let t = self.relative_transform(a, b)?;
        Ok(frame_overlap(&t, self.dims()))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::tiles::TileRecord;
    use super::*;

    fn tileset(dims: TileDims, transforms: &[Affine]) -> TileSet {
        let mut set = TileSet::from_records(dims, transforms.iter().enumerate().map(|(i, &t)| TileRecord {
            id: i as i64,
            z: 0,
            path: format!("{i}.tif"),
            transform: t,
        }));
        set.init_aux().unwrap();
        set
    }

    #[test]
    fn identical_tiles_overlap_fully() {
        let t = Affine::translation(1234.0, -77.0);
        let set = tileset(TileDims::new(100, 100), &[t, t]);
        // Corners run to W-1 and H-1, so full overlap is 99*99 / 100^2.
        assert_abs_diff_eq!(set.overlap(0, 1).unwrap(), 0.9801, epsilon = 1e-12);
        assert_abs_diff_eq!(set.overlap(0, 0).unwrap(), 0.9801, epsilon = 1e-12);
    }

    #[test]
    fn half_overlap() {
        let set = tileset(TileDims::new(100, 100), &[Affine::identity(), Affine::translation(50.0, 0.0)]);
        let olap = set.overlap(0, 1).unwrap();
        assert_abs_diff_eq!(olap, 0.5, epsilon = 0.02);
        assert_abs_diff_eq!(olap, 49.0 * 99.0 / 10_000.0, epsilon = 1e-12);
        assert_abs_diff_eq!(set.overlap(1, 0).unwrap(), olap, epsilon = 1e-12);
    }

    #[test]
    fn corner_overlap() {
        let set = tileset(TileDims::new(100, 100), &[Affine::identity(), Affine::translation(60.0, 70.0)]);
        assert_abs_diff_eq!(set.overlap(0, 1).unwrap(), 39.0 * 29.0 / 10_000.0, epsilon = 1e-12);
    }

    #[test]
    fn disjoint_tiles_do_not_overlap() {
        let set = tileset(TileDims::new(100, 80), &[Affine::identity(), Affine::translation(500.0, 500.0)]);
        assert_eq!(set.overlap(0, 1).unwrap(), 0.0);
        assert_eq!(set.overlap(1, 0).unwrap(), 0.0);
    }

    #[test]
    fn edge_contact_is_zero() {
        // Tile b starts on a's last pixel column: the intersection is a line.
        let set = tileset(TileDims::new(100, 100), &[Affine::identity(), Affine::translation(99.0, 0.0)]);
        assert_abs_diff_eq!(set.overlap(0, 1).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn contained_tile() {
        // A quarter-scale tile sits entirely inside its neighbour.
        let set = tileset(TileDims::new(100, 100), &[
            Affine::scale(0.25).translated(20.0, 20.0),
            Affine::identity(),
        ]);
        let expected = (99.0 * 0.25) * (99.0 * 0.25) / 10_000.0;
        assert_abs_diff_eq!(set.overlap(0, 1).unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn rotated_overlap_is_symmetric_and_bounded() {
        let a = Affine::identity();
        let b = Affine::rotation(0.3).translated(400.0, -150.0);
        let set = tileset(TileDims::new(1000, 1000), &[a, b]);

        let ab = set.overlap(0, 1).unwrap();
        let ba = set.overlap(1, 0).unwrap();
        assert!(ab > 0.0 && ab <= 1.0, "overlap {ab} out of range");
        assert_abs_diff_eq!(ab, ba, epsilon = 1e-2);
    }

    #[test]
    fn mirrored_tile_still_overlaps() {
        let mirror = Affine::new(-1.0, 0.0, 99.0, 0.0, 1.0, 0.0);
        let set = tileset(TileDims::new(100, 100), &[mirror, Affine::identity()]);
        assert_abs_diff_eq!(set.overlap(0, 1).unwrap(), 0.9801, epsilon = 1e-12);
    }

    #[test]
    fn stale_aux_is_an_error() {
        let mut set = tileset(TileDims::new(10, 10), &[Affine::identity(), Affine::identity()]);
        set.sort_by_layer();
        assert_eq!(set.overlap(0, 1), Err(TileError::StaleAux));
        assert!(matches!(set.overlap(0, 9), Err(TileError::IndexOutOfRange { index: 9, .. })));
    }
}
