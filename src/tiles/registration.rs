//! Frame bookkeeping for whole-layer coarse registration.
//!
//! A coarse registration driver rasterizes each layer in its oriented frame at
//! reduced scale, searches for the transform between two composites, and then
//! needs that transform back in montage coordinates. The helpers below build
//! the composite frames and undo them.

use crate::{error::GeomError, geom::Affine};
use super::LayerOrientation;

/// Map from montage coordinates to a composite raster of the layer, downsampled by `scale`.
pub fn composite_frame(orientation: &LayerOrientation, scale: f64) -> Result<Affine, GeomError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(GeomError::BadScale { scale });
    }
    Ok(Affine::scale(1.0 / scale) * orientation.to_origin())
}

/// Express a transform found between two composites in montage coordinates.
///
/// `found` maps the child composite onto the parent composite; `child` and
/// `parent` are the composite frames of each layer. The result maps child
/// montage coordinates onto parent montage coordinates.
pub fn recover_montage_transform(found: &Affine, child: &Affine, parent: &Affine) -> Result<Affine, GeomError> {
    Ok(parent.inverse()? * *found * *child)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use geo::Coord;

    use crate::tiles::{TileDims, TileRecord, TileSet};
    use super::*;

    fn layer(z: i32, placement: Affine) -> TileSet {
        TileSet::from_records(TileDims::new(500, 400), (0..4).map(|i| TileRecord {
            id: i,
            z,
            path: format!("{z}/{i}.tif"),
            transform: placement * Affine::translation(450.0 * i as f64, 0.0),
        }))
    }

    #[test]
    fn composite_frame_starts_at_origin() {
        let set = layer(0, Affine::rotation(0.2).translated(100.0, 100.0));
        let o = set.compute_orientation(0..4).unwrap();
        let frame = composite_frame(&o, 4.0).unwrap();

        let mut xs = Vec::new();
        for t in set.tiles() {
            for p in t.corners(set.dims()) { xs.push(frame.apply(p)) }
        }
        let min_x = xs.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = xs.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        assert_abs_diff_eq!(min_x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(max_x, o.width() / 4.0, epsilon = 1e-6);
    }

    #[test]
    fn recovers_layer_to_layer_motion() {
        // The parent layer is the child layer moved by `motion` in montage space.
        let motion = Affine::rotation(-0.05).translated(37.0, -12.0);
        let child_set = layer(1, Affine::rotation(0.3));
        let parent_set = layer(0, motion * Affine::rotation(0.3));

        let child = composite_frame(&child_set.compute_orientation(0..4).unwrap(), 8.0).unwrap();
        let parent = composite_frame(&parent_set.compute_orientation(0..4).unwrap(), 8.0).unwrap();

        // What an ideal composite search would report.
        let found = parent * motion * child.inverse().unwrap();

        let recovered = recover_montage_transform(&found, &child, &parent).unwrap();
        let p = Coord { x: 812.0, y: -77.0 };
        let (q, r) = (recovered.apply(p), motion.apply(p));
        assert_abs_diff_eq!(q.x, r.x, epsilon = 1e-6);
        assert_abs_diff_eq!(q.y, r.y, epsilon = 1e-6);
    }

    #[test]
    fn bad_scales_are_rejected() {
        let o = layer(0, Affine::identity()).compute_orientation(0..4).unwrap();
        for scale in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(composite_frame(&o, scale), Err(GeomError::BadScale { .. })), "scale {scale}");
        }
        assert_eq!(composite_frame(&o, -2.0), Err(GeomError::BadScale { scale: -2.0 }));
    }

    #[test]
    fn singular_parent_frame() {
        let zero = Affine::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(recover_montage_transform(&Affine::identity(), &Affine::identity(), &zero).is_err());
    }
}
