use std::ops::Range;

use geo::{Coord, Rect};
use log::debug;
use serde::Serialize;

use crate::{
    error::TileError,
    geom::{algorithm::tightest_bbox, Affine},
};
use super::TileSet;

/// The rotation that makes a layer's footprint minimal and axis-aligned,
/// together with the footprint box in the rotated frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayerOrientation {
    pub angle: f64,         // Radians, counter-clockwise
    #[serde(serialize_with = "serialize_rect")]
    pub bounds: Rect<f64>,  // In the rotated frame
}

fn serialize_rect<S: serde::Serializer>(rect: &Rect<f64>, s: S) -> Result<S::Ok, S::Error> {
    [rect.min().x, rect.min().y, rect.max().x, rect.max().y].serialize(s)
}

impl LayerOrientation {
    #[inline] pub fn degrees(&self) -> f64 { self.angle.to_degrees() }

    #[inline] pub fn width(&self) -> f64 { self.bounds.width() }

    #[inline] pub fn height(&self) -> f64 { self.bounds.height() }

    /// Box center in the rotated frame.
    #[inline] pub fn center(&self) -> Coord<f64> { self.bounds.center() }

    /// Pure rotation taking layer coordinates into the oriented frame.
    #[inline] pub fn rotation(&self) -> Affine { Affine::rotation(self.angle) }

    /// Rotation followed by the translation that puts the box's lower-left corner at the origin.
    pub fn to_origin(&self) -> Affine {
        let min = self.bounds.min();
        self.rotation().translated(-min.x, -min.y)
    }
}

impl TileSet {
    fn check_layer_range(&self, range: &Range<usize>) -> Result<(), TileError> {
        if range.end > self.len() {
            return Err(TileError::IndexOutOfRange { index: range.end - 1, len: self.len() });
        }
        if range.is_empty() {
            return Err(TileError::EmptyLayer { start: range.start, end: range.end });
        }
        Ok(())
    }

    /// Find the minimal axis-aligned footprint of the tiles in `range` over all rotations.
    /// Does not modify any tile.
    pub fn compute_orientation(&self, range: Range<usize>) -> Result<LayerOrientation, TileError> {
        self.check_layer_range(&range)?;

        let dims = *self.dims();
        let corners = self.tiles()[range.clone()].iter()
            .flat_map(|t| t.corners(&dims))
            .collect::<Vec<_>>();

        let (angle, bounds) = tightest_bbox(&corners)
            .ok_or(TileError::EmptyLayer { start: range.start, end: range.end })?;
        let orientation = LayerOrientation { angle, bounds };

        debug!("[orient] tiles [{}, {}): rotate {:.3} deg, box {:.1} x {:.1}",
            range.start, range.end, orientation.degrees(), orientation.width(), orientation.height());

        Ok(orientation)
    }

    /// Transforms of the tiles in `range` as they would be after `apply_orientation`.
    pub fn oriented_transforms(&self, range: Range<usize>, orientation: &LayerOrientation) -> Vec<Affine> {
        let to_origin = orientation.to_origin();
        self.tiles()[range].iter().map(|t| to_origin * t.transform).collect()
    }

    /// Rotate and translate the tiles in `range` into the oriented frame. Invalidates the aux data.
    pub fn apply_orientation(&mut self, range: Range<usize>, orientation: &LayerOrientation) {
        let to_origin = orientation.to_origin();
        for tile in self.tiles_mut(range) {
            tile.transform = to_origin * tile.transform;
        }
    }
}
