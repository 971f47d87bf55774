use std::sync::Arc;

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::{error::TileError, geom::Affine};

/// Pixel dimensions shared by every tile in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDims {
    pub width: u32,
    pub height: u32,
}

impl TileDims {
    pub fn new(width: u32, height: u32) -> Self { Self { width, height } }

    /// Fail unless both dimensions are positive; tile geometry is undefined otherwise.
    pub fn check(&self) -> Result<(), TileError> {
        if self.width == 0 || self.height == 0 {
            return Err(TileError::ZeroDims { width: self.width, height: self.height });
        }
        Ok(())
    }

    #[inline] pub fn w(&self) -> f64 { self.width as f64 }

    #[inline] pub fn h(&self) -> f64 { self.height as f64 }

    /// Pixel area `W*H`.
    #[inline] pub fn area(&self) -> f64 { self.w() * self.h() }

    /// Image corners in local pixel coordinates, counter-clockwise.
    #[inline]
    pub fn corners(&self) -> [Coord<f64>; 4] {
        let (r, t) = (self.w() - 1.0, self.h() - 1.0);
        [
            Coord { x: 0.0, y: 0.0 },
            Coord { x: r, y: 0.0 },
            Coord { x: r, y: t },
            Coord { x: 0.0, y: t },
        ]
    }

    /// Image center in local pixel coordinates.
    #[inline] pub fn center(&self) -> Coord<f64> { Coord { x: self.w() / 2.0, y: self.h() / 2.0 } }
}

/// An ingested tile description, before it joins a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub id: i64,
    pub z: i32,
    pub path: String,
    pub transform: Affine,
}

/// One source image placed in the shared frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub id: i64,                // Scene identifier, not necessarily sequential
    pub z: i32,                 // Layer index
    pub path: Arc<str>,
    pub transform: Affine,      // Local pixels -> layer frame
    pub(crate) seq: usize,      // Position in the registry
}

impl Tile {
    pub(crate) fn from_record(record: TileRecord, seq: usize) -> Self {
        Self {
            id: record.id,
            z: record.z,
            path: record.path.into(),
            transform: record.transform,
            seq,
        }
    }

    /// Position of this tile in the registry's current order.
    #[inline] pub fn seq(&self) -> usize { self.seq }

    /// The four image corners mapped into the layer frame.
    #[inline]
    pub fn corners(&self, dims: &TileDims) -> [Coord<f64>; 4] {
        dims.corners().map(|p| self.transform.apply(p))
    }

    /// The image center mapped into the layer frame.
    #[inline]
    pub fn center(&self, dims: &TileDims) -> Coord<f64> {
        self.transform.apply(dims.center())
    }
}

/// Derived per-tile data, valid only for the registry order it was built in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileAux {
    pub inverse: Affine,
    pub radius: f64, // Squared distance from the layer's bounding-box center
}
