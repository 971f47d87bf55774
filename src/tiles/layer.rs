use std::ops::Range;

use ahash::AHashMap;
use geo::Rect;
use serde::Serialize;

use crate::geom::bbox::{bounds_of, union};
use super::TileSet;

/// A half-open run `[start, end)` of registry indices sharing one layer `z`.
/// Only meaningful while the registry stays sorted by layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LayerRange {
    pub z: i32,
    pub start: usize,
    pub end: usize,
}

impl LayerRange {
    #[inline] pub fn len(&self) -> usize { self.end - self.start }

    #[inline] pub fn is_empty(&self) -> bool { self.end <= self.start }

    #[inline] pub fn range(&self) -> Range<usize> { self.start..self.end }

    #[inline] pub fn indices(&self) -> impl Iterator<Item = usize> + use<> { self.start..self.end }

    #[inline] pub fn contains(&self, i: usize) -> bool { self.range().contains(&i) }
}

impl TileSet {
    /// Stable sort of all tiles by ascending layer.
    pub fn sort_by_layer(&mut self) {
        self.sort_tiles_by(|a, b| a.z.cmp(&b.z));
    }

    /// Canonical order: ascending `(z, id)`, independent of ingestion order.
    pub fn sort_by_layer_then_id(&mut self) {
        self.sort_tiles_by(|a, b| a.z.cmp(&b.z).then(a.id.cmp(&b.id)));
    }

    /// Sort into layers, then within each layer by ascending distance from the
    /// layer's bounding-box center (ties by id), so tiles run center-outward.
    pub fn sort_by_layer_then_radius(&mut self) {
        self.sort_by_layer();

        let radii = self.layer_radii();
        let mut order = Vec::with_capacity(self.len());
        for layer in self.layers() {
            let mut within = layer.indices().collect::<Vec<_>>();
            within.sort_by(|&i, &j| {
                radii[i].total_cmp(&radii[j]).then(self.tile(i).id.cmp(&self.tile(j).id))
            });
            order.extend(within);
        }

        self.reorder(0..self.len(), &order);
    }

    /// The run of tiles sharing the layer of tile `i0`, or `None` if `i0` is out of bounds.
    ///
    /// Requires the registry to be sorted by layer; starting at 0 and then at each
    /// returned `end` visits every layer once, in ascending z.
    pub fn layer_range_at(&self, i0: usize) -> Option<LayerRange> {
        let z = self.get(i0)?.z;
        let end = self.tiles()[i0..].iter()
            .position(|t| t.z != z)
            .map_or(self.len(), |k| i0 + k);
        Some(LayerRange { z, start: i0, end })
    }

    /// Iterate over every layer run, in storage order.
    pub fn layers(&self) -> impl Iterator<Item = LayerRange> + '_ {
        std::iter::successors(self.layer_range_at(0), move |r| self.layer_range_at(r.end))
    }

    /// Find the run for layer `z`.
    pub fn layer(&self, z: i32) -> Option<LayerRange> {
        self.layers().find(|r| r.z == z)
    }

    /// Indices in `range` ordered by ascending tile id, without touching storage order.
    pub fn order_by_id_within(&self, range: Range<usize>) -> Vec<usize> {
        let mut order = range.collect::<Vec<_>>();
        order.sort_by_key(|&i| self.tile(i).id);
        order
    }

    /// Axis-aligned bounds of all tile corners in `range`, in the current frame.
    pub fn layer_bounds(&self, range: Range<usize>) -> Option<Rect<f64>> {
        let dims = *self.dims();
        bounds_of(self.tiles()[range].iter().flat_map(|t| t.corners(&dims)))
    }

    /// Squared distance of every tile's center from its layer's bounding-box center.
    /// Layers are keyed by `z`, so the registry need not be sorted.
    pub(crate) fn layer_radii(&self) -> Vec<f64> {
        let dims = *self.dims();

        let mut bounds = AHashMap::<i32, Rect<f64>>::new();
        for tile in self.tiles() {
            let Some(r) = bounds_of(tile.corners(&dims)) else { continue };
            bounds.entry(tile.z).and_modify(|b| *b = union(b, &r)).or_insert(r);
        }

        self.tiles().iter()
            .map(|tile| {
                let Some(center) = bounds.get(&tile.z).map(|b| b.center()) else { return 0.0 };
                let p = tile.center(&dims);
                (p.x - center.x).powi(2) + (p.y - center.y).powi(2)
            })
            .collect()
    }
}
