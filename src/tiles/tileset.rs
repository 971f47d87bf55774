use log::debug;

use crate::{error::TileError, geom::Affine};
use super::{Tile, TileAux, TileDims, TileRecord};

/// The tile registry: every tile of a run, in one mutable order, plus derived aux data.
///
/// Reordering or editing transforms invalidates the aux data; `init_aux()` must
/// be called again before overlap queries.
#[derive(Debug, Clone)]
pub struct TileSet {
    dims: TileDims,
    tiles: Vec<Tile>,
    aux: Option<Vec<TileAux>>, // Indexed by `Tile::seq`, None when stale
}

impl TileSet {
    /// Construct an empty registry for tiles of the given pixel dimensions.
    pub fn new(dims: TileDims) -> Self {
        Self { dims, tiles: Vec::new(), aux: None }
    }

    /// Construct a registry from a stream of ingested records, in stream order.
    pub fn from_records(dims: TileDims, records: impl IntoIterator<Item = TileRecord>) -> Self {
        let mut set = Self::new(dims);
        for record in records { set.push(record); }
        set
    }

    /// Append a tile, returning its index.
    pub fn push(&mut self, record: TileRecord) -> usize {
        let seq = self.tiles.len();
        self.tiles.push(Tile::from_record(record, seq));
        self.aux = None;
        seq
    }

    /// Get the number of tiles.
    #[inline] pub fn len(&self) -> usize { self.tiles.len() }

    /// Check if there are no tiles.
    #[inline] pub fn is_empty(&self) -> bool { self.tiles.is_empty() }

    /// Get the shared tile pixel dimensions.
    #[inline] pub fn dims(&self) -> &TileDims { &self.dims }

    /// Get the tiles in their current order.
    #[inline] pub fn tiles(&self) -> &[Tile] { &self.tiles }

    /// Get a tile by registry index.
    #[inline] pub fn tile(&self, i: usize) -> &Tile { &self.tiles[i] }

    /// Get a tile by registry index, or `None` if out of range.
    #[inline] pub fn get(&self, i: usize) -> Option<&Tile> { self.tiles.get(i) }

    /// Replace one tile's transform.
    pub fn set_transform(&mut self, i: usize, transform: Affine) -> Result<(), TileError> {
        let len = self.len();
        let tile = self.tiles.get_mut(i).ok_or(TileError::IndexOutOfRange { index: i, len })?;
        tile.transform = transform;
        self.aux = None;
        Ok(())
    }

    /// Get the aux data, if it is current.
    pub fn aux(&self) -> Result<&[TileAux], TileError> {
        self.aux.as_deref().ok_or(TileError::StaleAux)
    }

    /// Check whether the aux data matches the current order and transforms.
    #[inline] pub fn has_aux(&self) -> bool { self.aux.is_some() }

    /// Build the aux data (inverse transforms and layer radii) for the current order.
    /// Fails on zero tile dimensions or on the first tile whose transform cannot be inverted.
    pub fn init_aux(&mut self) -> Result<(), TileError> {
        self.dims.check()?;
        let radii = self.layer_radii();
        let aux = self.tiles.iter().zip(radii)
            .map(|(tile, radius)| -> Result<TileAux, TileError> {
                let inverse = tile.transform.inverse()
                    .map_err(|source| TileError::Singular { id: tile.id, z: tile.z, source })?;
                Ok(TileAux { inverse, radius })
            })
            .collect::<Result<Vec<_>, TileError>>()?;

        debug!("[tiles] aux data built for {} tiles", aux.len());
        self.aux = Some(aux);
        Ok(())
    }

    /// Mutable access to a contiguous run of tiles; invalidates the aux data.
    pub(crate) fn tiles_mut(&mut self, range: std::ops::Range<usize>) -> &mut [Tile] {
        self.aux = None;
        &mut self.tiles[range]
    }

    /// Permute `tiles[range]` so position `range.start + k` receives the tile at `order[k]`.
    /// Sequence indices are reassigned and the aux data is invalidated.
    pub(crate) fn reorder(&mut self, range: std::ops::Range<usize>, order: &[usize]) {
        debug_assert_eq!(order.len(), range.len(), "order must cover the range");

        let reordered = order.iter().map(|&i| self.tiles[i].clone()).collect::<Vec<_>>();
        for (k, tile) in reordered.into_iter().enumerate() {
            self.tiles[range.start + k] = tile;
        }
        self.reassign_seq();
        self.aux = None;
    }

    /// Reset every tile's sequence index to its storage position.
    pub(crate) fn reassign_seq(&mut self) {
        for (i, tile) in self.tiles.iter_mut().enumerate() { tile.seq = i }
    }

    /// Sort all tiles with `compare`, then reassign sequence indices.
    pub(crate) fn sort_tiles_by(&mut self, compare: impl FnMut(&Tile, &Tile) -> std::cmp::Ordering) {
        self.tiles.sort_by(compare);
        self.reassign_seq();
        self.aux = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, z: i32, x: f64, y: f64) -> TileRecord {
        TileRecord { id, z, path: format!("/data/{z}/{id}.tif"), transform: Affine::translation(x, y) }
    }

    #[test]
    fn push_assigns_sequence() {
        let set = TileSet::from_records(TileDims::new(100, 100), [record(7, 0, 0.0, 0.0), record(3, 1, 5.0, 5.0)]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.tile(0).seq(), 0);
        assert_eq!(set.tile(1).seq(), 1);
        assert_eq!(set.tile(1).id, 3);
        assert!(!set.has_aux());
    }

    #[test]
    fn aux_inverts_transforms() {
        let mut set = TileSet::from_records(TileDims::new(100, 100), [record(1, 0, 40.0, -8.0)]);
        assert_eq!(set.aux().unwrap_err(), TileError::StaleAux);

        set.init_aux().unwrap();
        let inv = set.aux().unwrap()[0].inverse;
        let id = inv * set.tile(0).transform;
        assert!((id.c).abs() < 1e-12 && (id.f).abs() < 1e-12);
    }

    #[test]
    fn singular_transform_is_reported() {
        let mut set = TileSet::new(TileDims::new(10, 10));
        set.push(TileRecord { id: 42, z: 3, path: "x".into(), transform: Affine::new(1.0, 1.0, 0.0, 1.0, 1.0, 0.0) });
        match set.init_aux() {
            Err(TileError::Singular { id, z, .. }) => assert_eq!((id, z), (42, 3)),
            other => panic!("expected singular error, got {other:?}"),
        }
    }

    #[test]
    fn zero_dims_are_rejected() {
        let mut set = TileSet::from_records(TileDims::new(0, 0), [record(1, 0, 0.0, 0.0)]);
        assert_eq!(set.init_aux(), Err(TileError::ZeroDims { width: 0, height: 0 }));
        assert!(!set.has_aux());

        let mut set = TileSet::from_records(TileDims::new(100, 0), [record(1, 0, 0.0, 0.0)]);
        assert!(matches!(set.init_aux(), Err(TileError::ZeroDims { height: 0, .. })));
    }

    #[test]
    fn edits_invalidate_aux() {
        let mut set = TileSet::from_records(TileDims::new(100, 100), [record(1, 0, 0.0, 0.0)]);
        set.init_aux().unwrap();
        set.set_transform(0, Affine::translation(3.0, 3.0)).unwrap();
        assert!(!set.has_aux());
        assert!(set.set_transform(5, Affine::identity()).is_err());
    }
}
