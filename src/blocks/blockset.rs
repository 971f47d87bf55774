use std::fmt::Write;

use geo::Coord;
use log::{debug, info};
use rayon::prelude::*;
use rstar::RTree;

use crate::{
    config::PlanConfig,
    error::TileError,
    geom::{bbox::{bounds_of, expand}, Affine, BoundingBox},
    tiles::{LayerOrientation, LayerRange, TileDims, TileSet},
};

/// Footprint boxes are grown by this many pixels before the pair search.
const PRUNE_MARGIN: f64 = 4.0;

/// Grid geometry of an oriented layer: `kx × ky` cells of size `dx × dy`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub kx: usize,
    pub ky: usize,
    pub dx: f64,
    pub dy: f64,
}

impl Grid {
    /// Tile a `w × h` extent with cells of about `k` tiles per side, exactly, with no remainder strip.
    /// A zero cell size collapses that axis to one cell.
    pub fn new(w: f64, h: f64, k: usize, dims: &TileDims) -> Self {
        let count = |extent: f64, step: f64| {
            if step > 0.0 { ((extent / step).ceil() as usize).max(1) } else { 1 }
        };
        let kx = count(w, k as f64 * dims.w());
        let ky = count(h, k as f64 * dims.h());
        Self { kx, ky, dx: w / kx as f64, dy: h / ky as f64 }
    }

    /// Number of cells.
    #[inline] pub fn len(&self) -> usize { self.kx * self.ky }

    /// Flat index of cell `(ix, iy)`.
    #[inline] pub fn index(&self, ix: usize, iy: usize) -> usize { ix + self.kx * iy }

    /// Cell coordinates of flat index `i`.
    #[inline] pub fn coords(&self, i: usize) -> (usize, usize) { (i % self.kx, i / self.kx) }

    /// Flat index of the cell containing `p`, clamped to the grid.
    pub fn cell_of(&self, p: Coord<f64>) -> usize {
        let clamp = |v: f64, step: f64, n: usize| {
            if step > 0.0 { ((v / step).floor().max(0.0) as usize).min(n - 1) } else { 0 }
        };
        self.index(clamp(p.x, self.dx, self.kx), clamp(p.y, self.dy, self.ky))
    }
}

/// The job partition of one layer: tile pairs grouped into spatial blocks.
///
/// Pairs are registry indices `(a, b)` with `a < b`, filed under the block
/// containing tile `a`'s center in the oriented layer frame.
#[derive(Debug, Clone)]
pub struct BlockSet {
    z: i32,
    orientation: LayerOrientation,
    w: f64,                         // Oriented layer extent in pixels
    h: f64,
    grid: Grid,
    blocks: Vec<Vec<(usize, usize)>>,
}

impl BlockSet {
    /// Orient the layer, lay out the grid, assign overlapping pairs and consolidate.
    /// The registry is only read, and its aux data must be current.
    pub fn carve(tiles: &TileSet, range: LayerRange, config: &PlanConfig) -> Result<Self, TileError> {
        tiles.dims().check()?;
        let orientation = tiles.compute_orientation(range.range())?;
        let oriented = tiles.oriented_transforms(range.range(), &orientation);

        let mut blocks = Self::with_dims(range.z, orientation, config.tiles_per_side(), tiles.dims());
        blocks.assign(tiles, range, &oriented, config.min_overlap, config.parallel)?;
        let passes = blocks.consolidate(config.low_count);

        debug!("[blocks] z={} consolidated in {passes} passes", range.z);
        info!("{}", blocks.report());
        Ok(blocks)
    }

    /// Empty block set sized for an oriented layer.
    fn with_dims(z: i32, orientation: LayerOrientation, k: usize, dims: &TileDims) -> Self {
        // Pixel extent, counting both end pixels.
        let w = orientation.width().floor() + 1.0;
        let h = orientation.height().floor() + 1.0;
        let grid = Grid::new(w, h, k, dims);

        debug!("[blocks] z={z} extent {w} x {h}, grid {} x {}, cell {:.1} x {:.1}",
            grid.kx, grid.ky, grid.dx, grid.dy);

        Self { z, orientation, w, h, grid, blocks: vec![Vec::new(); grid.len()] }
    }

    /// File every pair of overlapping tiles `a < b` in the layer under tile `a`'s block.
    fn assign(
        &mut self,
        tiles: &TileSet,
        range: LayerRange,
        oriented: &[Affine],
        min_overlap: f64,
        parallel: bool,
    ) -> Result<(), TileError> {
        let dims = *tiles.dims();
        let grid = self.grid;

        let footprints = range.indices()
            .filter_map(|i| bounds_of(tiles.tile(i).corners(&dims)).map(|r| (i, r)))
            .collect::<Vec<_>>();
        let rtree = RTree::bulk_load(footprints.iter().map(|&(i, r)| BoundingBox::new(i, r)).collect());

        let scan = |k: usize| -> Result<(usize, Vec<(usize, usize)>), TileError> {
            let (a, footprint) = footprints[k];
            let cell = grid.cell_of(oriented[a - range.start].apply(dims.center()));

            let mut candidates = rtree.locate_in_envelope_intersecting(&expand(&footprint, PRUNE_MARGIN))
                .map(BoundingBox::idx)
                .filter(|&b| b > a)
                .collect::<Vec<_>>();
            candidates.sort_unstable();

            let mut pairs = Vec::new();
            for b in candidates {
                if tiles.overlap(a, b)? > min_overlap { pairs.push((a, b)) }
            }
            Ok((cell, pairs))
        };

        let scanned = if parallel {
            (0..footprints.len()).into_par_iter().map(scan).collect::<Result<Vec<_>, _>>()?
        } else {
            (0..footprints.len()).map(scan).collect::<Result<Vec<_>, _>>()?
        };

        // Appending in ascending `a` keeps the result independent of scheduling.
        for (cell, pairs) in scanned {
            self.blocks[cell].extend(pairs);
        }

        debug!("[blocks] z={} assigned {} pairs", self.z, self.total_jobs());
        Ok(())
    }

    /// Merge every block holding fewer than `low_count` jobs into its least
    /// populated non-empty 4-neighbour, scanning until nothing moves.
    /// Returns the number of scans that moved at least one block.
    pub fn consolidate(&mut self, low_count: usize) -> usize {
        let grid = self.grid;
        if grid.len() <= 1 { return 0 }

        let mut passes = 0;
        loop {
            let mut changed = false;

            for i in 0..grid.len() {
                let count = self.blocks[i].len();
                if count == 0 || count >= low_count { continue }

                let (ix, iy) = grid.coords(i);
                let mut neighbours = Vec::with_capacity(4);
                if iy > 0 { neighbours.push(i - grid.kx) }
                if iy + 1 < grid.ky { neighbours.push(i + grid.kx) }
                if ix > 0 { neighbours.push(i - 1) }
                if ix + 1 < grid.kx { neighbours.push(i + 1) }

                // First strictly lowest non-empty neighbour wins.
                let mut target: Option<(usize, usize)> = None;
                for j in neighbours {
                    let c = self.blocks[j].len();
                    if c > 0 && target.is_none_or(|(_, low)| c < low) { target = Some((j, c)) }
                }

                let Some((j, _)) = target else { continue };
                let moved = std::mem::take(&mut self.blocks[i]);
                self.blocks[j].extend(moved);
                changed = true;
            }

            if !changed { break }
            passes += 1;
        }

        passes
    }

    /// Job-count table, one grid row per line, followed by the total.
    pub fn report(&self) -> String {
        let mut out = format!("Z {}, Array {}x{}, Jobs(i,j):\n", self.z, self.grid.kx, self.grid.ky);
        for (i, block) in self.blocks.iter().enumerate() {
            let (ix, _) = self.grid.coords(i);
            let sep = if ix + 1 == self.grid.kx { '\n' } else { '\t' };
            let _ = write!(out, "{}{sep}", block.len());
        }
        let _ = write!(out, "Total = {}", self.total_jobs());
        out
    }

    #[inline] pub fn z(&self) -> i32 { self.z }

    #[inline] pub fn orientation(&self) -> &LayerOrientation { &self.orientation }

    #[inline] pub fn grid(&self) -> &Grid { &self.grid }

    /// Oriented layer extent `(w, h)` in pixels.
    #[inline] pub fn extent(&self) -> (f64, f64) { (self.w, self.h) }

    /// Jobs filed under cell `(ix, iy)`.
    #[inline] pub fn block(&self, ix: usize, iy: usize) -> &[(usize, usize)] { &self.blocks[self.grid.index(ix, iy)] }

    /// Every job pair, block by block.
    pub fn jobs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.blocks.iter().flatten().copied()
    }

    /// Blocks holding at least one job, as `(ix, iy, pairs)`.
    pub fn non_empty_blocks(&self) -> impl Iterator<Item = (usize, usize, &[(usize, usize)])> + '_ {
        self.blocks.iter().enumerate()
            .filter(|(_, b)| !b.is_empty())
            .map(|(i, b)| { let (ix, iy) = self.grid.coords(i); (ix, iy, b.as_slice()) })
    }

    #[inline] pub fn total_jobs(&self) -> usize { self.blocks.iter().map(Vec::len).sum() }
}
