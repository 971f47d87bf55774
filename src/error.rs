use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    #[error("Singular affine transform (determinant {det:e})")]
    Singular { det: f64 },

    #[error("Scale must be positive and finite, got {scale}")]
    BadScale { scale: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TileError {
    #[error("Tile {id} in layer {z} has a non-invertible transform: {source}")]
    Singular {
        id: i64,
        z: i32,
        #[source]
        source: GeomError,
    },

    #[error("Tile dimensions must be positive, got {width} x {height}")]
    ZeroDims { width: u32, height: u32 },

    #[error("Auxiliary tile data is missing or stale; call init_aux() after reordering")]
    StaleAux,

    #[error("Layer range [{start}, {end}) contains no tiles")]
    EmptyLayer { start: usize, end: usize },

    #[error("Tile index {index} out of range (have {len} tiles)")]
    IndexOutOfRange { index: usize, len: usize },
}
