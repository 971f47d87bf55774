mod hull;
mod polygon;
mod segment;

pub use hull::tightest_bbox;
pub use polygon::{assemble_convex_polygon, snap_coords};
pub use segment::{closed_segment_intersections, left_side};
