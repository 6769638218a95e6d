//! Tile layout for the annotation track.
//!
//! Tiles track their temporal position as closely as possible while staying
//! legible: a greedy left-to-right placement pass approximates non-overlap
//! placement, and correction passes repair the drift it introduces at the
//! track boundaries. Colliding tiles are merged into groups, which are
//! contiguous runs over the canonical sequence and move as one unit.

pub mod engine;
pub mod group;

pub use engine::{layout, LayoutError, LayoutMode, LayoutResult, TilePlacement, TileSlot};
pub use group::{GroupId, Partition};
