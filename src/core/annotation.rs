//! Annotation records as seen by the layout and activation engines.
//!
//! The authoritative annotation data lives in an external data model; the
//! engine holds cloned snapshots in canonical (insertion) order. Layout and
//! tie-break rules depend on that order, not on interval values alone.

use crate::core::interval::{Interval, Time};

/// Unique, stable identifier for an annotation.
pub type AnnotationId = u64;

/// Opaque reference to an externally managed resource.
pub type ResourceId = String;

/// Measured pixel extents of an annotation's rendered tile.
///
/// Supplied by the renderer collaborator; layout reads these and never
/// computes them, since it is geometry-agnostic about tile content.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TileMetrics {
    pub width: f64,
    pub height: f64,
}

impl TileMetrics {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// One annotation: a resource attached to a timeline interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub interval: Interval,
    pub resource: ResourceId,
    pub tile: TileMetrics,
}

impl Annotation {
    pub fn new(id: AnnotationId, interval: Interval, resource: ResourceId) -> Self {
        Self {
            id,
            interval,
            resource,
            tile: TileMetrics::default(),
        }
    }

    /// Whether the playback cursor is inside this annotation's interval.
    pub fn contains(&self, t: Time) -> bool {
        self.interval.contains(t)
    }
}
