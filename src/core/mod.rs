//! Core data types for the annotation engine.
//!
//! Time values are plain seconds (f64), the same unit the playback source
//! reports. Annotations are owned by an external data model; the engine
//! works on snapshots of them in canonical (insertion) order.

pub mod annotation;
pub mod interval;

// Re-export core data structures for easier access.
pub use annotation::{Annotation, AnnotationId, ResourceId, TileMetrics};
pub use interval::{Interval, IntervalError, Time};
