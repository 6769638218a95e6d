//! Seams to the external player: data model, renderer, viewport, event sink.
//!
//! The controller never renders, persists or decodes anything itself; those
//! concerns live behind these traits. The renderer in particular is a pure
//! projection of controller state and is never queried to re-derive
//! structure, only to measure what it drew.

use crate::core::{Annotation, AnnotationId, Interval, ResourceId, TileMetrics, Time};
use crate::layout::LayoutResult;

/// Construction request passed to the data model for a new annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnnotation {
    pub interval: Interval,
    pub resource: ResourceId,
}

/// Which annotation set is selected: the current user's own set or the set
/// of another contributor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationSet {
    Own,
    Contributor(String),
}

/// The external data model owning all annotation content.
pub trait DataModel {
    /// Total timeline duration in seconds.
    fn duration(&self) -> Time;

    fn annotation_set(&self) -> AnnotationSet;

    fn set_annotation_set(&mut self, set: AnnotationSet);

    /// The current set's annotations in canonical (insertion) order.
    fn annotations(&self) -> Vec<Annotation>;

    fn new_annotation(&mut self, request: NewAnnotation) -> Annotation;

    fn remove_annotation(&mut self, id: AnnotationId);
}

/// The view layer, as far as the controller needs to drive it.
pub trait Renderer {
    /// Measured extents of the annotation's rendered tile.
    fn measure(&self, annotation: &Annotation) -> TileMetrics;

    /// Measured width of the annotation's detail element in the detail strip.
    fn detail_width(&self, id: AnnotationId) -> f64;

    /// Current left position of the detail element within the strip.
    fn detail_left(&self, id: AnnotationId) -> f64;

    /// Switch the timeline to the stacked editing layout. Row heights for
    /// overlapping intervals are the renderer's collision layout concern.
    fn stack_timeline(&mut self, annotations: &[Annotation]);

    /// Revert the timeline to the normal tile layout.
    fn reset_timeline(&mut self);

    /// Enable or disable drop-to-create interactions on the timeline.
    fn set_droppable(&mut self, droppable: bool);
}

/// Current geometry of the hosting viewport.
pub trait ViewportMetrics {
    /// Width of the tile track in pixels.
    fn track_width(&self) -> f64;

    /// Inner width of the container the detail strip centers within.
    fn detail_container_width(&self) -> f64;
}

/// Notifications the controller pushes back to the view layer.
///
/// All methods default to no-ops so hosts only implement what they observe.
pub trait AnnotationEvents {
    fn activated(&mut self, _id: AnnotationId) {}

    fn deactivated(&mut self, _id: AnnotationId) {}

    fn got_in_focus(&mut self, _id: AnnotationId) {}

    fn removed_from_focus(&mut self, _id: AnnotationId) {}

    /// The opened detail panel changed; `None` means the panel closed.
    fn opened(&mut self, _id: Option<AnnotationId>) {}

    fn layout_changed(&mut self, _layout: &LayoutResult) {}
}
