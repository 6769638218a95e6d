//! Coordination between the layout/activation engines and the host player.
//!
//! The [`AnnotationController`] owns the canonical annotation sequence and
//! all derived layout/activation state. The host reaches it either through
//! direct method calls or by queueing [`ControllerEvent`]s on a channel the
//! controller drains in arrival order, which is what serializes time ticks
//! and lifecycle events.

pub mod annotations;
pub mod collaborators;
pub mod transition;

pub use annotations::{
    default_interval_at, AnnotationController, ControllerError, ControllerEvent, DetailSlider,
    EditMode,
};
pub use collaborators::{
    AnnotationEvents, AnnotationSet, DataModel, NewAnnotation, Renderer, ViewportMetrics,
};
pub use transition::TransitionFollower;
