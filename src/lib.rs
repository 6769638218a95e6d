//! Annotation layout and temporal-state engine for video timelines.
//!
//! Users attach time-bounded annotations to a video; each annotation is shown
//! as a timeline segment, as a compact tile near its temporal midpoint on a
//! bounded-width track, and as a detail panel opened on demand. This crate
//! contains the two non-trivial pieces behind that UI:
//!
//! - [`layout`]: a deterministic engine that places variable-width tiles onto
//!   a fixed-width track without overlap, grouping colliding tiles and
//!   re-flowing groups to stay within track bounds.
//! - [`playback`]: a state machine that activates and deactivates annotations
//!   as the play cursor crosses their intervals, with a focus override and a
//!   deterministic "topmost active" tie-break.
//!
//! [`controller`] ties both to the external collaborators (data model,
//! renderer, viewport, playback source) and owns the canonical annotation
//! sequence. Rendering, persistence and playback mechanics live outside this
//! crate; they reach the engine through the traits in
//! [`controller::collaborators`].

pub mod controller;
pub mod core;
pub mod layout;
pub mod playback;
