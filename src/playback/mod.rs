//! Playback-driven temporal state of annotations.

pub mod tracker;

pub use tracker::{topmost_active, ActivationChange, ActivationTracker, FocusOutcome};
