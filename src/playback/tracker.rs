//! Activation state machine driven by the playback time signal.
//!
//! Every annotation is either inactive or active; it becomes active while
//! the play cursor is inside its interval. The focused annotation is forced
//! active regardless of containment, so it never deactivates under the
//! user's hands while being edited.

use std::collections::HashSet;

use log::debug;

use crate::core::{Annotation, AnnotationId, Time};

/// One transition produced by an [`ActivationTracker::update`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationChange {
    Activated(AnnotationId),
    Deactivated(AnnotationId),
}

/// Result of a focus change: the enter/exit notifications plus the
/// activation changes of the update re-run that follows immediately.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FocusOutcome {
    pub removed_from_focus: Option<AnnotationId>,
    pub got_in_focus: Option<AnnotationId>,
    pub changes: Vec<ActivationChange>,
}

/// Tracks which annotations are active at the current playback time.
#[derive(Debug, Default)]
pub struct ActivationTracker {
    active: HashSet<AnnotationId>,
    focused: Option<AnnotationId>,
}

impl ActivationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, id: AnnotationId) -> bool {
        self.active.contains(&id)
    }

    pub fn focused(&self) -> Option<AnnotationId> {
        self.focused
    }

    /// Recompute the active set for playback time `t`.
    ///
    /// Membership is derived fully from `(annotations, t)` on every call;
    /// nothing is carried over except for diffing. Each annotation whose
    /// state flips contributes exactly one change, in canonical order, even
    /// when several flip at once.
    pub fn update(&mut self, annotations: &[Annotation], t: Time) -> Vec<ActivationChange> {
        let mut next = HashSet::with_capacity(annotations.len());
        for a in annotations {
            if a.contains(t) || self.focused == Some(a.id) {
                next.insert(a.id);
            }
        }

        let mut changes = Vec::new();
        for a in annotations {
            let was = self.active.contains(&a.id);
            let now = next.contains(&a.id);
            if now && !was {
                changes.push(ActivationChange::Activated(a.id));
            } else if was && !now {
                changes.push(ActivationChange::Deactivated(a.id));
            }
        }

        self.active = next;
        changes
    }

    /// Move focus to `id` (or clear it), then re-run `update` for the
    /// current time so activation state reflects the new focus immediately.
    ///
    /// A no-op focus change still re-runs the update but emits no
    /// enter/exit notifications.
    pub fn set_focus(
        &mut self,
        annotations: &[Annotation],
        id: Option<AnnotationId>,
        t: Time,
    ) -> FocusOutcome {
        let previous = self.focused;
        let mut outcome = FocusOutcome::default();
        if previous != id {
            debug!("focus moves from {previous:?} to {id:?}");
            outcome.removed_from_focus = previous;
            outcome.got_in_focus = id;
        }
        self.focused = id;
        outcome.changes = self.update(annotations, t);
        outcome
    }

    /// Discard state about annotations no longer in the canonical sequence.
    /// Used when the data set is replaced wholesale.
    pub fn rebind(&mut self, annotations: &[Annotation]) {
        let ids: HashSet<AnnotationId> = annotations.iter().map(|a| a.id).collect();
        self.active.retain(|id| ids.contains(id));
        if let Some(f) = self.focused {
            if !ids.contains(&f) {
                self.focused = None;
            }
        }
    }

    /// Drop a single deleted annotation without firing a deactivation.
    pub fn forget(&mut self, id: AnnotationId) {
        self.active.remove(&id);
        if self.focused == Some(id) {
            self.focused = None;
        }
    }
}

/// Among the annotations containing `t`, the topmost one: the greatest
/// `start` wins, equal starts resolve to the later annotation in canonical
/// order. If nothing contains `t`, the first annotation in canonical order;
/// if the sequence is empty, `None`. Pure query, no state involved.
pub fn topmost_active(annotations: &[Annotation], t: Time) -> Option<&Annotation> {
    annotations
        .iter()
        .filter(|a| a.contains(t))
        .max_by(|a, b| a.interval.start().total_cmp(&b.interval.start()))
        .or_else(|| annotations.first())
}
