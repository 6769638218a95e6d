//! The annotation controller: owns the canonical sequence and all derived
//! layout/activation state, and mediates between the data model and the
//! view layer.
//!
//! External components only read through the query methods here; nothing
//! outside the controller mutates layout or activation state. Lifecycle
//! events arrive either as direct method calls or as [`ControllerEvent`]s
//! drained from a channel, one at a time in arrival order.

use std::time::Instant;

use crossbeam::channel::Receiver;
use log::{debug, warn};

use crate::controller::collaborators::{
    AnnotationEvents, AnnotationSet, DataModel, NewAnnotation, Renderer, ViewportMetrics,
};
use crate::controller::transition::{
    TransitionFollower, SIDEBAR_RELAYOUT_INTERVAL, SIDEBAR_TRANSITION_MAX, VIEW_SETTLE_DELAY,
};
use crate::core::{Annotation, AnnotationId, Interval, IntervalError, ResourceId, Time};
use crate::layout::engine::{self, LayoutError, LayoutMode, LayoutResult, TileSlot, DEFAULT_GAP};
use crate::layout::group;
use crate::playback::{topmost_active, ActivationChange, ActivationTracker};

/// Length in seconds of an annotation created from a bare playhead drop.
pub const DEFAULT_ANNOTATION_LENGTH: Time = 4.0;

/// Pixel gap between the detail elements in the detail strip.
const DETAIL_GAP: f64 = 10.0;

/// Error type for controller operations.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Interval(#[from] IntervalError),
    #[error("no annotation with id {id} in the current set")]
    UnknownAnnotation { id: AnnotationId },
}

/// The editor mode the host is in. Only `Annotations` changes this
/// controller's own behavior; any other editing mode still switches the
/// data model to the user's own annotation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Off,
    Annotations,
    Other,
}

/// Lifecycle events queued by the host and drained in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// Playback tick with the current time in seconds.
    TimeTick(Time),
    ViewportResized,
    SidebarToggled,
    VideoViewEntered,
    EditModeChanged { new: EditMode, old: EditMode },
    DatasetChanged,
    FocusRequested(Option<AnnotationId>),
    OpenRequested(Option<AnnotationId>),
    DeleteRequested(AnnotationId),
    CreateRequested(NewAnnotation),
}

/// Geometry of the detail strip while an annotation is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailSlider {
    /// Total width of the strip.
    pub width: f64,
    /// Left offset that centers the opened element in its container.
    pub offset: f64,
}

/// Deferred work an in-flight transition will trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingAction {
    Relayout,
    Refresh,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    follower: TransitionFollower,
    action: PendingAction,
}

/// Mediator between the annotation data model and its UI representations.
pub struct AnnotationController {
    model: Box<dyn DataModel>,
    renderer: Box<dyn Renderer>,
    viewport: Box<dyn ViewportMetrics>,
    events: Box<dyn AnnotationEvents>,

    annotations: Vec<Annotation>,
    layout: LayoutResult,
    tracker: ActivationTracker,
    opened: Option<AnnotationId>,
    edit_mode: EditMode,
    pending: Option<Pending>,
    current_time: Time,
    gap: f64,
}

impl AnnotationController {
    pub fn new(
        model: Box<dyn DataModel>,
        renderer: Box<dyn Renderer>,
        viewport: Box<dyn ViewportMetrics>,
        events: Box<dyn AnnotationEvents>,
    ) -> Self {
        Self {
            model,
            renderer,
            viewport,
            events,
            annotations: Vec::new(),
            layout: LayoutResult::default(),
            tracker: ActivationTracker::new(),
            opened: None,
            edit_mode: EditMode::Off,
            pending: None,
            current_time: 0.0,
            gap: DEFAULT_GAP,
        }
    }

    /// Bind to the data model's current annotation set and lay it out.
    pub fn initialize(&mut self) -> Result<(), ControllerError> {
        self.rebind();
        self.relayout()
    }

    /// Re-read the (possibly switched) annotation set and re-run layout.
    /// Called when the data model signals a dataset switch.
    pub fn refresh(&mut self) -> Result<(), ControllerError> {
        self.rebind();
        self.relayout()
    }

    fn rebind(&mut self) {
        self.annotations = self.model.annotations();
        for annotation in &mut self.annotations {
            annotation.tile = self.renderer.measure(annotation);
        }
        self.tracker.rebind(&self.annotations);
        if let Some(opened) = self.opened {
            if self.position_of(opened).is_err() {
                debug!("opened annotation {opened} left the set, closing panel");
                self.opened = None;
                self.events.opened(None);
            }
        }
        debug!("bound {} annotations", self.annotations.len());
    }

    /// Recompute tile positions wholesale and publish the result.
    ///
    /// A precondition failure leaves the previously computed placements
    /// untouched and republishes them in overflow mode, so the view
    /// degrades to a scrollable track instead of blocking.
    fn relayout(&mut self) -> Result<(), ControllerError> {
        let slots: Vec<TileSlot> = self.annotations.iter().map(TileSlot::from).collect();
        let track_width = self.viewport.track_width();
        let duration = self.model.duration();
        match engine::layout(&slots, track_width, duration, self.gap) {
            Ok(result) => {
                self.layout = result;
                self.events.layout_changed(&self.layout);
                Ok(())
            }
            Err(e) => {
                let widths: Vec<f64> = slots.iter().map(|s| s.width).collect();
                warn!("layout failed ({e}), degrading to overflow presentation");
                self.layout.mode = LayoutMode::Overflow {
                    content_width: group::content_width(&widths, self.gap),
                };
                self.events.layout_changed(&self.layout);
                Err(e.into())
            }
        }
    }

    /// Apply a playback tick: recompute activation state for `t` and notify
    /// the view of every enter/exit transition.
    pub fn update(&mut self, t: Time) -> Vec<ActivationChange> {
        self.current_time = t;
        let changes = self.tracker.update(&self.annotations, t);
        self.dispatch(&changes);
        changes
    }

    /// The topmost active annotation at `t`. Apply `update(t)` first when
    /// activation state for the same tick matters.
    pub fn topmost_active(&self, t: Time) -> Option<&Annotation> {
        topmost_active(&self.annotations, t)
    }

    pub fn focused(&self) -> Option<AnnotationId> {
        self.tracker.focused()
    }

    /// Move focus, notifying the old and new holder, then re-run activation
    /// for the current time.
    pub fn set_focus(
        &mut self,
        id: Option<AnnotationId>,
    ) -> Result<Vec<ActivationChange>, ControllerError> {
        if let Some(id) = id {
            self.position_of(id)?;
        }
        let outcome = self.tracker.set_focus(&self.annotations, id, self.current_time);
        if let Some(old) = outcome.removed_from_focus {
            self.events.removed_from_focus(old);
        }
        if let Some(new) = outcome.got_in_focus {
            self.events.got_in_focus(new);
        }
        self.dispatch(&outcome.changes);
        Ok(outcome.changes)
    }

    pub fn opened(&self) -> Option<AnnotationId> {
        self.opened
    }

    /// Open an annotation's detail panel, or close the panel with `None`.
    /// At most one annotation is open at a time.
    pub fn open(&mut self, id: Option<AnnotationId>) -> Result<(), ControllerError> {
        if let Some(id) = id {
            self.position_of(id)?;
        }
        self.opened = id;
        self.events.opened(id);
        Ok(())
    }

    /// Geometry for the detail strip, present while a panel is open.
    pub fn detail_slider(&self) -> Option<DetailSlider> {
        let opened = self.opened?;
        let width = self
            .annotations
            .iter()
            .map(|a| self.renderer.detail_width(a.id) + DETAIL_GAP)
            .sum();
        let offset = centering_offset(
            self.renderer.detail_left(opened),
            self.renderer.detail_width(opened),
            self.viewport.detail_container_width(),
        );
        Some(DetailSlider { width, offset })
    }

    /// React to a viewport resize: layout only, activation is unaffected.
    pub fn on_viewport_change(&mut self) -> Result<(), ControllerError> {
        self.relayout()
    }

    /// The sidebar started its width transition; follow it with repeated
    /// relayouts until it has certainly finished. A toggle while a follower
    /// is still pending replaces it.
    pub fn on_sidebar_toggle(&mut self, now: Instant) {
        debug!("sidebar toggled, following the width transition");
        self.pending = Some(Pending {
            follower: TransitionFollower::repeating(
                now,
                SIDEBAR_RELAYOUT_INTERVAL,
                SIDEBAR_TRANSITION_MAX,
            ),
            action: PendingAction::Relayout,
        });
    }

    /// The host switched into the video view; relayout once after the view
    /// has settled.
    pub fn on_video_view_entered(&mut self, now: Instant) {
        self.pending = Some(Pending {
            follower: TransitionFollower::one_shot(now, VIEW_SETTLE_DELAY),
            action: PendingAction::Relayout,
        });
    }

    /// Drive the pending transition follower, if any. The host calls this
    /// from its frame/tick loop with its own clock.
    pub fn poll(&mut self, now: Instant) -> Result<(), ControllerError> {
        let Some(mut pending) = self.pending.take() else {
            return Ok(());
        };
        let fire = pending.follower.poll(now);
        if !pending.follower.finished(now) {
            self.pending = Some(pending);
        }
        if fire {
            match pending.action {
                PendingAction::Relayout => self.relayout()?,
                PendingAction::Refresh => self.refresh()?,
            }
        }
        Ok(())
    }

    /// React to the host's edit-mode transitions.
    ///
    /// Entering any editing mode switches the data model to the user's own
    /// annotation set and refreshes once the view has settled. Entering the
    /// annotations mode itself freezes tile layout in favor of the stacked
    /// timeline and enables drop-to-create; leaving it reverts both and
    /// clears focus.
    pub fn on_edit_mode_change(
        &mut self,
        new: EditMode,
        old: EditMode,
        now: Instant,
    ) -> Result<(), ControllerError> {
        if old == EditMode::Off && new != EditMode::Off {
            self.model.set_annotation_set(AnnotationSet::Own);
            self.pending = Some(Pending {
                follower: TransitionFollower::one_shot(now, VIEW_SETTLE_DELAY),
                action: PendingAction::Refresh,
            });
        }

        if new == EditMode::Annotations && old != EditMode::Annotations {
            self.renderer.stack_timeline(&self.annotations);
            self.renderer.set_droppable(true);
        } else if old == EditMode::Annotations && new != EditMode::Annotations {
            self.set_focus(None)?;
            self.renderer.reset_timeline();
            self.renderer.set_droppable(false);
            self.refresh()?;
        }

        self.edit_mode = new;
        Ok(())
    }

    /// Remove an annotation from layout and activation state, then delegate
    /// its removal to the data model.
    pub fn delete_annotation(&mut self, id: AnnotationId) -> Result<(), ControllerError> {
        let pos = self.position_of(id)?;
        if self.tracker.focused() == Some(id) {
            self.set_focus(None)?;
        }
        if self.opened == Some(id) {
            self.open(None)?;
        }
        self.tracker.forget(id);
        self.annotations.remove(pos);
        self.relayout()?;
        self.model.remove_annotation(id);
        if self.edit_mode == EditMode::Annotations {
            self.renderer.stack_timeline(&self.annotations);
        }
        Ok(())
    }

    /// Create an annotation through the data model, lay it out immediately
    /// and enter the editing interaction for it (it takes focus).
    pub fn create_annotation(
        &mut self,
        interval: Interval,
        resource: ResourceId,
    ) -> Result<AnnotationId, ControllerError> {
        let mut annotation = self.model.new_annotation(NewAnnotation { interval, resource });
        annotation.tile = self.renderer.measure(&annotation);
        let id = annotation.id;
        self.annotations.push(annotation);
        self.update(self.current_time);
        if self.edit_mode == EditMode::Annotations {
            self.renderer.stack_timeline(&self.annotations);
        }
        self.relayout()?;
        self.set_focus(Some(id))?;
        Ok(id)
    }

    /// Apply one lifecycle event.
    pub fn handle(&mut self, event: ControllerEvent, now: Instant) -> Result<(), ControllerError> {
        match event {
            ControllerEvent::TimeTick(t) => {
                self.update(t);
                Ok(())
            }
            ControllerEvent::ViewportResized => self.on_viewport_change(),
            ControllerEvent::SidebarToggled => {
                self.on_sidebar_toggle(now);
                Ok(())
            }
            ControllerEvent::VideoViewEntered => {
                self.on_video_view_entered(now);
                Ok(())
            }
            ControllerEvent::EditModeChanged { new, old } => {
                self.on_edit_mode_change(new, old, now)
            }
            ControllerEvent::DatasetChanged => self.refresh(),
            ControllerEvent::FocusRequested(id) => self.set_focus(id).map(|_| ()),
            ControllerEvent::OpenRequested(id) => self.open(id),
            ControllerEvent::DeleteRequested(id) => self.delete_annotation(id),
            ControllerEvent::CreateRequested(request) => self
                .create_annotation(request.interval, request.resource)
                .map(|_| ()),
        }
    }

    /// Drain all queued events in arrival order. A failing event localizes
    /// to itself; later events still run.
    pub fn drain(&mut self, rx: &Receiver<ControllerEvent>, now: Instant) {
        while let Ok(event) = rx.try_recv() {
            if let Err(e) = self.handle(event, now) {
                warn!("annotation event failed: {e}");
            }
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    fn position_of(&self, id: AnnotationId) -> Result<usize, ControllerError> {
        self.annotations
            .iter()
            .position(|a| a.id == id)
            .ok_or(ControllerError::UnknownAnnotation { id })
    }

    fn dispatch(&mut self, changes: &[ActivationChange]) {
        for change in changes {
            match *change {
                ActivationChange::Activated(id) => self.events.activated(id),
                ActivationChange::Deactivated(id) => self.events.deactivated(id),
            }
        }
    }
}

/// Interval for an annotation dropped onto the timeline at playhead time
/// `t`: four seconds, clipped to the end of the video.
pub fn default_interval_at(t: Time, duration: Time) -> Result<Interval, IntervalError> {
    let end = if t + DEFAULT_ANNOTATION_LENGTH > duration {
        duration
    } else {
        t + DEFAULT_ANNOTATION_LENGTH
    };
    Interval::new(t, end)
}

/// Offset that horizontally centers the opened detail element within its
/// container.
fn centering_offset(item_left: f64, item_width: f64, container_width: f64) -> f64 {
    -(item_left - 1.0 - container_width / 2.0 + item_width / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TileMetrics;
    use crossbeam::channel;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Debug)]
    struct ModelState {
        duration: Time,
        set: AnnotationSet,
        annotations: Vec<Annotation>,
        next_id: AnnotationId,
        removed: Vec<AnnotationId>,
    }

    #[derive(Clone)]
    struct MockModel(Rc<RefCell<ModelState>>);

    impl MockModel {
        fn with(duration: Time, intervals: &[(Time, Time)]) -> Self {
            let annotations = intervals
                .iter()
                .enumerate()
                .map(|(i, &(s, e))| {
                    Annotation::new(i as AnnotationId + 1, Interval::new(s, e).unwrap(), "r".into())
                })
                .collect::<Vec<_>>();
            let next_id = annotations.len() as AnnotationId + 1;
            Self(Rc::new(RefCell::new(ModelState {
                duration,
                set: AnnotationSet::Own,
                annotations,
                next_id,
                removed: Vec::new(),
            })))
        }
    }

    impl DataModel for MockModel {
        fn duration(&self) -> Time {
            self.0.borrow().duration
        }

        fn annotation_set(&self) -> AnnotationSet {
            self.0.borrow().set.clone()
        }

        fn set_annotation_set(&mut self, set: AnnotationSet) {
            self.0.borrow_mut().set = set;
        }

        fn annotations(&self) -> Vec<Annotation> {
            self.0.borrow().annotations.clone()
        }

        fn new_annotation(&mut self, request: NewAnnotation) -> Annotation {
            let mut state = self.0.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            let annotation = Annotation::new(id, request.interval, request.resource);
            state.annotations.push(annotation.clone());
            annotation
        }

        fn remove_annotation(&mut self, id: AnnotationId) {
            let mut state = self.0.borrow_mut();
            state.annotations.retain(|a| a.id != id);
            state.removed.push(id);
        }
    }

    #[derive(Clone, Default)]
    struct MockRenderer(Rc<RefCell<Vec<String>>>);

    impl Renderer for MockRenderer {
        fn measure(&self, _annotation: &Annotation) -> TileMetrics {
            TileMetrics::new(50.0, 20.0)
        }

        fn detail_width(&self, _id: AnnotationId) -> f64 {
            100.0
        }

        fn detail_left(&self, id: AnnotationId) -> f64 {
            id as f64 * 110.0
        }

        fn stack_timeline(&mut self, annotations: &[Annotation]) {
            self.0.borrow_mut().push(format!("stack {}", annotations.len()));
        }

        fn reset_timeline(&mut self) {
            self.0.borrow_mut().push("reset".into());
        }

        fn set_droppable(&mut self, droppable: bool) {
            self.0.borrow_mut().push(format!("droppable {droppable}"));
        }
    }

    #[derive(Clone)]
    struct MockViewport(Rc<RefCell<f64>>);

    impl ViewportMetrics for MockViewport {
        fn track_width(&self) -> f64 {
            *self.0.borrow()
        }

        fn detail_container_width(&self) -> f64 {
            400.0
        }
    }

    #[derive(Clone, Default)]
    struct MockEvents(Rc<RefCell<Vec<String>>>);

    impl AnnotationEvents for MockEvents {
        fn activated(&mut self, id: AnnotationId) {
            self.0.borrow_mut().push(format!("activated {id}"));
        }

        fn deactivated(&mut self, id: AnnotationId) {
            self.0.borrow_mut().push(format!("deactivated {id}"));
        }

        fn got_in_focus(&mut self, id: AnnotationId) {
            self.0.borrow_mut().push(format!("focus {id}"));
        }

        fn removed_from_focus(&mut self, id: AnnotationId) {
            self.0.borrow_mut().push(format!("unfocus {id}"));
        }

        fn opened(&mut self, id: Option<AnnotationId>) {
            self.0.borrow_mut().push(format!("opened {id:?}"));
        }

        fn layout_changed(&mut self, layout: &LayoutResult) {
            self.0
                .borrow_mut()
                .push(format!("layout {}", layout.tiles.len()));
        }
    }

    struct Harness {
        controller: AnnotationController,
        model: MockModel,
        renderer: MockRenderer,
        events: MockEvents,
    }

    fn harness(duration: Time, intervals: &[(Time, Time)]) -> Harness {
        let _ = env_logger::builder().is_test(true).try_init();
        let model = MockModel::with(duration, intervals);
        let renderer = MockRenderer::default();
        let viewport = MockViewport(Rc::new(RefCell::new(1000.0)));
        let events = MockEvents::default();
        let controller = AnnotationController::new(
            Box::new(model.clone()),
            Box::new(renderer.clone()),
            Box::new(viewport),
            Box::new(events.clone()),
        );
        Harness {
            controller,
            model,
            renderer,
            events,
        }
    }

    fn event_log(events: &MockEvents) -> Vec<String> {
        events.0.borrow().clone()
    }

    #[test]
    fn test_initialize_measures_and_publishes_layout() {
        let mut h = harness(100.0, &[(10.0, 20.0), (60.0, 70.0)]);
        h.controller.initialize().unwrap();
        assert_eq!(h.controller.annotations().len(), 2);
        assert!(h.controller.annotations().iter().all(|a| a.tile.width == 50.0));
        assert_eq!(h.controller.layout().tiles.len(), 2);
        assert_eq!(event_log(&h.events), vec!["layout 2"]);
    }

    #[test]
    fn test_update_forwards_activation_changes() {
        let mut h = harness(100.0, &[(0.0, 10.0), (5.0, 15.0)]);
        h.controller.initialize().unwrap();
        h.controller.update(0.0);
        h.controller.update(5.0);
        h.controller.update(12.0);
        let log = event_log(&h.events);
        assert_eq!(
            log,
            vec![
                "layout 2",
                "activated 1",
                "activated 2",
                "deactivated 1"
            ]
        );
    }

    #[test]
    fn test_focus_override_and_notifications() {
        let mut h = harness(100.0, &[(0.0, 10.0)]);
        h.controller.initialize().unwrap();
        h.controller.update(50.0);

        let changes = h.controller.set_focus(Some(1)).unwrap();
        assert_eq!(changes, vec![ActivationChange::Activated(1)]);
        assert_eq!(h.controller.focused(), Some(1));

        let changes = h.controller.set_focus(None).unwrap();
        assert_eq!(changes, vec![ActivationChange::Deactivated(1)]);
        let log = event_log(&h.events);
        assert!(log.contains(&"focus 1".to_string()));
        assert!(log.contains(&"unfocus 1".to_string()));
    }

    #[test]
    fn test_set_focus_rejects_unknown_id() {
        let mut h = harness(100.0, &[(0.0, 10.0)]);
        h.controller.initialize().unwrap();
        assert_eq!(
            h.controller.set_focus(Some(99)),
            Err(ControllerError::UnknownAnnotation { id: 99 })
        );
    }

    #[test]
    fn test_delete_clears_focus_and_delegates_removal() {
        let mut h = harness(100.0, &[(0.0, 10.0), (20.0, 30.0)]);
        h.controller.initialize().unwrap();
        h.controller.set_focus(Some(1)).unwrap();

        h.controller.delete_annotation(1).unwrap();
        assert_eq!(h.controller.focused(), None);
        assert_eq!(h.controller.annotations().len(), 1);
        assert_eq!(h.controller.layout().tiles.len(), 1);
        assert_eq!(h.model.0.borrow().removed, vec![1]);
        assert!(event_log(&h.events).contains(&"unfocus 1".to_string()));
    }

    #[test]
    fn test_create_annotation_enters_editing() {
        let mut h = harness(100.0, &[(0.0, 10.0)]);
        h.controller.initialize().unwrap();
        let id = h
            .controller
            .create_annotation(Interval::new(40.0, 44.0).unwrap(), "res-9".into())
            .unwrap();
        assert_eq!(id, 2);
        assert_eq!(h.controller.annotations().len(), 2);
        assert_eq!(h.controller.focused(), Some(id));
        assert_eq!(h.controller.layout().tiles.len(), 2);
        assert!(event_log(&h.events).contains(&"focus 2".to_string()));
    }

    #[test]
    fn test_sidebar_toggle_follows_transition_then_stops() {
        let mut h = harness(100.0, &[(10.0, 20.0)]);
        h.controller.initialize().unwrap();
        let start = Instant::now();
        h.controller.on_sidebar_toggle(start);

        let layouts = |events: &MockEvents| {
            event_log(events)
                .iter()
                .filter(|l| l.starts_with("layout"))
                .count()
        };
        let before = layouts(&h.events);

        h.controller.poll(start + Duration::from_millis(10)).unwrap();
        assert_eq!(layouts(&h.events), before);
        h.controller.poll(start + Duration::from_millis(40)).unwrap();
        assert_eq!(layouts(&h.events), before + 1);
        h.controller.poll(start + Duration::from_millis(80)).unwrap();
        assert_eq!(layouts(&h.events), before + 2);
        // Past the transition bound the follower is gone.
        h.controller.poll(start + Duration::from_millis(300)).unwrap();
        h.controller.poll(start + Duration::from_millis(340)).unwrap();
        assert_eq!(layouts(&h.events), before + 2);
    }

    #[test]
    fn test_sidebar_toggle_replaces_pending_follower() {
        let mut h = harness(100.0, &[(10.0, 20.0)]);
        h.controller.initialize().unwrap();
        let start = Instant::now();
        h.controller.on_sidebar_toggle(start);
        // Restarting before the first deadline replaces the follower, so
        // the first schedule never fires.
        h.controller.on_sidebar_toggle(start + Duration::from_millis(20));
        h.controller.poll(start + Duration::from_millis(45)).unwrap();
        let log = event_log(&h.events);
        assert_eq!(
            log.iter().filter(|l| l.starts_with("layout")).count(),
            1,
            "only the initial layout, the replaced follower must not fire: {log:?}"
        );
        h.controller.poll(start + Duration::from_millis(60)).unwrap();
        assert_eq!(
            event_log(&h.events)
                .iter()
                .filter(|l| l.starts_with("layout"))
                .count(),
            2
        );
    }

    #[test]
    fn test_edit_mode_round_trip() {
        let mut h = harness(100.0, &[(0.0, 10.0)]);
        h.controller.initialize().unwrap();
        let now = Instant::now();

        h.controller
            .on_edit_mode_change(EditMode::Annotations, EditMode::Off, now)
            .unwrap();
        assert_eq!(h.controller.edit_mode(), EditMode::Annotations);
        assert_eq!(h.model.annotation_set(), AnnotationSet::Own);
        {
            let calls = h.renderer.0.borrow();
            assert!(calls.contains(&"stack 1".to_string()));
            assert!(calls.contains(&"droppable true".to_string()));
        }

        // The deferred refresh fires after the settle delay.
        h.controller.poll(now + Duration::from_millis(300)).unwrap();
        let layouts = event_log(&h.events)
            .iter()
            .filter(|l| l.starts_with("layout"))
            .count();
        assert_eq!(layouts, 2);

        h.controller.set_focus(Some(1)).unwrap();
        h.controller
            .on_edit_mode_change(EditMode::Off, EditMode::Annotations, now)
            .unwrap();
        assert_eq!(h.controller.edit_mode(), EditMode::Off);
        assert_eq!(h.controller.focused(), None);
        let calls = h.renderer.0.borrow();
        assert!(calls.contains(&"reset".to_string()));
        assert!(calls.contains(&"droppable false".to_string()));
    }

    #[test]
    fn test_layout_failure_degrades_to_overflow() {
        let mut h = harness(0.0, &[(0.0, 0.0)]);
        assert!(matches!(
            h.controller.initialize(),
            Err(ControllerError::Layout(LayoutError::InvalidDuration { .. }))
        ));
        assert!(h.controller.layout().is_overflow());
        // The degraded presentation was still published.
        assert_eq!(event_log(&h.events), vec!["layout 0"]);
    }

    #[test]
    fn test_failed_layout_keeps_previous_placements() {
        let mut h = harness(100.0, &[(10.0, 20.0), (60.0, 70.0)]);
        h.controller.initialize().unwrap();
        let before = h.controller.layout().tiles.clone();

        h.model.0.borrow_mut().duration = 0.0;
        assert!(h.controller.on_viewport_change().is_err());
        assert_eq!(h.controller.layout().tiles, before);
        assert!(h.controller.layout().is_overflow());
    }

    #[test]
    fn test_open_and_detail_slider_geometry() {
        let mut h = harness(100.0, &[(0.0, 10.0), (20.0, 30.0)]);
        h.controller.initialize().unwrap();
        assert!(h.controller.detail_slider().is_none());

        h.controller.open(Some(1)).unwrap();
        let slider = h.controller.detail_slider().unwrap();
        // Two detail elements of 100 px plus a 10 px gap each.
        assert_eq!(slider.width, 220.0);
        // Item 1 sits at left 110; centering it in the 400 px container
        // yields -(110 - 1 - 200 + 50) = 41.
        assert_eq!(slider.offset, 41.0);

        h.controller.open(None).unwrap();
        assert!(h.controller.detail_slider().is_none());
        let log = event_log(&h.events);
        assert!(log.contains(&"opened Some(1)".to_string()));
        assert!(log.contains(&"opened None".to_string()));
    }

    #[test]
    fn test_drain_applies_events_in_arrival_order() {
        let mut h = harness(100.0, &[(0.0, 10.0), (5.0, 15.0)]);
        h.controller.initialize().unwrap();

        let (tx, rx) = channel::unbounded();
        tx.send(ControllerEvent::TimeTick(0.0)).unwrap();
        tx.send(ControllerEvent::TimeTick(12.0)).unwrap();
        tx.send(ControllerEvent::FocusRequested(Some(1))).unwrap();
        // A failing event must not stop the ones after it.
        tx.send(ControllerEvent::DeleteRequested(99)).unwrap();
        tx.send(ControllerEvent::OpenRequested(Some(2))).unwrap();

        h.controller.drain(&rx, Instant::now());
        assert_eq!(h.controller.focused(), Some(1));
        assert_eq!(h.controller.opened(), Some(2));
        let log = event_log(&h.events);
        assert_eq!(
            log,
            vec![
                "layout 2",
                "activated 1",
                "deactivated 1",
                "activated 2",
                "focus 1",
                "activated 1",
                "opened Some(2)"
            ]
        );
    }

    #[test]
    fn test_default_interval_at() {
        assert_eq!(
            default_interval_at(10.0, 60.0).unwrap(),
            Interval::new(10.0, 14.0).unwrap()
        );
        assert_eq!(
            default_interval_at(58.0, 60.0).unwrap(),
            Interval::new(58.0, 60.0).unwrap()
        );
        // A drop past the end of the video cannot form an interval.
        assert!(default_interval_at(61.0, 60.0).is_err());
    }

    #[test]
    fn test_topmost_forwarded_through_controller() {
        let mut h = harness(100.0, &[(0.0, 10.0), (3.0, 8.0)]);
        h.controller.initialize().unwrap();
        h.controller.update(5.0);
        assert_eq!(h.controller.topmost_active(5.0).unwrap().id, 2);
    }
}
