// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine that ties gestures, bounds, animations and listeners together.

use alloc::boxed::Box;

use kurbo::{Affine, Rect, Size};

use crate::alignment::{Alignment, Axis, Gravity, Transformation};
use crate::dispatch::{ListenerId, UpdatesDispatcher, ZoomListener};
use crate::event::TouchEvent;
use crate::fling::{FlingAxis, FlingScroller};
use crate::gestures::pinch::PinchDetector;
use crate::gestures::scroll_fling::{ScrollFingers, ScrollFlingDetector};
use crate::matrix::{MatrixController, SizeChange, TransformState};
use crate::pan::PanManager;
use crate::point::{AbsolutePoint, ScaledPoint};
use crate::provider::{OverPanRangeProvider, OverZoomRangeProvider};
use crate::scheduler::{FrameTask, Scheduler};
use crate::state::{StateCallback, StateController, TouchCallback, TouchResult, ZoomState};
use crate::update::{MatrixUpdate, PanChange, ZoomChange};
use crate::zoom::{ZoomConfigError, ZoomManager, ZoomType};

/// Factor applied by [`ZoomEngine::zoom_in`].
const ZOOM_IN_FACTOR: f64 = 1.3;

/// Factor applied by [`ZoomEngine::zoom_out`].
const ZOOM_OUT_FACTOR: f64 = 0.7;

/// Everything the gesture detectors need mutable access to.
#[derive(Debug)]
pub(crate) struct EngineInner<S> {
    pub(crate) matrix: MatrixController,
    pub(crate) pan: PanManager,
    pub(crate) zoom: ZoomManager,
    pub(crate) fling: FlingScroller,
    dispatcher: UpdatesDispatcher,
    scheduler: S,
    transformation: Transformation,
    transformation_gravity: Option<Alignment>,
    animation_frame_pending: bool,
    fling_frame_pending: bool,
}

impl<S: Scheduler> EngineInner<S> {
    fn new(scheduler: S) -> Self {
        Self {
            matrix: MatrixController::default(),
            pan: PanManager::default(),
            zoom: ZoomManager::default(),
            fling: FlingScroller::default(),
            dispatcher: UpdatesDispatcher::default(),
            scheduler,
            transformation: Transformation::default(),
            transformation_gravity: None,
            animation_frame_pending: false,
            fling_frame_pending: false,
        }
    }

    /// Applies `update` now and notifies listeners if it asks for it.
    pub(crate) fn apply_update(&mut self, update: &MatrixUpdate) -> bool {
        let applied = self.matrix.apply_update(update, &self.zoom, &self.pan);
        if applied && update.notify {
            self.dispatcher.dispatch_update(self.matrix.state());
        }
        applied
    }

    /// Enters [`ZoomState::Animating`] and animates towards `update`.
    ///
    /// Any animation already running is cancelled first.
    pub(crate) fn animate_update(
        &mut self,
        state: &mut StateController,
        update: MatrixUpdate,
    ) -> bool {
        if !self.matrix.state().is_initialized() || !state.set_animating(self) {
            return false;
        }
        self.matrix.start_animation(update, &self.zoom);
        self.request_animation_frame();
        true
    }

    fn request_animation_frame(&mut self) {
        if !self.animation_frame_pending {
            self.animation_frame_pending = true;
            self.scheduler.post_on_animation(FrameTask::Animation);
        }
    }

    /// Starts the fling simulation. The caller has already entered
    /// [`ZoomState::Flinging`].
    pub(crate) fn start_fling(&mut self, x: FlingAxis, y: FlingAxis) {
        self.fling.fling(x, y);
        if !self.fling_frame_pending {
            self.fling_frame_pending = true;
            self.scheduler.post(FrameTask::Fling);
        }
    }

    fn run_animation_frame(&mut self, state: &mut StateController, now_ms: u64) {
        self.animation_frame_pending = false;
        if !self.matrix.has_animations() {
            return;
        }
        let step = self.matrix.step_animations(now_ms, &self.zoom, &self.pan);
        if step.notify {
            self.dispatcher.dispatch_update(self.matrix.state());
        }
        if self.matrix.has_animations() {
            self.request_animation_frame();
        } else if step.drained && state.is_animating() {
            state.make_idle(self);
        }
    }

    fn run_fling_frame(&mut self, state: &mut StateController, now_ms: u64) {
        self.fling_frame_pending = false;
        if !self.fling.compute_scroll_offset(now_ms) {
            // Finished on the previous frame, or stopped from outside. A new
            // owner may already have taken over.
            if state.is_flinging() {
                state.make_idle(self);
            }
            return;
        }
        let position = self.fling.current();
        let update = MatrixUpdate::new().with_pan(
            PanChange::ScaledTo(ScaledPoint::new(position.x, position.y)),
            true,
        );
        self.apply_update(&update);
        self.fling_frame_pending = true;
        self.scheduler.post_on_animation(FrameTask::Fling);
    }

    /// Gravity used to place the content when sizes first become known.
    fn resting_gravity(&self, axis: Axis) -> Gravity {
        let alignment = self.transformation_gravity.unwrap_or(self.pan.alignment);
        match alignment.gravity(axis) {
            Some(Gravity::None) | None => Gravity::Center,
            Some(gravity) => gravity,
        }
    }
}

impl<S: Scheduler> StateCallback for EngineInner<S> {
    fn is_state_allowed(&self, _new_state: ZoomState) -> bool {
        self.matrix.state().is_initialized()
    }

    fn on_state_idle(&mut self) {
        self.dispatcher.dispatch_idle(self.matrix.state());
    }

    fn cleanup_state(&mut self, old_state: ZoomState) {
        match old_state {
            ZoomState::Animating => {
                self.matrix.cancel_animations();
            }
            ZoomState::Flinging => self.fling.force_finished(),
            ZoomState::Idle | ZoomState::Scrolling | ZoomState::Pinching => {}
        }
    }
}

/// Borrowed view of the engine handed to the state machine while it routes a
/// touch event.
struct GestureHooks<'a, S> {
    pinch: &'a mut PinchDetector,
    scroll_fling: &'a mut ScrollFlingDetector,
    inner: &'a mut EngineInner<S>,
}

impl<S: Scheduler> StateCallback for GestureHooks<'_, S> {
    fn is_state_allowed(&self, new_state: ZoomState) -> bool {
        self.inner.is_state_allowed(new_state)
    }

    fn on_state_idle(&mut self) {
        self.inner.on_state_idle();
    }

    fn cleanup_state(&mut self, old_state: ZoomState) {
        self.inner.cleanup_state(old_state);
    }
}

impl<S: Scheduler> TouchCallback for GestureHooks<'_, S> {
    fn maybe_start_pinch_gesture(
        &mut self,
        state: &mut StateController,
        event: &TouchEvent,
    ) -> bool {
        self.pinch.maybe_start(event, state, self.inner)
    }

    fn maybe_start_scroll_fling_gesture(
        &mut self,
        state: &mut StateController,
        event: &TouchEvent,
    ) -> bool {
        self.scroll_fling.maybe_start(event, state, self.inner)
    }

    fn end_scroll_gesture(&mut self, state: &mut StateController) {
        self.scroll_fling.cancel_scroll(state, self.inner);
    }
}

/// Pan and zoom engine for a content rectangle inside a container.
///
/// The engine owns a scale-plus-translate transform that maps content
/// coordinates to container coordinates. It is driven by three kinds of
/// input, all on the host's thread:
///
/// - size notifications ([`set_content_size`](Self::set_content_size),
///   [`set_container_size`](Self::set_container_size)),
/// - touch events ([`on_touch_event`](Self::on_touch_event)) and API calls
///   such as [`zoom_to`](Self::zoom_to),
/// - frame callbacks ([`run_frame`](Self::run_frame)) for tasks it posted to
///   its [`Scheduler`].
///
/// Zoom values taken and returned by the API are *logical* unless the method
/// name says otherwise; see [`ZoomType`].
#[derive(Debug)]
pub struct ZoomEngine<S> {
    state: StateController,
    pinch: PinchDetector,
    scroll_fling: ScrollFlingDetector,
    inner: EngineInner<S>,
}

impl<S: Scheduler + Default> Default for ZoomEngine<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Scheduler> ZoomEngine<S> {
    /// Creates an engine that posts its frame tasks to `scheduler`.
    pub fn new(scheduler: S) -> Self {
        Self {
            state: StateController::default(),
            pinch: PinchDetector::default(),
            scroll_fling: ScrollFlingDetector::default(),
            inner: EngineInner::new(scheduler),
        }
    }

    /// The scheduler frame tasks are posted to.
    pub fn scheduler(&self) -> &S {
        &self.inner.scheduler
    }

    /// Mutable access to the scheduler, for hosts that drain it.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.inner.scheduler
    }

    /// Registers a listener. Listeners are notified in registration order.
    pub fn add_listener(&mut self, listener: impl ZoomListener + 'static) -> ListenerId {
        self.inner.dispatcher.add(Box::new(listener))
    }

    /// Unregisters a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.inner.dispatcher.remove(id)
    }

    // Sizes

    /// Sets the untransformed content size.
    ///
    /// Non-positive sizes are ignored. Once both sizes are known the content
    /// is fitted by the [`Transformation`]; later changes keep the current
    /// real zoom. `force_reset` fits the content again even if the size did
    /// not change.
    pub fn set_content_size(&mut self, size: Size, force_reset: bool) {
        let change = self.inner.matrix.set_content_size(size, force_reset);
        self.on_size_changed(change);
    }

    /// Sets the container size. See [`set_content_size`](Self::set_content_size).
    pub fn set_container_size(&mut self, size: Size, force_reset: bool) {
        let change = self.inner.matrix.set_container_size(size, force_reset);
        self.on_size_changed(change);
    }

    fn on_size_changed(&mut self, change: Option<SizeChange>) {
        let Some(change) = change else {
            return;
        };
        self.state.make_idle(&mut self.inner);

        let transform = *self.inner.matrix.state();
        let fit = self
            .inner
            .transformation
            .zoom_for(transform.content_size(), transform.container_size());
        self.inner.zoom.set_transformation_zoom(fit);
        log::debug!(
            "transformation zoom {} (first time: {})",
            self.inner.zoom.transformation_zoom(),
            change.first_time
        );

        if change.first_time {
            let fit = self.inner.zoom.transformation_zoom();
            self.inner.apply_update(
                &MatrixUpdate::new()
                    .with_zoom(ZoomChange::To(fit), false)
                    .with_notify(false),
            );
            let transform = *self.inner.matrix.state();
            let scaled = transform.content_scaled_size();
            let container = transform.container_size();
            let rest = ScaledPoint::new(
                self.inner
                    .resting_gravity(Axis::Horizontal)
                    .apply(container.width - scaled.width),
                self.inner
                    .resting_gravity(Axis::Vertical)
                    .apply(container.height - scaled.height),
            );
            self.inner
                .apply_update(&MatrixUpdate::new().with_pan(PanChange::ScaledTo(rest), false));
        } else {
            self.inner.apply_update(
                &MatrixUpdate::new().with_zoom(ZoomChange::To(change.previous_zoom), false),
            );
        }
    }

    /// Forgets both sizes and the transform, and stops everything.
    pub fn clear(&mut self) {
        self.state.make_idle(&mut self.inner);
        self.inner.fling.force_finished();
        self.inner.matrix.clear();
        self.inner.zoom.set_transformation_zoom(1.0);
    }

    // Configuration

    /// Sets the base transformation and the gravity used to place the content
    /// when it is first fitted. `None` uses the [alignment](Self::set_alignment).
    ///
    /// Takes effect on the next fit.
    pub fn set_transformation(
        &mut self,
        transformation: Transformation,
        gravity: Option<Alignment>,
    ) {
        self.inner.transformation = transformation;
        self.inner.transformation_gravity = gravity;
    }

    /// Sets where content smaller than the container rests.
    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.inner.pan.alignment = alignment;
    }

    /// Replaces the over-pan range provider.
    pub fn set_over_pan_range(&mut self, provider: impl OverPanRangeProvider + 'static) {
        self.inner.pan.set_over_pan_range(Box::new(provider));
    }

    /// Replaces the over-zoom range provider.
    pub fn set_over_zoom_range(&mut self, provider: impl OverZoomRangeProvider + 'static) {
        self.inner.zoom.set_over_zoom_range(Box::new(provider));
    }

    /// Allows horizontal pans past the edges during gestures.
    pub fn set_over_scroll_horizontal(&mut self, enabled: bool) {
        self.inner.pan.horizontal_over_pan_enabled = enabled;
    }

    /// Allows vertical pans past the edges during gestures.
    pub fn set_over_scroll_vertical(&mut self, enabled: bool) {
        self.inner.pan.vertical_over_pan_enabled = enabled;
    }

    /// Enables horizontal panning by gestures.
    pub fn set_horizontal_pan_enabled(&mut self, enabled: bool) {
        self.inner.pan.horizontal_pan_enabled = enabled;
    }

    /// Enables vertical panning by gestures.
    pub fn set_vertical_pan_enabled(&mut self, enabled: bool) {
        self.inner.pan.vertical_pan_enabled = enabled;
    }

    /// Allows pinches to go past the zoom bounds.
    pub fn set_over_pinchable(&mut self, enabled: bool) {
        self.inner.zoom.over_zoom_enabled = enabled;
    }

    /// Enables pinch-to-zoom.
    pub fn set_zoom_enabled(&mut self, enabled: bool) {
        self.inner.zoom.zoom_enabled = enabled;
    }

    /// Enables drag-to-pan.
    pub fn set_scroll_enabled(&mut self, enabled: bool) {
        self.scroll_fling.scroll_enabled = enabled;
    }

    /// Enables single-finger drags.
    pub fn set_one_finger_scroll_enabled(&mut self, enabled: bool) {
        self.scroll_fling.fingers.set(ScrollFingers::ONE, enabled);
    }

    /// Enables two-finger drags.
    pub fn set_two_finger_scroll_enabled(&mut self, enabled: bool) {
        self.scroll_fling.fingers.set(ScrollFingers::TWO, enabled);
    }

    /// Enables three-finger drags.
    pub fn set_three_finger_scroll_enabled(&mut self, enabled: bool) {
        self.scroll_fling.fingers.set(ScrollFingers::THREE, enabled);
    }

    /// Enables flings.
    pub fn set_fling_enabled(&mut self, enabled: bool) {
        self.scroll_fling.fling_enabled = enabled;
    }

    /// Allows a fling to start while the content is over-panned.
    pub fn set_allow_fling_in_overscroll(&mut self, enabled: bool) {
        self.scroll_fling.fling_in_over_pan_enabled = enabled;
    }

    /// Duration of API and corrective animations.
    pub fn set_animation_duration(&mut self, duration_ms: u64) {
        self.inner.matrix.animation_duration_ms = duration_ms;
    }

    /// Sets the minimum zoom. If the current zoom is now too small, it is
    /// animated up to the new minimum.
    pub fn set_min_zoom(&mut self, value: f64, zoom_type: ZoomType) -> Result<(), ZoomConfigError> {
        self.inner.zoom.set_min_zoom(value, zoom_type)?;
        let min = self.inner.zoom.min_zoom();
        if self.is_initialized() && self.real_zoom() < min {
            self.real_zoom_to(min, true);
        }
        Ok(())
    }

    /// Sets the maximum zoom. If the current zoom is now too large, it is
    /// animated down to the new maximum.
    pub fn set_max_zoom(&mut self, value: f64, zoom_type: ZoomType) -> Result<(), ZoomConfigError> {
        self.inner.zoom.set_max_zoom(value, zoom_type)?;
        let max = self.inner.zoom.max_zoom();
        if self.is_initialized() && self.real_zoom() > max {
            self.real_zoom_to(max, true);
        }
        Ok(())
    }

    // Operations

    /// Applies `update` immediately. Returns `false` if the engine is not
    /// initialized.
    ///
    /// Zoom values in `update` are real zooms.
    pub fn apply_update(&mut self, update: &MatrixUpdate) -> bool {
        self.inner.apply_update(update)
    }

    /// Animates towards the targets of `update`, replacing any running
    /// animation. Returns `false` if the engine is not initialized.
    pub fn animate_update(&mut self, update: MatrixUpdate) -> bool {
        self.inner.animate_update(&mut self.state, update)
    }

    fn submit(&mut self, update: MatrixUpdate, animate: bool) {
        if animate {
            self.inner.animate_update(&mut self.state, update);
        } else {
            self.inner.apply_update(&update);
        }
    }

    /// Moves to the logical `zoom` with the content's top-left corner at the
    /// absolute pan `(x, y)`.
    pub fn move_to(&mut self, zoom: f64, x: f64, y: f64, animate: bool) {
        let update = MatrixUpdate::new()
            .with_zoom(ZoomChange::To(self.inner.zoom.to_real(zoom)), false)
            .with_pan(PanChange::AbsoluteTo(AbsolutePoint::new(x, y)), false);
        self.submit(update, animate);
    }

    /// Pans to the absolute position `(x, y)`.
    pub fn pan_to(&mut self, x: f64, y: f64, animate: bool) {
        let update =
            MatrixUpdate::new().with_pan(PanChange::AbsoluteTo(AbsolutePoint::new(x, y)), false);
        self.submit(update, animate);
    }

    /// Pans by `(dx, dy)` content units.
    pub fn pan_by(&mut self, dx: f64, dy: f64, animate: bool) {
        let update =
            MatrixUpdate::new().with_pan(PanChange::AbsoluteBy(AbsolutePoint::new(dx, dy)), false);
        self.submit(update, animate);
    }

    /// Zooms to the logical `zoom`, around the container center.
    pub fn zoom_to(&mut self, zoom: f64, animate: bool) {
        let real = self.inner.zoom.to_real(zoom);
        self.real_zoom_to(real, animate);
    }

    /// Multiplies the zoom by `factor`, around the container center.
    pub fn zoom_by(&mut self, factor: f64, animate: bool) {
        let update = MatrixUpdate::new().with_zoom(ZoomChange::By(factor), false);
        self.submit(update, animate);
    }

    /// Animated zoom by 1.3×.
    pub fn zoom_in(&mut self) {
        self.zoom_by(ZOOM_IN_FACTOR, true);
    }

    /// Animated zoom by 0.7×.
    pub fn zoom_out(&mut self) {
        self.zoom_by(ZOOM_OUT_FACTOR, true);
    }

    /// Zooms to the real zoom `real`, around the container center.
    pub fn real_zoom_to(&mut self, real: f64, animate: bool) {
        let update = MatrixUpdate::new().with_zoom(ZoomChange::To(real), false);
        self.submit(update, animate);
    }

    /// Stops a running animation or fling where it is. Returns `true` if
    /// there was one.
    ///
    /// A stopped fling goes idle on its next frame.
    pub fn cancel_animations(&mut self) -> bool {
        if self.state.is_flinging() {
            self.inner.fling.force_finished();
            return true;
        }
        if self.state.is_animating() {
            return self.state.make_idle(&mut self.inner);
        }
        false
    }

    // Input

    fn process_touch_event(&mut self, event: &TouchEvent) -> TouchResult {
        let mut hooks = GestureHooks {
            pinch: &mut self.pinch,
            scroll_fling: &mut self.scroll_fling,
            inner: &mut self.inner,
        };
        let result = self.state.process_touch_event(event, &mut hooks);
        log::trace!("{:?} -> {result:?}", event.action);
        result
    }

    /// Feeds an event seen on its way to the container's children. Returns
    /// `true` if the engine is taking the stream over.
    pub fn on_intercept_touch_event(&mut self, event: &TouchEvent) -> bool {
        self.process_touch_event(event) > TouchResult::Listen
    }

    /// Feeds an event delivered to the container. Returns `true` if the
    /// engine wants the rest of the stream.
    pub fn on_touch_event(&mut self, event: &TouchEvent) -> bool {
        self.process_touch_event(event) > TouchResult::NoInterest
    }

    /// Runs a task previously posted to the scheduler.
    pub fn run_frame(&mut self, task: FrameTask, now_ms: u64) {
        match task {
            FrameTask::Animation => self.inner.run_animation_frame(&mut self.state, now_ms),
            FrameTask::Fling => {
                self.inner.run_fling_frame(&mut self.state, now_ms);
                if !self.state.is_flinging() {
                    self.scroll_fling.set_long_press_enabled(true);
                }
            }
        }
    }

    // Queries

    /// Snapshot of the transform and sizes.
    pub fn transform(&self) -> TransformState {
        *self.inner.matrix.state()
    }

    /// Current gesture or animation owner.
    pub fn state(&self) -> ZoomState {
        self.state.state()
    }

    /// Both sizes are known.
    pub fn is_initialized(&self) -> bool {
        self.inner.matrix.state().is_initialized()
    }

    /// Logical zoom.
    pub fn zoom(&self) -> f64 {
        self.inner.zoom.to_logical(self.real_zoom())
    }

    /// Real zoom, the scale factor of the transform.
    pub fn real_zoom(&self) -> f64 {
        self.inner.matrix.state().real_zoom()
    }

    /// Real zoom that corresponds to a logical zoom of `1.0`.
    pub fn transformation_zoom(&self) -> f64 {
        self.inner.zoom.transformation_zoom()
    }

    /// Configured minimum zoom and its unit.
    pub fn min_zoom(&self) -> (f64, ZoomType) {
        self.inner.zoom.min_zoom_setting()
    }

    /// Configured maximum zoom and its unit.
    pub fn max_zoom(&self) -> (f64, ZoomType) {
        self.inner.zoom.max_zoom_setting()
    }

    /// Position of the content's top-left corner, in content units.
    pub fn pan(&self) -> AbsolutePoint {
        self.inner.matrix.state().pan()
    }

    /// Horizontal component of [`pan`](Self::pan).
    pub fn pan_x(&self) -> f64 {
        self.pan().x
    }

    /// Vertical component of [`pan`](Self::pan).
    pub fn pan_y(&self) -> f64 {
        self.pan().y
    }

    /// Position of the content's top-left corner, in container pixels.
    pub fn scaled_pan(&self) -> ScaledPoint {
        self.inner.matrix.state().scaled_pan()
    }

    /// The content-to-container transform.
    pub fn matrix(&self) -> Affine {
        self.inner.matrix.state().matrix()
    }

    /// Untransformed content size.
    pub fn content_size(&self) -> Size {
        self.inner.matrix.state().content_size()
    }

    /// Container size.
    pub fn container_size(&self) -> Size {
        self.inner.matrix.state().container_size()
    }

    /// Content bounds in container coordinates.
    pub fn content_scaled_rect(&self) -> Rect {
        self.inner.matrix.state().content_scaled_rect()
    }

    /// Horizontal scroll-bar offset.
    pub fn compute_horizontal_scroll_offset(&self) -> f64 {
        -self.scaled_pan().x
    }

    /// Vertical scroll-bar offset.
    pub fn compute_vertical_scroll_offset(&self) -> f64 {
        -self.scaled_pan().y
    }

    /// Horizontal scroll-bar range.
    pub fn compute_horizontal_scroll_range(&self) -> f64 {
        self.inner.matrix.state().content_scaled_size().width
    }

    /// Vertical scroll-bar range.
    pub fn compute_vertical_scroll_range(&self) -> f64 {
        self.inner.matrix.state().content_scaled_size().height
    }
}
