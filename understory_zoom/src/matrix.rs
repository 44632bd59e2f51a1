// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The authoritative transform and the machinery that mutates it.
//!
//! [`TransformState`] is the read side: the content-to-container affine map
//! plus the sizes it relates, and every quantity derived from them.
//! [`MatrixController`] is the write side: it applies [`MatrixUpdate`]s,
//! validating them against the pan and zoom managers, and steps animations.

use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Size, Vec2};

use crate::alignment::Axis;
use crate::animation::{DEFAULT_ANIMATION_DURATION_MS, MatrixAnimation};
use crate::pan::PanManager;
use crate::point::{AbsolutePoint, ScaledPoint};
use crate::update::{MatrixUpdate, PanChange, ZoomChange};
use crate::zoom::ZoomManager;

/// Snapshot of the content-to-container transform.
///
/// The transform is a uniform scale followed by a translation. Before both
/// the content and the container have a positive size the state is not
/// [initialized](Self::is_initialized) and derived values are defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformState {
    matrix: Affine,
    content: Size,
    container: Size,
    initialized: bool,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            matrix: Affine::IDENTITY,
            content: Size::ZERO,
            container: Size::ZERO,
            initialized: false,
        }
    }
}

impl TransformState {
    /// Builds a state directly from its parts.
    ///
    /// The state counts as initialized when both sizes are positive.
    #[must_use]
    pub fn from_parts(content: Size, container: Size, matrix: Affine) -> Self {
        Self {
            matrix,
            content,
            container,
            initialized: is_positive(content) && is_positive(container),
        }
    }

    /// The content-to-container affine map.
    #[must_use]
    pub fn matrix(&self) -> Affine {
        self.matrix
    }

    /// Both sizes are known and positive.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Untransformed content size.
    #[must_use]
    pub fn content_size(&self) -> Size {
        self.content
    }

    /// Container (viewport) size.
    #[must_use]
    pub fn container_size(&self) -> Size {
        self.container
    }

    /// The content rectangle mapped into container coordinates.
    #[must_use]
    pub fn content_scaled_rect(&self) -> Rect {
        self.matrix.transform_rect_bbox(self.content.to_rect())
    }

    /// Content size at the current zoom.
    #[must_use]
    pub fn content_scaled_size(&self) -> Size {
        self.content_scaled_rect().size()
    }

    /// The current scale factor of the transform.
    #[must_use]
    pub fn real_zoom(&self) -> f64 {
        self.matrix.as_coeffs()[0]
    }

    /// Position of the content's top-left corner in container pixels.
    #[must_use]
    pub fn scaled_pan(&self) -> ScaledPoint {
        let rect = self.content_scaled_rect();
        ScaledPoint::new(rect.x0, rect.y0)
    }

    /// [`scaled_pan`](Self::scaled_pan) in content units.
    #[must_use]
    pub fn pan(&self) -> AbsolutePoint {
        self.scaled_pan().to_absolute(self.real_zoom())
    }

    pub(crate) fn container_extent(&self, axis: Axis) -> f64 {
        axis.select(self.container.width, self.container.height)
    }

    pub(crate) fn content_scaled_extent(&self, axis: Axis) -> f64 {
        let size = self.content_scaled_size();
        axis.select(size.width, size.height)
    }

    pub(crate) fn scaled_pan_on(&self, axis: Axis) -> f64 {
        let pan = self.scaled_pan();
        axis.select(pan.x, pan.y)
    }

    pub(crate) fn container_center(&self) -> Point {
        Point::new(self.container.width * 0.5, self.container.height * 0.5)
    }
}

fn is_positive(size: Size) -> bool {
    size.width > 0.0 && size.height > 0.0
}

/// Outcome of a content or container size change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SizeChange {
    /// Real zoom before the change.
    pub(crate) previous_zoom: f64,
    /// The transform just became initialized, or a reset was forced.
    pub(crate) first_time: bool,
}

/// Result of stepping the running animations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct AnimationStep {
    /// At least one applied frame asked for notification.
    pub(crate) notify: bool,
    /// At least one animation ended and none is left running.
    pub(crate) drained: bool,
}

/// Owns the transform and applies updates to it.
#[derive(Debug)]
pub(crate) struct MatrixController {
    state: TransformState,
    animations: Vec<MatrixAnimation>,
    pub(crate) animation_duration_ms: u64,
}

impl Default for MatrixController {
    fn default() -> Self {
        Self {
            state: TransformState::default(),
            animations: Vec::new(),
            animation_duration_ms: DEFAULT_ANIMATION_DURATION_MS,
        }
    }
}

impl MatrixController {
    pub(crate) fn state(&self) -> &TransformState {
        &self.state
    }

    /// Drops sizes and transform, and stops all animations.
    pub(crate) fn clear(&mut self) {
        self.state = TransformState::default();
        self.animations.clear();
    }

    /// Sets the content size.
    ///
    /// Non-positive sizes are ignored. Returns the change to react to, if the
    /// size changed (or `force_reset` is set) and the transform is initialized.
    pub(crate) fn set_content_size(&mut self, size: Size, force_reset: bool) -> Option<SizeChange> {
        if !is_positive(size) {
            return None;
        }
        if size == self.state.content && !force_reset {
            return None;
        }
        let previous_zoom = self.state.real_zoom();
        self.state.content = size;
        self.on_size_changed(previous_zoom, force_reset)
    }

    /// Sets the container size. See [`set_content_size`](Self::set_content_size).
    pub(crate) fn set_container_size(
        &mut self,
        size: Size,
        force_reset: bool,
    ) -> Option<SizeChange> {
        if !is_positive(size) {
            return None;
        }
        if size == self.state.container && !force_reset {
            return None;
        }
        let previous_zoom = self.state.real_zoom();
        self.state.container = size;
        self.on_size_changed(previous_zoom, force_reset)
    }

    fn on_size_changed(&mut self, previous_zoom: f64, force_reset: bool) -> Option<SizeChange> {
        if !is_positive(self.state.content) || !is_positive(self.state.container) {
            return None;
        }
        log::debug!(
            "size changed: content {:?}, container {:?}",
            self.state.content,
            self.state.container
        );
        let first_time = !self.state.initialized || force_reset;
        self.state.initialized = true;
        Some(SizeChange {
            previous_zoom,
            first_time,
        })
    }

    fn ensure_pan(&mut self, pan: &PanManager, allow_over_pan: bool) {
        let fix = Vec2::new(
            pan.check_bounds(&self.state, Axis::Horizontal, allow_over_pan),
            pan.check_bounds(&self.state, Axis::Vertical, allow_over_pan),
        );
        if fix != Vec2::ZERO {
            self.state.matrix = self.state.matrix.then_translate(fix);
        }
    }

    /// Resolves the real zoom `change` would lead to, clamped to bounds.
    pub(crate) fn resolve_zoom(
        &self,
        change: ZoomChange,
        can_over_zoom: bool,
        zoom: &ZoomManager,
    ) -> f64 {
        let target = match change {
            ZoomChange::To(value) => value,
            ZoomChange::By(factor) => self.state.real_zoom() * factor,
        };
        zoom.check_bounds(&self.state, target, can_over_zoom)
    }

    /// Applies `update` immediately.
    ///
    /// Returns `false` without touching anything if the transform is not
    /// initialized. The pan is applied first, then the zoom around the pivot,
    /// and finally the pan is corrected into bounds.
    ///
    /// Without an explicit pivot, a zoom that comes with a pan scales around
    /// the container origin, which leaves the absolute pan where the update
    /// put it.
    pub(crate) fn apply_update(
        &mut self,
        update: &MatrixUpdate,
        zoom: &ZoomManager,
        pan: &PanManager,
    ) -> bool {
        if !self.state.initialized {
            return false;
        }

        if let Some(change) = update.pan {
            // Absolute pans act in content space, before the current scale.
            // Scaled pans act in container space, after it.
            self.state.matrix = match change {
                PanChange::AbsoluteBy(delta) => self.state.matrix.pre_translate(delta.to_vec2()),
                PanChange::AbsoluteTo(target) => self
                    .state
                    .matrix
                    .pre_translate((target - self.state.pan()).to_vec2()),
                PanChange::ScaledBy(delta) => self.state.matrix.then_translate(delta.to_vec2()),
                PanChange::ScaledTo(target) => self
                    .state
                    .matrix
                    .then_translate((target - self.state.scaled_pan()).to_vec2()),
            };
        }

        if let Some(change) = update.zoom {
            let target = self.resolve_zoom(change, update.can_over_zoom, zoom);
            let current = self.state.real_zoom();
            if target > 0.0 && target.is_finite() && current > 0.0 {
                let pivot = update.pivot.unwrap_or(if update.pan.is_some() {
                    Point::ZERO
                } else {
                    self.state.container_center()
                });
                self.state.matrix = self.state.matrix.then_scale_about(target / current, pivot);
            } else {
                log::warn!("skipping zoom to {target} from {current}");
            }
        }

        self.ensure_pan(pan, update.can_over_pan);
        true
    }

    /// Queues an animation towards `update`'s targets.
    ///
    /// Returns `false` if the transform is not initialized.
    pub(crate) fn start_animation(&mut self, update: MatrixUpdate, zoom: &ZoomManager) -> bool {
        if !self.state.initialized {
            return false;
        }
        let target_zoom = update
            .zoom
            .map(|change| self.resolve_zoom(change, update.can_over_zoom, zoom));
        self.animations.push(MatrixAnimation::new(
            update,
            self.animation_duration_ms,
            self.state.real_zoom(),
            target_zoom,
            self.state.pan(),
            self.state.scaled_pan(),
        ));
        true
    }

    pub(crate) fn has_animations(&self) -> bool {
        !self.animations.is_empty()
    }

    /// Applies one frame of every running animation at `now_ms`.
    pub(crate) fn step_animations(
        &mut self,
        now_ms: u64,
        zoom: &ZoomManager,
        pan: &PanManager,
    ) -> AnimationStep {
        let mut step = AnimationStep::default();
        let mut animations = core::mem::take(&mut self.animations);
        let mut ended = false;
        animations.retain_mut(|animation| {
            let (update, finished) = animation.frame(now_ms);
            if self.apply_update(&update, zoom, pan) && update.notify {
                step.notify = true;
            }
            ended |= finished;
            !finished
        });
        self.animations = animations;
        step.drained = ended && self.animations.is_empty();
        step
    }

    /// Stops every running animation where it is. Returns how many were
    /// stopped.
    pub(crate) fn cancel_animations(&mut self) -> usize {
        let count = self.animations.len();
        self.animations.clear();
        count
    }

    /// Replaces the transform, for "what if" queries that are reverted.
    pub(crate) fn replace_matrix(&mut self, matrix: Affine) -> Affine {
        core::mem::replace(&mut self.state.matrix, matrix)
    }
}
