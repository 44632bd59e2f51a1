// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch gesture recognition and the detectors that turn gestures into
//! transform updates.
//!
//! Recognizers ([`scale`], [`scroll`]) only look at [`TouchEvent`](crate::TouchEvent)s
//! and report what they saw. Detectors ([`pinch`], [`scroll_fling`]) own a
//! recognizer each and translate its output into state transitions and
//! [`MatrixUpdate`]s against the engine.

use kurbo::Point;

use crate::alignment::Axis;
use crate::engine::EngineInner;
use crate::matrix::TransformState;
use crate::point::ScaledPoint;
use crate::scheduler::Scheduler;
use crate::state::StateController;
use crate::update::{MatrixUpdate, PanChange, ZoomChange};

pub(crate) mod pinch;
pub(crate) mod scale;
pub(crate) mod scroll;
pub(crate) mod scroll_fling;

/// Distance a pointer must travel before a scroll starts, in container pixels.
pub(crate) const TOUCH_SLOP: f64 = 8.0;

/// Span change needed before a pinch starts.
pub(crate) const SPAN_SLOP: f64 = TOUCH_SLOP * 2.0;

/// Smallest span between pointers that is treated as a pinch.
pub(crate) const MIN_SPAN: f64 = 27.0;

/// Slowest release that still counts as a fling, in px/s.
pub(crate) const MIN_FLING_VELOCITY: f64 = 50.0;

/// Fastest fling, in px/s.
pub(crate) const MAX_FLING_VELOCITY: f64 = 8000.0;

/// How long a pointer has to rest before the stream becomes a long press.
pub(crate) const LONG_PRESS_TIMEOUT_MS: u64 = 500;

/// Where to pivot a corrective zoom.
///
/// Below the fitted size the content shrinks or grows around its own center.
/// Above it, each axis pivots on the container edge the content has to move
/// away from, so the visible area near that edge stays put.
fn settle_pivot(transform: &TransformState, fix: ScaledPoint, logical_zoom: f64) -> Point {
    if logical_zoom <= 1.0 {
        return transform.content_scaled_rect().center();
    }
    let pick = |axis: Axis, fix: f64| {
        let extent = transform.container_extent(axis);
        if fix > 0.0 {
            extent
        } else if fix < 0.0 {
            0.0
        } else {
            extent * 0.5
        }
    };
    Point::new(pick(Axis::Horizontal, fix.x), pick(Axis::Vertical, fix.y))
}

/// Animates the transform back into its strict bounds after a gesture, or
/// goes idle if it already is in bounds.
pub(crate) fn settle_into_bounds<S: Scheduler>(
    state: &mut StateController,
    inner: &mut EngineInner<S>,
) {
    if !inner.zoom.over_zoom_enabled && !inner.pan.is_over_pan_enabled() {
        state.make_idle(inner);
        return;
    }

    let transform = *inner.matrix.state();
    let real_zoom = transform.real_zoom();
    let target_zoom = inner.zoom.check_bounds(&transform, real_zoom, false);
    let mut fix = inner.pan.correction(&transform);
    if target_zoom == real_zoom && fix.is_zero() {
        state.make_idle(inner);
        return;
    }

    let pivot = settle_pivot(&transform, fix, inner.zoom.to_logical(real_zoom));
    let mut target_pan = transform.pan() + fix.to_absolute(real_zoom);
    if target_zoom != real_zoom {
        // Zooming moves the content, so the pan correction has to be measured
        // on the zoomed transform.
        let previous = transform.matrix();
        let mut simulate = MatrixUpdate::new()
            .with_zoom(ZoomChange::To(target_zoom), true)
            .with_pivot(pivot)
            .with_notify(false);
        simulate.can_over_pan = true;
        inner.matrix.apply_update(&simulate, &inner.zoom, &inner.pan);
        let zoomed = *inner.matrix.state();
        fix = inner.pan.correction(&zoomed);
        target_pan = zoomed.pan() + fix.to_absolute(zoomed.real_zoom());
        inner.matrix.replace_matrix(previous);
    }

    log::debug!("settling: zoom {real_zoom} -> {target_zoom}, pan fix {fix:?}");
    let update = MatrixUpdate::new().with_zoom(ZoomChange::To(target_zoom), true);
    let update = if fix.is_zero() {
        update.with_pivot(pivot)
    } else {
        // The pivot already shaped `target_pan`. Zooming around the origin
        // keeps every frame's absolute pan, so the last frame lands on it.
        update.with_pan(PanChange::AbsoluteTo(target_pan), true)
    };
    inner.animate_update(state, update);
}
