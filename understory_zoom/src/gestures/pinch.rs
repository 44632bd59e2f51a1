// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pinch-to-zoom.

use kurbo::Point;

use super::scale::{ScaleEvent, ScaleGestureRecognizer};
use super::settle_into_bounds;
use crate::engine::EngineInner;
use crate::event::TouchEvent;
use crate::point::{AbsolutePoint, ScaledPoint};
use crate::scheduler::Scheduler;
use crate::state::StateController;
use crate::update::{MatrixUpdate, PanChange, ZoomChange};

/// Zooms around the pinch focus and lets the focus drag the content.
///
/// The content point that was under the focus when the pinch started stays
/// under the focus for the whole gesture, even as the fingers move together.
#[derive(Clone, Debug, Default)]
pub(crate) struct PinchDetector {
    recognizer: ScaleGestureRecognizer,
    initial_focus: Option<AbsolutePoint>,
}

impl PinchDetector {
    /// Feeds `event` to the scale recognizer. The recognizer tracks every
    /// stream, so this always reports interest.
    pub(crate) fn maybe_start<S: Scheduler>(
        &mut self,
        event: &TouchEvent,
        state: &mut StateController,
        inner: &mut EngineInner<S>,
    ) -> bool {
        for scale_event in self.recognizer.process(event) {
            match scale_event {
                ScaleEvent::Begin => self.initial_focus = None,
                ScaleEvent::Scale { factor, focus } => {
                    if self.on_scale(factor, focus, state, inner) {
                        self.recognizer.accept_scale();
                    }
                }
                ScaleEvent::End => self.on_scale_end(state, inner),
            }
        }
        true
    }

    fn on_scale<S: Scheduler>(
        &mut self,
        factor: f64,
        focus: Point,
        state: &mut StateController,
        inner: &mut EngineInner<S>,
    ) -> bool {
        if !inner.zoom.zoom_enabled || !state.set_pinching(inner) {
            return false;
        }
        let transform = *inner.matrix.state();
        let zoom = transform.real_zoom();
        let under_focus =
            (ScaledPoint::new(focus.x, focus.y) - transform.scaled_pan()).to_absolute(zoom);
        let initial = *self.initial_focus.get_or_insert(under_focus);
        let update = MatrixUpdate::new()
            .with_zoom(ZoomChange::To(zoom * factor), true)
            .with_pan(PanChange::AbsoluteBy(under_focus - initial), true)
            .with_pivot(focus);
        inner.apply_update(&update);
        true
    }

    fn on_scale_end<S: Scheduler>(
        &mut self,
        state: &mut StateController,
        inner: &mut EngineInner<S>,
    ) {
        self.initial_focus = None;
        if state.is_pinching() {
            settle_into_bounds(state, inner);
        }
    }
}
