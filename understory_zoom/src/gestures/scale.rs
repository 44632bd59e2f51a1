// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-finger scale recognition.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;
use smallvec::SmallVec;

use super::{MIN_SPAN, SPAN_SLOP};
use crate::event::{TouchAction, TouchEvent};

/// What the recognizer saw in one event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ScaleEvent {
    /// A scale gesture started.
    Begin,
    /// The span changed by `factor` since the last accepted scale.
    Scale { factor: f64, focus: Point },
    /// The scale gesture ended.
    End,
}

/// Distance between pointers as the diameter of their average deviation from
/// the focus.
fn span(event: &TouchEvent, focus: Point) -> f64 {
    let mut dev_x = 0.0;
    let mut dev_y = 0.0;
    let mut count = 0_u32;
    for pointer in event.active_pointers() {
        dev_x += (pointer.position.x - focus.x).abs();
        dev_y += (pointer.position.y - focus.y).abs();
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    let count = f64::from(count);
    (dev_x / count * 2.0).hypot(dev_y / count * 2.0)
}

/// Tracks the span of a multi-pointer stream.
///
/// Factors are reported relative to the last *accepted* span: a consumer that
/// rejects a [`ScaleEvent::Scale`] keeps accumulating the change until it
/// calls [`accept_scale`](Self::accept_scale).
#[derive(Clone, Debug, Default)]
pub(crate) struct ScaleGestureRecognizer {
    in_progress: bool,
    initial_span: f64,
    previous_span: f64,
    current_span: f64,
}

impl ScaleGestureRecognizer {
    pub(crate) fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    /// Marks the latest reported factor as consumed.
    pub(crate) fn accept_scale(&mut self) {
        self.previous_span = self.current_span;
    }

    pub(crate) fn process(&mut self, event: &TouchEvent) -> SmallVec<[ScaleEvent; 2]> {
        let mut out = SmallVec::new();
        let stream_end = event.is_stream_end();
        if event.action == TouchAction::Down || stream_end {
            if self.in_progress {
                out.push(ScaleEvent::End);
                self.in_progress = false;
                self.initial_span = 0.0;
            }
            if stream_end {
                return out;
            }
        }

        let Some(focus) = event.focus() else {
            return out;
        };
        let config_changed = matches!(
            event.action,
            TouchAction::Down | TouchAction::PointerDown(_) | TouchAction::PointerUp(_)
        );
        let span = span(event, focus);
        let was_in_progress = self.in_progress;

        if self.in_progress && (span < MIN_SPAN || config_changed) {
            out.push(ScaleEvent::End);
            self.in_progress = false;
            self.initial_span = span;
        }
        if config_changed {
            self.initial_span = span;
            self.previous_span = span;
            self.current_span = span;
        }

        let beyond_slop = was_in_progress || (span - self.initial_span).abs() > SPAN_SLOP;
        if !self.in_progress && event.active_count() >= 2 && span >= MIN_SPAN && beyond_slop {
            self.previous_span = span;
            self.current_span = span;
            self.in_progress = true;
            out.push(ScaleEvent::Begin);
        }

        if event.action == TouchAction::Move {
            self.current_span = span;
            if self.in_progress && self.previous_span > 0.0 {
                out.push(ScaleEvent::Scale {
                    factor: self.current_span / self.previous_span,
                    focus,
                });
            }
        }
        out
    }
}
