// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag-to-pan and fling.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Vec2;

use super::scroll::{ScrollEvent, ScrollGestureRecognizer};
use super::settle_into_bounds;
use crate::alignment::Axis;
use crate::engine::EngineInner;
use crate::event::TouchEvent;
use crate::fling::FlingAxis;
use crate::point::ScaledPoint;
use crate::scheduler::Scheduler;
use crate::state::StateController;
use crate::update::{MatrixUpdate, PanChange};

/// Largest share of a drag that survives inside the over-pan area.
const OVER_SCROLL_FRICTION: f64 = 0.6;

bitflags::bitflags! {
    /// Pointer counts that are allowed to drive a scroll.
    ///
    /// Streams with more than three pointers are never filtered.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ScrollFingers: u8 {
        /// Single-finger drags.
        const ONE   = 0b0000_0001;
        /// Two-finger drags.
        const TWO   = 0b0000_0010;
        /// Three-finger drags.
        const THREE = 0b0000_0100;
    }
}

impl Default for ScrollFingers {
    fn default() -> Self {
        Self::all()
    }
}

impl ScrollFingers {
    /// Whether a drag with `pointer_count` pointers may scroll.
    #[must_use]
    pub fn allows(self, pointer_count: usize) -> bool {
        match pointer_count {
            1 => self.contains(Self::ONE),
            2 => self.contains(Self::TWO),
            3 => self.contains(Self::THREE),
            _ => true,
        }
    }
}

/// Scales a drag `delta` that pushes further into an existing over-pan
/// `fix`, so that the content resists more the further out it is.
fn over_scroll_friction(delta: f64, fix: f64, max_over_pan: f64) -> f64 {
    let pushing_out = (fix < 0.0 && delta > 0.0) || (fix > 0.0 && delta < 0.0);
    if !pushing_out {
        return delta;
    }
    if max_over_pan <= 0.0 {
        return 0.0;
    }
    let ratio = (fix.abs() / max_over_pan).min(1.0);
    delta * OVER_SCROLL_FRICTION * (1.0 - ratio.powf(0.4))
}

/// Pans with the finger and flings on a fast release.
#[derive(Clone, Debug)]
pub(crate) struct ScrollFlingDetector {
    recognizer: ScrollGestureRecognizer,
    pub(crate) scroll_enabled: bool,
    pub(crate) fingers: ScrollFingers,
    pub(crate) fling_enabled: bool,
    pub(crate) fling_in_over_pan_enabled: bool,
}

impl Default for ScrollFlingDetector {
    fn default() -> Self {
        Self {
            recognizer: ScrollGestureRecognizer::default(),
            scroll_enabled: true,
            fingers: ScrollFingers::default(),
            fling_enabled: true,
            fling_in_over_pan_enabled: false,
        }
    }
}

impl ScrollFlingDetector {
    pub(crate) fn set_long_press_enabled(&mut self, enabled: bool) {
        self.recognizer.long_press_enabled = enabled;
    }

    pub(crate) fn maybe_start<S: Scheduler>(
        &mut self,
        event: &TouchEvent,
        state: &mut StateController,
        inner: &mut EngineInner<S>,
    ) -> bool {
        match self.recognizer.process(event) {
            Some(ScrollEvent::Down) => true,
            Some(ScrollEvent::Scroll {
                distance,
                pointer_count,
            }) => self.on_scroll(distance, pointer_count, state, inner),
            Some(ScrollEvent::Fling { velocity }) => self.on_fling(velocity, state, inner),
            Some(ScrollEvent::LongPress) | None => false,
        }
    }

    /// The scroll's pointers went up: bring an over-panned transform back.
    pub(crate) fn cancel_scroll<S: Scheduler>(
        &mut self,
        state: &mut StateController,
        inner: &mut EngineInner<S>,
    ) {
        settle_into_bounds(state, inner);
    }

    fn on_scroll<S: Scheduler>(
        &mut self,
        distance: Vec2,
        pointer_count: usize,
        state: &mut StateController,
        inner: &mut EngineInner<S>,
    ) -> bool {
        if !self.scroll_enabled
            || !self.fingers.allows(pointer_count)
            || !inner.pan.is_pan_enabled()
        {
            return false;
        }
        if !state.set_scrolling(inner) {
            return false;
        }

        let transform = *inner.matrix.state();
        let fix = inner.pan.correction(&transform);
        let mut delta = ScaledPoint::new(-distance.x, -distance.y);
        delta.x = over_scroll_friction(
            delta.x,
            fix.x,
            inner.pan.max_over_pan(&transform, Axis::Horizontal),
        );
        delta.y = over_scroll_friction(
            delta.y,
            fix.y,
            inner.pan.max_over_pan(&transform, Axis::Vertical),
        );
        if !inner.pan.horizontal_pan_enabled {
            delta.x = 0.0;
        }
        if !inner.pan.vertical_pan_enabled {
            delta.y = 0.0;
        }
        if !delta.is_zero() {
            inner.apply_update(&MatrixUpdate::new().with_pan(PanChange::ScaledBy(delta), true));
        }
        true
    }

    fn on_fling<S: Scheduler>(
        &mut self,
        velocity: Vec2,
        state: &mut StateController,
        inner: &mut EngineInner<S>,
    ) -> bool {
        if !self.fling_enabled || !inner.pan.is_pan_enabled() {
            return false;
        }
        let velocity = Vec2::new(
            if inner.pan.horizontal_pan_enabled { velocity.x } else { 0.0 },
            if inner.pan.vertical_pan_enabled { velocity.y } else { 0.0 },
        );

        let transform = *inner.matrix.state();
        let x = inner.pan.compute_status(&transform, Axis::Horizontal);
        let y = inner.pan.compute_status(&transform, Axis::Vertical);
        if (x.is_in_over_pan || y.is_in_over_pan) && !self.fling_in_over_pan_enabled {
            return false;
        }
        if x.min >= x.max && y.min >= y.max && !inner.pan.is_over_pan_enabled() {
            return false;
        }
        if !state.set_flinging(inner) {
            return false;
        }

        let over = |axis: Axis| {
            if inner.pan.is_over_pan_enabled_on(axis) {
                inner.pan.max_over_pan(&transform, axis)
            } else {
                0.0
            }
        };
        let x = FlingAxis {
            start: x.current,
            velocity: velocity.x,
            min: x.min,
            max: x.max,
            over: over(Axis::Horizontal),
        };
        let y = FlingAxis {
            start: y.current,
            velocity: velocity.y,
            min: y.min,
            max: y.max,
            over: over(Axis::Vertical),
        };
        log::debug!("fling: velocity {velocity:?}, x {x:?}, y {y:?}");
        self.set_long_press_enabled(false);
        inner.start_fling(x, y);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{ScrollFingers, over_scroll_friction};

    #[test]
    fn finger_filter() {
        let fingers = ScrollFingers::ONE | ScrollFingers::THREE;
        assert!(fingers.allows(1));
        assert!(!fingers.allows(2));
        assert!(fingers.allows(3));
        assert!(fingers.allows(5));
        assert!(ScrollFingers::default().allows(2));
    }

    #[test]
    fn friction_only_resists_pushing_further_out() {
        // Pulling back in is never damped.
        assert_eq!(over_scroll_friction(-10.0, -20.0, 50.0), -10.0);
        assert_eq!(over_scroll_friction(10.0, 0.0, 50.0), 10.0);
        // At the very edge of the legal range, the friction factor is 0.6.
        assert!((over_scroll_friction(10.0, -1e-12, 50.0) - 6.0).abs() < 1e-3);
        // Deeper in the over-pan, more resistance.
        let shallow = over_scroll_friction(10.0, -5.0, 50.0);
        let deep = over_scroll_friction(10.0, -40.0, 50.0);
        assert!(deep < shallow && deep > 0.0);
        // Fully stretched: no more movement.
        assert_eq!(over_scroll_friction(-10.0, 50.0, 50.0), 0.0);
        assert_eq!(over_scroll_friction(10.0, -5.0, 0.0), 0.0);
    }
}
