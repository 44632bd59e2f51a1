// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll, fling and long-press recognition.

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Vec2};

use super::{LONG_PRESS_TIMEOUT_MS, MAX_FLING_VELOCITY, MIN_FLING_VELOCITY, TOUCH_SLOP};
use crate::event::{TouchAction, TouchEvent};

/// Samples older than this, relative to the newest, are ignored.
const VELOCITY_HORIZON_MS: u64 = 100;

/// Upper bound on retained samples.
const VELOCITY_SAMPLES: usize = 20;

/// Estimates pointer velocity with a least-squares line over recent samples.
#[derive(Clone, Debug, Default)]
pub(crate) struct VelocityTracker {
    samples: Vec<(u64, Point)>,
}

impl VelocityTracker {
    pub(crate) fn clear(&mut self) {
        self.samples.clear();
    }

    pub(crate) fn add(&mut self, time_ms: u64, position: Point) {
        if self.samples.len() == VELOCITY_SAMPLES {
            self.samples.remove(0);
        }
        self.samples.push((time_ms, position));
    }

    /// Velocity in px/s, or zero with fewer than two usable samples.
    pub(crate) fn velocity(&self) -> Vec2 {
        let Some(&(newest, _)) = self.samples.last() else {
            return Vec2::ZERO;
        };
        let window = self
            .samples
            .iter()
            .filter(|(time, _)| newest.saturating_sub(*time) <= VELOCITY_HORIZON_MS);
        let mut n = 0.0;
        let mut sum_t = 0.0;
        let mut sum = Vec2::ZERO;
        for (time, position) in window.clone() {
            let t = -(newest.saturating_sub(*time) as f64) / 1000.0;
            n += 1.0;
            sum_t += t;
            sum += position.to_vec2();
        }
        if n < 2.0 {
            return Vec2::ZERO;
        }
        let mean_t = sum_t / n;
        let mean = sum / n;
        let mut var_t = 0.0;
        let mut cov = Vec2::ZERO;
        for (time, position) in window {
            let dt = -(newest.saturating_sub(*time) as f64) / 1000.0 - mean_t;
            var_t += dt * dt;
            cov += (position.to_vec2() - mean) * dt;
        }
        if var_t <= 0.0 {
            return Vec2::ZERO;
        }
        cov / var_t
    }
}

/// What the recognizer saw in one event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ScrollEvent {
    /// The first pointer went down.
    Down,
    /// The focus moved by `-distance` since the last scroll.
    Scroll { distance: Vec2, pointer_count: usize },
    /// The stream ended with a fast release.
    Fling { velocity: Vec2 },
    /// The pointer rested in place long enough. The rest of the stream is
    /// ignored.
    LongPress,
}

/// Turns a touch stream into scrolls and flings.
///
/// Long presses are detected when the next event arrives, not on a timer.
#[derive(Clone, Debug)]
pub(crate) struct ScrollGestureRecognizer {
    velocity: VelocityTracker,
    down_focus: Point,
    last_focus: Point,
    down_time_ms: u64,
    still_down: bool,
    always_in_tap_region: bool,
    in_long_press: bool,
    pub(crate) long_press_enabled: bool,
}

impl Default for ScrollGestureRecognizer {
    fn default() -> Self {
        Self {
            velocity: VelocityTracker::default(),
            down_focus: Point::ZERO,
            last_focus: Point::ZERO,
            down_time_ms: 0,
            still_down: false,
            always_in_tap_region: false,
            in_long_press: false,
            long_press_enabled: true,
        }
    }
}

impl ScrollGestureRecognizer {
    fn reset(&mut self) {
        self.velocity.clear();
        self.still_down = false;
        self.always_in_tap_region = false;
        self.in_long_press = false;
    }

    fn check_long_press(&mut self, now_ms: u64) -> bool {
        if self.long_press_enabled
            && self.still_down
            && self.always_in_tap_region
            && !self.in_long_press
            && now_ms.saturating_sub(self.down_time_ms) >= LONG_PRESS_TIMEOUT_MS
        {
            log::trace!("long press at {:?}", self.down_focus);
            self.in_long_press = true;
            return true;
        }
        false
    }

    pub(crate) fn process(&mut self, event: &TouchEvent) -> Option<ScrollEvent> {
        let Some(focus) = event.focus() else {
            if event.is_stream_end() {
                self.reset();
            }
            return None;
        };
        let now = event.time_ms;
        match event.action {
            TouchAction::Down => {
                self.reset();
                self.velocity.add(now, focus);
                self.down_focus = focus;
                self.last_focus = focus;
                self.down_time_ms = now;
                self.still_down = true;
                self.always_in_tap_region = true;
                Some(ScrollEvent::Down)
            }
            TouchAction::PointerDown(_) | TouchAction::PointerUp(_) => {
                // The focus jumps when the pointer set changes.
                self.down_focus = focus;
                self.last_focus = focus;
                self.velocity.clear();
                self.velocity.add(now, focus);
                None
            }
            TouchAction::Move => {
                if self.check_long_press(now) {
                    return Some(ScrollEvent::LongPress);
                }
                if self.in_long_press || !self.still_down {
                    return None;
                }
                self.velocity.add(now, focus);
                let distance = self.last_focus - focus;
                let moved = if self.always_in_tap_region {
                    let beyond = (focus - self.down_focus).hypot() > TOUCH_SLOP;
                    self.always_in_tap_region = !beyond;
                    beyond
                } else {
                    distance.x.abs() >= 1.0 || distance.y.abs() >= 1.0
                };
                if !moved {
                    return None;
                }
                self.last_focus = focus;
                Some(ScrollEvent::Scroll {
                    distance,
                    pointer_count: event.active_count(),
                })
            }
            TouchAction::Up => {
                let result = if self.check_long_press(now) {
                    Some(ScrollEvent::LongPress)
                } else if self.in_long_press || self.always_in_tap_region || !self.still_down {
                    None
                } else {
                    self.velocity.add(now, focus);
                    let v = self.velocity.velocity();
                    let v = Vec2::new(
                        v.x.clamp(-MAX_FLING_VELOCITY, MAX_FLING_VELOCITY),
                        v.y.clamp(-MAX_FLING_VELOCITY, MAX_FLING_VELOCITY),
                    );
                    (v.x.abs() > MIN_FLING_VELOCITY || v.y.abs() > MIN_FLING_VELOCITY)
                        .then_some(ScrollEvent::Fling { velocity: v })
                };
                self.reset();
                result
            }
            TouchAction::Cancel => {
                self.reset();
                None
            }
        }
    }
}
