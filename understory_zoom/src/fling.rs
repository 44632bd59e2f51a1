// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ballistic fling simulation with an over-scroll cushion.
//!
//! Each axis is simulated independently in three phases:
//!
//! 1. A ballistic glide along an exponential deceleration curve.
//! 2. If the glide crosses a bound, a constant deceleration that stops the
//!    motion within the over-scroll distance.
//! 3. A spring back to the bound that was crossed.
//!
//! Content that starts a fling outside its bounds skips straight to the
//! spring back. The reported position never leaves
//! `[min - over, max + over]`.
//!
//! ```
//! use understory_zoom::{FlingAxis, FlingScroller};
//!
//! let mut scroller = FlingScroller::default();
//! scroller.fling(
//!     FlingAxis { start: -50.0, velocity: 3000.0, min: -200.0, max: 0.0, over: 40.0 },
//!     FlingAxis::at_rest(0.0),
//! );
//! let mut now = 0;
//! while scroller.compute_scroll_offset(now) {
//!     assert!((-240.0..=40.0).contains(&scroller.current().x));
//!     now += 16;
//! }
//! assert!(scroller.is_finished());
//! assert_eq!(scroller.current().x, 0.0);
//! ```

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;

// Deceleration curve constants from Chromium's fling curve.
const ALPHA: f64 = -5707.62;
const BETA: f64 = 172.0;
const GAMMA: f64 = 3.7;

/// Minimum deceleration inside the over-scroll cushion, in px/s².
const GRAVITY: f64 = 2000.0;

fn curve_position(t: f64) -> f64 {
    ALPHA * (-GAMMA * t).exp() - BETA * t - ALPHA
}

fn curve_velocity(t: f64) -> f64 {
    -ALPHA * GAMMA * (-GAMMA * t).exp() - BETA
}

fn curve_time_at_velocity(v: f64) -> f64 {
    -((v + BETA) / (-ALPHA * GAMMA)).ln() / GAMMA
}

/// Fastest velocity the curve can represent.
fn max_velocity() -> f64 {
    curve_velocity(0.0)
}

fn smoothstep(u: f64) -> f64 {
    u * u * (3.0 - 2.0 * u)
}

/// Fling parameters for one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlingAxis {
    /// Starting position.
    pub start: f64,
    /// Initial velocity, in units per second.
    pub velocity: f64,
    /// Smallest resting position.
    pub min: f64,
    /// Largest resting position.
    pub max: f64,
    /// How far past `min` or `max` the motion may travel before springing back.
    pub over: f64,
}

impl FlingAxis {
    /// An axis that does not move.
    #[must_use]
    pub fn at_rest(position: f64) -> Self {
        Self {
            start: position,
            velocity: 0.0,
            min: position,
            max: position,
            over: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Glide {
    direction: f64,
    curve_offset: f64,
    position_offset: f64,
    duration: f64,
}

impl Glide {
    fn new(velocity: f64) -> Self {
        let speed = velocity.abs().min(max_velocity());
        if speed <= 0.0 {
            return Self::default();
        }
        let curve_offset = curve_time_at_velocity(speed);
        Self {
            direction: velocity.signum(),
            curve_offset,
            position_offset: curve_position(curve_offset),
            duration: curve_time_at_velocity(0.0) - curve_offset,
        }
    }

    fn displacement(&self, t: f64) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        let t = t.clamp(0.0, self.duration);
        self.direction * (curve_position(self.curve_offset + t) - self.position_offset)
    }

    fn velocity(&self, t: f64) -> f64 {
        self.direction * curve_velocity(self.curve_offset + t)
    }

    /// Time at which `|displacement|` first reaches `distance`, if it does.
    fn time_to_travel(&self, distance: f64) -> Option<f64> {
        if self.displacement(self.duration).abs() < distance {
            return None;
        }
        let (mut lo, mut hi) = (0.0, self.duration);
        for _ in 0..64 {
            let mid = 0.5 * (lo + hi);
            if self.displacement(mid).abs() < distance {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Some(hi)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Cushion {
    edge: f64,
    velocity: f64,
    deceleration: f64,
    duration: f64,
}

impl Cushion {
    fn position(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, self.duration);
        self.edge + self.velocity * t - self.velocity.signum() * 0.5 * self.deceleration * t * t
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Spring {
    from: f64,
    to: f64,
    duration: f64,
}

impl Spring {
    fn new(from: f64, to: f64) -> Self {
        Self {
            from,
            to,
            duration: (2.0 * (to - from).abs() / GRAVITY).sqrt(),
        }
    }

    fn position(&self, t: f64) -> f64 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let u = (t / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * smoothstep(u)
    }
}

/// Planned motion of one axis, in seconds since the fling started.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct AxisMotion {
    start: f64,
    low: f64,
    high: f64,
    glide: Glide,
    glide_duration: f64,
    cushion: Option<Cushion>,
    spring: Option<Spring>,
    final_position: f64,
}

impl AxisMotion {
    fn plan(axis: FlingAxis) -> Self {
        let over = axis.over.max(0.0);
        let (min, max) = if axis.min <= axis.max {
            (axis.min, axis.max)
        } else {
            (axis.max, axis.min)
        };
        let mut motion = Self {
            start: axis.start,
            low: min - over,
            high: max + over,
            final_position: axis.start.clamp(min, max),
            ..Self::default()
        };

        if axis.start < min || axis.start > max {
            motion.spring = Some(Spring::new(axis.start, motion.final_position));
            return motion;
        }

        let glide = Glide::new(axis.velocity);
        motion.glide = glide;
        let edge = if glide.direction > 0.0 { max } else { min };
        let Some(t_edge) = glide
            .time_to_travel((edge - axis.start).abs())
            .filter(|_| glide.direction != 0.0)
        else {
            motion.glide_duration = glide.duration;
            motion.final_position =
                (axis.start + glide.displacement(glide.duration)).clamp(min, max);
            return motion;
        };

        motion.glide_duration = t_edge;
        motion.final_position = edge;
        let velocity = glide.velocity(t_edge);
        if over <= 0.0 || velocity == 0.0 {
            return motion;
        }
        let deceleration = GRAVITY.max(velocity * velocity / (2.0 * over));
        let cushion = Cushion {
            edge,
            velocity,
            deceleration,
            duration: velocity.abs() / deceleration,
        };
        motion.spring = Some(Spring::new(cushion.position(cushion.duration), edge));
        motion.cushion = Some(cushion);
        motion
    }

    fn duration(&self) -> f64 {
        self.glide_duration
            + self.cushion.map_or(0.0, |c| c.duration)
            + self.spring.map_or(0.0, |s| s.duration)
    }

    fn position(&self, t: f64) -> f64 {
        let raw = if t < self.glide_duration {
            self.start + self.glide.displacement(t)
        } else {
            let mut t = t - self.glide_duration;
            let mut position = self.final_position;
            if let Some(cushion) = self.cushion {
                if t < cushion.duration {
                    return cushion.position(t).clamp(self.low, self.high);
                }
                t -= cushion.duration;
            }
            if let Some(spring) = self.spring {
                position = spring.position(t);
            }
            position
        };
        raw.clamp(self.low, self.high)
    }
}

/// Two-axis fling simulator.
///
/// The clock starts on the first [`compute_scroll_offset`](Self::compute_scroll_offset)
/// call after [`fling`](Self::fling).
#[derive(Clone, Debug)]
pub struct FlingScroller {
    x: AxisMotion,
    y: AxisMotion,
    start_ms: Option<u64>,
    current: Point,
    finished: bool,
}

impl Default for FlingScroller {
    fn default() -> Self {
        Self {
            x: AxisMotion::default(),
            y: AxisMotion::default(),
            start_ms: None,
            current: Point::ZERO,
            finished: true,
        }
    }
}

impl FlingScroller {
    /// Starts a new fling, replacing any previous one.
    pub fn fling(&mut self, x: FlingAxis, y: FlingAxis) {
        self.x = AxisMotion::plan(x);
        self.y = AxisMotion::plan(y);
        self.start_ms = None;
        self.current = Point::new(x.start, y.start);
        self.finished = false;
    }

    /// Advances the simulation to `now_ms`.
    ///
    /// Returns `false` if the fling had already finished, in which case the
    /// current position is left untouched. The step that reaches the end
    /// returns `true` and marks the scroller finished.
    pub fn compute_scroll_offset(&mut self, now_ms: u64) -> bool {
        if self.finished {
            return false;
        }
        let start = *self.start_ms.get_or_insert(now_ms);
        let t = now_ms.saturating_sub(start) as f64 / 1000.0;
        self.current = Point::new(self.x.position(t), self.y.position(t));
        if t >= self.x.duration().max(self.y.duration()) {
            self.finished = true;
        }
        true
    }

    /// Most recently computed position.
    #[must_use]
    pub fn current(&self) -> Point {
        self.current
    }

    /// Where the fling will come to rest.
    #[must_use]
    pub fn final_position(&self) -> Point {
        Point::new(self.x.final_position, self.y.final_position)
    }

    /// Returns `true` once the fling has ended or was stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stops the fling where it is.
    pub fn force_finished(&mut self) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::{FlingAxis, FlingScroller, curve_velocity, max_velocity};

    fn run(scroller: &mut FlingScroller) -> (f64, f64, u64) {
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        let mut now = 0;
        while scroller.compute_scroll_offset(now) {
            lo = lo.min(scroller.current().x);
            hi = hi.max(scroller.current().x);
            now += 16;
            assert!(now < 60_000, "fling never finished");
        }
        (lo, hi, now)
    }

    #[test]
    fn stays_inside_the_cushion_and_finishes() {
        for over in [0.0, 10.0, 50.0] {
            let mut scroller = FlingScroller::default();
            scroller.fling(
                FlingAxis {
                    start: -50.0,
                    velocity: 3000.0,
                    min: -200.0,
                    max: 0.0,
                    over,
                },
                FlingAxis::at_rest(0.0),
            );
            let (lo, hi, _) = run(&mut scroller);
            assert!(lo >= -200.0 - over, "over {over}: {lo}");
            assert!(hi <= over, "over {over}: {hi}");
            assert!(scroller.is_finished());
            assert_eq!(scroller.current().x, 0.0);
        }
    }

    #[test]
    fn overshoot_uses_the_cushion() {
        let mut scroller = FlingScroller::default();
        scroller.fling(
            FlingAxis {
                start: -50.0,
                velocity: 3000.0,
                min: -200.0,
                max: 0.0,
                over: 50.0,
            },
            FlingAxis::at_rest(0.0),
        );
        let (_, hi, _) = run(&mut scroller);
        assert!(hi > 0.0);
    }

    #[test]
    fn slow_fling_comes_to_rest_inside() {
        let mut scroller = FlingScroller::default();
        scroller.fling(
            FlingAxis {
                start: -500.0,
                velocity: -300.0,
                min: -1000.0,
                max: 0.0,
                over: 50.0,
            },
            FlingAxis::at_rest(0.0),
        );
        let end = scroller.final_position().x;
        assert!(end < -500.0 && end > -1000.0);
        run(&mut scroller);
        assert!((scroller.current().x - end).abs() < 1e-9);
    }

    #[test]
    fn out_of_bounds_start_springs_back() {
        let mut scroller = FlingScroller::default();
        scroller.fling(
            FlingAxis {
                start: 30.0,
                velocity: 5000.0,
                min: -200.0,
                max: 0.0,
                over: 50.0,
            },
            FlingAxis::at_rest(0.0),
        );
        let (_, hi, _) = run(&mut scroller);
        assert!(hi <= 30.0);
        assert_eq!(scroller.current().x, 0.0);
    }

    #[test]
    fn force_finished_stops_immediately() {
        let mut scroller = FlingScroller::default();
        assert!(scroller.is_finished());
        scroller.fling(
            FlingAxis {
                start: 0.0,
                velocity: -2000.0,
                min: -5000.0,
                max: 0.0,
                over: 0.0,
            },
            FlingAxis::at_rest(0.0),
        );
        assert!(scroller.compute_scroll_offset(0));
        assert!(scroller.compute_scroll_offset(100));
        let at = scroller.current();
        scroller.force_finished();
        assert!(!scroller.compute_scroll_offset(200));
        assert_eq!(scroller.current(), at);
    }

    #[test]
    fn curve_decelerates_to_zero() {
        assert!(max_velocity() > 20_000.0);
        assert!(curve_velocity(0.5) < curve_velocity(0.1));
    }
}
