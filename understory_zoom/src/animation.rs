// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interpolated transform animations.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::point::{AbsolutePoint, ScaledPoint};
use crate::update::{MatrixUpdate, PanChange, ZoomChange};

/// Default animation duration in milliseconds.
pub const DEFAULT_ANIMATION_DURATION_MS: u64 = 280;

/// Slow start, fast middle, slow end.
pub(crate) fn ease_in_out(t: f64) -> f64 {
    ((t + 1.0) * core::f64::consts::PI).cos() * 0.5 + 0.5
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum PanTrack {
    Absolute(AbsolutePoint, AbsolutePoint),
    Scaled(ScaledPoint, ScaledPoint),
}

/// One running animation.
///
/// Start and end values are captured when the animation is created. The clock
/// starts on the first frame, so the time between creation and the first
/// frame does not count.
#[derive(Clone, Debug)]
pub(crate) struct MatrixAnimation {
    update: MatrixUpdate,
    duration_ms: u64,
    start_ms: Option<u64>,
    zoom: Option<(f64, f64)>,
    pan: Option<PanTrack>,
}

impl MatrixAnimation {
    /// Animates from the given current values towards the targets of
    /// `update`. `target_zoom` is the already-clamped real zoom target.
    pub(crate) fn new(
        update: MatrixUpdate,
        duration_ms: u64,
        zoom: f64,
        target_zoom: Option<f64>,
        pan: AbsolutePoint,
        scaled_pan: ScaledPoint,
    ) -> Self {
        let pan = update.pan.map(|change| match change {
            PanChange::AbsoluteTo(target) => PanTrack::Absolute(pan, target),
            PanChange::AbsoluteBy(delta) => PanTrack::Absolute(pan, pan + delta),
            PanChange::ScaledTo(target) => PanTrack::Scaled(scaled_pan, target),
            PanChange::ScaledBy(delta) => PanTrack::Scaled(scaled_pan, scaled_pan + delta),
        });
        Self {
            update,
            duration_ms,
            start_ms: None,
            zoom: target_zoom.map(|target| (zoom, target)),
            pan,
        }
    }

    /// Eased progress at `now_ms`, starting the clock if needed.
    fn progress(&mut self, now_ms: u64) -> f64 {
        let start = *self.start_ms.get_or_insert(now_ms);
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(start) as f64;
        ease_in_out((elapsed / self.duration_ms as f64).clamp(0.0, 1.0))
    }

    /// Immediate update for the frame at `now_ms`, and whether this was the
    /// last frame.
    pub(crate) fn frame(&mut self, now_ms: u64) -> (MatrixUpdate, bool) {
        let t = self.progress(now_ms);
        let finished = self
            .start_ms
            .is_some_and(|start| now_ms.saturating_sub(start) >= self.duration_ms);
        let t = if finished { 1.0 } else { t };

        let mut update = MatrixUpdate::new()
            .with_maybe_pivot(self.update.pivot)
            .with_notify(self.update.notify);
        if let Some((from, to)) = self.zoom {
            update = update.with_zoom(ZoomChange::To(lerp(from, to, t)), self.update.can_over_zoom);
        }
        if let Some(track) = self.pan {
            let change = match track {
                PanTrack::Absolute(from, to) => PanChange::AbsoluteTo(AbsolutePoint::new(
                    lerp(from.x, to.x, t),
                    lerp(from.y, to.y, t),
                )),
                PanTrack::Scaled(from, to) => PanChange::ScaledTo(ScaledPoint::new(
                    lerp(from.x, to.x, t),
                    lerp(from.y, to.y, t),
                )),
            };
            update = update.with_pan(change, self.update.can_over_pan);
        }
        (update, finished)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::{MatrixAnimation, ease_in_out};
    use crate::point::{AbsolutePoint, ScaledPoint};
    use crate::update::{MatrixUpdate, PanChange, ZoomChange};

    #[test]
    fn easing_endpoints_and_symmetry() {
        assert!(ease_in_out(0.0).abs() < 1e-12);
        assert!((ease_in_out(1.0) - 1.0).abs() < 1e-12);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-12);
        assert!((ease_in_out(0.25) + ease_in_out(0.75) - 1.0).abs() < 1e-12);
        // Slow start.
        assert!(ease_in_out(0.1) < 0.1);
    }

    #[test]
    fn clock_starts_on_first_frame() {
        let update = MatrixUpdate::new().with_zoom(ZoomChange::To(2.0), false);
        let mut anim = MatrixAnimation::new(
            update,
            100,
            1.0,
            Some(2.0),
            AbsolutePoint::ZERO,
            ScaledPoint::ZERO,
        );
        let (first, done) = anim.frame(5_000);
        assert!(!done);
        assert_eq!(first.zoom, Some(ZoomChange::To(1.0)));
        let (mid, done) = anim.frame(5_050);
        assert!(!done);
        let Some(ZoomChange::To(z)) = mid.zoom else {
            panic!("expected an absolute zoom frame");
        };
        assert!((z - 1.5).abs() < 1e-9);
        let (last, done) = anim.frame(5_200);
        assert!(done);
        assert_eq!(last.zoom, Some(ZoomChange::To(2.0)));
    }

    #[test]
    fn frames_keep_the_update_flags() {
        let update = MatrixUpdate::new()
            .with_pan(PanChange::AbsoluteBy(AbsolutePoint::new(10.0, -10.0)), true)
            .with_pivot(Point::new(3.0, 4.0))
            .with_notify(false);
        let mut anim = MatrixAnimation::new(
            update,
            0,
            1.0,
            None,
            AbsolutePoint::new(5.0, 5.0),
            ScaledPoint::ZERO,
        );
        let (frame, done) = anim.frame(0);
        assert!(done);
        assert_eq!(
            frame.pan,
            Some(PanChange::AbsoluteTo(AbsolutePoint::new(15.0, -5.0)))
        );
        assert!(frame.can_over_pan);
        assert!(!frame.notify);
        assert_eq!(frame.pivot, Some(Point::new(3.0, 4.0)));
        assert_eq!(frame.zoom, None);
    }
}
